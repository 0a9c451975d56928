//! Conversions between script values and the context's typed parameters.

use rhai::{Array, Blob, Dynamic, Map};
use serde_json::Value;

use crate::args::{ArgBag, ArgKind, ArgSpec};
use crate::context::{Content, WriteOptions};
use crate::error::{KinoError, Result};
use crate::gitignore::GitignoreExtras;

/// Convert a script value to JSON. Argument bags keep their declaration
/// order, also when nested inside maps or arrays.
pub fn to_json_value(value: &Dynamic) -> Result<Value> {
    if let Some(bag) = value.clone().try_cast::<ArgBag>() {
        return Ok(bag.into_value());
    }
    if value.is_map() {
        if let Some(map) = value.clone().try_cast::<Map>() {
            let mut out = serde_json::Map::new();
            for (key, v) in map {
                out.insert(key.to_string(), to_json_value(&v)?);
            }
            return Ok(Value::Object(out));
        }
    }
    if value.is_array() {
        if let Some(items) = value.clone().try_cast::<Array>() {
            return items.iter().map(to_json_value).collect::<Result<Vec<_>>>().map(Value::Array);
        }
    }
    serde_json::to_value(value)
        .map_err(|e| KinoError::ContentType(format!("cannot convert {} to JSON: {}", value.type_name(), e)))
}

/// Template arguments for `write`: an argument bag or a map.
pub fn template_args(value: &Dynamic) -> Result<Value> {
    match to_json_value(value)? {
        obj @ Value::Object(_) => Ok(obj),
        _ => Err(KinoError::ContentType(format!(
            "write args must be a map, got {}",
            value.type_name()
        ))),
    }
}

pub fn from_json_value(value: Value) -> Result<Dynamic> {
    rhai::serde::to_dynamic(value).map_err(|e| KinoError::Script(e.to_string()))
}

/// Inline `write` payload: a string or a blob, nothing else.
pub fn content(value: Dynamic) -> Result<Content> {
    if value.is_string() {
        let text = value
            .into_string()
            .map_err(|t| KinoError::ContentType(format!("illegal content type {}", t)))?;
        return Ok(Content::Text(text));
    }
    let type_name = value.type_name().to_string();
    match value.try_cast::<Blob>() {
        Some(bytes) => Ok(Content::Bytes(bytes)),
        None => Err(KinoError::ContentType(format!("illegal content type {}", type_name))),
    }
}

/// Second argument of `write`: inline content, or an options map
/// `#{ content, source, args, mkdir }`.
pub fn write_options(value: Dynamic) -> Result<WriteOptions> {
    if !value.is_map() {
        return Ok(WriteOptions {
            content: Some(content(value)?),
            ..WriteOptions::default()
        });
    }
    let Some(map) = value.try_cast::<Map>() else {
        return Err(KinoError::ContentType("illegal write options".to_string()));
    };
    let mut opts = WriteOptions::default();
    for (key, v) in map {
        match key.as_str() {
            "content" => opts.content = Some(content(v)?),
            "source" => opts.source = Some(string_attr("source", v)?),
            "args" => opts.args = Some(template_args(&v)?),
            "mkdir" => opts.mkdir = bool_attr("mkdir", &v)?,
            other => {
                return Err(KinoError::ContentType(format!("unknown write option '{}'", other)))
            }
        }
    }
    Ok(opts)
}

/// Build an option or positional declaration from `k.option(decl, attrs)` / `k.argument(name, attrs)`.
pub fn arg_spec(decl: &str, positional: bool, attrs: Map) -> Result<ArgSpec> {
    let mut spec = if positional {
        ArgSpec::argument(decl)?
    } else {
        ArgSpec::option(decl)?
    };
    let mut is_flag = false;
    for (key, v) in attrs {
        match key.as_str() {
            "default" => spec = spec.with_default(to_json_value(&v)?),
            "required" => spec = spec.with_required(bool_attr("required", &v)?),
            "help" => spec = spec.with_help(string_attr("help", v)?),
            "is_flag" => is_flag = bool_attr("is_flag", &v)?,
            "type" => spec = spec.with_kind(ArgKind::parse_name(&string_attr("type", v)?)?),
            other => {
                return Err(KinoError::Argument(format!(
                    "unknown attribute '{}' for '{}'",
                    other, decl
                )))
            }
        }
    }
    if is_flag {
        spec = spec.with_kind(ArgKind::Flag);
    }
    Ok(spec)
}

pub fn gitignore_extras(opts: &Map) -> Result<GitignoreExtras> {
    let mut extras = GitignoreExtras::default();
    for (key, v) in opts {
        let flag = bool_attr(key.as_str(), v)?;
        match key.as_str() {
            "mac_os" => extras.mac_os = flag,
            "intellij_idea" => extras.intellij_idea = flag,
            "vscode" => extras.vscode = flag,
            "netbeans" => extras.netbeans = flag,
            other => {
                return Err(KinoError::Argument(format!("unknown .gitignore extra '{}'", other)))
            }
        }
    }
    Ok(extras)
}

pub fn bool_attr(name: &str, v: &Dynamic) -> Result<bool> {
    v.as_bool()
        .map_err(|t| KinoError::Argument(format!("'{}' must be a bool, got {}", name, t)))
}

fn string_attr(name: &str, v: Dynamic) -> Result<String> {
    let type_name = v.type_name().to_string();
    v.into_string()
        .map_err(|_| KinoError::Argument(format!("'{}' must be a string, got {}", name, type_name)))
}
