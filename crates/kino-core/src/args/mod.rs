//! Script argument resolution.
//!
//! A script declares an ordered table of options and positional arguments;
//! the raw tokens after the script location on the command line are parsed
//! against it into an [`ArgBag`].

mod parse;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{KinoError, Result};

pub use parse::{resolve, usage};

/// Key injected with the target directory's base name when no declaration provides it.
pub const TARGET_NAME_KEY: &str = "target_name";

/// Value type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Text,
    Int,
    Float,
    /// Takes no value; present means `true`.
    Flag,
}

impl ArgKind {
    pub fn parse_name(name: &str) -> Result<ArgKind> {
        match name {
            "string" | "str" | "text" => Ok(ArgKind::Text),
            "int" | "integer" => Ok(ArgKind::Int),
            "float" => Ok(ArgKind::Float),
            "bool" | "flag" => Ok(ArgKind::Flag),
            other => Err(KinoError::Argument(format!("unknown option type '{}'", other))),
        }
    }
}

/// One declared option (`--group`) or positional argument (`name`).
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    /// Key in the resulting bag.
    pub key: String,
    pub long: Option<String>,
    pub short: Option<char>,
    pub positional: bool,
    pub kind: Option<ArgKind>,
    pub default: Option<Value>,
    pub required: bool,
    pub help: String,
}

impl ArgSpec {
    /// Declare an option from `--name`, `-n`, `-n/--name` or `-n, --name`.
    pub fn option(decl: &str) -> Result<ArgSpec> {
        let mut long = None;
        let mut short = None;
        for part in decl.split(&['/', ',', ' '][..]).map(str::trim).filter(|p| !p.is_empty()) {
            if let Some(name) = part.strip_prefix("--") {
                if name.is_empty() || name.starts_with('-') {
                    return Err(bad_decl(decl));
                }
                long = Some(name.to_string());
            } else if let Some(name) = part.strip_prefix('-') {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c != '-' => short = Some(c),
                    _ => return Err(bad_decl(decl)),
                }
            } else {
                return Err(bad_decl(decl));
            }
        }
        let key = match (&long, short) {
            (Some(l), _) => l.replace('-', "_"),
            (None, Some(c)) => c.to_string(),
            (None, None) => return Err(bad_decl(decl)),
        };
        Ok(ArgSpec {
            key,
            long,
            short,
            positional: false,
            kind: None,
            default: None,
            required: false,
            help: String::new(),
        })
    }

    /// Declare a positional argument. Required unless a default is given.
    pub fn argument(name: &str) -> Result<ArgSpec> {
        let name = name.trim();
        if name.is_empty() || name.starts_with('-') {
            return Err(bad_decl(name));
        }
        Ok(ArgSpec {
            key: name.replace('-', "_"),
            long: None,
            short: None,
            positional: true,
            kind: None,
            default: None,
            required: true,
            help: String::new(),
        })
    }

    pub fn with_default(mut self, value: Value) -> Self {
        if self.positional {
            self.required = false;
        }
        self.default = Some(value);
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn with_kind(mut self, kind: ArgKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Declared kind, or one inferred from the default (bool → flag).
    pub fn effective_kind(&self) -> ArgKind {
        if let Some(kind) = self.kind {
            return kind;
        }
        match &self.default {
            Some(Value::Bool(_)) if !self.positional => ArgKind::Flag,
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => ArgKind::Int,
            Some(Value::Number(_)) => ArgKind::Float,
            _ => ArgKind::Text,
        }
    }

    /// How the option is spelled in messages: `--group`, `-g` or `NAME`.
    pub fn display_name(&self) -> String {
        if self.positional {
            return self.key.to_uppercase();
        }
        match (&self.long, self.short) {
            (Some(l), _) => format!("--{}", l),
            (None, Some(c)) => format!("-{}", c),
            (None, None) => self.key.clone(),
        }
    }
}

fn bad_decl(decl: &str) -> KinoError {
    KinoError::Argument(format!("invalid option declaration '{}'", decl))
}

/// Resolved script arguments in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ArgBag(Map<String, Value>);

impl ArgBag {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub(crate) fn insert(&mut self, key: String, value: Value) {
        self.0.insert(key, value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

/// Outcome of resolving: either arguments, or a request to show usage and stop.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Args(ArgBag),
    Help(String),
}
