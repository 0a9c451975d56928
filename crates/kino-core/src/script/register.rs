//! Rhai bindings for [`Proxy`]: the method set a script sees on `k`.
//!
//! Keyword arguments become overloads or an options map. Failures abort the
//! script with a non-catchable termination so `try`/`catch` in a script cannot
//! swallow an overwrite conflict or a fetch error.

use rhai::{Array, Blob, Dynamic, Engine, EvalAltResult, ImmutableString, Map, Position};

use super::convert;
use super::proxy::Proxy;
use crate::args::{ArgBag, ArgSpec};
use crate::context::WriteOptions;
use crate::error::{KinoError, Result};
use crate::gitignore::GitignoreExtras;

type RhaiResult<T> = std::result::Result<T, Box<EvalAltResult>>;

/// Run `f` against the proxy, turning a `KinoError` into script termination.
fn call<T>(k: &Proxy, f: impl FnOnce(&Proxy) -> Result<T>) -> RhaiResult<T> {
    f(k).map_err(|e| {
        let msg = k.park(e);
        Box::new(EvalAltResult::ErrorTerminated(Dynamic::from(msg), Position::NONE))
    })
}

fn strings(values: &[Dynamic]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn specs_from(array: Array) -> Result<Vec<ArgSpec>> {
    array
        .into_iter()
        .map(|item| {
            let type_name = item.type_name();
            item.try_cast::<ArgSpec>().ok_or_else(|| {
                KinoError::Argument(format!(
                    "get_args expects k.option(...) or k.argument(...) entries, got {}",
                    type_name
                ))
            })
        })
        .collect()
}

pub fn register(engine: &mut Engine) {
    engine.register_type_with_name::<Proxy>("Kino");
    engine.register_type_with_name::<ArgSpec>("ArgSpec");
    engine.register_type_with_name::<ArgBag>("ArgBag");

    register_properties(engine);
    register_files(engine);
    register_args(engine);
    register_bag(engine);
    register_output(engine);
    register_network(engine);
}

fn register_properties(engine: &mut Engine) {
    engine
        .register_get("target_dir", |k: &mut Proxy| k.target_dir())
        .register_get("target_name", |k: &mut Proxy| k.target_name())
        .register_get("source_location", |k: &mut Proxy| k.source_location())
        .register_get("source_args", |k: &mut Proxy| -> Array {
            k.source_args().into_iter().map(Dynamic::from).collect()
        });
}

fn register_files(engine: &mut Engine) {
    engine
        .register_fn("write", |k: &mut Proxy, path: &str, payload: Dynamic| {
            call(k, |k| k.write(path, convert::write_options(payload)?))
        })
        .register_fn(
            "write",
            |k: &mut Proxy, path: &str, payload: Dynamic, args: Dynamic| {
                call(k, |k| {
                    let opts = WriteOptions {
                        content: Some(convert::content(payload)?),
                        args: Some(convert::template_args(&args)?),
                        ..WriteOptions::default()
                    };
                    k.write(path, opts)
                })
            },
        )
        .register_fn("copy", |k: &mut Proxy, path: &str| {
            call(k, |k| k.copy(path, None, true))
        })
        .register_fn("copy", |k: &mut Proxy, path: &str, source: &str| {
            call(k, |k| k.copy(path, Some(source), true))
        })
        .register_fn(
            "copy",
            |k: &mut Proxy, path: &str, source: &str, mkdir: bool| {
                call(k, |k| k.copy(path, Some(source), mkdir))
            },
        );

    for name in ["download", "wget"] {
        engine
            .register_fn(name, |k: &mut Proxy, path: &str, url: &str| {
                call(k, |k| k.download(path, url, true))
            })
            .register_fn(name, |k: &mut Proxy, path: &str, url: &str, mkdir: bool| {
                call(k, |k| k.download(path, url, mkdir))
            });
    }

    for name in ["mkdir", "mkdir_p"] {
        engine.register_fn(name, |k: &mut Proxy, path: &str| call(k, |k| k.mkdir(path)));
    }

    engine
        .register_fn("exists", |k: &mut Proxy, path: &str| call(k, |k| k.exists(path)))
        .register_fn("exists_source", |k: &mut Proxy, path: &str| {
            call(k, |k| k.exists_source(path))
        })
        .register_fn("read", |k: &mut Proxy, path: &str| call(k, |k| k.read_text(path)))
        .register_fn("read", |k: &mut Proxy, path: &str, as_text: bool| {
            call(k, |k| {
                if as_text {
                    Ok(Dynamic::from(k.read_text(path)?))
                } else {
                    Ok(Dynamic::from_blob(k.read(path)?))
                }
            })
        })
        .register_fn("rm", |k: &mut Proxy, path: &str| call(k, |k| k.rm(path)));
}

fn register_args(engine: &mut Engine) {
    engine
        .register_fn("option", |k: &mut Proxy, decl: &str| {
            call(k, |_| convert::arg_spec(decl, false, Map::new()))
        })
        .register_fn("option", |k: &mut Proxy, decl: &str, attrs: Map| {
            call(k, |_| convert::arg_spec(decl, false, attrs))
        })
        .register_fn("argument", |k: &mut Proxy, name: &str| {
            call(k, |_| convert::arg_spec(name, true, Map::new()))
        })
        .register_fn("argument", |k: &mut Proxy, name: &str, attrs: Map| {
            call(k, |_| convert::arg_spec(name, true, attrs))
        })
        .register_fn("get_args", |k: &mut Proxy, specs: Array| {
            call(k, |k| k.get_args(&specs_from(specs)?))
        });
}

/// The resolved argument bag. A string indexer doubles as property access,
/// so `args.name` and `args["name"]` both work.
fn register_bag(engine: &mut Engine) {
    engine
        .register_indexer_get(|bag: &mut ArgBag, key: ImmutableString| -> RhaiResult<Dynamic> {
            match bag.get(&key) {
                Some(value) => convert::from_json_value(value.clone()).map_err(|e| e.to_string().into()),
                None => Ok(Dynamic::UNIT),
            }
        })
        .register_indexer_set(|bag: &mut ArgBag, key: ImmutableString, value: Dynamic| -> RhaiResult<()> {
            let value = convert::to_json_value(&value).map_err(|e| e.to_string())?;
            bag.insert(key.to_string(), value);
            Ok(())
        })
        .register_fn("keys", |bag: &mut ArgBag| -> Array {
            bag.keys().map(|key| Dynamic::from(key.to_string())).collect()
        })
        .register_fn("len", |bag: &mut ArgBag| bag.len() as i64)
        .register_fn("contains", |bag: &mut ArgBag, key: &str| bag.contains(key))
        .register_fn("to_map", |bag: &mut ArgBag| -> RhaiResult<Dynamic> {
            convert::from_json_value(bag.clone().into_value()).map_err(|e| e.to_string().into())
        })
        .register_fn("to_string", |bag: &mut ArgBag| bag.to_json())
        .register_fn("to_debug", |bag: &mut ArgBag| bag.to_json());
}

fn register_output(engine: &mut Engine) {
    engine
        .register_fn("to_json", |k: &mut Proxy, value: Dynamic| {
            call(k, |k| k.to_json(&convert::to_json_value(&value)?, true, false))
        })
        .register_fn("to_json", |k: &mut Proxy, value: Dynamic, pretty: bool| {
            call(k, |k| k.to_json(&convert::to_json_value(&value)?, pretty, false))
        })
        .register_fn(
            "to_json",
            |k: &mut Proxy, value: Dynamic, pretty: bool, sort_keys: bool| {
                call(k, |k| k.to_json(&convert::to_json_value(&value)?, pretty, sort_keys))
            },
        );

    engine
        .register_fn("log", |k: &mut Proxy, msg: &str| k.log(msg, &[]))
        .register_fn("log", |k: &mut Proxy, msg: &str, a: Dynamic| {
            k.log(msg, &strings(&[a]))
        })
        .register_fn("log", |k: &mut Proxy, msg: &str, a: Dynamic, b: Dynamic| {
            k.log(msg, &strings(&[a, b]))
        })
        .register_fn(
            "log",
            |k: &mut Proxy, msg: &str, a: Dynamic, b: Dynamic, c: Dynamic| {
                k.log(msg, &strings(&[a, b, c]))
            },
        )
        .register_fn("log_error", |k: &mut Proxy, msg: &str| k.log_error(msg, &[]))
        .register_fn("log_error", |k: &mut Proxy, msg: &str, a: Dynamic| {
            k.log_error(msg, &strings(&[a]))
        })
        .register_fn("log_error", |k: &mut Proxy, msg: &str, a: Dynamic, b: Dynamic| {
            k.log_error(msg, &strings(&[a, b]))
        })
        .register_fn(
            "log_error",
            |k: &mut Proxy, msg: &str, a: Dynamic, b: Dynamic, c: Dynamic| {
                k.log_error(msg, &strings(&[a, b, c]))
            },
        )
        .register_fn("raise_error", |k: &mut Proxy, msg: &str| -> RhaiResult<()> {
            call(k, |k| Err(k.raise_error(msg)))
        });
}

fn register_network(engine: &mut Engine) {
    engine
        .register_fn("curl", |k: &mut Proxy, url: &str| call(k, |k| k.curl_text(url, false)))
        .register_fn("curl", |k: &mut Proxy, url: &str, opts: Map| {
            call(k, |k| {
                let mut as_text = true;
                let mut strip = false;
                for (key, v) in &opts {
                    match key.as_str() {
                        "as_text" => as_text = convert::bool_attr("as_text", v)?,
                        "strip" => strip = convert::bool_attr("strip", v)?,
                        other => {
                            return Err(KinoError::Argument(format!("unknown curl option '{}'", other)))
                        }
                    }
                }
                if as_text {
                    Ok(Dynamic::from(k.curl_text(url, strip)?))
                } else {
                    let bytes: Blob = k.curl(url)?;
                    Ok(Dynamic::from_blob(bytes))
                }
            })
        })
        .register_fn("curl_gitignore", |k: &mut Proxy, lang: &str| {
            call(k, |k| k.curl_gitignore(lang, GitignoreExtras::default()))
        })
        .register_fn("curl_gitignore", |k: &mut Proxy, lang: &str, opts: Map| {
            call(k, |k| k.curl_gitignore(lang, convert::gitignore_extras(&opts)?))
        });
}
