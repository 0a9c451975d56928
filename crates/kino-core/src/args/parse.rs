//! Command-line tail parsing, delegated to a `clap::Command` built from the
//! script's declaration table.

use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches, ColorChoice, Command};
use serde_json::Value;
use std::collections::HashSet;

use super::{ArgBag, ArgKind, ArgSpec, Resolution, TARGET_NAME_KEY};
use crate::error::{KinoError, Result};

const HELP_FLAGS: [&str; 3] = ["-H", "--HELP", "--help"];
const HELP_ID: &str = "HELP";

/// Parse `tokens` against `specs`.
///
/// A help flag anywhere before `--` wins over every other check. Otherwise
/// values land in the bag in declaration order, and `target_name` is added
/// when no declaration produced that key.
pub fn resolve(specs: &[ArgSpec], tokens: &[String], target_name: &str) -> Result<Resolution> {
    validate(specs)?;
    let wants_help = tokens
        .iter()
        .take_while(|t| t.as_str() != "--")
        .any(|t| HELP_FLAGS.contains(&t.as_str()));
    if wants_help {
        return Ok(Resolution::Help(command(specs).render_help().to_string()));
    }

    let matches = command(specs)
        .try_get_matches_from(tokens)
        .map_err(argument_error)?;

    let mut bag = ArgBag::default();
    for spec in specs {
        bag.insert(spec.key.clone(), value_of(&matches, spec));
    }
    if !bag.contains(TARGET_NAME_KEY) {
        bag.insert(TARGET_NAME_KEY.to_string(), Value::String(target_name.to_string()));
    }
    Ok(Resolution::Args(bag))
}

/// Usage text for `specs`, as printed for `-H`.
pub fn usage(specs: &[ArgSpec]) -> Result<String> {
    validate(specs)?;
    Ok(command(specs).render_help().to_string())
}

fn command(specs: &[ArgSpec]) -> Command {
    let help = Arg::new(HELP_ID)
        .short('H')
        .long("HELP")
        .action(ArgAction::Help)
        .help("Show this message and exit");
    let mut cmd = Command::new("script")
        .bin_name("kino script")
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args_override_self(true)
        .color(ColorChoice::Never)
        .arg(help);
    for spec in specs {
        cmd = cmd.arg(to_arg(spec));
    }
    cmd
}

fn to_arg(spec: &ArgSpec) -> Arg {
    let mut arg = Arg::new(spec.key.clone()).required(spec.required);
    if spec.positional {
        arg = arg.value_name(spec.display_name());
    } else {
        if let Some(long) = &spec.long {
            arg = arg.long(long.clone());
        }
        if let Some(short) = spec.short {
            arg = arg.short(short);
        }
        if spec.effective_kind() != ArgKind::Flag {
            arg = arg.value_name(spec.key.to_uppercase());
        }
    }
    if !spec.help.is_empty() {
        arg = arg.help(spec.help.clone());
    }
    // Shown in the help text only; the typed default is applied in `value_of`.
    match &spec.default {
        _ if spec.required => {}
        Some(Value::String(s)) if !s.is_empty() => arg = arg.default_value(s.clone()),
        Some(v @ Value::Number(_)) => arg = arg.default_value(v.to_string()),
        _ => {}
    }
    match spec.effective_kind() {
        ArgKind::Flag => arg.action(ArgAction::SetTrue),
        ArgKind::Int => arg.action(ArgAction::Set).value_parser(value_parser!(i64)),
        ArgKind::Float => arg.action(ArgAction::Set).value_parser(value_parser!(f64)),
        ArgKind::Text => arg.action(ArgAction::Set),
    }
}

fn value_of(matches: &ArgMatches, spec: &ArgSpec) -> Value {
    let id = spec.key.as_str();
    if matches.value_source(id) == Some(ValueSource::CommandLine) {
        let given = match spec.effective_kind() {
            ArgKind::Flag => Some(Value::Bool(matches.get_flag(id))),
            ArgKind::Int => matches.get_one::<i64>(id).map(|v| Value::from(*v)),
            ArgKind::Float => matches
                .get_one::<f64>(id)
                .and_then(|v| serde_json::Number::from_f64(*v))
                .map(Value::Number),
            ArgKind::Text => matches.get_one::<String>(id).map(|v| Value::String(v.clone())),
        };
        if let Some(value) = given {
            return value;
        }
    }
    match (&spec.default, spec.effective_kind()) {
        (Some(default), _) => default.clone(),
        (None, ArgKind::Flag) => Value::Bool(false),
        (None, _) => Value::Null,
    }
}

/// Reject tables clap would refuse to build.
fn validate(specs: &[ArgSpec]) -> Result<()> {
    let mut keys = HashSet::new();
    let mut longs: HashSet<&str> = HashSet::from(["HELP", "help"]);
    let mut shorts: HashSet<char> = HashSet::from(['H']);
    let mut optional_positional = false;
    for spec in specs {
        let taken = |what: &str| {
            KinoError::Argument(format!("{} declared twice: {}", what, spec.display_name()))
        };
        if spec.key == HELP_ID || !keys.insert(spec.key.as_str()) {
            return Err(taken("option"));
        }
        if let Some(long) = spec.long.as_deref() {
            if !longs.insert(long) {
                return Err(taken("long name"));
            }
        }
        if let Some(short) = spec.short {
            if !shorts.insert(short) {
                return Err(taken("short name"));
            }
        }
        if spec.positional {
            if spec.effective_kind() == ArgKind::Flag {
                return Err(KinoError::Argument(format!(
                    "argument {} cannot be a flag",
                    spec.display_name()
                )));
            }
            if spec.required && optional_positional {
                return Err(KinoError::Argument(format!(
                    "required argument {} follows an optional one",
                    spec.display_name()
                )));
            }
            optional_positional |= !spec.required;
        }
    }
    Ok(())
}

/// First paragraph of clap's message, without the `error: ` lead.
fn argument_error(err: clap::Error) -> KinoError {
    let rendered = err.render().to_string();
    let first = rendered.split("\n\n").next().unwrap_or(&rendered).trim();
    KinoError::Argument(first.strip_prefix("error: ").unwrap_or(first).to_string())
}
