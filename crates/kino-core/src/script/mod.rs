//! Script runtime: compile a Rhai script, check its entry point and run
//! `main(k)` inside the target directory with a [`Proxy`] as `k`.

mod convert;
pub mod proxy;
mod register;

pub use proxy::Proxy;

use rhai::{CallFnOptions, Dynamic, Engine, Position, Scope, AST};
use std::fs;
use std::path::Path;

use crate::config::KinoConfig;
use crate::context::workdir::WorkDir;
use crate::context::{console, Context};
use crate::error::{IoContext, KinoError, Result};
use crate::http::HttpClient;
use crate::source::Source;

const ENTRY: &str = "main";

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// A help flag was given; carries the usage text to print.
    Help(String),
}

fn build_engine() -> Engine {
    let mut engine = Engine::new();
    // Debug builds default to a shallow nesting limit that option lists hit.
    engine.set_max_expr_depths(128, 64);
    engine.set_module_resolver(rhai::module_resolvers::DummyModuleResolver::new());
    engine.on_print(console::info);
    engine.on_debug(|text: &str, source: Option<&str>, pos: Position| {
        tracing::debug!(source = source.unwrap_or(""), %pos, "{}", text);
    });
    register::register(&mut engine);
    engine
}

/// Compile `text` and make sure it defines `fn main(k)`.
fn compile(engine: &Engine, text: &str, location: &str) -> Result<AST> {
    let ast = engine
        .compile(text)
        .map_err(|e| KinoError::Script(format!("{}: {}", location, e)))?;
    let has_entry = ast
        .iter_functions()
        .any(|f| f.name == ENTRY && f.params.len() == 1);
    if !has_entry {
        return Err(KinoError::MissingEntry(location.to_string()));
    }
    Ok(ast)
}

/// Compile-only validation used by `kino check`.
pub fn check_script(text: &str, location: &str) -> Result<()> {
    compile(&build_engine(), text, location)?;
    Ok(())
}

impl Context {
    /// Run script text bound to this context.
    ///
    /// Syntax errors and a missing entry are reported before the working
    /// directory changes. While `main` runs the process sits in the target
    /// directory; the previous directory is restored on every exit path.
    pub fn run_script(&self, text: &str) -> Result<RunOutcome> {
        let engine = build_engine();
        let ast = compile(&engine, text, &self.source().location())?;
        self.run(|proxy| {
            let mut scope = Scope::new();
            let options = CallFnOptions::new().eval_ast(true).rewind_scope(true);
            let outcome = engine.call_fn_with_options::<Dynamic>(
                options,
                &mut scope,
                &ast,
                ENTRY,
                (proxy.clone(),),
            );
            // An aborting proxy call wins over whatever Rhai reports on top of it.
            if let Some(err) = proxy.take_parked() {
                return Err(err);
            }
            outcome.map(|_| ()).map_err(|e| KinoError::Script(e.to_string()))
        })
    }

    /// Enter the target directory and hand a fresh [`Proxy`] to `f`.
    pub fn run<F>(&self, f: F) -> Result<RunOutcome>
    where
        F: FnOnce(&Proxy) -> Result<()>,
    {
        let proxy = Proxy::new(self.clone());
        let _guard = WorkDir::enter(self.target_dir())?;
        tracing::info!(source = %self.source(), target = %self.target_dir().display(), "running script");
        match f(&proxy) {
            Ok(()) => Ok(RunOutcome::Completed),
            Err(KinoError::HelpRequested(text)) => Ok(RunOutcome::Help(text)),
            Err(e) => Err(e),
        }
    }
}

/// Everything one `kino run` needs.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub location: String,
    pub target: std::path::PathBuf,
    pub overwrite: bool,
    pub script_args: Vec<String>,
}

/// Resolve the source, load the script, create the target if absent and run.
pub fn run(req: &RunRequest, cfg: &KinoConfig) -> Result<RunOutcome> {
    let http = HttpClient::new(cfg.http.clone());
    let source = Source::new(&req.location, http)?;
    let text = source.read_script()?;
    ensure_target(&req.target)?;
    let ctx = Context::new(&req.target, source, req.script_args.clone())?
        .allow_overwrite(req.overwrite)
        .with_config(cfg);
    ctx.run_script(&text)
}

/// Resolve the source and validate its script without running it.
pub fn check(location: &str, cfg: &KinoConfig) -> Result<()> {
    let source = Source::new(location, HttpClient::new(cfg.http.clone()))?;
    let text = source.read_script()?;
    check_script(&text, &source.location())
}

fn ensure_target(target: &Path) -> Result<()> {
    if target.exists() {
        return Ok(());
    }
    fs::create_dir_all(target).io_context(|| format!("create target {}", target.display()))?;
    tracing::debug!(target = %target.display(), "created target directory");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_requires_one_arg_main() {
        let engine = build_engine();
        assert!(compile(&engine, "fn main(k) { }", "a.kino.rhai").is_ok());

        let err = compile(&engine, "fn helper(k) { }", "a.kino.rhai").unwrap_err();
        assert!(matches!(err, KinoError::MissingEntry(loc) if loc == "a.kino.rhai"));

        let err = compile(&engine, "fn main() { }", "a.kino.rhai").unwrap_err();
        assert!(matches!(err, KinoError::MissingEntry(_)));
    }

    #[test]
    fn nested_option_declarations_compile() {
        let text = r#"
fn main(k) {
    let args = k.get_args([
        k.option("--group", #{ required: true, help: "g" }),
        k.option("-n/--name", #{ "default": k.target_name, help: "n" }),
    ]);
}
"#;
        assert!(check_script(text, "opts.kino.rhai").is_ok());
    }

    #[test]
    fn syntax_error_is_script_error() {
        let err = check_script("fn main(k) { let = ; }", "bad.kino.rhai").unwrap_err();
        match err {
            KinoError::Script(msg) => assert!(msg.starts_with("bad.kino.rhai")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn imports_are_disabled() {
        let engine = build_engine();
        let ast = compile(&engine, "fn main(k) { }\nimport \"x\" as x;", "s").unwrap();
        assert!(engine.run_ast(&ast).is_err());
    }
}
