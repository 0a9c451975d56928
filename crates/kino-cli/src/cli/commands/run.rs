//! `kino run` – execute a template script against a target directory.

use anyhow::Result;
use kino_core::config::KinoConfig;
use kino_core::{RunOutcome, RunRequest};
use std::path::PathBuf;

pub fn run_script(
    cfg: &KinoConfig,
    source: String,
    target: PathBuf,
    overwrite: bool,
    script_args: Vec<String>,
) -> Result<()> {
    let req = RunRequest {
        location: source,
        target,
        overwrite,
        script_args,
    };
    tracing::info!(
        source = %req.location,
        target = %req.target.display(),
        overwrite = req.overwrite,
        "kino run"
    );

    match kino_core::run(&req, cfg)? {
        RunOutcome::Completed => {
            tracing::info!(source = %req.location, "script completed");
        }
        RunOutcome::Help(usage) => print!("{}", usage),
    }
    Ok(())
}
