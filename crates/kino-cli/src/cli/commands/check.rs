//! `kino check` – compile a script and verify its entry point.

use anyhow::{Context, Result};
use kino_core::config::KinoConfig;

pub fn run_check(cfg: &KinoConfig, source: &str) -> Result<()> {
    kino_core::check(source, cfg).with_context(|| format!("check {}", source))?;
    println!("{}: ok", source);
    Ok(())
}
