//! RAII guard that restores the process working directory when dropped.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, Result};

/// Holds the previous working directory for the lifetime of a script run.
pub struct WorkDir {
    previous: PathBuf,
}

impl WorkDir {
    /// Change into `dir`; the old directory comes back when the guard drops,
    /// on success, error and unwind alike.
    pub fn enter(dir: &Path) -> Result<WorkDir> {
        let previous = env::current_dir().io_context(|| "read current directory".to_string())?;
        env::set_current_dir(dir).io_context(|| format!("change directory to {}", dir.display()))?;
        tracing::debug!(from = %previous.display(), to = %dir.display(), "entered work dir");
        Ok(WorkDir { previous })
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            tracing::warn!(dir = %self.previous.display(), "restore work dir failed: {}", e);
        }
    }
}
