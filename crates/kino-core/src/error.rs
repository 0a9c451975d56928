//! Error kinds surfaced by a kino run.
//!
//! Every variant aborts the run; there is no retry and no rollback of files
//! already written.

use std::io;
use std::path::PathBuf;

/// Result alias used throughout the core crate.
pub type Result<T, E = KinoError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum KinoError {
    /// Target path exists but is not a directory.
    #[error("target {0} is not a directory")]
    InvalidTarget(PathBuf),

    /// Location string is neither a local path nor an HTTP(S) URL.
    #[error("illegal script location: {0}")]
    InvalidSourceLocation(String),

    /// A companion path was absolute or climbed out of the script's origin.
    #[error("companion path {0:?} must be relative to the script location")]
    OutsideOrigin(String),

    /// A target path was absolute or climbed out of the target directory.
    #[error("path {0:?} must stay inside the target directory")]
    OutsideTarget(String),

    /// Remote request failed or returned a non-success status.
    #[error("fetch {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    /// Destination exists and overwriting was not permitted.
    #[error("refusing to overwrite {0}, use --overwrite option")]
    OverwriteConflict(PathBuf),

    /// `write` got content of an unsupported type, or no content at all.
    #[error("{0}")]
    ContentType(String),

    /// The script does not define a callable `main(k)`.
    #[error("no main function in kino script {0}")]
    MissingEntry(String),

    /// Script argument parsing failed.
    #[error("{0}")]
    Argument(String),

    /// A help flag was found in the script arguments. Carries the usage text;
    /// the run stops here and still counts as successful.
    #[error("help requested")]
    HelpRequested(String),

    /// Template syntax error or undefined variable.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Script evaluation failed (syntax, runtime or `raise_error`).
    #[error("script error: {0}")]
    Script(String),

    #[error("invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl KinoError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        KinoError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn fetch(url: &str, reason: impl Into<String>) -> Self {
        KinoError::Fetch {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Attach a path-style context to `io::Result`s, the way `anyhow::Context` does.
pub(crate) trait IoContext<T> {
    fn io_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| KinoError::io(f(), e))
    }
}
