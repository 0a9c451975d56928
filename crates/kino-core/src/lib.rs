pub mod args;
pub mod config;
pub mod context;
pub mod error;
pub mod gitignore;
pub mod http;
pub mod logging;
pub mod script;
pub mod source;

pub use context::Context;
pub use error::{KinoError, Result};
pub use script::{check, run, RunOutcome, RunRequest};
pub use source::Source;
