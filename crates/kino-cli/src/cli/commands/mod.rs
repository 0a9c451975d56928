//! CLI command handlers, one file per subcommand.

mod check;
mod run;

pub use check::run_check;
pub use run::run_script;
