//! Command-line interface
//!
//! `args` defines the clap surface, `run` owns configuration discovery,
//! runtime setup, dispatch and error reporting, and `commands` holds one
//! module per subcommand.

pub mod args;
mod commands;
mod run;

#[cfg(test)]
mod tests;

pub use args::{BumpArg, Cli, Commands, OutputFormat, build_cli};
pub use run::run;
