//! Command implementations
//!
//! Each handler returns the exit code for a completed run; errors propagate
//! to `run.rs`, which reports them.

mod common;
mod evolve;
mod generate;
mod init;
mod validate;

pub use evolve::{EvolveOptions, execute_evolve_command};
pub use generate::execute_generate_command;
pub use init::execute_init_command;
pub use validate::{execute_check_command, execute_validate_command};
