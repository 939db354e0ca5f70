//! Shared foundation for the evospec workspace: validation contract types,
//! the error taxonomy, exit codes, tracing setup, and file helpers.

pub mod atomic_write;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod paths;
pub mod types;
