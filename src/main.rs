//! evospec CLI binary
//!
//! All logic lives in the library; main.rs only invokes `cli::run()`.

fn main() {
    // cli::run() prints its own errors; main only maps to the process exit code
    if let Err(code) = evospec::cli::run() {
        std::process::exit(code.as_i32());
    }
}
