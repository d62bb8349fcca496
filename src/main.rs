//! handler_bundler - bundles Node.js function handlers with esbuild.
//!
//! Runs esbuild on the host when a compatible version is installed, otherwise
//! inside a build container, and stages the output as a hashed directory.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match handler_bundler::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
