//! Quill CLI
//!
//! Runs scripts in a headless frame loop, checks their syntax, and prints
//! the effective configuration.

use quill_core::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run_cli().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
