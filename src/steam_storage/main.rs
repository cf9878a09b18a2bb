//! # steam-storage CLI
//!
//! The binary is intentionally thin: the CLI lives in `cli/`, while this file installs
//! logging, invokes `cli::run()` and handles process termination. Everything the CLI does
//! goes through `steam_storage::api::StorageApi`.
//!
//! ## Logging
//!
//! Diagnostics go through `tracing` to stderr so they never mix with command output.
//! The level is `warn` by default and `debug` with `--verbose`; `RUST_LOG` overrides both.

use tracing_subscriber::EnvFilter;

mod cli;

pub(crate) fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
