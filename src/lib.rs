pub mod commands;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod perception;
pub mod timeline;
pub mod validator;

use std::path::PathBuf;

use crate::commands::Command;

/// Process exit codes.
pub const EXIT_VALID: i32 = 0;
pub const EXIT_INVALID: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Entry point shared by the binary: logging, `.env`, then the command.
/// Returns the process exit code.
pub async fn run(command: Command, config_path: Option<PathBuf>, verbose: bool) -> i32 {
    init_tracing(verbose);

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    match commands::execute(command, config_path.as_deref()).await {
        Ok(true) => EXIT_VALID,
        Ok(false) => EXIT_INVALID,
        Err(e) => {
            tracing::error!(error = %e, "pillcheck failed");
            EXIT_ERROR
        }
    }
}
