use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::interfaces::cli::{self, Cli};

/// `RUST_LOG` wins; `info` otherwise. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let input = cli::input_of(&cli).map(|p| p.to_path_buf());

    match cli::execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Run failed");
            eprintln!("{}", cli::failure_report(&err, input.as_deref()));
            ExitCode::FAILURE
        }
    }
}
