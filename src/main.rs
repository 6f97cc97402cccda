//! ASoC Automator - Main entry point

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use asoc_automator::{Cli, CliApp, LogLevel, exit_codes};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let app = match CliApp::new(cli) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    let exit_code = match app.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            app.context().docker().cleanup().await;
            exit_codes::FATAL
        }
    };

    std::process::exit(exit_code);
}

/// `-v` sets the level for this crate; `RUST_LOG` wins when set
fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,asoc_automator={}", level.directive())));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
