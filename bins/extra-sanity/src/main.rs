mod config;
mod console;
mod docker;
mod engine;
mod evaluator;
mod executor;
mod image;
mod paths;

#[cfg(test)]
mod engine_tests;

use clap::Parser;
use config::{Cli, RunnerConfig};
use console::{Color, Console};
use docker::SystemRunner;
use extra_sanity_common::config::EXIT_FAILURE;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Console output goes to stdout; diagnostics go to stderr via tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let color_flag = cli.color;

    let code = match RunnerConfig::from_env(cli) {
        Ok(config) => {
            debug!(?config, "Runner configured");
            executor::execute(&config, &SystemRunner).await
        }
        Err(e) => {
            Console::new(color_flag).print(format!("FATAL ERROR during execution: {:#}", e), Color::Emph);
            EXIT_FAILURE
        }
    };

    std::process::exit(code);
}
