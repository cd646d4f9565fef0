use clap::Parser;
use problem_crawler::{Crawler, cancel_on_signal};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("problem_crawler={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.to_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let crawler = match Crawler::new(config) {
        Ok(crawler) => crawler,
        Err(e) => {
            tracing::error!(error = %e, "failed to start crawler");
            return ExitCode::FAILURE;
        }
    };
    let watcher = cancel_on_signal(crawler.cancellation_token());

    let result = crawler.run().await;
    watcher.abort();

    match result {
        Ok(stats) => {
            println!("{stats}");
            if let Some(guidance) = stats.retry_guidance() {
                println!("{guidance}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "crawl aborted");
            ExitCode::FAILURE
        }
    }
}
