//! # problem-crawler
//!
//! Sequential, rate-limited, resumable crawler for LeetCode problem records.
//!
//! The crawler downloads the problem index, sorts and filters it by id, then
//! fetches every problem's detail document one at a time and stores it as
//! `<output_dir>/<id>.<slug>.json`. Problems whose file already exists are
//! skipped, so an interrupted run resumes where it left off.
//!
//! ## Quick Start
//!
//! ```no_run
//! use problem_crawler::{Config, Crawler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         output_dir: "problems".into(),
//!         ..Default::default()
//!     };
//!
//!     let stats = Crawler::new(config)?.run().await?;
//!     println!("{stats}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP client for the problem API
pub mod client;
/// Configuration types
pub mod config;
/// The crawl loop and retry controller
pub mod crawler;
/// Error types
pub mod error;
/// Adaptive pauses between requests
pub mod pacing;
/// Metadata loading and work selection
pub mod selector;
/// Document persistence
pub mod sink;
/// Core types
pub mod types;

// Re-export commonly used types
pub use client::ProblemClient;
pub use config::{Config, IdRange, Site};
pub use crawler::Crawler;
pub use error::{Error, FetchFailure, MetadataError, Result};
pub use pacing::{DelayPolicy, Pause, PauseKind};
pub use types::{FetchOutcome, MetadataIndex, RunStats, WorkItem};

use tokio_util::sync::CancellationToken;

/// Cancel `token` when the process receives a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// The crawler stops between requests once the token is cancelled, so a later
/// run picks up the remaining problems.
pub fn cancel_on_signal(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_signal() => {
                tracing::warn!("stopping after the current request, run again to resume");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
