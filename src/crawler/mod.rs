//! The crawl loop
//!
//! A [`Crawler`] owns everything a run needs (configuration, the shared HTTP
//! client, the delay policy, the statistics) and is consumed by
//! [`Crawler::run`]. Items are processed strictly one after another; an item
//! is finished, including its retries and the pause that follows it, before
//! the next one starts.

mod retry;


use crate::client::ProblemClient;
use crate::config::Config;
use crate::error::{FetchFailure, Result};
use crate::pacing::DelayPolicy;
use crate::selector::{self, MetadataSource};
use crate::sink;
use crate::types::{FetchOutcome, RunStats, WorkItem};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// Sequential, rate-limited, resumable problem crawler
pub struct Crawler {
    config: Config,
    client: ProblemClient,
    policy: DelayPolicy,
    cancel: CancellationToken,
    stats: RunStats,
}

impl Crawler {
    /// Validate `config` and build the HTTP client
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = ProblemClient::new(&config)?;
        let policy = DelayPolicy::new(config.pacing.clone());
        Ok(Self {
            config,
            client,
            policy,
            cancel: CancellationToken::new(),
            stats: RunStats::new(),
        })
    }

    /// Use `cancel` to stop the run early
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that interrupts this crawler when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Configuration of this run
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Obtain the metadata index and select the batch to process
    ///
    /// Failures here are fatal to the run.
    pub async fn select_work(&self) -> Result<Vec<WorkItem>> {
        let source = match &self.config.metadata_file {
            Some(path) => MetadataSource::Snapshot(path.as_path()),
            None => MetadataSource::Remote(&self.client),
        };
        let index = selector::load_index(source, self.config.save_metadata.as_deref()).await?;
        let available = index.len();
        let items = selector::select(index, self.config.range);
        tracing::info!(
            available,
            selected = items.len(),
            start = ?self.config.range.start,
            end = ?self.config.range.end,
            "problems selected"
        );
        Ok(items)
    }

    /// Run a complete crawl and return its statistics
    ///
    /// Only failure to obtain the work list or to create the output directory
    /// is an error; individual problems that cannot be fetched are counted as
    /// failed and the run carries on.
    pub async fn run(mut self) -> Result<RunStats> {
        let items = self.select_work().await?;
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        self.crawl(&items).await;
        self.stats.finished_at = Some(Utc::now());
        self.report();
        Ok(self.stats)
    }

    /// Process `items` in order, updating the statistics
    pub(crate) async fn crawl(&mut self, items: &[WorkItem]) {
        for item in items {
            if self.cancel.is_cancelled() {
                self.stats.interrupted = true;
                break;
            }

            let path = sink::output_path(&self.config.output_dir, item);
            if !self.config.update && sink::exists(&path).await {
                tracing::info!(id = item.id, path = %path.display(), "already fetched, skipping");
                self.stats.total += 1;
                self.stats.skipped += 1;
                continue;
            }

            tracing::info!(id = item.id, title = %item.title, "fetching {}", item);
            match self.fetch_with_retry(item, &path).await {
                FetchOutcome::Success { attempts } => {
                    tracing::info!(id = item.id, attempts, path = %path.display(), "saved");
                    self.stats.total += 1;
                    self.stats.success += 1;
                }
                FetchOutcome::Exhausted {
                    last: FetchFailure::Interrupted,
                    ..
                } => {
                    tracing::warn!(id = item.id, "interrupted, problem left for the next run");
                    self.stats.interrupted = true;
                    break;
                }
                FetchOutcome::Retryable(last) | FetchOutcome::Exhausted { last, .. } => {
                    tracing::error!(
                        id = item.id,
                        slug = %item.slug,
                        reason = last.reason(),
                        error = %last,
                        "giving up on problem"
                    );
                    self.stats.total += 1;
                    self.stats.failed += 1;
                }
            }
        }
    }

    fn report(&self) {
        let stats = &self.stats;
        tracing::info!(
            total = stats.total,
            success = stats.success,
            skipped = stats.skipped,
            failed = stats.failed,
            interrupted = stats.interrupted,
            "crawl finished"
        );
    }
}
