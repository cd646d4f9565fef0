//! Bounded retry around a single detail fetch
//!
//! Every failure kind is retried until `retry.max_attempts` is used up:
//!
//! - transport errors, malformed JSON, a missing `data.question` object and
//!   local write failures wait the fixed `retry.retry_delay`;
//! - non-200 responses instead take the pause the delay policy picks for that
//!   response, so a 429 cools down for the rate-limit period.
//!
//! No wait follows the final attempt. A successful attempt persists the
//! document and then takes the delay policy's pause before returning.

use super::Crawler;
use crate::error::FetchFailure;
use crate::pacing;
use crate::sink;
use crate::types::{FetchOutcome, WorkItem};
use std::path::Path;

/// Single attempt result, plus whether a pause was already taken for it
struct Attempt {
    outcome: FetchOutcome,
    paused: bool,
}

impl Attempt {
    fn failed(failure: FetchFailure) -> Self {
        Self {
            outcome: FetchOutcome::Retryable(failure),
            paused: false,
        }
    }
}

impl Crawler {
    /// Fetch `item` and persist it at `path`, retrying transient failures
    ///
    /// Returns [`FetchOutcome::Success`] or [`FetchOutcome::Exhausted`].
    pub(crate) async fn fetch_with_retry(&self, item: &WorkItem, path: &Path) -> FetchOutcome {
        let max_attempts = self.config.retry.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let retries_left = attempt < max_attempts;
            let Attempt { outcome, paused } = self.attempt(item, path, attempt, retries_left).await;

            match outcome {
                FetchOutcome::Success { attempts } => {
                    if attempts > 1 {
                        tracing::info!(id = item.id, attempts, "problem fetched after retry");
                    }
                    return FetchOutcome::Success { attempts };
                }
                FetchOutcome::Retryable(FetchFailure::Interrupted) => {
                    return FetchOutcome::Exhausted {
                        attempts: attempt,
                        last: FetchFailure::Interrupted,
                    };
                }
                FetchOutcome::Retryable(failure) if retries_left => {
                    tracing::warn!(
                        id = item.id,
                        error = %failure,
                        reason = failure.reason(),
                        attempt,
                        max_attempts,
                        "fetch failed, retrying"
                    );

                    if !paused {
                        let delay = self.config.retry.retry_delay;
                        tracing::info!(wait_secs = delay.as_secs_f64(), "waiting before retry");
                        if !pacing::sleep(delay, &self.cancel).await {
                            return FetchOutcome::Exhausted {
                                attempts: attempt,
                                last: FetchFailure::Interrupted,
                            };
                        }
                    }
                }
                FetchOutcome::Retryable(failure) => {
                    tracing::error!(
                        id = item.id,
                        error = %failure,
                        attempts = attempt,
                        "fetch failed after all attempts exhausted"
                    );
                    return FetchOutcome::Exhausted {
                        attempts: attempt,
                        last: failure,
                    };
                }
                exhausted @ FetchOutcome::Exhausted { .. } => return exhausted,
            }
        }
    }

    /// One request/classify/persist cycle
    async fn attempt(
        &self,
        item: &WorkItem,
        path: &Path,
        attempt: u32,
        retries_left: bool,
    ) -> Attempt {
        let response = tokio::select! {
            result = self.client.fetch_detail(&item.slug) => match result {
                Ok(response) => response,
                Err(failure) => return Attempt::failed(failure),
            },
            _ = self.cancel.cancelled() => return Attempt::failed(FetchFailure::Interrupted),
        };
        let (status, elapsed) = (response.status, response.elapsed);

        if status != 200 {
            if !retries_left {
                return Attempt::failed(FetchFailure::Status(status));
            }
            let pause = self.policy.delay_for(status, elapsed);
            if !pacing::wait(pause, &self.cancel).await {
                return Attempt::failed(FetchFailure::Interrupted);
            }
            return Attempt {
                outcome: FetchOutcome::Retryable(FetchFailure::Status(status)),
                paused: true,
            };
        }

        let document = match response.into_document() {
            Ok(document) => document,
            Err(failure) => return Attempt::failed(failure),
        };

        if let Err(e) = sink::write(path, &document).await {
            return Attempt::failed(FetchFailure::Write(e));
        }

        // The document is on disk; an interrupted pause doesn't undo that.
        pacing::wait(self.policy.delay_for(status, elapsed), &self.cancel).await;

        Attempt {
            outcome: FetchOutcome::Success { attempts: attempt },
            paused: true,
        }
    }
}
