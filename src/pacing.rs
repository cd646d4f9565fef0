//! Adaptive pacing between requests
//!
//! After each response the crawler pauses for a duration chosen from the
//! response's status and latency, so that a struggling or rate-limiting
//! server sees the crawler back off:
//!
//! | Condition                 | Base pause |
//! |---------------------------|-----------:|
//! | HTTP 429                  |       60 s |
//! | latency above threshold   |        5 s |
//! | anything else             |        1 s |
//!
//! Up to one second of uniform jitter is added on top of the base pause.

use crate::config::PacingConfig;
use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// HTTP status signalling rate limiting
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Which rule selected a pause
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PauseKind {
    /// Server answered 429
    RateLimited,
    /// Server answered slower than the threshold
    Slow,
    /// Steady-state pace
    Normal,
}

/// A pause decided by the [`DelayPolicy`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pause {
    /// Rule that matched
    pub kind: PauseKind,
    /// How long to wait, jitter included
    pub wait: Duration,
}

/// Maps a response outcome to the pause before the next request
#[derive(Clone, Debug)]
pub struct DelayPolicy {
    config: PacingConfig,
}

impl DelayPolicy {
    /// Create a policy from pacing settings
    #[must_use]
    pub fn new(config: PacingConfig) -> Self {
        Self { config }
    }

    /// Decide the pause for a response with `status` that took `elapsed`
    ///
    /// Rules are checked in order; the first match wins.
    #[must_use]
    pub fn delay_for(&self, status: u16, elapsed: Duration) -> Pause {
        let (kind, base) = if status == TOO_MANY_REQUESTS {
            (PauseKind::RateLimited, self.config.rate_limited_delay)
        } else if elapsed > self.config.slow_threshold {
            (PauseKind::Slow, self.config.slow_delay)
        } else {
            (PauseKind::Normal, self.config.normal_delay)
        };

        let wait = if self.config.jitter {
            add_jitter(base)
        } else {
            base
        };

        Pause { kind, wait }
    }
}

/// Sleep for `pause`, waking early if `cancel` fires
///
/// Returns `false` when the wait was cut short by cancellation.
pub async fn wait(pause: Pause, cancel: &CancellationToken) -> bool {
    match pause.kind {
        PauseKind::RateLimited => {
            tracing::warn!(
                wait_secs = pause.wait.as_secs_f64(),
                "too many requests, backing off"
            );
        }
        PauseKind::Slow => {
            tracing::info!(
                wait_secs = pause.wait.as_secs_f64(),
                "server is slow, waiting longer"
            );
        }
        PauseKind::Normal => {
            tracing::debug!(wait_secs = pause.wait.as_secs_f64(), "waiting");
        }
    }
    sleep(pause.wait, cancel).await
}

/// Cancellable sleep; `false` means the token fired first
pub async fn sleep(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = cancel.cancelled() => false,
    }
}

/// Add uniform jitter in `[0, 1)` seconds
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_secs: f64 = rng.gen_range(0.0..1.0);
    delay + Duration::from_secs_f64(jitter_secs)
}
