//! Configuration types for problem-crawler

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Base URL of the international site
pub const GLOBAL_BASE_URL: &str = "https://leetcode.com";

/// Base URL of the China site
pub const CN_BASE_URL: &str = "https://leetcode.cn";

/// Which LeetCode deployment to crawl
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    /// leetcode.com (default)
    #[default]
    Global,
    /// leetcode.cn
    Cn,
}

impl Site {
    /// Fixed base URL for this site
    pub fn base_url(&self) -> &'static str {
        match self {
            Site::Global => GLOBAL_BASE_URL,
            Site::Cn => CN_BASE_URL,
        }
    }
}

/// Inclusive id range used to select a batch of problems
///
/// Either bound may be absent, meaning unbounded on that side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    /// Lowest id to process (inclusive)
    #[serde(default)]
    pub start: Option<u32>,

    /// Highest id to process (inclusive)
    #[serde(default)]
    pub end: Option<u32>,
}

impl IdRange {
    /// Whether `id` falls inside the range
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.start.is_none_or(|start| id >= start) && self.end.is_none_or(|end| id <= end)
    }
}

/// Retry behavior for detail requests
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per problem before giving up (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed wait between failed attempts (default: 60 seconds)
    #[serde(default = "default_retry_delay", with = "duration_serde")]
    pub retry_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay: default_retry_delay(),
        }
    }
}

/// Adaptive pause between requests
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Pause after an HTTP 429 (default: 60 seconds)
    #[serde(default = "default_rate_limited_delay", with = "duration_serde")]
    pub rate_limited_delay: Duration,

    /// Pause after a slow response (default: 5 seconds)
    #[serde(default = "default_slow_delay", with = "duration_serde")]
    pub slow_delay: Duration,

    /// Pause after a normal response (default: 1 second)
    #[serde(default = "default_normal_delay", with = "duration_serde")]
    pub normal_delay: Duration,

    /// Responses taking longer than this count as slow (default: 2 seconds)
    #[serde(default = "default_slow_threshold", with = "duration_serde")]
    pub slow_threshold: Duration,

    /// Add up to one second of random jitter to every pause (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            rate_limited_delay: default_rate_limited_delay(),
            slow_delay: default_slow_delay(),
            normal_delay: default_normal_delay(),
            slow_threshold: default_slow_threshold(),
            jitter: true,
        }
    }
}

/// HTTP client settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Override for the site base URL (tests, mirrors)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Main configuration for a crawl run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Site to crawl
    #[serde(default)]
    pub site: Site,

    /// Directory receiving one JSON file per problem (default: "problems")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Pre-fetched metadata snapshot; skips the remote index request
    #[serde(default)]
    pub metadata_file: Option<PathBuf>,

    /// Where to save the remote index after fetching it
    #[serde(default)]
    pub save_metadata: Option<PathBuf>,

    /// Re-fetch problems whose output file already exists
    #[serde(default)]
    pub update: bool,

    /// Optional id bounds
    #[serde(default)]
    pub range: IdRange,

    /// Retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Pause settings
    #[serde(default)]
    pub pacing: PacingConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: Site::default(),
            output_dir: default_output_dir(),
            metadata_file: None,
            save_metadata: None,
            update: false,
            range: IdRange::default(),
            retry: RetryConfig::default(),
            pacing: PacingConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        serde_json::from_str(&contents).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.range.start, self.range.end)
            && start > end
        {
            return Err(Error::config(
                "range",
                format!("start ({start}) must not exceed end ({end})"),
            ));
        }
        if self.metadata_file.is_some() && self.save_metadata.is_some() {
            return Err(Error::config(
                "save_metadata",
                "cannot save metadata when it is read from a snapshot file",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config(
                "retry.max_attempts",
                "at least one attempt is required",
            ));
        }
        if self.http.request_timeout.is_zero() {
            return Err(Error::config(
                "http.request_timeout",
                "request timeout must be positive",
            ));
        }
        self.base_url()?;
        Ok(())
    }

    /// Effective base URL: the override if set, otherwise the site's
    pub fn base_url(&self) -> Result<url::Url> {
        let raw = self
            .http
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.site.base_url());
        let parsed = url::Url::parse(raw)
            .map_err(|e| Error::config("http.base_url", format!("invalid URL {raw:?}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(Error::config(
                "http.base_url",
                format!("{raw:?} cannot be used as a base URL"),
            ));
        }
        Ok(parsed)
    }
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("problems")
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_rate_limited_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_slow_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_normal_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_slow_threshold() -> Duration {
    Duration::from_secs(2)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
