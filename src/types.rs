//! Core types: work items, the metadata index, fetch outcomes and run statistics

use crate::error::{FetchFailure, MetadataError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One problem to fetch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Numeric question id, unique within an index
    pub id: u32,
    /// Title slug addressing the detail query
    pub slug: String,
    /// Display title
    pub title: String,
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.id, self.title)
    }
}

/// Raw `/api/problems/all/` body; everything but the stat block is ignored
#[derive(Debug, Deserialize)]
struct RawIndex {
    #[serde(default)]
    stat_status_pairs: Vec<RawPair>,
}

#[derive(Debug, Deserialize)]
struct RawPair {
    stat: RawStat,
}

#[derive(Debug, Deserialize)]
struct RawStat {
    question_id: u32,
    #[serde(rename = "question__title_slug")]
    slug: String,
    #[serde(rename = "question__title")]
    title: String,
}

/// Whether `slug` can be embedded in an output file name without leaving the
/// output directory
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty() && !slug.contains(['/', '\\', '\0']) && !slug.starts_with("..")
}

/// The list of work items, in source order until sorted by the selector
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataIndex {
    /// Work entries
    pub items: Vec<WorkItem>,
}

impl MetadataIndex {
    /// Parse an index from raw JSON bytes
    ///
    /// `origin` names the source (file path or URL) for error messages.
    pub fn from_slice(bytes: &[u8], origin: &str) -> Result<Self, MetadataError> {
        let raw: RawIndex = serde_json::from_slice(bytes).map_err(|source| MetadataError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_raw(raw)
    }

    /// Build an index from an already parsed JSON value
    pub fn from_value(value: serde_json::Value, origin: &str) -> Result<Self, MetadataError> {
        let raw: RawIndex =
            serde_json::from_value(value).map_err(|source| MetadataError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawIndex) -> Result<Self, MetadataError> {
        if raw.stat_status_pairs.is_empty() {
            return Err(MetadataError::Empty);
        }
        let items: Vec<WorkItem> = raw
            .stat_status_pairs
            .into_iter()
            .filter_map(|pair| {
                let stat = pair.stat;
                if !is_safe_slug(&stat.slug) {
                    tracing::warn!(
                        id = stat.question_id,
                        slug = %stat.slug,
                        "slug is not a plain file name component, dropping entry"
                    );
                    return None;
                }
                Some(WorkItem {
                    id: stat.question_id,
                    slug: stat.slug,
                    title: stat.title,
                })
            })
            .collect();
        if items.is_empty() {
            return Err(MetadataError::Empty);
        }
        Ok(Self { items })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the index holds no entries
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Result of fetching one problem
///
/// A single attempt yields `Success` or `Retryable`; the retry controller
/// turns a run of `Retryable` attempts into `Exhausted`.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The document was fetched and persisted
    Success {
        /// Attempts used, including the successful one
        attempts: u32,
    },
    /// This attempt failed and may be retried
    Retryable(FetchFailure),
    /// Every attempt failed; the item is given up for this run
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Failure of the final attempt
        last: FetchFailure,
    },
}

/// Counters for one crawl run
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Items visited
    pub total: usize,
    /// Items fetched and written
    pub success: usize,
    /// Items skipped because their file already existed
    pub skipped: usize,
    /// Items that exhausted their attempts
    pub failed: usize,
    /// Whether the run stopped early on a signal
    pub interrupted: bool,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished (None while running)
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunStats {
    /// Fresh counters stamped with the current time
    #[must_use]
    pub fn new() -> Self {
        Self {
            total: 0,
            success: 0,
            skipped: 0,
            failed: 0,
            interrupted: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Wall-clock duration of the run, if it has finished
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }

    /// Advice on recovering failed problems, if there are any
    pub fn retry_guidance(&self) -> Option<String> {
        (self.failed > 0).then(|| {
            format!(
                "{} problem(s) failed. Run the same command again to retry them; \
                 use --update to re-fetch everything.",
                self.failed
            )
        })
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+----------+--------+")?;
        writeln!(f, "| Result   |  Count |")?;
        writeln!(f, "+----------+--------+")?;
        writeln!(f, "| Total    | {:>6} |", self.total)?;
        writeln!(f, "| Success  | {:>6} |", self.success)?;
        writeln!(f, "| Skipped  | {:>6} |", self.skipped)?;
        writeln!(f, "| Failed   | {:>6} |", self.failed)?;
        write!(f, "+----------+--------+")?;
        if let Some(elapsed) = self.elapsed() {
            write!(f, "\nElapsed: {}s", elapsed.num_seconds())?;
        }
        if self.interrupted {
            write!(f, "\nRun was interrupted before all problems were processed.")?;
        }
        Ok(())
    }
}
