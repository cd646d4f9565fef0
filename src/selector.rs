//! Work selection: obtain the metadata index and turn it into an ordered batch

use crate::client::ProblemClient;
use crate::config::IdRange;
use crate::error::{MetadataError, Result};
use crate::sink;
use crate::types::{MetadataIndex, WorkItem};
use std::collections::HashSet;
use std::path::Path;

/// Where the metadata index comes from
#[derive(Clone, Copy, Debug)]
pub enum MetadataSource<'a> {
    /// A snapshot previously saved to disk
    Snapshot(&'a Path),
    /// The remote index endpoint
    Remote(&'a ProblemClient),
}

/// Load the metadata index from `source`
///
/// When fetching remotely and `save_to` is set, the raw index is also written
/// there so later runs can pass it as a snapshot.
pub async fn load_index(source: MetadataSource<'_>, save_to: Option<&Path>) -> Result<MetadataIndex> {
    match source {
        MetadataSource::Snapshot(path) => {
            tracing::info!(path = %path.display(), "loading metadata snapshot");
            let bytes =
                tokio::fs::read(path)
                    .await
                    .map_err(|source| MetadataError::ReadSnapshot {
                        path: path.to_path_buf(),
                        source,
                    })?;
            Ok(MetadataIndex::from_slice(&bytes, &path.display().to_string())?)
        }
        MetadataSource::Remote(client) => {
            let value = client.fetch_metadata().await?;
            if let Some(save_to) = save_to {
                sink::write(save_to, &value).await?;
                tracing::info!(path = %save_to.display(), "metadata snapshot saved");
            }
            Ok(MetadataIndex::from_value(
                value,
                client.metadata_url().as_str(),
            )?)
        }
    }
}

/// Sort the index by id, drop duplicate ids and keep only ids within `range`
///
/// The first occurrence of a duplicated id in source order wins.
#[must_use]
pub fn select(index: MetadataIndex, range: IdRange) -> Vec<WorkItem> {
    let mut seen = HashSet::with_capacity(index.len());
    let mut items: Vec<WorkItem> = index
        .items
        .into_iter()
        .filter(|item| {
            let first = seen.insert(item.id);
            if !first {
                tracing::warn!(id = item.id, slug = %item.slug, "duplicate id in metadata, ignoring");
            }
            first
        })
        .filter(|item| range.contains(item.id))
        .collect();

    items.sort_by_key(|item| item.id);
    items
}
