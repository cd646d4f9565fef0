//! On-disk persistence of fetched documents
//!
//! Each problem lands in `<output_dir>/<id>.<slug>.json`. The presence of that
//! file is the only record that a problem is done, so writes go to a sibling
//! temporary file first and are renamed into place.

use crate::types::WorkItem;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};

/// Suffix of the in-progress file that is renamed over the final path
const TEMP_SUFFIX: &str = ".part";

/// Deterministic output path for `item`
#[must_use]
pub fn output_path(output_dir: &Path, item: &WorkItem) -> PathBuf {
    output_dir.join(format!("{}.{}.json", item.id, item.slug))
}

/// Whether a document already exists at `path`
///
/// A path whose existence cannot be determined is treated as absent, so the
/// problem is fetched again.
pub async fn exists(path: &Path) -> bool {
    match tokio::fs::try_exists(path).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot check output file, treating as missing");
            false
        }
    }
}

/// Serialize `document` as UTF-8 JSON with a four-space indent
///
/// Non-ASCII characters are written as-is rather than escaped.
pub fn to_pretty_json<T: Serialize + ?Sized>(document: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write `document` to `path`, replacing any existing file
pub async fn write<T: Serialize + ?Sized>(path: &Path, document: &T) -> std::io::Result<()> {
    let bytes = to_pretty_json(document).map_err(std::io::Error::other)?;

    let mut temp = path.as_os_str().to_owned();
    temp.push(TEMP_SUFFIX);
    let temp = PathBuf::from(temp);

    if let Err(e) = tokio::fs::write(&temp, &bytes).await {
        tokio::fs::remove_file(&temp).await.ok();
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        tokio::fs::remove_file(&temp).await.ok();
        return Err(e);
    }

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "document written");
    Ok(())
}
