use std::path::Path;

use serde_json::Value;

use crate::error::LoadsumError;
use crate::runs::filename::{tag_from_path, RunTag};
use crate::runs::{sort_records, RunRecord};

/// Read a k6 JSON summary from disk.
pub fn read_summary(path: impl AsRef<Path>) -> Result<Value, LoadsumError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadsumError::MissingInput(path.to_path_buf())
        } else {
            LoadsumError::Io(e)
        }
    })?;
    serde_json::from_str(&content).map_err(|source| LoadsumError::InvalidSummary {
        path: path.to_path_buf(),
        source,
    })
}

/// Load one [`RunRecord`] per summary file, sorted by `(label, total)`.
///
/// The label and total come from each file name; unrecognised names still
/// produce a row under the `unknown` label. Runs sharing a `(label, total)`
/// are listed oldest first, by the timestamp in their file name.
pub fn load_run_records<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<RunRecord>, LoadsumError> {
    let mut tagged: Vec<(RunTag, &Path)> = paths
        .iter()
        .map(|p| {
            let path: &Path = p.as_ref();
            (tag_from_path(path), path)
        })
        .collect();
    tagged.sort_by_key(|(tag, _)| (tag.started_at.is_none(), tag.started_at));

    let mut records = Vec::with_capacity(tagged.len());
    for (tag, path) in tagged {
        if tag.total.is_none() {
            tracing::warn!(
                path = %path.display(),
                "file name does not follow <label>_<total>_<timestamp>.json; tagging as unknown"
            );
        }
        let summary = read_summary(path)?;
        records.push(RunRecord::from_summary(&summary, &tag));
    }
    sort_records(&mut records);
    tracing::info!(count = records.len(), "loaded run summaries");
    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
