// src/store.rs
//! Small persisted JSON documents (cache entries, health ledger, novelty
//! store, trend watchlist). Writes go to a temp file in the target directory
//! and are renamed into place, so readers never observe a partial document.
//!
//! There is no cross-process locking: the pipeline is expected to run as a
//! single active instance, and overlapping instances can lose whole-document
//! updates.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::io::Write;
use std::path::Path;

/// Read and deserialize a JSON document. A missing or corrupt file is not an
/// error, it reads as "no state".
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "corrupt state document, treating as empty");
            None
        }
    }
}

/// Serialize and atomically replace a JSON document.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let json = serde_json::to_vec_pretty(value).context("serializing state document")?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("temp file in {}", dir.display()))?;
    tmp.write_all(&json).context("writing state document")?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn round_trips_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut doc: HashMap<String, i64> = HashMap::new();
        doc.insert("🪿".into(), 1);
        write_json_atomic(&path, &doc).unwrap();
        let back: HashMap<String, i64> = read_json(&path).unwrap();
        assert_eq!(back, doc);

        doc.insert("HQ".into(), 2);
        write_json_atomic(&path, &doc).unwrap();
        let back: HashMap<String, i64> = read_json(&path).unwrap();
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn missing_or_corrupt_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(read_json::<HashMap<String, i64>>(&path).is_none());

        std::fs::write(&path, "{not json").unwrap();
        assert!(read_json::<HashMap<String, i64>>(&path).is_none());
    }
}
