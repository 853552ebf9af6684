//! File-backed timeline cache with checksum verification.
//!
//! Snapshots are stored one file per trip hash as a JSON envelope carrying
//! a SHA-256 digest of the serialized timeline. A missing file or a digest
//! mismatch is a cache miss, not an error; only I/O and encoding failures
//! propagate.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::models::Timeline;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    checksum: String,
    timeline: Timeline,
}

/// Compute the cache checksum for a timeline snapshot.
pub fn timeline_checksum(timeline: &Timeline) -> Result<String> {
    let bytes = serde_json::to_vec(timeline).context("Failed to serialize timeline")?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Directory-based cache of timeline snapshots.
#[derive(Debug, Clone)]
pub struct TimelineCache {
    dir: PathBuf,
}

impl TimelineCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, trip_hash: &str) -> PathBuf {
        self.dir.join(format!("{trip_hash}.json"))
    }

    /// Write a snapshot, creating the cache directory if needed.
    pub fn save(&self, trip_hash: &str, timeline: &Timeline) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache dir {}", self.dir.display()))?;

        let envelope = CacheEnvelope {
            checksum: timeline_checksum(timeline)?,
            timeline: timeline.clone(),
        };
        let json =
            serde_json::to_string(&envelope).context("Failed to serialize cache envelope")?;

        let path = self.path_for(trip_hash);
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write cache file {}", path.display()))?;
        Ok(())
    }

    /// Read a snapshot back, verifying the stored digest.
    ///
    /// Returns `Ok(None)` when the file is absent or its digest no longer
    /// matches the payload (the stale entry is warn-logged and ignored).
    pub fn load(&self, trip_hash: &str) -> Result<Option<Timeline>> {
        let path = self.path_for(trip_hash);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read cache file {}", path.display()))
            }
        };

        let deserializer = &mut serde_json::Deserializer::from_str(&json);
        let envelope: CacheEnvelope = match serde_path_to_error::deserialize(deserializer) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::warn!(
                    "Discarding unreadable cache entry {} (at {}): {}",
                    path.display(),
                    e.path(),
                    e
                );
                return Ok(None);
            }
        };

        let expected = timeline_checksum(&envelope.timeline)?;
        if envelope.checksum != expected {
            log::warn!(
                "Discarding cache entry {} with stale checksum",
                path.display()
            );
            return Ok(None);
        }

        Ok(Some(envelope.timeline))
    }

    /// Remove a cached snapshot. Absence counts as removed.
    pub fn invalidate(&self, trip_hash: &str) -> Result<bool> {
        let path = self.path_for(trip_hash);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove cache file {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{City, Timeline, TimelineId};

    fn timeline(trip_hash: &str) -> Timeline {
        Timeline {
            id: TimelineId(7),
            trip_hash: trip_hash.to_string(),
            profile: None,
            city: City::named("Porto"),
            plans: Some(vec![]),
            segments: None,
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TimelineCache::new(dir.path());

        let t = timeline("abc123");
        cache.save("abc123", &t).unwrap();
        assert_eq!(cache.load("abc123").unwrap(), Some(t));
    }

    #[test]
    fn missing_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TimelineCache::new(dir.path());
        assert_eq!(cache.load("nope").unwrap(), None);
    }

    #[test]
    fn tampered_payload_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TimelineCache::new(dir.path());

        cache.save("abc123", &timeline("abc123")).unwrap();

        let path = dir.path().join("abc123.json");
        let tampered = std::fs::read_to_string(&path)
            .unwrap()
            .replace("Porto", "Paris");
        std::fs::write(&path, tampered).unwrap();

        assert_eq!(cache.load("abc123").unwrap(), None);
    }

    #[test]
    fn malformed_json_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TimelineCache::new(dir.path());

        std::fs::write(dir.path().join("abc123.json"), "{not json").unwrap();
        assert_eq!(cache.load("abc123").unwrap(), None);
    }

    #[test]
    fn invalidate_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TimelineCache::new(dir.path());

        cache.save("abc123", &timeline("abc123")).unwrap();
        assert!(cache.invalidate("abc123").unwrap());
        assert!(!cache.invalidate("abc123").unwrap());
        assert_eq!(cache.load("abc123").unwrap(), None);
    }
}
