// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # JSON State Store (C2)
//!
//! Durable, checksum-protected job progress. Writes are atomic
//! (write-to-temp + rename) so a crash mid-write never leaves a half-written
//! `state.json`; reads that fail checksum verification are treated as
//! absent, never surfaced as partially-trusted state.

use async_trait::async_trait;
use md5::{Digest, Md5};
use std::path::{Path, PathBuf};

use updater_domain::{Checksum, JobState, StateStore, UpdaterError};

pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Canonical checksum: MD5 over the JSON serialization of the state with
    /// `checksum` blanked to the empty string (spec §3).
    fn compute_checksum(state: &JobState) -> Result<Checksum, UpdaterError> {
        let mut blanked = state.clone();
        blanked.checksum = String::new();
        let bytes = serde_json::to_vec(&blanked).map_err(|e| UpdaterError::Serialization(e.to_string()))?;
        Checksum::from_hex(hex::encode(Md5::digest(bytes)))
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load(&self) -> Result<Option<JobState>, UpdaterError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(UpdaterError::Io(e.to_string())),
        };

        let state: JobState = match serde_json::from_slice(&bytes) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("state.json failed to parse, treating as absent: {e}");
                return Ok(None);
            }
        };

        let expected = match Checksum::from_hex(state.checksum.clone()) {
            Ok(c) => c,
            Err(_) => {
                tracing::warn!("state.json checksum field is malformed, treating as absent");
                return Ok(None);
            }
        };
        let recomputed = Self::compute_checksum(&state)?;
        if recomputed != expected {
            tracing::warn!("state.json checksum mismatch, treating as absent");
            return Ok(None);
        }
        Ok(Some(state))
    }

    async fn save(&self, state: &JobState) -> Result<(), UpdaterError> {
        let mut stamped = state.clone();
        stamped.checksum = Self::compute_checksum(state)?.to_string();

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| UpdaterError::Io(e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(&stamped).map_err(|e| UpdaterError::Serialization(e.to_string()))?;

        let tmp_path = tmp_path_for(&self.path);
        tokio::fs::write(&tmp_path, &bytes).await.map_err(|e| UpdaterError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| UpdaterError::Io(e.to_string()))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), UpdaterError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UpdaterError::Io(e.to_string())),
        }
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf as StdPathBuf;

    fn fresh_state() -> JobState {
        JobState::new(StdPathBuf::from("/tmp/pkg"), "desc".into(), Utc::now())
    }

    #[tokio::test]
    async fn save_then_load_round_trips_except_checksum_and_last_updated() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));
        let state = fresh_state();
        store.save(&state).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.status, state.status);
        assert_eq!(loaded.package_path, state.package_path);
        assert_eq!(loaded.description, state.description);
        assert_eq!(loaded.completed_actions, state.completed_actions);
    }

    #[tokio::test]
    async fn load_returns_none_when_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn load_returns_none_on_corrupted_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = JsonStateStore::new(&path);
        store.save(&fresh_state()).await.unwrap();

        let mut bytes = tokio::fs::read(&path).await.unwrap();
        let flip_at = bytes.iter().position(|&b| b == b'"').map(|i| i + 5).unwrap_or(10);
        bytes[flip_at] ^= 0xFF;
        tokio::fs::write(&path, &bytes).await.unwrap();

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));
        store.clear().await.unwrap();
        store.save(&fresh_state()).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn is_update_in_progress_reflects_status() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));
        assert!(!store.is_update_in_progress().await.unwrap());

        let mut state = fresh_state();
        state.status = updater_domain::JobStatus::InProgress;
        store.save(&state).await.unwrap();
        assert!(store.is_update_in_progress().await.unwrap());
    }
}
