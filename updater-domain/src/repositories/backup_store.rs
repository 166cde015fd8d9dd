// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Backup Store Port
//!
//! Contract for C3: sequentially named content snapshots with integrity
//! checksums and a `latest` pointer. See spec §4.3 for the create/restore/
//! list/retention contracts.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::UpdaterError;
use crate::value_objects::BackupEntry;

#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Creates a new numbered backup from `sources`, pointing `latest` at it.
    /// Missing sources fail fast (no partial backup is left pointed-to by
    /// `latest`).
    async fn create(&self, sources: &[PathBuf], name: Option<&str>) -> Result<BackupEntry, UpdaterError>;

    /// Restores `name` (default `"latest"`) over the original source paths.
    /// When `verify` is true, every file listed in the backup's checksum
    /// manifest is re-hashed before any destination is touched.
    async fn restore(&self, name: &str, verify: bool) -> Result<(), UpdaterError>;

    async fn list(&self) -> Result<Vec<BackupEntry>, UpdaterError>;

    /// Prunes all but the `keep_last_n` most recent entries. `keep_last_n ==
    /// 0` is a no-op (spec §4.3). `latest` is never pruned while it remains
    /// the most recent entry.
    async fn cleanup_old(&self, keep_last_n: u32) -> Result<Vec<String>, UpdaterError>;

    fn backup_dir(&self) -> &Path;
}
