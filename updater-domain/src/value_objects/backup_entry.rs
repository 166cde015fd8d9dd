// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Backup Entry
//!
//! A numbered snapshot directory (`backup_NNN/`) with a metadata sidecar and
//! per-file checksums (spec §3). `BackupEntry` is the in-memory view used by
//! the backup store (C3); `BackupMetadata` is what gets serialized into
//! `metadata.json`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    File,
    Directory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSource {
    pub original_path: PathBuf,
    pub backup_relpath: PathBuf,
    pub kind: SourceKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub created_at: DateTime<Utc>,
    pub sources: Vec<BackupSource>,
    /// relpath (within the backup directory) -> MD5 hex
    pub checksums: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupEntry {
    pub name: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub sources: Vec<BackupSource>,
}

impl BackupEntry {
    /// Parses the numeric suffix from a `backup_NNN` directory name.
    pub fn parse_index(name: &str) -> Option<u32> {
        name.strip_prefix("backup_").and_then(|n| n.parse::<u32>().ok())
    }

    pub fn format_name(index: u32) -> String {
        format!("backup_{index:03}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_padded_three_digits() {
        assert_eq!(BackupEntry::format_name(1), "backup_001");
        assert_eq!(BackupEntry::format_name(42), "backup_042");
        assert_eq!(BackupEntry::format_name(1000), "backup_1000");
    }

    #[test]
    fn parses_index_back() {
        assert_eq!(BackupEntry::parse_index("backup_007"), Some(7));
        assert_eq!(BackupEntry::parse_index("latest"), None);
        assert_eq!(BackupEntry::parse_index("backup_abc"), None);
    }
}
