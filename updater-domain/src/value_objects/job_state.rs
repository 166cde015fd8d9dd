// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Job State
//!
//! The persisted, checksum-protected record of job progress. The
//! checksum field is the MD5 hex of the canonically serialized object with
//! `checksum` itself omitted; a mismatch on load means the record is treated
//! as absent, never surfaced as a partially-trusted state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    RolledBack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobState {
    pub status: JobStatus,
    pub package_path: PathBuf,
    pub description: String,
    #[serde(default)]
    pub completed_actions: BTreeSet<usize>,
    #[serde(default)]
    pub current_action: Option<usize>,
    #[serde(default)]
    pub current_action_name: Option<String>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// MD5 hex of the object with this field blanked, computed over the
    /// canonical JSON serialization. Populated only on the wire; callers
    /// constructing a fresh `JobState` in memory leave it empty until the
    /// state store serializes and stamps it.
    #[serde(default)]
    pub checksum: String,
}

impl JobState {
    pub fn new(package_path: PathBuf, description: String, now: DateTime<Utc>) -> Self {
        Self {
            status: JobStatus::Pending,
            package_path,
            description,
            completed_actions: BTreeSet::new(),
            current_action: None,
            current_action_name: None,
            last_updated: now,
            completed_at: None,
            checksum: String::new(),
        }
    }

    pub fn is_update_in_progress(&self) -> bool {
        self.status == JobStatus::InProgress
    }

    /// First action index in `0..total_actions` not yet in
    /// `completed_actions` (resume point per spec §4.6).
    pub fn first_incomplete_action(&self, total_actions: usize) -> Option<usize> {
        (0..total_actions).find(|i| !self.completed_actions.contains(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_pending_and_not_in_progress() {
        let s = JobState::new(PathBuf::from("/tmp/pkg"), "test".into(), Utc::now());
        assert_eq!(s.status, JobStatus::Pending);
        assert!(!s.is_update_in_progress());
    }

    #[test]
    fn first_incomplete_action_skips_completed() {
        let mut s = JobState::new(PathBuf::from("/tmp/pkg"), "test".into(), Utc::now());
        s.completed_actions.insert(0);
        s.completed_actions.insert(1);
        assert_eq!(s.first_incomplete_action(3), Some(2));
    }

    #[test]
    fn first_incomplete_action_none_when_all_done() {
        let mut s = JobState::new(PathBuf::from("/tmp/pkg"), "test".into(), Utc::now());
        s.completed_actions.extend([0, 1, 2]);
        assert_eq!(s.first_incomplete_action(3), None);
    }
}
