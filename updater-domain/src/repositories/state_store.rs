// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # State Store Port
//!
//! Contract for C2: durable, checksum-protected job progress that survives a
//! crash at any point. Implementations never expose a state that failed
//! integrity verification — `load()` returns `Ok(None)` in that case,
//! never an error, so callers can't mistake corruption for a clean machine.

use async_trait::async_trait;

use crate::error::UpdaterError;
use crate::value_objects::JobState;

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<Option<JobState>, UpdaterError>;

    async fn save(&self, state: &JobState) -> Result<(), UpdaterError>;

    async fn clear(&self) -> Result<(), UpdaterError>;

    async fn is_update_in_progress(&self) -> Result<bool, UpdaterError> {
        Ok(self.load().await?.map(|s| s.is_update_in_progress()).unwrap_or(false))
    }
}
