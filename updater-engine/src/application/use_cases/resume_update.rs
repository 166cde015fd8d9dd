// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! CLI entry point for `updater resume`: re-reads the manifest from the
//! package path recorded in the last persisted state and continues from the
//! first incomplete action (spec §4.6).

use uuid::Uuid;

use updater_domain::{ManifestService, StateStore, UpdaterError};

use crate::infrastructure::engine::{RunOutcome, UpdateEngine};

pub async fn resume_update(engine: &UpdateEngine, state_store: &dyn StateStore, manifest_svc: &dyn ManifestService) -> Result<RunOutcome, UpdaterError> {
    let state = state_store.load().await?.ok_or_else(|| UpdaterError::state_corruption("no resumable job found"))?;
    let manifest_bytes = tokio::fs::read(state.package_path.join("manifest.yml")).await.map_err(|e| UpdaterError::manifest(format!("re-reading manifest for resume: {e}")))?;
    let manifest = manifest_svc.parse_manifest(&manifest_bytes)?;
    let job_id = Uuid::new_v4().to_string();
    engine.resume(&manifest, job_id).await
}
