// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! CLI/HTTP entry point for an operator-requested rollback, independent of
//! auto-rollback-on-failure (spec §4.7 step 1).

use uuid::Uuid;

use updater_domain::{ManifestService, StateStore, UpdaterError};

use crate::infrastructure::engine::UpdateEngine;

pub async fn rollback_update(engine: &UpdateEngine, state_store: &dyn StateStore, manifest_svc: &dyn ManifestService) -> Result<(), UpdaterError> {
    let state = state_store.load().await?.ok_or_else(|| UpdaterError::state_corruption("no job to roll back"))?;
    let manifest_bytes = tokio::fs::read(state.package_path.join("manifest.yml")).await.map_err(|e| UpdaterError::manifest(format!("re-reading manifest for rollback: {e}")))?;
    let manifest = manifest_svc.parse_manifest(&manifest_bytes)?;
    let job_id = Uuid::new_v4().to_string();
    engine.rollback_explicit(&manifest, job_id).await
}
