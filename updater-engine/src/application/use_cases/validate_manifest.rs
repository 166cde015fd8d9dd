// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

use std::path::Path;

use updater_domain::{Manifest, ManifestService, UpdaterError};

pub async fn validate_manifest(manifest_svc: &dyn ManifestService, path: &Path) -> Result<Manifest, UpdaterError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| UpdaterError::Io(e.to_string()))?;
    manifest_svc.parse_manifest(&bytes)
}
