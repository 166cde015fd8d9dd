// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! CLI entry point for `updater apply <archive>`: runs bootstrap-then-drive
//! synchronously and returns the terminal outcome, unlike the HTTP façade's
//! `JobManager::apply` which backgrounds the work.

use std::path::Path;
use uuid::Uuid;

use updater_domain::UpdaterError;

use crate::infrastructure::bootstrap::{BootstrapOutcome, Bootstrapper};

pub async fn apply_update(bootstrapper: &Bootstrapper, archive: &Path) -> Result<BootstrapOutcome, UpdaterError> {
    let job_id = Uuid::new_v4().to_string();
    bootstrapper.apply_archive(archive, job_id).await
}
