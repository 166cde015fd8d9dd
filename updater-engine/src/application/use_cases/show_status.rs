// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

use updater_domain::UpdaterError;

use crate::application::services::job_manager::JobInfo;
use crate::application::services::progress::ProgressService;

pub async fn show_status(progress: &ProgressService) -> Result<JobInfo, UpdaterError> {
    progress.snapshot().await
}
