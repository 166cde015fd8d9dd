// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Builds the `status(job_id)` / SSE `status` event payload (spec §6) by
//! combining the persisted `JobState` with the in-memory admission slot —
//! neither alone has everything: `JobState` survives a restart but doesn't
//! know whether a job is still actively running versus merely the last one
//! recorded, and the slot knows "running" but not `completed_actions`.

use std::sync::Arc;

use updater_domain::StateStore;

use crate::application::services::job_manager::{JobInfo, JobManager};

pub struct ProgressService {
    state_store: Arc<dyn StateStore>,
    job_manager: Arc<JobManager>,
}

impl ProgressService {
    pub fn new(state_store: Arc<dyn StateStore>, job_manager: Arc<JobManager>) -> Self {
        Self { state_store, job_manager }
    }

    pub async fn snapshot(&self) -> Result<JobInfo, updater_domain::UpdaterError> {
        let state = self.state_store.load().await?;
        let job_id = self.job_manager.current_job_id();

        Ok(match state {
            Some(s) => {
                let total = s.current_action.map(|i| i + 1).unwrap_or(s.completed_actions.len());
                JobInfo {
                    job_id,
                    status: Some(s.status),
                    description: Some(s.description),
                    package_name: s.package_path.file_name().map(|n| n.to_string_lossy().into_owned()),
                    last_updated: Some(s.last_updated),
                    completed_at: s.completed_at,
                    progress_completed: s.completed_actions.len(),
                    progress_total: total.max(s.completed_actions.len()),
                }
            }
            None => JobInfo {
                job_id,
                status: None,
                description: None,
                package_name: None,
                last_updated: None,
                completed_at: None,
                progress_completed: 0,
                progress_total: 0,
            },
        })
    }
}
