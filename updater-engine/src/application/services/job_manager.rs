// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Single-slot job admission (spec §5, §9). `apply` does an atomic
//! test-and-set over one `Mutex<Slot>` rather than scanning a job table —
//! there is never more than one job.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use updater_domain::{JobStatus, ManifestService, UpdaterError};

use crate::application::services::log_buffer::LogBuffer;
use crate::infrastructure::bootstrap::{BootstrapOutcome, Bootstrapper};
use crate::infrastructure::engine::UpdateEngine;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Idle,
    Running { job_id: String, started_at: DateTime<Utc> },
}

pub struct JobManager {
    slot: Mutex<Slot>,
    uploads_dir: PathBuf,
    base_dir: PathBuf,
    engine: Arc<UpdateEngine>,
    manifest_svc: Arc<dyn ManifestService>,
    pub log_buffer: Arc<LogBuffer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobInfo {
    pub job_id: Option<String>,
    pub status: Option<JobStatus>,
    pub description: Option<String>,
    pub package_name: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress_completed: usize,
    pub progress_total: usize,
}

impl JobManager {
    pub fn new(base_dir: PathBuf, engine: Arc<UpdateEngine>, manifest_svc: Arc<dyn ManifestService>, max_log_lines: usize) -> Self {
        Self {
            slot: Mutex::new(Slot::Idle),
            uploads_dir: base_dir.join("uploads"),
            base_dir,
            engine,
            manifest_svc,
            log_buffer: Arc::new(LogBuffer::new(max_log_lines)),
        }
    }

    /// Persists `archive_bytes` under `uploads/` and returns an opaque id
    /// for a later `apply`.
    pub async fn submit(&self, archive_bytes: &[u8]) -> Result<String, UpdaterError> {
        tokio::fs::create_dir_all(&self.uploads_dir).await.map_err(|e| UpdaterError::Io(e.to_string()))?;
        let upload_id = Uuid::new_v4().to_string();
        let path = self.uploads_dir.join(format!("{upload_id}.tar.gz"));
        tokio::fs::write(&path, archive_bytes).await.map_err(|e| UpdaterError::Io(e.to_string()))?;
        Ok(upload_id)
    }

    /// Admits `upload_id` as the running job, rejecting with
    /// `UpdaterError::Admission` if one is already in flight. The work runs
    /// on a detached task; callers observe progress via `status`/the log
    /// buffer, not by awaiting this method's background work.
    pub async fn apply(self: &Arc<Self>, upload_id: &str) -> Result<String, UpdaterError> {
        let job_id = Uuid::new_v4().to_string();
        {
            let mut slot = self.slot.lock();
            if !matches!(*slot, Slot::Idle) {
                return Err(UpdaterError::admission("an update is already in progress"));
            }
            *slot = Slot::Running { job_id: job_id.clone(), started_at: Utc::now() };
        }
        self.log_buffer.clear();

        let archive_path = self.uploads_dir.join(format!("{upload_id}.tar.gz"));
        let manager = Arc::clone(self);
        let job_id_for_task = job_id.clone();
        let upload_id = upload_id.to_string();
        tokio::spawn(async move {
            manager.log_buffer.push(format!("applying upload {upload_id}"));
            let bootstrapper = Bootstrapper::new(manager.base_dir.clone(), manager.engine.clone(), manager.manifest_svc.clone());
            let result = bootstrapper.apply_archive(&archive_path, job_id_for_task).await;
            match &result {
                Ok(BootstrapOutcome::Applied(outcome)) => manager.log_buffer.push(format!("job completed: {outcome:?}")),
                Ok(BootstrapOutcome::EngineUpgradeInstalled { new_version }) => manager.log_buffer.push(format!("engine upgraded to {new_version}, restart required")),
                Err(e) => manager.log_buffer.push(format!("job failed: {e}")),
            }
            *manager.slot.lock() = Slot::Idle;
        });

        Ok(job_id)
    }

    pub fn is_running(&self) -> bool {
        !matches!(*self.slot.lock(), Slot::Idle)
    }

    pub fn current_job_id(&self) -> Option<String> {
        match &*self.slot.lock() {
            Slot::Idle => None,
            Slot::Running { job_id, .. } => Some(job_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{checksum::Md5ChecksumService, manifest::YamlManifestService, state_store::JsonStateStore};
    use std::path::Path;
    use updater_domain::BackupStore;

    struct StubBackupStore;

    #[async_trait::async_trait]
    impl BackupStore for StubBackupStore {
        async fn create(&self, _sources: &[PathBuf], _name: Option<&str>) -> Result<updater_domain::BackupEntry, UpdaterError> {
            unimplemented!()
        }
        async fn restore(&self, _name: &str, _verify: bool) -> Result<(), UpdaterError> {
            Ok(())
        }
        async fn list(&self) -> Result<Vec<updater_domain::BackupEntry>, UpdaterError> {
            Ok(Vec::new())
        }
        async fn cleanup_old(&self, _keep_last_n: u32) -> Result<Vec<String>, UpdaterError> {
            Ok(Vec::new())
        }
        fn backup_dir(&self) -> &Path {
            Path::new("/tmp")
        }
    }

    fn build_manager(base_dir: &Path) -> Arc<JobManager> {
        let engine = Arc::new(UpdateEngine::new(
            Arc::new(JsonStateStore::new(base_dir.join("state.json"))),
            Arc::new(StubBackupStore),
            Arc::new(Md5ChecksumService::new()),
            Arc::new(crate::infrastructure::metrics::Metrics::new()),
        ));
        Arc::new(JobManager::new(base_dir.to_path_buf(), engine, Arc::new(YamlManifestService::new()), 100))
    }

    #[tokio::test]
    async fn second_apply_is_rejected_while_first_is_running() {
        let dir = tempfile::tempdir().unwrap();
        let manager = build_manager(dir.path());
        let upload_id = manager.submit(b"not a real archive").await.unwrap();

        let first = manager.apply(&upload_id).await;
        assert!(first.is_ok());
        let second = manager.apply(&upload_id).await;
        assert!(matches!(second, Err(UpdaterError::Admission(_))));
    }
}
