// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Driver Engine (C6)
//!
//! Runs a validated `Manifest` through pre-checks, the action sequence, and
//! post-checks, persisting `JobState` after every state-changing step so a
//! crash at any point leaves a resumable record (spec §4.6). A pre-check
//! failure fails the job outright — no action has mutated anything yet, so
//! there is nothing to roll back. A failure during actions or post-checks
//! triggers rollback consideration per `manifest.rollback`.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

use updater_domain::{
    BackupStore, ChecksumService, ExecutionContext, JobAggregate, JobStatus, Manifest, StateStore, UpdaterError,
};

use crate::infrastructure::metrics::Metrics;
use crate::infrastructure::{actions, checks};

pub struct UpdateEngine {
    pub state_store: Arc<dyn StateStore>,
    pub backup_store: Arc<dyn BackupStore>,
    pub checksum_svc: Arc<dyn ChecksumService>,
    pub metrics: Arc<Metrics>,
}

/// Terminal outcome of a full `run` invocation, used by the application
/// layer (apply/resume use cases) to decide the CLI exit message and HTTP
/// status without re-deriving it from `JobState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    RolledBack,
    FailedNoRollback,
}

impl UpdateEngine {
    pub fn new(state_store: Arc<dyn StateStore>, backup_store: Arc<dyn BackupStore>, checksum_svc: Arc<dyn ChecksumService>, metrics: Arc<Metrics>) -> Self {
        Self { state_store, backup_store, checksum_svc, metrics }
    }

    /// Starts a brand-new job. Fails with `UpdaterError::Admission` if one is
    /// already in progress (spec §6, single-job admission).
    pub async fn apply(&self, manifest: &Manifest, package_root: PathBuf, job_id: String) -> Result<RunOutcome, UpdaterError> {
        if self.state_store.is_update_in_progress().await? {
            return Err(UpdaterError::admission("an update is already in progress"));
        }
        let now = Utc::now();
        let aggregate = JobAggregate::start(package_root.clone(), manifest.description.clone(), manifest.actions.len(), now);
        self.state_store.save(aggregate.state()).await?;
        self.drive(aggregate, manifest, package_root, job_id, now).await
    }

    /// Resumes a job from the last checkpointed `JobState`, re-running only
    /// actions not yet in `completed_actions` (spec §4.6 resume path).
    pub async fn resume(&self, manifest: &Manifest, job_id: String) -> Result<RunOutcome, UpdaterError> {
        let state = self
            .state_store
            .load()
            .await?
            .ok_or_else(|| UpdaterError::state_corruption("no resumable job state found"))?;
        if state.status != JobStatus::InProgress {
            return Err(UpdaterError::admission(format!("job is not resumable from status {:?}", state.status)));
        }
        let package_root = state.package_path.clone();
        let aggregate = JobAggregate::resume(state, manifest.actions.len());
        self.drive(aggregate, manifest, package_root, job_id, Utc::now()).await
    }

    /// Operator-requested rollback (outside the auto-rollback-on-failure
    /// path): uses the recorded `package_path` from the last persisted
    /// state, per spec §4.7 step 1's `rollback` branch.
    pub async fn rollback_explicit(&self, manifest: &Manifest, job_id: String) -> Result<(), UpdaterError> {
        let state = self.state_store.load().await?.ok_or_else(|| UpdaterError::state_corruption("no job state to roll back"))?;
        let ctx = ExecutionContext::new(state.package_path.clone(), job_id);
        let mut aggregate = JobAggregate::resume(state, manifest.actions.len());

        aggregate.begin_rollback("operator-requested rollback".to_string(), Utc::now());
        self.state_store.save(aggregate.state()).await?;

        match self.run_rollback(manifest, &ctx).await {
            Ok(()) => {
                aggregate.finalize_rolled_back(Utc::now());
                self.state_store.save(aggregate.state()).await?;
                self.metrics.rollback_total.with_label_values(&["success"]).inc();
                Ok(())
            }
            Err(e) => {
                self.metrics.rollback_total.with_label_values(&["failed"]).inc();
                Err(e)
            }
        }
    }

    async fn drive(&self, mut aggregate: JobAggregate, manifest: &Manifest, package_root: PathBuf, job_id: String, started_at: chrono::DateTime<Utc>) -> Result<RunOutcome, UpdaterError> {
        let ctx = ExecutionContext::new(package_root, job_id);

        // Pre-checks only run on a fresh start; a resumed job already passed them.
        if aggregate.state().completed_actions.is_empty() && aggregate.state().current_action.is_none() {
            if let Err(e) = self.run_checks(&manifest.pre_checks, &ctx).await {
                aggregate.finalize_failed(e.to_string(), Utc::now());
                self.state_store.save(aggregate.state()).await?;
                self.record_terminal("failed", started_at);
                return Err(e);
            }
        }

        let start_index = aggregate.state().first_incomplete_action(manifest.actions.len()).unwrap_or(manifest.actions.len());
        for index in start_index..manifest.actions.len() {
            let descriptor = &manifest.actions[index];
            let name = descriptor.display_name(index);
            aggregate.start_action(index, name.clone(), Utc::now())?;
            self.state_store.save(aggregate.state()).await?;

            let executor = actions::build(&descriptor.kind, self.backup_store.clone(), self.checksum_svc.clone());
            match executor.run(&ctx).await {
                Ok(()) => {
                    aggregate.complete_action(index, Utc::now());
                    self.state_store.save(aggregate.state()).await?;
                    self.metrics.actions_total.with_label_values(&[descriptor.kind.tag(), "completed"]).inc();
                }
                Err(e) if descriptor.continue_on_error => {
                    aggregate.action_failed_but_continued(index, e.to_string(), Utc::now());
                    self.state_store.save(aggregate.state()).await?;
                    self.metrics.actions_total.with_label_values(&[descriptor.kind.tag(), "failed_continued"]).inc();
                }
                Err(e) => {
                    self.metrics.actions_total.with_label_values(&[descriptor.kind.tag(), "failed"]).inc();
                    return self.handle_failure(aggregate, manifest, &ctx, e, started_at).await;
                }
            }
        }

        if let Err(e) = self.run_checks(&manifest.post_checks, &ctx).await {
            return self.handle_failure(aggregate, manifest, &ctx, e, started_at).await;
        }

        aggregate.finalize_completed(Utc::now());
        self.state_store.save(aggregate.state()).await?;
        self.record_terminal("completed", started_at);

        if manifest.cleanup.remove_old_backups {
            self.backup_store.cleanup_old(manifest.cleanup.keep_last_n).await?;
        }

        Ok(RunOutcome::Completed)
    }

    async fn run_checks(&self, descriptors: &[updater_domain::CheckDescriptor], ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        for descriptor in descriptors {
            let result = checks::build(descriptor).run(ctx).await;
            self.metrics.checks_total.with_label_values(&[descriptor.kind(), if result.is_ok() { "passed" } else { "failed" }]).inc();
            result?;
        }
        Ok(())
    }

    fn record_terminal(&self, status: &str, started_at: chrono::DateTime<Utc>) {
        self.metrics.jobs_total.with_label_values(&[status]).inc();
        let elapsed = (Utc::now() - started_at).num_milliseconds().max(0) as f64 / 1000.0;
        self.metrics.job_duration_seconds.with_label_values(&[status]).observe(elapsed);
    }

    async fn handle_failure(&self, mut aggregate: JobAggregate, manifest: &Manifest, ctx: &ExecutionContext, cause: UpdaterError, started_at: chrono::DateTime<Utc>) -> Result<RunOutcome, UpdaterError> {
        let should_rollback = manifest.rollback.enabled && manifest.rollback.auto_rollback_on_failure && cause.triggers_rollback_consideration();

        if !should_rollback {
            aggregate.finalize_failed(cause.to_string(), Utc::now());
            self.state_store.save(aggregate.state()).await?;
            self.record_terminal("failed", started_at);
            return Err(cause);
        }

        aggregate.begin_rollback(cause.to_string(), Utc::now());
        self.state_store.save(aggregate.state()).await?;

        let rollback_result = self.run_rollback(manifest, ctx).await;
        match rollback_result {
            Ok(()) => {
                aggregate.finalize_rolled_back(Utc::now());
                self.state_store.save(aggregate.state()).await?;
                self.metrics.rollback_total.with_label_values(&["success"]).inc();
                self.record_terminal("rolled_back", started_at);
                Ok(RunOutcome::RolledBack)
            }
            Err(rollback_err) => {
                aggregate.finalize_failed(format!("{cause}; rollback also failed: {rollback_err}"), Utc::now());
                self.state_store.save(aggregate.state()).await?;
                self.metrics.rollback_total.with_label_values(&["failed"]).inc();
                self.record_terminal("failed", started_at);
                Err(cause)
            }
        }
    }

    async fn run_rollback(&self, manifest: &Manifest, ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        match &manifest.rollback.steps {
            Some(steps) => {
                for descriptor in steps {
                    let executor = actions::build(&descriptor.kind, self.backup_store.clone(), self.checksum_svc.clone());
                    executor.run(ctx).await?;
                }
                Ok(())
            }
            None => self.backup_store.restore("latest", true).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use updater_domain::{ActionDescriptor, ActionKind, CheckDescriptor, CleanupConfig, EngineVersion, RollbackConfig};

    use crate::infrastructure::backup_store::FsBackupStore;
    use crate::infrastructure::state_store::JsonStateStore;

    fn build_engine(base_dir: &Path) -> UpdateEngine {
        UpdateEngine::new(
            Arc::new(JsonStateStore::new(base_dir.join("state.json"))),
            Arc::new(FsBackupStore::new(base_dir.join("backups"))),
            Arc::new(crate::infrastructure::checksum::Md5ChecksumService::new()),
            Arc::new(Metrics::new()),
        )
    }

    fn base_manifest() -> Manifest {
        Manifest {
            description: "test update".to_string(),
            date: "2026-01-01".to_string(),
            required_engine_version: EngineVersion { major: 1, minor: 0, patch: 0 },
            pre_checks: Vec::new(),
            post_checks: Vec::new(),
            actions: Vec::new(),
            rollback: RollbackConfig::default(),
            cleanup: CleanupConfig::default(),
        }
    }

    #[tokio::test]
    async fn apply_runs_checks_and_actions_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let package_root = dir.path().join("package");
        fs::create_dir_all(&package_root).unwrap();
        fs::write(package_root.join("marker.txt"), b"present").unwrap();

        let mut manifest = base_manifest();
        manifest.pre_checks = vec![CheckDescriptor::FileExists { path: PathBuf::from("marker.txt") }];
        manifest.actions = vec![ActionDescriptor { name: None, continue_on_error: false, kind: ActionKind::Command { command: "true".to_string(), cwd: None, timeout_secs: 5 } }];

        let engine = build_engine(dir.path());
        let outcome = engine.apply(&manifest, package_root, "job-1".to_string()).await.unwrap();
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(engine.metrics.jobs_total.with_label_values(&["completed"]).get(), 1.0);
    }

    #[tokio::test]
    async fn failed_pre_check_fails_job_without_touching_actions() {
        let dir = tempfile::tempdir().unwrap();
        let package_root = dir.path().join("package");
        fs::create_dir_all(&package_root).unwrap();

        let mut manifest = base_manifest();
        manifest.pre_checks = vec![CheckDescriptor::FileExists { path: PathBuf::from("missing.txt") }];
        manifest.actions = vec![ActionDescriptor { name: None, continue_on_error: false, kind: ActionKind::Command { command: "touch ran.txt".to_string(), cwd: None, timeout_secs: 5 } }];

        let engine = build_engine(dir.path());
        let result = engine.apply(&manifest, package_root.clone(), "job-1".to_string()).await;
        assert!(result.is_err());
        assert!(!package_root.join("ran.txt").exists());
    }

    #[tokio::test]
    async fn action_failure_triggers_auto_rollback_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let package_root = dir.path().join("package");
        fs::create_dir_all(&package_root).unwrap();
        let protected = package_root.join("protected.txt");
        fs::write(&protected, b"original").unwrap();

        let mut manifest = base_manifest();
        manifest.actions = vec![
            ActionDescriptor { name: None, continue_on_error: false, kind: ActionKind::Backup { sources: vec![protected.clone()], name: None } },
            ActionDescriptor { name: None, continue_on_error: false, kind: ActionKind::Command { command: "exit 1".to_string(), cwd: None, timeout_secs: 5 } },
        ];
        manifest.rollback = RollbackConfig { enabled: true, auto_rollback_on_failure: true, steps: None };

        let engine = build_engine(dir.path());
        let outcome = engine.apply(&manifest, package_root, "job-1".to_string()).await.unwrap();
        assert_eq!(outcome, RunOutcome::RolledBack);
        assert_eq!(engine.metrics.rollback_total.with_label_values(&["success"]).get(), 1.0);
    }

    #[tokio::test]
    async fn resume_continues_from_first_incomplete_action() {
        let dir = tempfile::tempdir().unwrap();
        let package_root = dir.path().join("package");
        fs::create_dir_all(&package_root).unwrap();

        let mut manifest = base_manifest();
        manifest.actions = vec![
            ActionDescriptor { name: None, continue_on_error: false, kind: ActionKind::Command { command: "true".to_string(), cwd: None, timeout_secs: 5 } },
            ActionDescriptor { name: None, continue_on_error: false, kind: ActionKind::Command { command: "touch second.txt".to_string(), cwd: Some(package_root.clone()), timeout_secs: 5 } },
        ];

        let engine = build_engine(dir.path());

        let mut aggregate = JobAggregate::start(package_root.clone(), manifest.description.clone(), manifest.actions.len(), Utc::now());
        aggregate.start_action(0, "command#0".to_string(), Utc::now()).unwrap();
        aggregate.complete_action(0, Utc::now());
        engine.state_store.save(aggregate.state()).await.unwrap();

        let outcome = engine.resume(&manifest, "job-2".to_string()).await.unwrap();
        assert_eq!(outcome, RunOutcome::Completed);
        assert!(package_root.join("second.txt").exists());
    }
}
