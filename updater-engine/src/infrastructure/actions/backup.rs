// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `backup` and `restore_backup` actions: thin adapters over the `BackupStore`
//! port (C3), resolving manifest-relative paths through the `ExecutionContext`.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use updater_domain::{ActionExecutor, BackupStore, ExecutionContext, UpdaterError};

pub struct BackupAction {
    pub sources: Vec<PathBuf>,
    pub name: Option<String>,
    pub store: Arc<dyn BackupStore>,
}

#[async_trait]
impl ActionExecutor for BackupAction {
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let resolved: Vec<PathBuf> = self.sources.iter().map(|p| ctx.resolve(p)).collect();
        self.store.create(&resolved, self.name.as_deref()).await.map(|_| ())
    }

    fn kind(&self) -> &'static str {
        "backup"
    }
}

pub struct RestoreBackupAction {
    pub backup_name: String,
    pub store: Arc<dyn BackupStore>,
}

#[async_trait]
impl ActionExecutor for RestoreBackupAction {
    async fn run(&self, _ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        self.store.restore(&self.backup_name, true).await
    }

    fn kind(&self) -> &'static str {
        "restore_backup"
    }
}
