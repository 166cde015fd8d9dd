// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

use updater_domain::{BackupEntry, BackupStore, UpdaterError};

pub async fn list_backups(backup_store: &dyn BackupStore) -> Result<Vec<BackupEntry>, UpdaterError> {
    backup_store.list().await
}
