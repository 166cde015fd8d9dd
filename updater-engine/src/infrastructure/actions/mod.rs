// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Mutating update steps (C5). `build` maps a parsed `ActionKind` onto the
//! concrete executor, wiring in the shared `BackupStore`/`ChecksumService`
//! ports the `backup`/`restore_backup`/`file_copy` variants need.

mod backup;
mod command;
mod docker_compose;
mod docker_load;
mod docker_prune;
mod file_copy;
mod file_merge;
mod file_sync;

use std::sync::Arc;

use updater_domain::{ActionExecutor, ActionKind, BackupStore, ChecksumService};

pub use backup::{BackupAction, RestoreBackupAction};
pub use command::CommandAction;
pub use docker_compose::{DockerComposeDownAction, DockerComposeUpAction};
pub use docker_load::DockerLoadAction;
pub use docker_prune::DockerPruneAction;
pub use file_copy::FileCopyAction;
pub use file_merge::FileMergeAction;
pub use file_sync::FileSyncAction;

pub fn build(kind: &ActionKind, backup_store: Arc<dyn BackupStore>, checksum_svc: Arc<dyn ChecksumService>) -> Arc<dyn ActionExecutor> {
    match kind.clone() {
        ActionKind::Command { command, cwd, timeout_secs } => Arc::new(CommandAction { command, cwd, timeout_secs }),
        ActionKind::Backup { sources, name } => Arc::new(BackupAction { sources, name, store: backup_store }),
        ActionKind::RestoreBackup { backup_name } => Arc::new(RestoreBackupAction { backup_name, store: backup_store }),
        ActionKind::DockerComposeDown { compose_file, timeout_secs } => Arc::new(DockerComposeDownAction { compose_file, timeout_secs }),
        ActionKind::DockerComposeUp { compose_file, detach, build, timeout_secs } => Arc::new(DockerComposeUpAction { compose_file, detach, build, timeout_secs }),
        ActionKind::DockerLoad { image_tar } => Arc::new(DockerLoadAction { image_tar }),
        ActionKind::DockerPrune { all, force } => Arc::new(DockerPruneAction { all, force }),
        ActionKind::FileCopy { source, destination, checksum } => Arc::new(FileCopyAction { source, destination, checksum, checksum_svc }),
        ActionKind::FileSync { source, destination, mode } => Arc::new(FileSyncAction { source, destination, mode }),
        ActionKind::FileMerge { source, destination, strategy } => Arc::new(FileMergeAction { source, destination, strategy }),
    }
}
