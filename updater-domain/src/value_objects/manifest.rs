// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Manifest
//!
//! The operator-authored document describing one update: preconditions,
//! the ordered action sequence, postconditions, rollback policy, and cleanup
//! policy. Parsing (YAML bytes -> `Manifest`) is an infrastructure concern
//! (C1, `updater-engine::infrastructure::manifest`); this module only defines
//! the validated shape.
//!
//! Unknown top-level manifest keys are ignored by `serde_yaml` (default
//! behavior, no `deny_unknown_fields`); unknown `type` tags on a check or
//! action are a hard parse failure, per spec §6.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::value_objects::engine_version::EngineVersion;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub description: String,
    pub date: String,
    pub required_engine_version: EngineVersion,
    #[serde(default)]
    pub pre_checks: Vec<CheckDescriptor>,
    #[serde(default)]
    pub post_checks: Vec<CheckDescriptor>,
    #[serde(default)]
    pub actions: Vec<ActionDescriptor>,
    #[serde(default)]
    pub rollback: RollbackConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollbackConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub auto_rollback_on_failure: bool,
    #[serde(default)]
    pub steps: Option<Vec<ActionDescriptor>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub remove_old_backups: bool,
    pub keep_last_n: u32,
    pub remove_old_images: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self { remove_old_backups: false, keep_last_n: 0, remove_old_images: false }
    }
}

/// A single precondition/postcondition predicate. Variants carry only the
/// fields that particular check needs (spec §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckDescriptor {
    DiskSpace {
        path: PathBuf,
        required_mb: u64,
    },
    DockerRunning {},
    FileExists {
        path: PathBuf,
    },
    DockerHealth {
        #[serde(default)]
        container_name: Option<String>,
        #[serde(default)]
        container_id: Option<String>,
    },
    HttpCheck {
        url: String,
        #[serde(default = "default_expected_status")]
        expected_status: u16,
        #[serde(default = "default_retries")]
        retries: u32,
        #[serde(default = "default_delay_secs")]
        delay_secs: u64,
        #[serde(default = "default_http_timeout_secs")]
        timeout_secs: u64,
    },
    ServiceRunning {
        service_name: String,
    },
    Command {
        command: String,
        #[serde(default = "default_check_command_timeout_secs")]
        timeout_secs: u64,
    },
}

impl CheckDescriptor {
    pub fn kind(&self) -> &'static str {
        match self {
            CheckDescriptor::DiskSpace { .. } => "disk_space",
            CheckDescriptor::DockerRunning {} => "docker_running",
            CheckDescriptor::FileExists { .. } => "file_exists",
            CheckDescriptor::DockerHealth { .. } => "docker_health",
            CheckDescriptor::HttpCheck { .. } => "http_check",
            CheckDescriptor::ServiceRunning { .. } => "service_running",
            CheckDescriptor::Command { .. } => "command",
        }
    }
}

/// A single mutating step. `name` and `continue_on_error` are common to every
/// variant (spec §3); the payload is variant-specific (spec §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub continue_on_error: bool,
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl ActionDescriptor {
    pub fn display_name(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("{}#{}", self.kind.tag(), index))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Command {
        command: String,
        #[serde(default)]
        cwd: Option<PathBuf>,
        #[serde(default = "default_action_command_timeout_secs")]
        timeout_secs: u64,
    },
    Backup {
        sources: Vec<PathBuf>,
        #[serde(default)]
        name: Option<String>,
    },
    RestoreBackup {
        #[serde(default = "default_backup_name")]
        backup_name: String,
    },
    DockerComposeDown {
        compose_file: PathBuf,
        #[serde(default = "default_compose_down_timeout_secs")]
        timeout_secs: u64,
    },
    DockerComposeUp {
        compose_file: PathBuf,
        #[serde(default = "default_true")]
        detach: bool,
        #[serde(default)]
        build: bool,
        #[serde(default = "default_compose_up_timeout_secs")]
        timeout_secs: u64,
    },
    DockerLoad {
        image_tar: PathBuf,
    },
    DockerPrune {
        #[serde(default)]
        all: bool,
        #[serde(default = "default_true")]
        force: bool,
    },
    FileCopy {
        source: PathBuf,
        destination: PathBuf,
        #[serde(default)]
        checksum: Option<String>,
    },
    FileSync {
        source: PathBuf,
        destination: PathBuf,
        mode: SyncMode,
    },
    FileMerge {
        source: PathBuf,
        destination: PathBuf,
        strategy: MergeStrategy,
    },
}

impl ActionKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ActionKind::Command { .. } => "command",
            ActionKind::Backup { .. } => "backup",
            ActionKind::RestoreBackup { .. } => "restore_backup",
            ActionKind::DockerComposeDown { .. } => "docker_compose_down",
            ActionKind::DockerComposeUp { .. } => "docker_compose_up",
            ActionKind::DockerLoad { .. } => "docker_load",
            ActionKind::DockerPrune { .. } => "docker_prune",
            ActionKind::FileCopy { .. } => "file_copy",
            ActionKind::FileSync { .. } => "file_sync",
            ActionKind::FileMerge { .. } => "file_merge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    Mirror,
    AddOnly,
    OverwriteExisting,
}

/// `KeepExisting` and `MergeKeys` are documented aliases (spec §4.5, §9 open
/// question) — both prefer the destination value on conflict. `OverwriteAll`
/// prefers the source value on conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    KeepExisting,
    OverwriteAll,
    MergeKeys,
}

fn default_expected_status() -> u16 {
    200
}
fn default_retries() -> u32 {
    1
}
fn default_delay_secs() -> u64 {
    5
}
fn default_http_timeout_secs() -> u64 {
    10
}
fn default_check_command_timeout_secs() -> u64 {
    30
}
fn default_action_command_timeout_secs() -> u64 {
    300
}
fn default_compose_down_timeout_secs() -> u64 {
    60
}
fn default_compose_up_timeout_secs() -> u64 {
    60
}
fn default_backup_name() -> String {
    "latest".to_string()
}
fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_config_default() {
        let c = CleanupConfig::default();
        assert!(!c.remove_old_backups);
        assert_eq!(c.keep_last_n, 0);
    }

    #[test]
    fn action_display_name_falls_back_to_kind_and_index() {
        let a = ActionDescriptor {
            name: None,
            continue_on_error: false,
            kind: ActionKind::DockerPrune { all: false, force: true },
        };
        assert_eq!(a.display_name(2), "docker_prune#2");
    }

    #[test]
    fn merge_strategies_are_distinct_tags() {
        assert_ne!(MergeStrategy::KeepExisting, MergeStrategy::OverwriteAll);
        assert_ne!(MergeStrategy::MergeKeys, MergeStrategy::OverwriteAll);
    }
}
