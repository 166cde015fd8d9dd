// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Engine-level configuration: where state/backups live, HTTP bind address,
//! and the observability overlay. Loaded from an optional TOML file and
//! layered over compiled defaults — there is no global config singleton
//! (spec §9 redesign flag); every layer that needs it is handed an
//! `EngineConfig` explicitly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use updater_domain::UpdaterError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub state_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub http_addr: String,
    pub max_log_lines: usize,
    pub observability: ObservabilityConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("/opt/updater/state"),
            backup_dir: PathBuf::from("/opt/updater/backups"),
            http_addr: "127.0.0.1:8787".to_string(),
            max_log_lines: 1000,
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), metrics_enabled: true }
    }
}

impl EngineConfig {
    /// Starts from compiled defaults, then overlays `base_dir` (from
    /// `updater-bootstrap`'s CLI/env resolution) and, if present, a TOML
    /// config file at `<base_dir>/config.toml`.
    pub async fn resolve(base_dir: &Path, log_level: &str) -> Result<Self, UpdaterError> {
        let mut config = Self { state_dir: base_dir.join("state"), backup_dir: base_dir.join("backups"), ..Self::default() };
        config.observability.log_level = log_level.to_string();

        let config_path = base_dir.join("config.toml");
        match tokio::fs::read_to_string(&config_path).await {
            Ok(contents) => {
                let overlay: EngineConfigOverlay = toml::from_str(&contents).map_err(|e| UpdaterError::manifest(format!("invalid config.toml: {e}")))?;
                overlay.apply(&mut config);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(UpdaterError::Io(e.to_string())),
        }
        Ok(config)
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join("state.json")
    }
}

/// Every field optional so a `config.toml` can override just the handful of
/// settings an operator cares about.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct EngineConfigOverlay {
    state_dir: Option<PathBuf>,
    backup_dir: Option<PathBuf>,
    http_addr: Option<String>,
    max_log_lines: Option<usize>,
    log_level: Option<String>,
    metrics_enabled: Option<bool>,
}

impl EngineConfigOverlay {
    fn apply(self, config: &mut EngineConfig) {
        if let Some(v) = self.state_dir {
            config.state_dir = v;
        }
        if let Some(v) = self.backup_dir {
            config.backup_dir = v;
        }
        if let Some(v) = self.http_addr {
            config.http_addr = v;
        }
        if let Some(v) = self.max_log_lines {
            config.max_log_lines = v;
        }
        if let Some(v) = self.log_level {
            config.observability.log_level = v;
        }
        if let Some(v) = self.metrics_enabled {
            config.observability.metrics_enabled = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_derive_from_base_dir_when_no_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::resolve(dir.path(), "debug").await.unwrap();
        assert_eq!(config.state_dir, dir.path().join("state"));
        assert_eq!(config.observability.log_level, "debug");
    }

    #[tokio::test]
    async fn toml_overlay_overrides_selected_fields() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("config.toml"), "http_addr = \"0.0.0.0:9999\"\n").await.unwrap();
        let config = EngineConfig::resolve(dir.path(), "info").await.unwrap();
        assert_eq!(config.http_addr, "0.0.0.0:9999");
        assert_eq!(config.state_dir, dir.path().join("state"));
    }
}
