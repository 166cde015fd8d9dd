// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Configuration
//!
//! The handful of settings the bootstrap layer itself needs before the
//! engine's own `EngineConfig` (in `updater-engine::infrastructure::config`)
//! takes over: where state/backups/logs live, and at what verbosity to
//! start logging before a manifest or CLI flag can refine it further.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_DIR: &str = "/opt/updater";
pub const BASE_DIR_ENV_VAR: &str = "UPDATER_BASE_DIR";
pub const LOG_LEVEL_ENV_VAR: &str = "UPDATER_LOG";

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub base_dir: PathBuf,
    pub log_level: String,
}

impl BootstrapConfig {
    /// Resolves settings in the order: explicit CLI flag, environment
    /// variable, compiled-in default.
    pub fn resolve(cli_base_dir: Option<PathBuf>, verbose: bool) -> Self {
        let base_dir = cli_base_dir
            .or_else(|| env::var(BASE_DIR_ENV_VAR).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR));

        let log_level = if verbose {
            "debug".to_string()
        } else {
            env::var(LOG_LEVEL_ENV_VAR).unwrap_or_else(|_| "info".to_string())
        };

        Self { base_dir, log_level }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_wins_over_default() {
        let cfg = BootstrapConfig::resolve(Some(PathBuf::from("/custom")), false);
        assert_eq!(cfg.base_dir, PathBuf::from("/custom"));
    }

    #[test]
    fn verbose_forces_debug() {
        let cfg = BootstrapConfig::resolve(None, true);
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn default_base_dir_when_unset() {
        // SAFETY: test-only mutation of process env, no concurrent access in this test binary.
        unsafe { env::remove_var(BASE_DIR_ENV_VAR) };
        let cfg = BootstrapConfig::resolve(None, false);
        assert_eq!(cfg.base_dir, PathBuf::from(DEFAULT_BASE_DIR));
    }
}
