// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `tracing-subscriber` initialization. Level is driven by
//! `ObservabilityConfig::log_level`, itself resolved from `-v`/`UPDATER_LOG`
//! by `updater-bootstrap`; this module only wires the subscriber once that
//! decision has been made.

use tracing_subscriber::EnvFilter;

/// Installs a global subscriber writing structured, leveled lines to
/// stderr. Safe to call once per process; a second call is a no-op error
/// that we deliberately ignore (tests may install their own subscriber).
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init();
}
