// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `service_running` check: queries the host init system. Linux-only
//! (`systemctl`); other platforms report a clear check failure rather than a
//! silent pass.

use async_trait::async_trait;

use updater_domain::{CheckExecutor, ExecutionContext, UpdaterError};

use crate::infrastructure::process_runner::run_shell;

pub struct ServiceRunningCheck {
    pub service_name: String,
}

#[async_trait]
impl CheckExecutor for ServiceRunningCheck {
    #[cfg(target_os = "linux")]
    async fn run(&self, _ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let command = format!("systemctl is-active {}", self.service_name);
        let output = run_shell(&command, None, 10).await.map_err(|e| UpdaterError::check_failed(format!("service_running: {e}")))?;
        if output.stdout.trim() == "active" {
            Ok(())
        } else {
            Err(UpdaterError::check_failed(format!("service_running: {} is not active", self.service_name)))
        }
    }

    #[cfg(not(target_os = "linux"))]
    async fn run(&self, _ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        Err(UpdaterError::check_failed("service_running: unsupported on this platform"))
    }

    fn kind(&self) -> &'static str {
        "service_running"
    }
}
