// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `docker_running` and `docker_health` checks, both shelling out to the
//! `docker` CLI rather than speaking the daemon socket protocol directly —
//! the orchestrator targets air-gapped hosts where the CLI is the one
//! guaranteed integration point.

use async_trait::async_trait;

use updater_domain::{CheckExecutor, ExecutionContext, UpdaterError};

use crate::infrastructure::process_runner::run_shell;

pub struct DockerRunningCheck;

#[async_trait]
impl CheckExecutor for DockerRunningCheck {
    async fn run(&self, _ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        run_shell("docker info", None, 10).await.map(|_| ()).map_err(|e| UpdaterError::check_failed(format!("docker_running: {e}")))
    }

    fn kind(&self) -> &'static str {
        "docker_running"
    }
}

pub struct DockerHealthCheck {
    pub container_name: Option<String>,
    pub container_id: Option<String>,
}

#[async_trait]
impl CheckExecutor for DockerHealthCheck {
    async fn run(&self, _ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let target = self
            .container_id
            .clone()
            .or_else(|| self.container_name.clone())
            .ok_or_else(|| UpdaterError::check_failed("docker_health: neither container_name nor container_id given"))?;

        let command = format!("docker inspect --format '{{{{.State.Health.Status}}}}' {target}");
        let output = run_shell(&command, None, 10).await.map_err(|e| UpdaterError::check_failed(format!("docker_health: {e}")))?;
        let status = output.stdout.trim();
        if status == "healthy" {
            Ok(())
        } else {
            Err(UpdaterError::check_failed(format!("docker_health: container {target} reported '{status}'")))
        }
    }

    fn kind(&self) -> &'static str {
        "docker_health"
    }
}
