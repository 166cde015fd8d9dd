// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `docker_compose_up`/`docker_compose_down` actions, driving the `docker
//! compose` CLI plugin rather than the legacy standalone `docker-compose`
//! binary (air-gapped hosts provision the plugin form).

use async_trait::async_trait;
use std::path::PathBuf;

use updater_domain::{ActionExecutor, ExecutionContext, UpdaterError};

use crate::infrastructure::process_runner::run_shell;

pub struct DockerComposeUpAction {
    pub compose_file: PathBuf,
    pub detach: bool,
    pub build: bool,
    pub timeout_secs: u64,
}

#[async_trait]
impl ActionExecutor for DockerComposeUpAction {
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let file = ctx.resolve(&self.compose_file);
        let mut command = format!("docker compose -f {} up", file.display());
        if self.detach {
            command.push_str(" -d");
        }
        if self.build {
            command.push_str(" --build");
        }
        run_shell(&command, None, self.timeout_secs).await.map(|_| ()).map_err(|e| UpdaterError::action_failed(format!("docker_compose_up: {e}")))
    }

    fn kind(&self) -> &'static str {
        "docker_compose_up"
    }
}

pub struct DockerComposeDownAction {
    pub compose_file: PathBuf,
    pub timeout_secs: u64,
}

#[async_trait]
impl ActionExecutor for DockerComposeDownAction {
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let file = ctx.resolve(&self.compose_file);
        let command = format!("docker compose -f {} down", file.display());
        run_shell(&command, None, self.timeout_secs).await.map(|_| ()).map_err(|e| UpdaterError::action_failed(format!("docker_compose_down: {e}")))
    }

    fn kind(&self) -> &'static str {
        "docker_compose_down"
    }
}
