// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `docker_prune` action: reclaims disk after an image swap.

use async_trait::async_trait;

use updater_domain::{ActionExecutor, ExecutionContext, UpdaterError};

use crate::infrastructure::process_runner::run_shell;

pub struct DockerPruneAction {
    pub all: bool,
    pub force: bool,
}

#[async_trait]
impl ActionExecutor for DockerPruneAction {
    async fn run(&self, _ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let mut command = "docker system prune".to_string();
        if self.all {
            command.push_str(" -a");
        }
        if self.force {
            command.push_str(" -f");
        }
        run_shell(&command, None, 120).await.map(|_| ()).map_err(|e| UpdaterError::action_failed(format!("docker_prune: {e}")))
    }

    fn kind(&self) -> &'static str {
        "docker_prune"
    }
}
