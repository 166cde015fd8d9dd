// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `docker_load` action: imports an offline image tarball bundled with the
//! update package.

use async_trait::async_trait;
use std::path::PathBuf;

use updater_domain::{ActionExecutor, ExecutionContext, UpdaterError};

use crate::infrastructure::process_runner::run_shell;

pub struct DockerLoadAction {
    pub image_tar: PathBuf,
}

#[async_trait]
impl ActionExecutor for DockerLoadAction {
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let tar = ctx.resolve(&self.image_tar);
        let command = format!("docker load -i {}", tar.display());
        run_shell(&command, None, 300).await.map(|_| ()).map_err(|e| UpdaterError::action_failed(format!("docker_load: {e}")))
    }

    fn kind(&self) -> &'static str {
        "docker_load"
    }
}
