// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `command` action: an arbitrary shell step, run from `cwd` (defaulting to
//! the extracted package root) under a deadline.

use async_trait::async_trait;
use std::path::PathBuf;

use updater_domain::{ActionExecutor, ExecutionContext, UpdaterError};

use crate::infrastructure::process_runner::run_shell;

pub struct CommandAction {
    pub command: String,
    pub cwd: Option<PathBuf>,
    pub timeout_secs: u64,
}

#[async_trait]
impl ActionExecutor for CommandAction {
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let cwd = self.cwd.as_ref().map(|p| ctx.resolve(p)).unwrap_or_else(|| ctx.package_root.clone());
        run_shell(&self.command, Some(&cwd), self.timeout_secs).await.map(|_| ()).map_err(|e| UpdaterError::action_failed(format!("command: {e}")))
    }

    fn kind(&self) -> &'static str {
        "command"
    }
}
