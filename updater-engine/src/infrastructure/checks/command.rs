// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `command` check: an arbitrary shell predicate, passing iff the exit code
//! is zero within `timeout_secs`.

use async_trait::async_trait;

use updater_domain::{CheckExecutor, ExecutionContext, UpdaterError};

use crate::infrastructure::process_runner::run_shell;

pub struct CommandCheck {
    pub command: String,
    pub timeout_secs: u64,
}

#[async_trait]
impl CheckExecutor for CommandCheck {
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        run_shell(&self.command, Some(&ctx.package_root), self.timeout_secs)
            .await
            .map(|_| ())
            .map_err(|e| UpdaterError::check_failed(format!("command: {e}")))
    }

    fn kind(&self) -> &'static str {
        "command"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn passes_on_zero_exit() {
        let check = CommandCheck { command: "true".into(), timeout_secs: 5 };
        let ctx = ExecutionContext::new(PathBuf::from("/tmp"), "job-1");
        assert!(check.run(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn fails_on_nonzero_exit() {
        let check = CommandCheck { command: "false".into(), timeout_secs: 5 };
        let ctx = ExecutionContext::new(PathBuf::from("/tmp"), "job-1");
        assert!(check.run(&ctx).await.is_err());
    }
}
