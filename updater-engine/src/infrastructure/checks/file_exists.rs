// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `file_exists` post-check: confirms a path landed where an action claimed
//! to have put it.

use async_trait::async_trait;
use std::path::PathBuf;

use updater_domain::{CheckExecutor, ExecutionContext, UpdaterError};

pub struct FileExistsCheck {
    pub path: PathBuf,
}

#[async_trait]
impl CheckExecutor for FileExistsCheck {
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let target = ctx.resolve(&self.path);
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            Ok(())
        } else {
            Err(UpdaterError::check_failed(format!("file_exists: {} not found", target.display())))
        }
    }

    fn kind(&self) -> &'static str {
        "file_exists"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("marker");
        tokio::fs::write(&file, b"x").await.unwrap();
        let check = FileExistsCheck { path: file };
        let ctx = ExecutionContext::new(dir.path().to_path_buf(), "job-1");
        assert!(check.run(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn fails_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let check = FileExistsCheck { path: PathBuf::from("missing") };
        let ctx = ExecutionContext::new(dir.path().to_path_buf(), "job-1");
        assert!(check.run(&ctx).await.is_err());
    }
}
