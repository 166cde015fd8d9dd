// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `file_copy` action: copies a single file from the package payload to its
//! destination. When an expected checksum is given, `src` is verified
//! before the copy (so a corrupt payload is caught before it ever reaches
//! the destination) and `dst` is re-verified after.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use updater_domain::{ActionExecutor, Checksum, ChecksumService, ExecutionContext, UpdaterError};

pub struct FileCopyAction {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub checksum: Option<String>,
    pub checksum_svc: Arc<dyn ChecksumService>,
}

#[async_trait]
impl ActionExecutor for FileCopyAction {
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let src = ctx.resolve(&self.source);
        let dst = ctx.resolve(&self.destination);

        let expected = self.checksum.as_ref().map(|hex| Checksum::from_hex(hex.clone())).transpose()?;
        if let Some(expected) = &expected {
            if !self.checksum_svc.verify(&src, expected).await? {
                return Err(UpdaterError::integrity(format!("file_copy: source {} failed checksum verification", src.display())));
            }
        }

        if let Some(parent) = dst.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| UpdaterError::Io(e.to_string()))?;
        }
        tokio::fs::copy(&src, &dst).await.map_err(|e| UpdaterError::action_failed(format!("file_copy: {} -> {}: {e}", src.display(), dst.display())))?;

        if let Some(expected) = &expected {
            if !self.checksum_svc.verify(&dst, expected).await? {
                return Err(UpdaterError::integrity(format!("file_copy: destination {} failed checksum verification", dst.display())));
            }
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "file_copy"
    }
}
