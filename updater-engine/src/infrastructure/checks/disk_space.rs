// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `disk_space` precheck: the filesystem backing `path` must have at least
//! `required_mb` free. `path` is created if it doesn't exist yet, so a
//! not-yet-provisioned target directory can still be sized before anything
//! is written into it.

use async_trait::async_trait;
use std::path::PathBuf;
use sysinfo::Disks;

use updater_domain::{CheckExecutor, ExecutionContext, UpdaterError};

pub struct DiskSpaceCheck {
    pub path: PathBuf,
    pub required_mb: u64,
}

#[async_trait]
impl CheckExecutor for DiskSpaceCheck {
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let target = ctx.resolve(&self.path);
        tokio::fs::create_dir_all(&target).await.map_err(|e| UpdaterError::Io(e.to_string()))?;
        let disks = Disks::new_with_refreshed_list();
        let mount = disks
            .list()
            .iter()
            .filter(|d| target.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len())
            .ok_or_else(|| UpdaterError::check_failed(format!("no filesystem found for {}", target.display())))?;

        let available_mb = mount.available_space() / (1024 * 1024);
        if available_mb < self.required_mb {
            return Err(UpdaterError::check_failed(format!(
                "disk_space: {} has {available_mb} MB free, needs {}",
                target.display(),
                self.required_mb
            )));
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "disk_space"
    }
}
