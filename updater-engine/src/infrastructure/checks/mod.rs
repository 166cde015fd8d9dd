// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Precondition/postcondition predicates (C4). `build` maps a parsed
//! `CheckDescriptor` onto the concrete executor that knows how to run it;
//! the driver engine never matches on the descriptor itself.

mod command;
mod disk_space;
mod docker;
mod file_exists;
mod http_check;
mod service_running;

use std::sync::Arc;

use updater_domain::{CheckDescriptor, CheckExecutor};

pub use command::CommandCheck;
pub use disk_space::DiskSpaceCheck;
pub use docker::{DockerHealthCheck, DockerRunningCheck};
pub use file_exists::FileExistsCheck;
pub use http_check::HttpCheck;
pub use service_running::ServiceRunningCheck;

pub fn build(descriptor: &CheckDescriptor) -> Arc<dyn CheckExecutor> {
    match descriptor.clone() {
        CheckDescriptor::DiskSpace { path, required_mb } => Arc::new(DiskSpaceCheck { path, required_mb }),
        CheckDescriptor::DockerRunning {} => Arc::new(DockerRunningCheck),
        CheckDescriptor::FileExists { path } => Arc::new(FileExistsCheck { path }),
        CheckDescriptor::DockerHealth { container_name, container_id } => Arc::new(DockerHealthCheck { container_name, container_id }),
        CheckDescriptor::HttpCheck { url, expected_status, retries, delay_secs, timeout_secs } => {
            Arc::new(HttpCheck { url, expected_status, retries, delay_secs, timeout_secs })
        }
        CheckDescriptor::ServiceRunning { service_name } => Arc::new(ServiceRunningCheck { service_name }),
        CheckDescriptor::Command { command, timeout_secs } => Arc::new(CommandCheck { command, timeout_secs }),
    }
}
