// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `system_info()` façade operation (spec §6): host facts an operator
//! checks before approving an update — hostname, disk headroom, memory,
//! and uptime.

use serde::Serialize;
use sysinfo::{Disks, System};

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub disk_available_mb: u64,
    pub disk_total_mb: u64,
    pub memory_available_mb: u64,
    pub memory_total_mb: u64,
    pub boot_time_unix_secs: u64,
}

pub fn system_info() -> SystemInfo {
    let mut sys = System::new_all();
    sys.refresh_all();
    let disks = Disks::new_with_refreshed_list();

    let (disk_available, disk_total) = disks.list().iter().fold((0u64, 0u64), |(avail, total), d| (avail + d.available_space(), total + d.total_space()));

    SystemInfo {
        hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
        disk_available_mb: disk_available / (1024 * 1024),
        disk_total_mb: disk_total / (1024 * 1024),
        memory_available_mb: sys.available_memory() / (1024 * 1024),
        memory_total_mb: sys.total_memory() / (1024 * 1024),
        boot_time_unix_secs: System::boot_time(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_nonzero_memory() {
        let info = system_info();
        assert!(info.memory_total_mb > 0);
    }
}
