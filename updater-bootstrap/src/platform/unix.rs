// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Unix Platform Implementation
//!
//! POSIX implementation backed by `libc` (Linux and macOS).

use super::{Platform, PlatformError};
use async_trait::async_trait;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub struct UnixPlatform;

impl UnixPlatform {
    pub fn new() -> Self {
        Self
    }

    fn get_page_size_impl() -> usize {
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            size as usize
        } else {
            4096
        }
    }

    fn get_cpu_count_impl() -> usize {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }

    /// Reads `/proc/meminfo` for `(total, available)` bytes. Falls back to an
    /// error on platforms without `/proc` (macOS), since `sysinfo` in
    /// `updater-engine` covers host introspection for the job facade.
    fn get_memory_info_impl() -> Result<(u64, u64), PlatformError> {
        let contents = std::fs::read_to_string("/proc/meminfo")
            .map_err(|e| PlatformError::NotSupported(format!("/proc/meminfo unavailable: {e}")))?;
        let mut total = None;
        let mut available = None;
        for line in contents.lines() {
            if let Some(kb) = parse_meminfo_kb(line, "MemTotal:") {
                total = Some(kb * 1024);
            } else if let Some(kb) = parse_meminfo_kb(line, "MemAvailable:") {
                available = Some(kb * 1024);
            }
        }
        match (total, available) {
            (Some(t), Some(a)) => Ok((t, a)),
            _ => Err(PlatformError::Other("MemTotal/MemAvailable not found in /proc/meminfo".into())),
        }
    }

    fn is_elevated_impl() -> bool {
        unsafe { libc::geteuid() == 0 }
    }
}

fn parse_meminfo_kb(line: &str, prefix: &str) -> Option<u64> {
    line.strip_prefix(prefix)?.trim().strip_suffix(" kB")?.trim().parse().ok()
}

impl Default for UnixPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Platform for UnixPlatform {
    fn page_size(&self) -> usize {
        Self::get_page_size_impl()
    }

    fn cpu_count(&self) -> usize {
        Self::get_cpu_count_impl()
    }

    fn total_memory(&self) -> Result<u64, PlatformError> {
        Self::get_memory_info_impl().map(|(total, _)| total)
    }

    fn available_memory(&self) -> Result<u64, PlatformError> {
        Self::get_memory_info_impl().map(|(_, available)| available)
    }

    fn line_separator(&self) -> &'static str {
        "\n"
    }

    fn path_separator(&self) -> char {
        ':'
    }

    fn platform_name(&self) -> &'static str {
        if cfg!(target_os = "macos") {
            "macos"
        } else {
            "linux"
        }
    }

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }

    fn is_elevated(&self) -> bool {
        Self::is_elevated_impl()
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<(), PlatformError> {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
        Ok(())
    }

    fn is_executable(&self, path: &Path) -> bool {
        std::fs::metadata(path).map(|m| m.permissions().mode() & 0o111 != 0).unwrap_or(false)
    }

    async fn sync_file(&self, file: &tokio::fs::File) -> Result<(), PlatformError> {
        file.sync_all().await?;
        Ok(())
    }
}
