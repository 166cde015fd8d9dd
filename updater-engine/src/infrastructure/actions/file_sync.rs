// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `file_sync` action: directory-tree synchronization with three policies
//! (spec §4.5):
//!
//! - `mirror` — destination becomes an exact copy of source; files present
//!   in the destination but not the source are removed.
//! - `add_only` — files are copied only if they don't already exist at the
//!   destination; existing files are left untouched.
//! - `overwrite_existing` — files are copied only where the destination
//!   already has a same-named entry; new files are never introduced.

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use updater_domain::{ActionExecutor, ExecutionContext, SyncMode, UpdaterError};

pub struct FileSyncAction {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub mode: SyncMode,
}

#[async_trait]
impl ActionExecutor for FileSyncAction {
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let src = ctx.resolve(&self.source);
        let dst = ctx.resolve(&self.destination);
        let mode = self.mode;
        tokio::task::spawn_blocking(move || sync_tree(&src, &dst, mode))
            .await
            .map_err(|e| UpdaterError::Internal(e.to_string()))?
    }

    fn kind(&self) -> &'static str {
        "file_sync"
    }
}

fn sync_tree(src: &Path, dst: &Path, mode: SyncMode) -> Result<(), UpdaterError> {
    fs::create_dir_all(dst).map_err(|e| UpdaterError::Io(e.to_string()))?;

    for entry in WalkDir::new(src).into_iter().filter_map(Result::ok) {
        let relpath = entry.path().strip_prefix(src).unwrap();
        if relpath.as_os_str().is_empty() {
            continue;
        }
        let target = dst.join(relpath);

        if entry.file_type().is_dir() {
            if mode != SyncMode::OverwriteExisting || target.exists() {
                fs::create_dir_all(&target).map_err(|e| UpdaterError::Io(e.to_string()))?;
            }
            continue;
        }

        let should_copy = match mode {
            SyncMode::Mirror => true,
            SyncMode::AddOnly => !target.exists(),
            SyncMode::OverwriteExisting => target.exists(),
        };
        if should_copy {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| UpdaterError::Io(e.to_string()))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| UpdaterError::Io(e.to_string()))?;
        }
    }

    if mode == SyncMode::Mirror {
        prune_extraneous(src, dst)?;
    }
    Ok(())
}

fn prune_extraneous(src: &Path, dst: &Path) -> Result<(), UpdaterError> {
    let mut to_remove = Vec::new();
    for entry in WalkDir::new(dst).contents_first(true).into_iter().filter_map(Result::ok) {
        let relpath = entry.path().strip_prefix(dst).unwrap();
        if relpath.as_os_str().is_empty() {
            continue;
        }
        if !src.join(relpath).exists() {
            to_remove.push(entry.path().to_path_buf());
        }
    }
    for path in to_remove {
        if path.is_dir() {
            let _ = fs::remove_dir(&path);
        } else {
            fs::remove_file(&path).map_err(|e| UpdaterError::Io(e.to_string()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn mirror_removes_extraneous_destination_files() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        write(&src_dir.path().join("keep.txt"), b"keep");
        write(&dst_dir.path().join("stale.txt"), b"stale");

        sync_tree(src_dir.path(), dst_dir.path(), SyncMode::Mirror).unwrap();

        assert!(dst_dir.path().join("keep.txt").exists());
        assert!(!dst_dir.path().join("stale.txt").exists());
    }

    #[test]
    fn add_only_never_overwrites_existing() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        write(&src_dir.path().join("f.txt"), b"new");
        write(&dst_dir.path().join("f.txt"), b"old");

        sync_tree(src_dir.path(), dst_dir.path(), SyncMode::AddOnly).unwrap();

        assert_eq!(fs::read(dst_dir.path().join("f.txt")).unwrap(), b"old");
    }

    #[test]
    fn overwrite_existing_never_introduces_new_files() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        write(&src_dir.path().join("existing.txt"), b"new");
        write(&src_dir.path().join("brand_new.txt"), b"new");
        write(&dst_dir.path().join("existing.txt"), b"old");

        sync_tree(src_dir.path(), dst_dir.path(), SyncMode::OverwriteExisting).unwrap();

        assert_eq!(fs::read(dst_dir.path().join("existing.txt")).unwrap(), b"new");
        assert!(!dst_dir.path().join("brand_new.txt").exists());
    }
}
