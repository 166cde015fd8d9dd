// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Filesystem Backup Store (C3)
//!
//! Sequentially named snapshot directories (`backup_NNN/`) with a
//! `metadata.json` sidecar, a `CHECKSUM` manifest, and a `latest` symlink
//! (spec §4.3). All filesystem-heavy work (walking, copying, hashing) runs
//! on a blocking thread via `spawn_blocking`, mirroring the teacher's
//! pattern of keeping the async surface thin over blocking I/O primitives.

use async_trait::async_trait;
use md5::{Digest, Md5};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use updater_domain::{BackupEntry, BackupMetadata, BackupSource, BackupStore, SourceKind, UpdaterError};

const METADATA_FILE: &str = "metadata.json";
const CHECKSUM_FILE: &str = "CHECKSUM";
const LATEST_LINK: &str = "latest";

#[derive(Clone)]
pub struct FsBackupStore {
    backup_dir: PathBuf,
}

impl FsBackupStore {
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self { backup_dir: backup_dir.into() }
    }

    fn next_name(&self) -> Result<String, UpdaterError> {
        let mut max_index = 0u32;
        if self.backup_dir.exists() {
            for entry in fs::read_dir(&self.backup_dir).map_err(|e| UpdaterError::Io(e.to_string()))? {
                let entry = entry.map_err(|e| UpdaterError::Io(e.to_string()))?;
                if let Some(name) = entry.file_name().to_str() {
                    if let Some(idx) = BackupEntry::parse_index(name) {
                        max_index = max_index.max(idx);
                    }
                }
            }
        }
        Ok(BackupEntry::format_name(max_index + 1))
    }

    fn resolve_entry_dir(&self, name: &str) -> Result<PathBuf, UpdaterError> {
        if name == LATEST_LINK {
            let link = self.backup_dir.join(LATEST_LINK);
            fs::read_link(&link)
                .map(|target| if target.is_absolute() { target } else { self.backup_dir.join(target) })
                .map_err(|e| UpdaterError::NotFound(format!("no 'latest' backup pointer: {e}")))
        } else {
            let dir = self.backup_dir.join(name);
            if !dir.exists() {
                return Err(UpdaterError::NotFound(format!("backup {name} does not exist")));
            }
            Ok(dir)
        }
    }

    fn load_metadata(entry_dir: &Path) -> Result<BackupMetadata, UpdaterError> {
        let bytes = fs::read(entry_dir.join(METADATA_FILE)).map_err(|e| UpdaterError::Io(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| UpdaterError::Serialization(e.to_string()))
    }

    fn create_blocking(&self, sources: &[PathBuf], name: Option<&str>) -> Result<BackupEntry, UpdaterError> {
        for src in sources {
            if !src.exists() {
                return Err(UpdaterError::NotFound(format!("backup source missing: {}", src.display())));
            }
        }

        let name = match name {
            Some(n) => n.to_string(),
            None => self.next_name()?,
        };
        let entry_dir = self.backup_dir.join(&name);
        fs::create_dir_all(&entry_dir).map_err(|e| UpdaterError::Io(e.to_string()))?;

        let mut backup_sources = Vec::new();
        for src in sources {
            let file_name = src.file_name().ok_or_else(|| UpdaterError::Validation(format!("source has no file name: {}", src.display())))?;
            let backup_relpath = PathBuf::from(file_name);
            copy_tree(src, &entry_dir.join(&backup_relpath))?;
            let kind = if src.is_dir() { SourceKind::Directory } else { SourceKind::File };
            backup_sources.push(BackupSource { original_path: src.clone(), backup_relpath, kind });
        }

        let checksums = write_checksums(&entry_dir)?;
        let created_at = chrono::Utc::now();
        let metadata = BackupMetadata { created_at, sources: backup_sources.clone(), checksums };
        let metadata_bytes = serde_json::to_vec_pretty(&metadata).map_err(|e| UpdaterError::Serialization(e.to_string()))?;
        fs::write(entry_dir.join(METADATA_FILE), metadata_bytes).map_err(|e| UpdaterError::Io(e.to_string()))?;

        update_latest_pointer(&self.backup_dir, &name)?;

        Ok(BackupEntry { name, path: entry_dir, created_at, sources: backup_sources })
    }

    fn restore_blocking(&self, name: &str, verify: bool) -> Result<(), UpdaterError> {
        let entry_dir = self.resolve_entry_dir(name)?;
        let metadata = Self::load_metadata(&entry_dir)?;

        if verify {
            for (relpath, expected) in &metadata.checksums {
                let actual = checksum_file(&entry_dir.join(relpath))?;
                if &actual != expected {
                    return Err(UpdaterError::integrity(format!("backup {name} file {relpath} failed verification")));
                }
            }
        }

        for source in &metadata.sources {
            remove_path(&source.original_path)?;
            copy_tree(&entry_dir.join(&source.backup_relpath), &source.original_path)?;
        }
        Ok(())
    }

    fn list_blocking(&self) -> Result<Vec<BackupEntry>, UpdaterError> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.backup_dir).map_err(|e| UpdaterError::Io(e.to_string()))? {
            let entry = entry.map_err(|e| UpdaterError::Io(e.to_string()))?;
            if let Some(name) = entry.file_name().to_str() {
                if BackupEntry::parse_index(name).is_some() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        let mut entries = Vec::new();
        for name in names {
            let entry_dir = self.backup_dir.join(&name);
            let metadata = Self::load_metadata(&entry_dir)?;
            entries.push(BackupEntry { name, path: entry_dir, created_at: metadata.created_at, sources: metadata.sources });
        }
        Ok(entries)
    }

    fn cleanup_old_blocking(&self, keep_last_n: u32) -> Result<Vec<String>, UpdaterError> {
        if keep_last_n == 0 {
            return Ok(Vec::new());
        }
        let mut entries = self.list_blocking()?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut removed = Vec::new();
        for entry in entries.into_iter().skip(keep_last_n as usize) {
            fs::remove_dir_all(&entry.path).map_err(|e| UpdaterError::Io(e.to_string()))?;
            removed.push(entry.name);
        }
        Ok(removed)
    }
}

fn checksum_file(path: &Path) -> Result<String, UpdaterError> {
    use std::io::Read;
    let mut file = fs::File::open(path).map_err(|e| UpdaterError::Io(e.to_string()))?;
    let mut hasher = Md5::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = file.read(&mut buf).map_err(|e| UpdaterError::Io(e.to_string()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Copies a file or directory tree, preserving symlinks as symlinks.
fn copy_tree(src: &Path, dst: &Path) -> Result<(), UpdaterError> {
    if src.is_symlink() {
        let target = fs::read_link(src).map_err(|e| UpdaterError::Io(e.to_string()))?;
        symlink(&target, dst)?;
        return Ok(());
    }
    if src.is_dir() {
        fs::create_dir_all(dst).map_err(|e| UpdaterError::Io(e.to_string()))?;
        for entry in fs::read_dir(src).map_err(|e| UpdaterError::Io(e.to_string()))? {
            let entry = entry.map_err(|e| UpdaterError::Io(e.to_string()))?;
            copy_tree(&entry.path(), &dst.join(entry.file_name()))?;
        }
        if let Ok(meta) = fs::metadata(src) {
            let _ = fs::set_permissions(dst, meta.permissions());
        }
    } else {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).map_err(|e| UpdaterError::Io(e.to_string()))?;
        }
        fs::copy(src, dst).map_err(|e| UpdaterError::Io(format!("copying {} to {}: {e}", src.display(), dst.display())))?;
    }
    Ok(())
}

fn remove_path(path: &Path) -> Result<(), UpdaterError> {
    if !path.exists() && !path.is_symlink() {
        return Ok(());
    }
    if path.is_dir() && !path.is_symlink() {
        fs::remove_dir_all(path).map_err(|e| UpdaterError::Io(e.to_string()))
    } else {
        fs::remove_file(path).map_err(|e| UpdaterError::Io(e.to_string()))
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> Result<(), UpdaterError> {
    std::os::unix::fs::symlink(target, link).map_err(|e| UpdaterError::Io(e.to_string()))
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> Result<(), UpdaterError> {
    let result = if target.is_dir() { std::os::windows::fs::symlink_dir(target, link) } else { std::os::windows::fs::symlink_file(target, link) };
    result.map_err(|e| UpdaterError::Io(e.to_string()))
}

fn update_latest_pointer(backup_dir: &Path, name: &str) -> Result<(), UpdaterError> {
    let link = backup_dir.join(LATEST_LINK);
    remove_path(&link)?;
    symlink(Path::new(name), &link)
}

fn write_checksums(entry_dir: &Path) -> Result<BTreeMap<String, String>, UpdaterError> {
    let mut checksums = BTreeMap::new();
    for entry in WalkDir::new(entry_dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let relpath = entry.path().strip_prefix(entry_dir).unwrap().to_string_lossy().replace('\\', "/");
        if relpath == METADATA_FILE || relpath == CHECKSUM_FILE {
            continue;
        }
        checksums.insert(relpath, checksum_file(entry.path())?);
    }

    let mut checksum_file_contents = String::new();
    for (relpath, md5) in &checksums {
        checksum_file_contents.push_str(&format!("{md5}  {relpath}\n"));
    }
    fs::write(entry_dir.join(CHECKSUM_FILE), checksum_file_contents).map_err(|e| UpdaterError::Io(e.to_string()))?;
    Ok(checksums)
}

#[async_trait]
impl BackupStore for FsBackupStore {
    async fn create(&self, sources: &[PathBuf], name: Option<&str>) -> Result<BackupEntry, UpdaterError> {
        let store = self.clone();
        let sources = sources.to_vec();
        let name = name.map(|n| n.to_string());
        tokio::task::spawn_blocking(move || store.create_blocking(&sources, name.as_deref())).await.map_err(|e| UpdaterError::Internal(e.to_string()))?
    }

    async fn restore(&self, name: &str, verify: bool) -> Result<(), UpdaterError> {
        let store = self.clone();
        let name = name.to_string();
        tokio::task::spawn_blocking(move || store.restore_blocking(&name, verify)).await.map_err(|e| UpdaterError::Internal(e.to_string()))?
    }

    async fn list(&self) -> Result<Vec<BackupEntry>, UpdaterError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.list_blocking()).await.map_err(|e| UpdaterError::Internal(e.to_string()))?
    }

    async fn cleanup_old(&self, keep_last_n: u32) -> Result<Vec<String>, UpdaterError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.cleanup_old_blocking(keep_last_n)).await.map_err(|e| UpdaterError::Internal(e.to_string()))?
    }

    fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }
}

/// Parses a `CHECKSUM` file's `<md5>  <relpath>` lines, used by integrity
/// checks that don't need the full metadata (e.g. engine verification, C7).
pub fn parse_checksum_file(path: &Path) -> Result<BTreeMap<String, String>, UpdaterError> {
    let file = fs::File::open(path).map_err(|e| UpdaterError::Io(e.to_string()))?;
    let mut out = BTreeMap::new();
    for line in std::io::BufReader::new(file).lines() {
        let line = line.map_err(|e| UpdaterError::Io(e.to_string()))?;
        if let Some((md5, relpath)) = line.split_once("  ") {
            out.insert(relpath.to_string(), md5.to_string());
        }
    }
    Ok(out)
}

/// Writes a `<md5>  <relpath>` checksum file, used by the bootstrap engine
/// verifier independently of a full backup entry.
pub fn write_checksum_file(path: &Path, checksums: &BTreeMap<String, String>) -> Result<(), UpdaterError> {
    let mut out = String::new();
    for (relpath, md5) in checksums {
        out.push_str(&format!("{md5}  {relpath}\n"));
    }
    let mut file = fs::File::create(path).map_err(|e| UpdaterError::Io(e.to_string()))?;
    file.write_all(out.as_bytes()).map_err(|e| UpdaterError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(path: &Path, contents: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn backup_names_increase_monotonically_and_latest_tracks_max() {
        let dir = tempfile::tempdir().unwrap();
        let src_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("app.conf");
        write_file(&src, b"v1");

        let store = FsBackupStore::new(dir.path().join("backups"));
        let e1 = store.create(&[src.clone()], None).await.unwrap();
        assert_eq!(e1.name, "backup_001");
        let e2 = store.create(&[src.clone()], None).await.unwrap();
        assert_eq!(e2.name, "backup_002");

        let latest = fs::read_link(dir.path().join("backups").join("latest")).unwrap();
        assert_eq!(latest, PathBuf::from("backup_002"));
    }

    #[tokio::test]
    async fn create_fails_fast_on_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBackupStore::new(dir.path().join("backups"));
        let missing = dir.path().join("does-not-exist");
        assert!(store.create(&[missing], None).await.is_err());
    }

    #[tokio::test]
    async fn restore_with_verify_fails_after_bitflip_and_leaves_original_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let src_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("app.conf");
        write_file(&src, b"original bytes");

        let store = FsBackupStore::new(dir.path().join("backups"));
        let entry = store.create(&[src.clone()], None).await.unwrap();

        let backed_up_file = entry.path.join("app.conf");
        let mut bytes = fs::read(&backed_up_file).unwrap();
        bytes[0] ^= 0xFF;
        fs::write(&backed_up_file, &bytes).unwrap();

        write_file(&src, b"modified after backup");
        let result = store.restore(&entry.name, true).await;
        assert!(result.is_err());
        assert_eq!(fs::read(&src).unwrap(), b"modified after backup");
    }

    #[tokio::test]
    async fn restore_latest_replaces_original() {
        let dir = tempfile::tempdir().unwrap();
        let src_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("app.conf");
        write_file(&src, b"original");

        let store = FsBackupStore::new(dir.path().join("backups"));
        store.create(&[src.clone()], None).await.unwrap();
        write_file(&src, b"changed");

        store.restore("latest", true).await.unwrap();
        assert_eq!(fs::read(&src).unwrap(), b"original");
    }

    #[tokio::test]
    async fn cleanup_old_keeps_most_recent_n() {
        let dir = tempfile::tempdir().unwrap();
        let src_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("app.conf");
        write_file(&src, b"v");

        let store = FsBackupStore::new(dir.path().join("backups"));
        for _ in 0..4 {
            store.create(&[src.clone()], None).await.unwrap();
        }
        let removed = store.cleanup_old(2).await.unwrap();
        assert_eq!(removed.len(), 2);
        let remaining = store.list().await.unwrap();
        assert_eq!(remaining.len(), 2);
    }

    #[tokio::test]
    async fn cleanup_old_is_noop_when_keep_zero() {
        let dir = tempfile::tempdir().unwrap();
        let src_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("app.conf");
        write_file(&src, b"v");

        let store = FsBackupStore::new(dir.path().join("backups"));
        store.create(&[src.clone()], None).await.unwrap();
        let removed = store.cleanup_old(0).await.unwrap();
        assert!(removed.is_empty());
    }
}
