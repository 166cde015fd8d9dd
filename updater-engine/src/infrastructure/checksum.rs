// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Checksum Utilities (C1)
//!
//! Streaming MD5 over a file, 4 KiB chunks at a time so memory use is
//! independent of file size. Used consistently across bundle contents,
//! backups, and job state (spec §4.1) — the hash is an integrity check
//! against accidental corruption, never a security boundary.

use async_trait::async_trait;
use md5::{Digest, Md5};
use std::path::Path;
use tokio::io::AsyncReadExt;

use updater_domain::{Checksum, ChecksumService, UpdaterError};

const CHUNK_SIZE: usize = 4096;

pub struct Md5ChecksumService;

impl Md5ChecksumService {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Md5ChecksumService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChecksumService for Md5ChecksumService {
    async fn checksum(&self, path: &Path) -> Result<Checksum, UpdaterError> {
        let mut file = tokio::fs::File::open(path).await.map_err(|e| UpdaterError::Io(format!("opening {}: {e}", path.display())))?;
        let mut hasher = Md5::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = file.read(&mut buf).await.map_err(|e| UpdaterError::Io(format!("reading {}: {e}", path.display())))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Checksum::from_hex(hex::encode(hasher.finalize()))
    }
}

/// Synchronous counterpart used where the caller already holds a blocking
/// thread (e.g. inside `spawn_blocking` archive-walking code).
pub fn checksum_file_blocking(path: &Path) -> Result<Checksum, UpdaterError> {
    use std::io::Read;
    let mut file = std::fs::File::open(path).map_err(|e| UpdaterError::Io(format!("opening {}: {e}", path.display())))?;
    let mut hasher = Md5::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(|e| UpdaterError::Io(format!("reading {}: {e}", path.display())))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Checksum::from_hex(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn checksums_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        tokio::fs::write(&path, b"").await.unwrap();
        let svc = Md5ChecksumService::new();
        let sum = svc.checksum(&path).await.unwrap();
        assert_eq!(sum.as_str(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[tokio::test]
    async fn blocking_and_async_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        tokio::fs::write(&path, b"hello world").await.unwrap();
        let svc = Md5ChecksumService::new();
        let async_sum = svc.checksum(&path).await.unwrap();
        let blocking_sum = checksum_file_blocking(&path).unwrap();
        assert_eq!(async_sum, blocking_sum);
    }

    #[tokio::test]
    async fn verify_detects_bitflip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        tokio::fs::write(&path, b"original content").await.unwrap();
        let svc = Md5ChecksumService::new();
        let original = svc.checksum(&path).await.unwrap();
        tokio::fs::write(&path, b"Original content").await.unwrap();
        assert!(!svc.verify(&path, &original).await.unwrap());
    }
}
