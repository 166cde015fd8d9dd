// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Checksum Service Port
//!
//! C1's streaming-hash contract. Reading a file is I/O, so unlike the purely
//! in-memory value objects this is an async port implemented in
//! infrastructure (`updater-engine::infrastructure::checksum`).

use async_trait::async_trait;
use std::path::Path;

use crate::error::UpdaterError;
use crate::value_objects::Checksum;

#[async_trait]
pub trait ChecksumService: Send + Sync {
    /// Streaming MD5 over the file at `path`, read in fixed-size chunks so
    /// memory use is independent of file size.
    async fn checksum(&self, path: &Path) -> Result<Checksum, UpdaterError>;

    async fn verify(&self, path: &Path, expected: &Checksum) -> Result<bool, UpdaterError> {
        Ok(&self.checksum(path).await? == expected)
    }
}
