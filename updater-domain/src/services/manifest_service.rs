// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Manifest Service Port
//!
//! C1's `parse_manifest` contract, kept as a port so the domain names the
//! operation without committing to a serialization format (YAML today).

use crate::error::UpdaterError;
use crate::value_objects::Manifest;

pub trait ManifestService: Send + Sync {
    fn parse_manifest(&self, bytes: &[u8]) -> Result<Manifest, UpdaterError>;
}
