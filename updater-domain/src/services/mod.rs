// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Stateless domain service ports.

pub mod checksum_service;
pub mod manifest_service;

pub use checksum_service::ChecksumService;
pub use manifest_service::ManifestService;
