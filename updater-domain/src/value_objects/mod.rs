// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Immutable, self-validating value objects: the manifest schema, checksum
//! and engine-version wrappers, job state, and backup entries.

pub mod backup_entry;
pub mod checksum;
pub mod engine_version;
pub mod job_state;
pub mod manifest;

pub use backup_entry::{BackupEntry, BackupMetadata, BackupSource, SourceKind};
pub use checksum::Checksum;
pub use engine_version::EngineVersion;
pub use job_state::{JobState, JobStatus};
pub use manifest::{ActionDescriptor, ActionKind, CheckDescriptor, CleanupConfig, Manifest, MergeStrategy, RollbackConfig, SyncMode};
