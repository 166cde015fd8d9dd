// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Updater Domain
//!
//! The core business logic and rules of the offline update orchestrator,
//! independent of filesystem, subprocess, and HTTP concerns. Implements
//! Domain-Driven Design patterns:
//!
//! - **Value objects** (`value_objects`): the manifest schema, `Checksum`,
//!   `EngineVersion`, `JobState`, `BackupEntry` — immutable, self-validating.
//! - **Aggregates** (`aggregates`): `JobAggregate`, the consistency boundary
//!   that owns legal state-machine transitions.
//! - **Domain events** (`events`): what happened, for the progress stream.
//! - **Repository/service ports** (`repositories`, `services`): traits that
//!   infrastructure implements — `StateStore`, `BackupStore`,
//!   `CheckExecutor`, `ActionExecutor`, `ChecksumService`, `ManifestService`.
//! - **Errors** (`error`): the `UpdaterError` taxonomy.

pub mod aggregates;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use aggregates::JobAggregate;
pub use error::UpdaterError;
pub use repositories::{ActionExecutor, BackupStore, CheckExecutor, ExecutionContext, StateStore};
pub use services::{ChecksumService, ManifestService};
pub use value_objects::{
    ActionDescriptor, ActionKind, BackupEntry, BackupMetadata, BackupSource, CheckDescriptor, Checksum, CleanupConfig, EngineVersion, JobState,
    JobStatus, Manifest, MergeStrategy, RollbackConfig, SourceKind, SyncMode,
};
