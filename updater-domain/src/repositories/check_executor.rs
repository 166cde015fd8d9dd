// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Check Executor Port
//!
//! Contract for C4: a typed, side-effect-free (aside from network GETs and
//! subprocess exits) predicate. A failure returns a structured
//! `UpdaterError::Check` naming the check kind and what was observed.

use async_trait::async_trait;

use crate::error::UpdaterError;
use crate::repositories::execution_context::ExecutionContext;

#[async_trait]
pub trait CheckExecutor: Send + Sync {
    /// Runs the predicate; `Ok(())` means it passed.
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError>;

    /// The manifest `type` tag this executor handles, e.g. `"disk_space"`.
    fn kind(&self) -> &'static str;
}
