// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Action Executor Port
//!
//! Contract for C5: a typed mutating operation. `continue_on_error` is
//! handled by the engine (C6), not by individual executors — an executor
//! always reports its true outcome.

use async_trait::async_trait;

use crate::error::UpdaterError;
use crate::repositories::execution_context::ExecutionContext;

#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError>;

    /// The manifest `type` tag this executor handles, e.g. `"file_copy"`.
    fn kind(&self) -> &'static str;
}
