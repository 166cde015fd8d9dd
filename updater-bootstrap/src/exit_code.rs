// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Codes
//!
//! Per spec: `0` on success, `1` on any failure path (extraction, version
//! gate, action, post-check, rollback). Kept as a thin enum rather than a
//! bare `u8` so call sites read as intent, not a magic number.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Failure,
}

impl ExitCode {
    pub fn as_u8(self) -> u8 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Failure => 1,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_u8())
    }
}

pub fn map_error_to_exit_code<E>(_err: &E) -> ExitCode {
    ExitCode::Failure
}

/// Converts an application `Result` into a process exit code, logging the
/// error before doing so.
pub fn result_to_exit_code<T, E: std::fmt::Display>(result: Result<T, E>) -> std::process::ExitCode {
    match result {
        Ok(_) => ExitCode::Success.into(),
        Err(e) => {
            tracing::error!("{e}");
            map_error_to_exit_code(&e).into()
        }
    }
}
