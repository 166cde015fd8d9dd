// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Security Validation Layer
//!
//! Runs after clap parsing, before any argument reaches application code.
//! Canonicalizes paths (rejecting traversal outside what the operator typed)
//! and rejects shell metacharacters in free-form strings, since several
//! manifest/action fields end up composed into subprocess invocations.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid value for --{arg}: {reason}")]
    InvalidValue { arg: String, reason: String },

    #[error("argument contains disallowed characters: {0}")]
    DisallowedCharacters(String),
}

/// Shell metacharacters that have no business appearing in a path or
/// identifier-like CLI argument.
const DANGEROUS_CHARS: &[char] = &[';', '|', '&', '$', '`', '\n', '\0'];

pub struct SecureArgParser;

impl SecureArgParser {
    /// Validates a path argument that is expected to already exist, and
    /// returns its canonical (symlink-resolved, absolute) form.
    pub fn validate_path(raw: &str) -> Result<PathBuf, ParseError> {
        Self::validate_argument(raw)?;
        let path = Path::new(raw);
        path.canonicalize().map_err(|_| ParseError::PathNotFound(raw.to_string()))
    }

    /// Validates a free-form argument (including paths that may not exist
    /// yet) against dangerous-character injection, without requiring
    /// existence.
    pub fn validate_argument(raw: &str) -> Result<(), ParseError> {
        if raw.is_empty() {
            return Err(ParseError::InvalidValue { arg: "argument".to_string(), reason: "must not be empty".to_string() });
        }
        if let Some(c) = raw.chars().find(|c| DANGEROUS_CHARS.contains(c)) {
            return Err(ParseError::DisallowedCharacters(format!("{raw:?} contains {c:?}")));
        }
        if raw.contains("..") {
            return Err(ParseError::InvalidPath { path: raw.to_string(), reason: "parent-directory traversal (..) is not allowed".to_string() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert!(SecureArgParser::validate_argument("").is_err());
    }

    #[test]
    fn rejects_traversal() {
        assert!(SecureArgParser::validate_argument("../../etc/passwd").is_err());
    }

    #[test]
    fn rejects_shell_metacharacters() {
        assert!(SecureArgParser::validate_argument("foo; rm -rf /").is_err());
        assert!(SecureArgParser::validate_argument("$(whoami)").is_err());
    }

    #[test]
    fn accepts_plain_identifier() {
        assert!(SecureArgParser::validate_argument("manifest.yml").is_ok());
    }

    #[test]
    fn validate_path_requires_existence() {
        assert!(SecureArgParser::validate_path("/definitely/not/a/real/path/xyz").is_err());
    }
}
