// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! MD5 checksum value object.
//!
//! MD5 is used throughout this system (bundle, backup, state) as an
//! integrity check against accidental corruption, not as a security
//! primitive: files are co-located with a checksum produced by the same
//! builder, never an untrusted third party.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::UpdaterError;

/// A validated, lowercase hex-encoded MD5 digest (32 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum(String);

impl Checksum {
    /// Validates and wraps a hex string. Accepts mixed case, normalizes to
    /// lowercase.
    pub fn from_hex(hex: impl Into<String>) -> Result<Self, UpdaterError> {
        let hex = hex.into();
        if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(UpdaterError::Validation(format!(
                "invalid MD5 checksum: {hex:?}"
            )));
        }
        Ok(Self(hex.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Checksum {
    type Error = UpdaterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(value)
    }
}

impl From<Checksum> for String {
    fn from(value: Checksum) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_md5() {
        let c = Checksum::from_hex("d41d8cd98f00b204e9800998ecf8427e").unwrap();
        assert_eq!(c.as_str(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn normalizes_case() {
        let c = Checksum::from_hex("D41D8CD98F00B204E9800998ECF8427E").unwrap();
        assert_eq!(c.as_str(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Checksum::from_hex("abc").is_err());
    }

    #[test]
    fn rejects_non_hex() {
        assert!(Checksum::from_hex("zz1d8cd98f00b204e9800998ecf8427e").is_err());
    }
}
