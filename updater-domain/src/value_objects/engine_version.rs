// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Engine semantic version: `(major, minor, patch)`, parsed from the
//! manifest's `required_engine_version` field and compared against the
//! running engine's compiled-in version during the bootstrap gate (C7).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::UpdaterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EngineVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl EngineVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    pub fn parse(s: &str) -> Result<Self, UpdaterError> {
        let v = semver::Version::parse(s.trim())
            .map_err(|e| UpdaterError::Validation(format!("invalid engine version {s:?}: {e}")))?;
        Ok(Self::new(v.major, v.minor, v.patch))
    }

    /// -1 / 0 / 1, matching spec's `compare(a, b)` contract.
    pub fn compare(&self, other: &Self) -> i32 {
        match self.cmp(other) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    pub fn satisfies(&self, required: &Self) -> bool {
        self >= required
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for EngineVersion {
    type Err = UpdaterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EngineVersion {
    type Error = UpdaterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EngineVersion> for String {
    fn from(value: EngineVersion) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_semver_triple() {
        let v = EngineVersion::parse("1.2.3").unwrap();
        assert_eq!(v, EngineVersion::new(1, 2, 3));
    }

    #[test]
    fn orders_correctly() {
        let a = EngineVersion::new(1, 0, 0);
        let b = EngineVersion::new(1, 1, 0);
        assert_eq!(a.compare(&b), -1);
        assert_eq!(b.compare(&a), 1);
        assert_eq!(a.compare(&a), 0);
    }

    #[test]
    fn satisfies_gate() {
        let installed = EngineVersion::new(1, 1, 0);
        let required = EngineVersion::new(1, 0, 0);
        assert!(installed.satisfies(&required));
        assert!(!required.satisfies(&installed));
    }

    #[test]
    fn rejects_malformed() {
        assert!(EngineVersion::parse("not-a-version").is_err());
    }
}
