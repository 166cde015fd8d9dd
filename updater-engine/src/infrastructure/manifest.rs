// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Manifest Parsing (C1)
//!
//! YAML is the chosen manifest format (spec §6). Unknown top-level keys are
//! ignored by `serde_yaml`'s default behavior; unknown `type` tags on a
//! check or action are a hard parse failure because `CheckDescriptor`/
//! `ActionKind` have no catch-all variant.

use updater_domain::{Manifest, ManifestService, UpdaterError};

pub struct YamlManifestService;

impl YamlManifestService {
    pub fn new() -> Self {
        Self
    }
}

impl Default for YamlManifestService {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestService for YamlManifestService {
    fn parse_manifest(&self, bytes: &[u8]) -> Result<Manifest, UpdaterError> {
        serde_yaml::from_slice(bytes).map_err(|e| UpdaterError::manifest(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
description: test update
date: "2026-01-01"
required_engine_version: "1.0.0"
"#;

    #[test]
    fn parses_minimal_manifest_with_empty_actions() {
        let svc = YamlManifestService::new();
        let m = svc.parse_manifest(MINIMAL.as_bytes()).unwrap();
        assert_eq!(m.description, "test update");
        assert!(m.actions.is_empty());
        assert!(m.pre_checks.is_empty());
    }

    #[test]
    fn rejects_missing_required_engine_version() {
        let svc = YamlManifestService::new();
        let bad = "description: x\ndate: \"2026-01-01\"\n";
        assert!(svc.parse_manifest(bad.as_bytes()).is_err());
    }

    #[test]
    fn rejects_unknown_check_type() {
        let svc = YamlManifestService::new();
        let bad = format!("{MINIMAL}\npre_checks:\n  - type: not_a_real_check\n");
        assert!(svc.parse_manifest(bad.as_bytes()).is_err());
    }

    #[test]
    fn parses_full_action_and_check_sequence() {
        let svc = YamlManifestService::new();
        let doc = format!(
            "{MINIMAL}\npre_checks:\n  - type: disk_space\n    path: /tmp\n    required_mb: 10\nactions:\n  - type: backup\n    sources: [/etc/app.conf]\n  - type: file_copy\n    source: payload/app.conf\n    destination: /etc/app.conf\npost_checks:\n  - type: file_exists\n    path: /etc/app.conf\nrollback:\n  enabled: true\n  auto_rollback_on_failure: true\n"
        );
        let m = svc.parse_manifest(doc.as_bytes()).unwrap();
        assert_eq!(m.actions.len(), 2);
        assert_eq!(m.pre_checks.len(), 1);
        assert!(m.rollback.auto_rollback_on_failure);
    }
}
