// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `file_merge` action: merges two flat `KEY=VALUE` (.env-style) files line
//! by line rather than replacing one with the other wholesale, so
//! operator-customized destination config survives an update that only adds
//! new keys.
//!
//! `KeepExisting` and `MergeKeys` both resolve a conflicting key in favor of
//! the destination's existing value; `OverwriteAll` resolves it in favor of
//! the source's incoming value. All three add keys present only in the
//! source and keep keys present only in the destination.

use async_trait::async_trait;
use std::path::PathBuf;

use updater_domain::{ActionExecutor, ExecutionContext, MergeStrategy, UpdaterError};

pub struct FileMergeAction {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub strategy: MergeStrategy,
}

#[async_trait]
impl ActionExecutor for FileMergeAction {
    async fn run(&self, ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let src = ctx.resolve(&self.source);
        let dst = ctx.resolve(&self.destination);

        let source_bytes = tokio::fs::read(&src).await.map_err(|e| UpdaterError::Io(e.to_string()))?;
        let source_values = parse_env(&String::from_utf8_lossy(&source_bytes));

        let dest_values = match tokio::fs::read(&dst).await {
            Ok(bytes) => parse_env(&String::from_utf8_lossy(&bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(UpdaterError::Io(e.to_string())),
        };

        let merged = merge(source_values, dest_values, self.strategy);

        if let Some(parent) = dst.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| UpdaterError::Io(e.to_string()))?;
        }
        tokio::fs::write(&dst, render_env(&merged)).await.map_err(|e| UpdaterError::Io(e.to_string()))
    }

    fn kind(&self) -> &'static str {
        "file_merge"
    }
}

/// Parses `KEY=VALUE` lines into an ordered list, skipping blank lines and
/// `#`-prefixed comments. A value wrapped in matching single or double
/// quotes has them stripped.
fn parse_env(text: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_string();
        let mut value = value.trim();
        if value.len() >= 2 && ((value.starts_with('"') && value.ends_with('"')) || (value.starts_with('\'') && value.ends_with('\''))) {
            value = &value[1..value.len() - 1];
        }
        entries.push((key, value.to_string()));
    }
    entries
}

/// Quotes any value containing a space or `#` on write, matching the
/// original tool's escaping rule.
fn render_env(entries: &[(String, String)]) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        if value.contains(' ') || value.contains('#') {
            out.push_str(&format!("{key}=\"{value}\"\n"));
        } else {
            out.push_str(&format!("{key}={value}\n"));
        }
    }
    out
}

/// `overwrite_all` takes `source` as the base and lets `dest` fill in keys
/// `source` doesn't have; `keep_existing`/`merge_keys` do the opposite. In
/// both cases the overlay's value wins on a shared key and its new keys are
/// appended in the overlay's order.
fn merge(source: Vec<(String, String)>, dest: Vec<(String, String)>, strategy: MergeStrategy) -> Vec<(String, String)> {
    let (base, overlay) = match strategy {
        MergeStrategy::OverwriteAll => (dest, source),
        MergeStrategy::KeepExisting | MergeStrategy::MergeKeys => (source, dest),
    };
    let mut merged = base;
    for (key, value) in overlay {
        match merged.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => merged.push((key, value)),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_lines_and_skips_comments_and_blanks() {
        let parsed = parse_env("A=1\n# a comment\n\nB=two\n");
        assert_eq!(parsed, vec![("A".to_string(), "1".to_string()), ("B".to_string(), "two".to_string())]);
    }

    #[test]
    fn parse_strips_matching_quotes() {
        let parsed = parse_env("A=\"hello world\"\nB='it is # fine'\n");
        assert_eq!(parsed, vec![("A".to_string(), "hello world".to_string()), ("B".to_string(), "it is # fine".to_string())]);
    }

    #[test]
    fn render_quotes_values_with_space_or_hash() {
        let rendered = render_env(&[("A".to_string(), "plain".to_string()), ("B".to_string(), "has space".to_string()), ("C".to_string(), "has#hash".to_string())]);
        assert_eq!(rendered, "A=plain\nB=\"has space\"\nC=\"has#hash\"\n");
    }

    #[test]
    fn keep_existing_prefers_destination_on_conflict() {
        let source = vec![("a".to_string(), "99".to_string()), ("c".to_string(), "3".to_string())];
        let dest = vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())];
        let merged = merge(source, dest, MergeStrategy::KeepExisting);
        assert_eq!(merged, vec![("a".to_string(), "1".to_string()), ("c".to_string(), "3".to_string()), ("b".to_string(), "2".to_string())]);
    }

    #[test]
    fn overwrite_all_prefers_source_on_conflict() {
        let source = vec![("a".to_string(), "99".to_string()), ("c".to_string(), "3".to_string())];
        let dest = vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())];
        let merged = merge(source, dest, MergeStrategy::OverwriteAll);
        assert_eq!(merged, vec![("a".to_string(), "99".to_string()), ("b".to_string(), "2".to_string()), ("c".to_string(), "3".to_string())]);
    }

    #[test]
    fn merge_keys_behaves_like_keep_existing() {
        let source = vec![("a".to_string(), "2".to_string()), ("b".to_string(), "3".to_string())];
        let dest = vec![("a".to_string(), "1".to_string())];
        assert_eq!(merge(source.clone(), dest.clone(), MergeStrategy::MergeKeys), merge(source, dest, MergeStrategy::KeepExisting));
    }
}
