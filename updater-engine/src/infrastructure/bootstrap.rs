// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap (C7)
//!
//! Runs ahead of every job: extracts the update archive, gates on the
//! manifest's `required_engine_version`, verifies (and if needed falls back
//! to a backup of) the installed engine, then hands off to the driver
//! engine (C6). Lives in `updater-engine` rather than `updater-bootstrap`
//! because it needs `Manifest`/`EngineVersion`/`Checksum` domain types —
//! the ambient `updater-bootstrap` crate carries no dependency on
//! `updater-domain` (see DESIGN.md).

use flate2::read::GzDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tar::Archive;

use updater_domain::{EngineVersion, ManifestService, UpdaterError};

use crate::infrastructure::backup_store::{parse_checksum_file, write_checksum_file};
use crate::infrastructure::checksum::checksum_file_blocking;
use crate::infrastructure::engine::{RunOutcome, UpdateEngine};

/// The version of this compiled binary, gating manifests that declare a
/// higher `required_engine_version`.
pub const CURRENT_ENGINE_VERSION: EngineVersion = EngineVersion { major: 1, minor: 0, patch: 0 };

const ENGINE_DIR: &str = "engine";
const ENGINE_CHECKSUM_FILE: &str = "CHECKSUM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Applied(RunOutcome),
    /// The archive shipped a newer engine; it has been installed and the
    /// caller must restart the process before actions can run (spec §4.7
    /// step 3 — never mix two engine versions in one process).
    EngineUpgradeInstalled { new_version: EngineVersion },
}

pub struct Bootstrapper {
    pub base_dir: PathBuf,
    pub engine: Arc<UpdateEngine>,
    pub manifest_svc: Arc<dyn ManifestService>,
}

impl Bootstrapper {
    pub fn new(base_dir: PathBuf, engine: Arc<UpdateEngine>, manifest_svc: Arc<dyn ManifestService>) -> Self {
        Self { base_dir, engine, manifest_svc }
    }

    pub async fn apply_archive(&self, archive_path: &Path, job_id: String) -> Result<BootstrapOutcome, UpdaterError> {
        let tmp_dir = self.base_dir.join("tmp");
        self.extract(archive_path, &tmp_dir).await?;

        let manifest_bytes = tokio::fs::read(tmp_dir.join("manifest.yml")).await.map_err(|e| UpdaterError::manifest(format!("manifest.yml missing or unreadable: {e}")))?;
        let manifest = self.manifest_svc.parse_manifest(&manifest_bytes)?;

        if !CURRENT_ENGINE_VERSION.satisfies(&manifest.required_engine_version) {
            let new_version = self.upgrade_engine(&tmp_dir).await?;
            return Ok(BootstrapOutcome::EngineUpgradeInstalled { new_version });
        }

        self.verify_or_fallback_engine().await?;

        let outcome = self.engine.apply(&manifest, tmp_dir.clone(), job_id).await?;
        self.cleanup(&tmp_dir).await;
        Ok(BootstrapOutcome::Applied(outcome))
    }

    async fn extract(&self, archive_path: &Path, tmp_dir: &Path) -> Result<(), UpdaterError> {
        if !tokio::fs::try_exists(archive_path).await.unwrap_or(false) {
            return Err(UpdaterError::NotFound(format!("update archive not found: {}", archive_path.display())));
        }
        let tmp_dir = tmp_dir.to_path_buf();
        let archive_path = archive_path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            if tmp_dir.exists() {
                fs::remove_dir_all(&tmp_dir).map_err(|e| UpdaterError::Io(e.to_string()))?;
            }
            fs::create_dir_all(&tmp_dir).map_err(|e| UpdaterError::Io(e.to_string()))?;
            let file = fs::File::open(&archive_path).map_err(|e| UpdaterError::Io(e.to_string()))?;
            let mut archive = Archive::new(GzDecoder::new(file));
            archive.unpack(&tmp_dir).map_err(|e| UpdaterError::action_failed(format!("extracting archive: {e}")))
        })
        .await
        .map_err(|e| UpdaterError::Internal(e.to_string()))?
    }

    async fn upgrade_engine(&self, tmp_dir: &Path) -> Result<EngineVersion, UpdaterError> {
        let new_engine_src = tmp_dir.join("update_engine");
        if !new_engine_src.exists() {
            return Err(UpdaterError::manifest("manifest requires a newer engine but archive has no update_engine/ subtree"));
        }
        let checksums = parse_checksum_file(&new_engine_src.join(ENGINE_CHECKSUM_FILE))?;
        self.verify_checksums(&new_engine_src, &checksums)?;

        let installed_version = self.read_installed_version().unwrap_or(CURRENT_ENGINE_VERSION);
        let backup_dir = self.base_dir.join(format!("engine_backup_{installed_version}"));
        let installed_dir = self.base_dir.join(ENGINE_DIR);

        if installed_dir.exists() {
            if backup_dir.exists() {
                fs::remove_dir_all(&backup_dir).map_err(|e| UpdaterError::Io(e.to_string()))?;
            }
            fs::rename(&installed_dir, &backup_dir).map_err(|e| UpdaterError::Io(e.to_string()))?;
        }
        copy_dir_recursive(&new_engine_src, &installed_dir)?;

        let version_path = installed_dir.join("VERSION");
        let new_version = fs::read_to_string(&version_path).ok().and_then(|s| EngineVersion::parse(s.trim()).ok()).unwrap_or(CURRENT_ENGINE_VERSION);
        Ok(new_version)
    }

    fn read_installed_version(&self) -> Option<EngineVersion> {
        let version_path = self.base_dir.join(ENGINE_DIR).join("VERSION");
        fs::read_to_string(version_path).ok().and_then(|s| EngineVersion::parse(s.trim()).ok())
    }

    async fn verify_or_fallback_engine(&self) -> Result<(), UpdaterError> {
        let installed_dir = self.base_dir.join(ENGINE_DIR);
        if !installed_dir.exists() {
            return Ok(());
        }
        let checksum_path = installed_dir.join(ENGINE_CHECKSUM_FILE);
        if !checksum_path.exists() {
            return Ok(());
        }
        let checksums = parse_checksum_file(&checksum_path)?;
        if self.verify_checksums(&installed_dir, &checksums).is_ok() {
            return Ok(());
        }

        tracing::warn!("installed engine failed integrity verification, searching for a fallback");
        let mut candidates: Vec<PathBuf> = fs::read_dir(&self.base_dir)
            .map_err(|e| UpdaterError::Io(e.to_string()))?
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with("engine_backup_")))
            .collect();
        candidates.sort_by(|a, b| b.cmp(a));

        for candidate in candidates {
            let candidate_checksum = candidate.join(ENGINE_CHECKSUM_FILE);
            if !candidate_checksum.exists() {
                continue;
            }
            let candidate_checksums = parse_checksum_file(&candidate_checksum)?;
            if self.verify_checksums(&candidate, &candidate_checksums).is_ok() {
                fs::remove_dir_all(&installed_dir).map_err(|e| UpdaterError::Io(e.to_string()))?;
                copy_dir_recursive(&candidate, &installed_dir)?;
                return Ok(());
            }
        }

        Err(UpdaterError::integrity("installed engine is corrupt and no verifiable backup engine was found"))
    }

    fn verify_checksums(&self, dir: &Path, checksums: &std::collections::BTreeMap<String, String>) -> Result<(), UpdaterError> {
        for (relpath, expected) in checksums {
            let actual = checksum_file_blocking(&dir.join(relpath))?;
            if actual.as_str() != expected {
                return Err(UpdaterError::integrity(format!("{} failed checksum verification", dir.join(relpath).display())));
            }
        }
        Ok(())
    }

    async fn cleanup(&self, tmp_dir: &Path) {
        let _ = tokio::fs::remove_dir_all(tmp_dir).await;
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), UpdaterError> {
    fs::create_dir_all(dst).map_err(|e| UpdaterError::Io(e.to_string()))?;
    for entry in fs::read_dir(src).map_err(|e| UpdaterError::Io(e.to_string()))? {
        let entry = entry.map_err(|e| UpdaterError::Io(e.to_string()))?;
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| UpdaterError::Io(e.to_string()))?;
        }
    }
    Ok(())
}

/// Regenerates an engine directory's `CHECKSUM` manifest, used by the
/// release-packaging tooling (not part of the runtime gate above, but
/// sharing the same MD5-per-file format).
pub fn write_engine_checksums(engine_dir: &Path) -> Result<(), UpdaterError> {
    use walkdir::WalkDir;
    let mut checksums = std::collections::BTreeMap::new();
    for entry in WalkDir::new(engine_dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let relpath = entry.path().strip_prefix(engine_dir).unwrap().to_string_lossy().replace('\\', "/");
        if relpath == ENGINE_CHECKSUM_FILE {
            continue;
        }
        checksums.insert(relpath, checksum_file_blocking(entry.path())?.to_string());
    }
    write_checksum_file(&engine_dir.join(ENGINE_CHECKSUM_FILE), &checksums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{checksum::Md5ChecksumService, manifest::YamlManifestService, state_store::JsonStateStore};
    use updater_domain::BackupStore;

    struct StubBackupStore;

    #[async_trait::async_trait]
    impl BackupStore for StubBackupStore {
        async fn create(&self, _sources: &[PathBuf], _name: Option<&str>) -> Result<updater_domain::BackupEntry, UpdaterError> {
            unimplemented!()
        }
        async fn restore(&self, _name: &str, _verify: bool) -> Result<(), UpdaterError> {
            Ok(())
        }
        async fn list(&self) -> Result<Vec<updater_domain::BackupEntry>, UpdaterError> {
            Ok(Vec::new())
        }
        async fn cleanup_old(&self, _keep_last_n: u32) -> Result<Vec<String>, UpdaterError> {
            Ok(Vec::new())
        }
        fn backup_dir(&self) -> &Path {
            Path::new("/tmp")
        }
    }

    fn build_engine(base_dir: &Path) -> Arc<UpdateEngine> {
        Arc::new(UpdateEngine::new(
            Arc::new(JsonStateStore::new(base_dir.join("state.json"))),
            Arc::new(StubBackupStore),
            Arc::new(Md5ChecksumService::new()),
            Arc::new(crate::infrastructure::metrics::Metrics::new()),
        ))
    }

    fn make_archive(dir: &Path, manifest_yaml: &str) -> PathBuf {
        let staging = dir.join("staging");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("manifest.yml"), manifest_yaml).unwrap();

        let archive_path = dir.join("update.tar.gz");
        let tar_gz = fs::File::create(&archive_path).unwrap();
        let enc = flate2::write::GzEncoder::new(tar_gz, flate2::Compression::default());
        let mut tar = tar::Builder::new(enc);
        tar.append_dir_all(".", &staging).unwrap();
        tar.finish().unwrap();
        archive_path
    }

    #[tokio::test]
    async fn rejects_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let bootstrapper = Bootstrapper::new(dir.path().to_path_buf(), build_engine(dir.path()), Arc::new(YamlManifestService::new()));
        let result = bootstrapper.apply_archive(&dir.path().join("missing.tar.gz"), "job-1".into()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn applies_manifest_with_satisfied_engine_version() {
        let dir = tempfile::tempdir().unwrap();
        let archive = make_archive(dir.path(), "description: test\ndate: \"2026-01-01\"\nrequired_engine_version: \"1.0.0\"\n");
        let bootstrapper = Bootstrapper::new(dir.path().to_path_buf(), build_engine(dir.path()), Arc::new(YamlManifestService::new()));
        let outcome = bootstrapper.apply_archive(&archive, "job-1".into()).await.unwrap();
        assert_eq!(outcome, BootstrapOutcome::Applied(RunOutcome::Completed));
    }

    #[tokio::test]
    async fn rejects_unsatisfied_version_without_update_engine_subtree() {
        let dir = tempfile::tempdir().unwrap();
        let archive = make_archive(dir.path(), "description: test\ndate: \"2026-01-01\"\nrequired_engine_version: \"99.0.0\"\n");
        let bootstrapper = Bootstrapper::new(dir.path().to_path_buf(), build_engine(dir.path()), Arc::new(YamlManifestService::new()));
        let result = bootstrapper.apply_archive(&archive, "job-1".into()).await;
        assert!(result.is_err());
    }
}
