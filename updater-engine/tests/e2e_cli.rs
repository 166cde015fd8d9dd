// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! End-to-End CLI Tests
//!
//! Drives the real `updater` binary the way an operator would: build an
//! update archive on disk, invoke subcommands as separate processes against
//! a scratch base directory, and assert on exit status and stdout. No
//! in-process shortcuts — if the CLI wiring in `main.rs` is wrong, these
//! catch it where the unit tests (which call `Bootstrapper`/`UpdateEngine`
//! directly) cannot.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn updater_bin() -> &'static str {
    env!("CARGO_BIN_EXE_updater")
}

fn run(base_dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(updater_bin())
        .arg("--base-dir")
        .arg(base_dir)
        .args(args)
        .output()
        .expect("failed to run updater binary")
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

#[test]
fn validate_manifest_accepts_a_well_formed_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("manifest.yml");
    fs::write(&manifest_path, "description: test\ndate: \"2026-01-01\"\nrequired_engine_version: \"1.0.0\"\n").unwrap();

    let output = run(dir.path(), &["validate-manifest", manifest_path.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("manifest is valid"));
}

#[test]
fn validate_manifest_rejects_an_unknown_check_type() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("manifest.yml");
    fs::write(
        &manifest_path,
        "description: test\ndate: \"2026-01-01\"\nrequired_engine_version: \"1.0.0\"\npre_checks:\n  - type: not_a_real_check\n",
    )
    .unwrap();

    let output = run(dir.path(), &["validate-manifest", manifest_path.to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn apply_runs_a_full_update_then_status_and_list_backups_reflect_it() {
    let dir = tempfile::tempdir().unwrap();
    let work_file = dir.path().join("marker.txt");
    let manifest = format!(
        "description: integration update\ndate: \"2026-01-01\"\nrequired_engine_version: \"1.0.0\"\nactions:\n  - type: command\n    command: \"touch {}\"\n",
        work_file.display()
    );
    let archive = make_archive(dir.path(), &manifest);

    let apply_output = run(dir.path(), &["apply", archive.to_str().unwrap()]);
    assert!(apply_output.status.success(), "stderr: {}", String::from_utf8_lossy(&apply_output.stderr));
    assert!(work_file.exists(), "apply did not run the command action");

    let status_output = run(dir.path(), &["status"]);
    assert!(status_output.status.success(), "stderr: {}", String::from_utf8_lossy(&status_output.stderr));
    let status_json = String::from_utf8_lossy(&status_output.stdout);
    assert!(status_json.contains("\"completed\""), "status output: {status_json}");

    let backups_output = run(dir.path(), &["list-backups"]);
    assert!(backups_output.status.success());
    assert!(String::from_utf8_lossy(&backups_output.stdout).trim_start().starts_with('['));
}

#[test]
fn apply_rejects_a_manifest_requiring_an_unreachable_engine_version_without_an_upgrade_subtree() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = "description: too new\ndate: \"2026-01-01\"\nrequired_engine_version: \"99.0.0\"\n";
    let archive = make_archive(dir.path(), manifest);

    let output = run(dir.path(), &["apply", archive.to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn system_info_prints_a_json_object_with_host_fields() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["system-info"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hostname"));
    assert!(stdout.contains("disk_total_mb"));
}

#[test]
fn resume_with_no_prior_job_fails_instead_of_fabricating_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["resume"]);
    assert!(!output.status.success());
}
