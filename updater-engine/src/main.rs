// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # `updater` Binary
//!
//! Wires `updater-bootstrap`'s CLI parsing and platform/shutdown concerns to
//! the application and infrastructure layers below, then dispatches on the
//! validated command: `serve` runs the HTTP façade (C8) until a shutdown
//! signal; every other command is a one-shot operation that exits as soon
//! as it completes.

mod application;
mod infrastructure;
mod presentation;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use updater_bootstrap::config::BootstrapConfig;
use updater_bootstrap::shutdown::ShutdownCoordinator;
use updater_bootstrap::{bootstrap_cli, result_to_exit_code, signals, ValidatedCommand};

use updater_domain::{BackupStore, ManifestService, UpdaterError};

use application::services::job_manager::JobManager;
use application::services::progress::ProgressService;
use application::use_cases::{apply_update, list_backups, resume_update, rollback_update, show_status, system_info, validate_manifest};
use infrastructure::backup_store::FsBackupStore;
use infrastructure::bootstrap::Bootstrapper;
use infrastructure::checksum::Md5ChecksumService;
use infrastructure::config::EngineConfig;
use infrastructure::engine::UpdateEngine;
use infrastructure::manifest::YamlManifestService;
use infrastructure::metrics::Metrics;
use infrastructure::state_store::JsonStateStore;
use presentation::http;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let validated = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("argument error: {e}");
            return std::process::ExitCode::from(65);
        }
    };

    let bootstrap_config = BootstrapConfig::resolve(validated.base_dir.clone(), validated.verbose);
    infrastructure::logging::init(&bootstrap_config.log_level);

    result_to_exit_code(run(validated.command, bootstrap_config.base_dir, bootstrap_config.log_level).await)
}

async fn run(command: ValidatedCommand, base_dir: PathBuf, log_level: String) -> Result<(), UpdaterError> {
    let config = EngineConfig::resolve(&base_dir, &log_level).await?;
    tokio::fs::create_dir_all(&config.state_dir).await.map_err(UpdaterError::from)?;
    tokio::fs::create_dir_all(&config.backup_dir).await.map_err(UpdaterError::from)?;

    let state_store = Arc::new(JsonStateStore::new(config.state_file()));
    let backup_store: Arc<dyn BackupStore> = Arc::new(FsBackupStore::new(config.backup_dir.clone()));
    let checksum_svc = Arc::new(Md5ChecksumService::new());
    let manifest_svc: Arc<dyn ManifestService> = Arc::new(YamlManifestService::new());
    let metrics = Arc::new(Metrics::new());
    let engine = Arc::new(UpdateEngine::new(state_store.clone(), backup_store.clone(), checksum_svc.clone(), metrics.clone()));
    let bootstrapper = Bootstrapper::new(base_dir.clone(), engine.clone(), manifest_svc.clone());

    match command {
        ValidatedCommand::Serve { addr } => serve(addr, base_dir, config, engine, manifest_svc, backup_store, metrics).await,
        ValidatedCommand::Apply { archive } => {
            let outcome = apply_update::apply_update(&bootstrapper, &archive).await?;
            tracing::info!("apply finished: {outcome:?}");
            Ok(())
        }
        ValidatedCommand::Resume => {
            let outcome = resume_update::resume_update(&engine, state_store.as_ref(), manifest_svc.as_ref()).await?;
            tracing::info!("resume finished: {outcome:?}");
            Ok(())
        }
        ValidatedCommand::Rollback { job_id: _ } => rollback_update::rollback_update(&engine, state_store.as_ref(), manifest_svc.as_ref()).await,
        ValidatedCommand::Status { job_id: _ } => {
            let job_manager = Arc::new(JobManager::new(base_dir.clone(), engine.clone(), manifest_svc.clone(), config.max_log_lines));
            let progress = ProgressService::new(state_store.clone(), job_manager);
            let info = show_status::show_status(&progress).await?;
            println!("{}", serde_json::to_string_pretty(&info).map_err(|e| UpdaterError::Serialization(e.to_string()))?);
            Ok(())
        }
        ValidatedCommand::ListBackups => {
            let backups = list_backups::list_backups(backup_store.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&backups).map_err(|e| UpdaterError::Serialization(e.to_string()))?);
            Ok(())
        }
        ValidatedCommand::SystemInfo => {
            let info = system_info::system_info();
            println!("{}", serde_json::to_string_pretty(&info).map_err(|e| UpdaterError::Serialization(e.to_string()))?);
            Ok(())
        }
        ValidatedCommand::ValidateManifest { manifest } => {
            validate_manifest::validate_manifest(manifest_svc.as_ref(), &manifest).await?;
            println!("manifest is valid");
            Ok(())
        }
    }
}

async fn serve(
    addr: String,
    base_dir: PathBuf,
    config: EngineConfig,
    engine: Arc<UpdateEngine>,
    manifest_svc: Arc<dyn ManifestService>,
    backup_store: Arc<dyn BackupStore>,
    metrics: Arc<Metrics>,
) -> Result<(), UpdaterError> {
    let job_manager = Arc::new(JobManager::new(base_dir, engine.clone(), manifest_svc, config.max_log_lines));
    let progress = ProgressService::new(engine.state_store.clone(), job_manager.clone());
    let state = Arc::new(http::AppState { job_manager, progress, backup_store, metrics });

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(UpdaterError::from)?;
    tracing::info!("listening on {addr}");

    let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
    let shutdown_signal = signals::wait_for_shutdown_signal(coordinator.clone());

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| UpdaterError::Internal(e.to_string()))
}
