// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Signal Handling
//!
//! Listens for SIGTERM/SIGINT (and SIGHUP on Unix) and drives the
//! [`ShutdownCoordinator`]. Per spec §5, an in-flight job is not cancellable:
//! signaling sets the coordinator's token so the HTTP facade stops accepting
//! new work and the current subprocess/action is allowed to finish before
//! the process exits.

use crate::shutdown::ShutdownCoordinator;

#[cfg(unix)]
pub async fn wait_for_shutdown_signal(coordinator: ShutdownCoordinator) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        _ = sigint.recv() => tracing::info!("received SIGINT"),
        _ = sighup.recv() => tracing::info!("received SIGHUP"),
    }

    coordinator.initiate_shutdown();
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal(coordinator: ShutdownCoordinator) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("received Ctrl-C");
    }
    coordinator.initiate_shutdown();
}
