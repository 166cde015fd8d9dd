// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Structure
//!
//! `clap`-derived argument structure. Parsing here is purely syntactic; no
//! path canonicalization or range checks happen until `validator` runs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Offline update orchestrator: apply, resume, or roll back a manifest-driven
/// update, or run the local HTTP job facade.
#[derive(Debug, Parser)]
#[command(name = "updater", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base directory for engine state (default /opt/updater)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Verbose (debug-level) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to an optional updater.toml overlay
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP job facade (upload, apply, status, rollback)
    Serve {
        /// Listen address, e.g. 127.0.0.1:8787
        #[arg(long, default_value = "127.0.0.1:8787")]
        addr: String,
    },
    /// Apply an update archive directly (no HTTP facade)
    Apply {
        /// Path to the gzip-compressed update archive
        archive: PathBuf,
    },
    /// Resume an in-progress job found in state.json
    Resume,
    /// Roll back the most recent (or a named) job
    Rollback {
        #[arg(long)]
        job_id: Option<String>,
    },
    /// Print the current or last job's status
    Status {
        #[arg(long)]
        job_id: Option<String>,
    },
    /// List backup entries under backups/
    ListBackups,
    /// Print host information (hostname, memory, disk, boot time)
    SystemInfo,
    /// Parse and validate a manifest without applying it
    ValidateManifest {
        manifest: PathBuf,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
