// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ```text
//! 1. parser::parse_cli()      Parse CLI with clap
//! 2. validator::validate()    Security validation
//! 3. ValidatedCli              Safe, validated config
//! ```

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration: every path canonicalized, every value
/// range-checked, ready to hand to application code without re-checking.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub base_dir: Option<PathBuf>,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Serve { addr: String },
    Apply { archive: PathBuf },
    Resume,
    Rollback { job_id: Option<String> },
    Status { job_id: Option<String> },
    ListBackups,
    SystemInfo,
    ValidateManifest { manifest: PathBuf },
}

/// Parses CLI arguments and applies security validation in one call.
///
/// # Errors
///
/// Returns `ParseError` if any validation fails.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let base_dir = match cli.base_dir {
        Some(ref path) => {
            SecureArgParser::validate_argument(&path.to_string_lossy())?;
            Some(path.clone())
        }
        None => None,
    };

    let config = match cli.config {
        Some(ref path) => Some(SecureArgParser::validate_path(&path.to_string_lossy())?),
        None => None,
    };

    let command = match cli.command {
        Commands::Serve { addr } => {
            SecureArgParser::validate_argument(&addr)?;
            ValidatedCommand::Serve { addr }
        }
        Commands::Apply { archive } => {
            let validated = SecureArgParser::validate_path(&archive.to_string_lossy())?;
            ValidatedCommand::Apply { archive: validated }
        }
        Commands::Resume => ValidatedCommand::Resume,
        Commands::Rollback { job_id } => {
            if let Some(ref id) = job_id {
                SecureArgParser::validate_argument(id)?;
            }
            ValidatedCommand::Rollback { job_id }
        }
        Commands::Status { job_id } => {
            if let Some(ref id) = job_id {
                SecureArgParser::validate_argument(id)?;
            }
            ValidatedCommand::Status { job_id }
        }
        Commands::ListBackups => ValidatedCommand::ListBackups,
        Commands::SystemInfo => ValidatedCommand::SystemInfo,
        Commands::ValidateManifest { manifest } => {
            let validated = SecureArgParser::validate_path(&manifest.to_string_lossy())?;
            ValidatedCommand::ValidateManifest { manifest: validated }
        }
    };

    Ok(ValidatedCli { command, base_dir, verbose: cli.verbose, config })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_accepts_missing_job_id() {
        let cli = Cli { command: Commands::Rollback { job_id: None }, base_dir: None, verbose: false, config: None };
        let validated = validate_cli(cli).unwrap();
        assert!(matches!(validated.command, ValidatedCommand::Rollback { job_id: None }));
    }

    #[test]
    fn apply_rejects_missing_archive() {
        let cli = Cli { command: Commands::Apply { archive: PathBuf::from("/no/such/archive.tar.gz") }, base_dir: None, verbose: false, config: None };
        assert!(validate_cli(cli).is_err());
    }
}
