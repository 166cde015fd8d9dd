// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Shared subprocess execution with a deadline. Every `command`-flavored
//! check/action and the Docker actions run through here so timeout handling
//! and exit-status interpretation stay in one place.

use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use updater_domain::UpdaterError;

#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs `command` through the platform shell, capturing output, under a
/// deadline. A nonzero exit is reported as `UpdaterError::Process`; exceeding
/// `timeout_secs` is reported as `UpdaterError::Timeout`.
pub async fn run_shell(command: &str, cwd: Option<&Path>, timeout_secs: u64) -> Result<CommandOutput, UpdaterError> {
    let mut cmd = shell_command(command);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = timeout(Duration::from_secs(timeout_secs), cmd.output())
        .await
        .map_err(|_| UpdaterError::timeout(format!("command '{command}' exceeded {timeout_secs}s")))?
        .map_err(|e| UpdaterError::process(format!("spawning '{command}': {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(UpdaterError::process(format!(
            "command '{command}' exited with {}: {}",
            output.status.code().map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()),
            stderr.trim()
        )));
    }

    Ok(CommandOutput { stdout, stderr })
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_successful_command() {
        let out = run_shell("echo hello", None, 5).await.unwrap();
        assert!(out.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn reports_nonzero_exit() {
        assert!(run_shell("exit 3", None, 5).await.is_err());
    }

    #[tokio::test]
    async fn enforces_timeout() {
        let result = run_shell("sleep 2", None, 0).await;
        match result {
            Err(UpdaterError::Timeout(_)) => {}
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
