use std::process::Command;

use serde::Deserialize;
use tracing::trace;

/// Error from a failed command.
#[derive(Debug, Clone, thiserror::Error)]
#[error("command failed: {command} ({})\n{detail}", describe_status(.status))]
pub struct CommandError {
    pub command: String,
    /// Exit status, `None` if the process could not be spawned or was killed by a signal.
    pub status: Option<i32>,
    pub detail: String,
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "no exit status".to_string(),
    }
}

/// How a command should be executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    /// Prefix with `sudo -n`, failing instead of prompting for a password.
    Sudo,
    /// Run as the current user.
    #[default]
    User,
}

/// Format a human-readable display string for a direct command invocation.
fn format_command_display(program: &str, args: &[&str], privilege: Privilege) -> String {
    let mut parts = Vec::with_capacity(args.len() + 3);
    if matches!(privilege, Privilege::Sudo) {
        parts.extend_from_slice(&["sudo", "-n"]);
    }
    parts.push(program);
    parts.extend_from_slice(args);
    parts.join(" ")
}

fn build_command(program: &str, args: &[&str], privilege: Privilege) -> Command {
    match privilege {
        Privilege::Sudo => {
            let mut cmd = Command::new("sudo");
            cmd.arg("-n").arg(program).args(args);
            cmd
        }
        Privilege::User => {
            let mut cmd = Command::new(program);
            cmd.args(args);
            cmd
        }
    }
}

/// Execute a command and block until it exits.
///
/// Invokes the program binary directly with the given arguments; nothing is
/// passed through a shell. Returns trimmed stdout on success.
pub fn exec(program: &str, args: &[&str], privilege: Privilege) -> Result<String, CommandError> {
    let cmd_display = format_command_display(program, args, privilege);
    trace!(command = %cmd_display, "exec");

    let output = build_command(program, args, privilege)
        .output()
        .map_err(|e| CommandError {
            command: cmd_display.clone(),
            status: None,
            detail: e.to_string(),
        })?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(stdout)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(CommandError {
            command: cmd_display,
            status: output.status.code(),
            detail: stderr,
        })
    }
}
