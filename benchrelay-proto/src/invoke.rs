//! Process Invocation
//!
//! Runs the external binary synchronously and captures its standard output.
//! The calling thread blocks for the full duration of the child process; the
//! run time is bounded only by the flags passed to the binary itself.

use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Failure launching or completing one external invocation.
///
/// Fatal to that single invocation; never retried by the harness. The failing
/// command line (and captured stderr, when any) ride along for diagnosis.
#[derive(Debug, Error)]
pub enum ExternalProcessError {
    /// The binary could not be launched at all
    #[error("failed to launch `{command}`: {source}")]
    LaunchFailed {
        /// The command line that failed
        command: String,
        /// Underlying spawn error
        source: std::io::Error,
    },

    /// The binary exited with a non-zero status
    #[error("`{command}` exited with {status}; stderr: {stderr}")]
    NonZeroExit {
        /// The command line that failed
        command: String,
        /// Exit status description (code or signal)
        status: String,
        /// Captured stderr, trimmed
        stderr: String,
    },

    /// The binary exited cleanly but wrote nothing to stdout
    #[error("`{command}` produced no output")]
    EmptyOutput {
        /// The command line that failed
        command: String,
    },
}

fn render_command(command: &[String]) -> String {
    command.join(" ")
}

/// Run `command` in `working_dir`, returning captured stdout.
///
/// Fails on spawn error, non-zero exit, or empty stdout. Blocks until the
/// child exits; there is no harness-side timeout.
pub fn run(command: &[String], working_dir: &Path) -> Result<Vec<u8>, ExternalProcessError> {
    let rendered = render_command(command);
    let (program, args) = match command.split_first() {
        Some(split) => split,
        None => {
            return Err(ExternalProcessError::LaunchFailed {
                command: rendered,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
            });
        }
    };

    tracing::debug!(command = %rendered, dir = %working_dir.display(), "invoking external binary");

    let output = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| ExternalProcessError::LaunchFailed {
            command: rendered.clone(),
            source,
        })?;

    if !output.status.success() {
        let status = match output.status.code() {
            Some(code) => format!("status {}", code),
            None => "signal termination".to_string(),
        };
        return Err(ExternalProcessError::NonZeroExit {
            command: rendered,
            status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    if output.stdout.is_empty() {
        return Err(ExternalProcessError::EmptyOutput { command: rendered });
    }

    tracing::debug!(bytes = output.stdout.len(), "external binary completed");
    Ok(output.stdout)
}
