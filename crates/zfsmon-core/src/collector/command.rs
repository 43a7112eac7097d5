//! External command execution abstraction.
//!
//! Dataset properties are only available through the `zfs` userland tool,
//! so the dataset collector talks to a `CommandRunner` instead of spawning
//! processes directly. Tests swap in `MockCommandRunner`.

use std::io;
use std::process::Command;

use tracing::debug;

/// Error type for command execution failures.
#[derive(Debug)]
pub enum CommandError {
    /// The process could not be started (binary missing, permission denied).
    Spawn { command: String, source: io::Error },
    /// The process exited with a non-zero status.
    Failed { command: String, stderr: String },
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Spawn { command, source } => {
                write!(f, "failed to execute {}: {}", command, source)
            }
            CommandError::Failed { command, stderr } => write!(f, "{} error: {}", command, stderr),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Spawn { source, .. } => Some(source),
            CommandError::Failed { .. } => None,
        }
    }
}

/// Runs an external command and returns its stdout as lines.
pub trait CommandRunner: Send + Sync {
    /// Executes `command` with `args`.
    ///
    /// On success, stdout is trimmed and split on `\n`. An empty stdout
    /// yields a single empty line, so callers always get at least one
    /// element back.
    fn run(&self, command: &str, args: &[&str]) -> Result<Vec<String>, CommandError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &str, args: &[&str]) -> Result<Vec<String>, CommandError> {
        debug!(command, ?args, "executing command");

        let output = Command::new(command)
            .args(args)
            .output()
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(command, status = %output.status, "command failed");
            return Err(CommandError::Failed {
                command: command.to_string(),
                stderr,
            });
        }

        Ok(split_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Trims `stdout` and splits it into lines.
pub(crate) fn split_output(stdout: &str) -> Vec<String> {
    stdout.trim().split('\n').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_output() {
        assert_eq!(
            split_output("tank\t1024\nrpool\t2048\n"),
            vec!["tank\t1024", "rpool\t2048"]
        );
    }

    #[test]
    fn test_split_output_empty() {
        assert_eq!(split_output(""), vec![""]);
        assert_eq!(split_output("  \n"), vec![""]);
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::Failed {
            command: "zfs".to_string(),
            stderr: "no datasets available".to_string(),
        };
        assert_eq!(err.to_string(), "zfs error: no datasets available");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_success() {
        let runner = SystemCommandRunner::new();
        let lines = runner.run("sh", &["-c", "printf 'a\\tb\\nc\\td\\n'"]).unwrap();
        assert_eq!(lines, vec!["a\tb", "c\td"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_non_zero_exit() {
        let runner = SystemCommandRunner::new();
        let err = runner
            .run("sh", &["-c", "echo out; echo boom >&2; exit 1"])
            .unwrap_err();
        match err {
            CommandError::Failed { command, stderr } => {
                assert_eq!(command, "sh");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_system_runner_missing_binary() {
        let runner = SystemCommandRunner::new();
        let err = runner
            .run("zfsmon-definitely-not-a-command", &[])
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }
}
