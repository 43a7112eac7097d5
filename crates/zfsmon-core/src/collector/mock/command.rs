//! Canned command responses for testing the dataset collector.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use crate::collector::command::{CommandError, CommandRunner, split_output};

#[derive(Debug, Clone)]
enum MockResponse {
    Output(String),
    Failure(String),
}

/// Command runner that answers from a table keyed by the full command line
/// (`"zfs list -Hp -o name,avail"`).
///
/// Command lines without a response fail as if the binary were missing.
#[derive(Debug, Default)]
pub struct MockCommandRunner {
    responses: HashMap<String, MockResponse>,
    calls: Mutex<Vec<String>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `command_line` with a successful exit and `stdout`.
    pub fn with_output(mut self, command_line: &str, stdout: &str) -> Self {
        self.responses.insert(
            command_line.to_string(),
            MockResponse::Output(stdout.to_string()),
        );
        self
    }

    /// Answers `command_line` with a non-zero exit and `stderr`.
    pub fn with_failure(mut self, command_line: &str, stderr: &str) -> Self {
        self.responses.insert(
            command_line.to_string(),
            MockResponse::Failure(stderr.to_string()),
        );
        self
    }

    /// Command lines executed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, command: &str, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let mut command_line = command.to_string();
        for arg in args {
            command_line.push(' ');
            command_line.push_str(arg);
        }

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command_line.clone());
        }

        match self.responses.get(&command_line) {
            Some(MockResponse::Output(stdout)) => Ok(split_output(stdout)),
            Some(MockResponse::Failure(stderr)) => Err(CommandError::Failed {
                command: command.to_string(),
                stderr: stderr.trim().to_string(),
            }),
            None => Err(CommandError::Spawn {
                command: command.to_string(),
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no mock response for: {}", command_line),
                ),
            }),
        }
    }
}
