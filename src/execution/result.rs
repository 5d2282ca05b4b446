//! Execution result types.

use std::time::Duration;

use super::command::Command;
use super::executor::OutputFormat;
use crate::error::BartError;
use crate::Result;

/// Result of a finished command.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The command that was run.
    pub command: Command,
    /// Captured stdout, one entry per line, in output order.
    pub output: Vec<String>,
    /// Exit code of the process.
    pub exit_code: i32,
    /// Execution duration.
    pub duration: Duration,
}

impl ExecutionResult {
    /// Create a new execution result.
    pub fn new(command: Command, output: Vec<String>, exit_code: i32, duration: Duration) -> Self {
        Self {
            command,
            output,
            exit_code,
            duration,
        }
    }

    /// Check if command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if command failed (non-zero exit code).
    pub fn failed(&self) -> bool {
        !self.success()
    }

    /// Get output lines.
    pub fn output_lines(&self) -> impl Iterator<Item = &str> {
        self.output.iter().map(String::as_str)
    }

    /// Output lines joined with `\n`.
    pub fn joined_output(&self) -> String {
        self.output.join("\n")
    }

    /// Convert into the value returned by the fail-fast mode.
    ///
    /// A non-zero exit code becomes [`BartError::CommandExecution`].
    pub fn into_run_output(self, format: OutputFormat) -> Result<RunOutput> {
        if self.failed() {
            return Err(BartError::CommandExecution {
                exit_code: self.exit_code,
                command: self.command.to_string(),
                output: self.joined_output(),
            });
        }

        Ok(match format {
            OutputFormat::Lines => RunOutput::Lines(self.output),
            OutputFormat::Joined => RunOutput::Joined(self.output.join("\n")),
        })
    }
}

/// Output of a successful fail-fast run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutput {
    /// Raw output lines.
    Lines(Vec<String>),
    /// Output lines joined with `\n`.
    Joined(String),
}

impl RunOutput {
    /// Output as lines, splitting a joined string if needed.
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Self::Lines(lines) => lines,
            Self::Joined(text) if text.is_empty() => Vec::new(),
            Self::Joined(text) => text.split('\n').map(str::to_string).collect(),
        }
    }

    /// Output as one string, joining lines if needed.
    pub fn into_string(self) -> String {
        match self {
            Self::Lines(lines) => lines.join("\n"),
            Self::Joined(text) => text,
        }
    }
}
