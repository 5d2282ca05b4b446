//! Command execution engine.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use tracing::{debug, error};

use super::command::Command;
use super::result::{ExecutionResult, RunOutput};
use crate::config::ShellSection;
use crate::logging::LogSink;
use crate::Result;

/// Exit code reported when the process could not be started at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Shape of the value returned by [`CommandExecutor::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Ordered output lines.
    #[default]
    Lines,
    /// Output lines joined with `\n`.
    Joined,
}

/// Raw outcome of a process run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    /// Stdout split into lines.
    pub stdout_lines: Vec<String>,
    /// Exit code of the process.
    pub exit_code: i32,
}

/// Spawns a process for a command line and waits for it to exit.
///
/// The command line is already escaped and must be passed on verbatim.
pub trait ProcessRunner {
    /// Run `command_line` to completion.
    fn spawn_and_wait(&self, command_line: &str) -> io::Result<RawOutput>;
}

/// Runs command lines through a POSIX shell (`sh -c` by default).
///
/// Stdout is captured, stderr is passed through to the parent, stdin is
/// closed.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    program: String,
    flag: String,
}

impl ShellRunner {
    /// Create a runner for the given shell program and command flag.
    pub fn new(program: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flag: flag.into(),
        }
    }

    /// Create a runner from the `shell` config section.
    pub fn from_config(section: &ShellSection) -> Self {
        Self::new(&section.program, &section.flag)
    }

    /// The shell program.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new("sh", "-c")
    }
}

impl ProcessRunner for ShellRunner {
    fn spawn_and_wait(&self, command_line: &str) -> io::Result<RawOutput> {
        let output = std::process::Command::new(&self.program)
            .arg(&self.flag)
            .arg(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()?;

        Ok(RawOutput {
            stdout_lines: split_lines(&output.stdout),
            exit_code: exit_code(output.status),
        })
    }
}

/// Split captured stdout into lines with trailing whitespace removed.
///
/// A trailing newline does not produce an empty final line.
pub fn split_lines(stdout: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(stdout);
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|line| line.trim_end().to_string())
        .collect();
    if text.is_empty() || text.ends_with('\n') {
        lines.pop();
    }
    lines
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Runs [`Command`]s and captures their output and exit code.
///
/// Every call blocks until the child process has exited.
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor<R: ProcessRunner = ShellRunner> {
    runner: R,
    sink: LogSink,
}

impl<R: ProcessRunner> CommandExecutor<R> {
    /// Create a new command executor.
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            sink: LogSink::global(),
        }
    }

    /// Log through `sink` instead of the global subscriber.
    pub fn with_sink(mut self, sink: LogSink) -> Self {
        self.sink = sink;
        self
    }

    /// The underlying process runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Execute the command and wrap the outcome in an [`ExecutionResult`].
    ///
    /// This never fails. A non-zero exit is reported in the result, and a
    /// process that could not be spawned is reported with exit code
    /// [`SPAWN_FAILURE_EXIT_CODE`].
    pub fn get_result(&self, command: &Command) -> ExecutionResult {
        self.execute(command)
    }

    /// Execute the command, failing with
    /// [`BartError::CommandExecution`](crate::BartError::CommandExecution)
    /// if it exits non-zero.
    pub fn run(&self, command: &Command, format: OutputFormat) -> Result<RunOutput> {
        let result = self.execute(command);
        if result.failed() {
            self.sink
                .scope(|| error!(exit_code = result.exit_code, "Non-zero exit status"));
        }
        result.into_run_output(format)
    }

    /// [`run`](Self::run) returning the output lines.
    pub fn run_lines(&self, command: &Command) -> Result<Vec<String>> {
        self.run(command, OutputFormat::Lines).map(RunOutput::into_lines)
    }

    /// [`run`](Self::run) returning the output joined with `\n`.
    pub fn run_joined(&self, command: &Command) -> Result<String> {
        self.run(command, OutputFormat::Joined).map(RunOutput::into_string)
    }

    fn execute(&self, command: &Command) -> ExecutionResult {
        let start = Instant::now();
        self.sink
            .scope(|| debug!(command = %command, "Executing"));

        let raw = match self.runner.spawn_and_wait(command.as_str()) {
            Ok(raw) => raw,
            Err(e) => {
                self.sink
                    .scope(|| error!(command = %command, error = %e, "Failed to spawn command"));
                RawOutput {
                    stdout_lines: Vec::new(),
                    exit_code: SPAWN_FAILURE_EXIT_CODE,
                }
            }
        };

        ExecutionResult::new(
            command.clone(),
            raw.stdout_lines,
            raw.exit_code,
            start.elapsed(),
        )
    }
}
