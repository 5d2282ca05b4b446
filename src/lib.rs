//! # bart
//!
//! Injection-safe shell command execution, plus a small Gerrit client
//! built on top of it.
//!
//! Commands are written as printf-style templates. The template is
//! metacharacter-escaped and every argument is single-quoted before
//! substitution, so an argument like `; rm -rf /` always reaches the
//! program as one literal token.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bart::{Command, OutputFormat};
//!
//! fn main() -> bart::Result<()> {
//!     // Initialize logging
//!     bart::logging::try_init().ok();
//!
//!     let cmd = Command::new("echo %s", &["hello world"])?;
//!     assert_eq!(cmd.to_string(), "echo 'hello world'");
//!
//!     // Non-throwing: inspect the exit code yourself
//!     let result = cmd.get_result();
//!     println!("exit code {}", result.exit_code);
//!
//!     // Fail fast on non-zero exit
//!     let lines = cmd.run(OutputFormat::Lines)?.into_lines();
//!     assert_eq!(lines, vec!["hello world"]);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod gerrit;
pub mod logging;

// Re-export commonly used types
pub use error::{BartError, Result};
pub use execution::{
    make_safe_string, Command, CommandExecutor, CommandFactory, DefaultCommandFactory,
    ExecutionResult, FormatError, OutputFormat, ProcessRunner, RunOutput, ShellRunner,
};
pub use gerrit::{Api, ApiResult, Change, SshApi};
pub use logging::LogSink;
