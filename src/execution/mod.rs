//! Safe shell command building and execution.
//!
//! This module provides:
//! - Shell escaping of templates and arguments
//! - printf-style `%s` substitution
//! - Blocking execution with captured stdout lines and exit code
//!
//! # Example
//!
//! ```no_run
//! use bart::execution::{Command, OutputFormat};
//!
//! let cmd = Command::new("grep -c %s %s", &["needle; rm -rf /", "haystack.txt"])?;
//! assert_eq!(cmd.as_str(), "grep -c 'needle; rm -rf /' 'haystack.txt'");
//!
//! // Tell me what happened
//! let result = cmd.get_result();
//! println!("exit {}: {:?}", result.exit_code, result.output);
//!
//! // Fail fast
//! let count = cmd.run(OutputFormat::Joined)?.into_string();
//! # Ok::<(), bart::BartError>(())
//! ```

mod command;
mod escape;
mod executor;
mod format;
mod result;

pub use command::{make_safe_string, Command, CommandFactory, DefaultCommandFactory};
pub use escape::{escape_shell_arg, escape_shell_cmd};
pub use executor::{
    split_lines, CommandExecutor, OutputFormat, ProcessRunner, RawOutput, ShellRunner,
    SPAWN_FAILURE_EXIT_CODE,
};
pub use format::{format_template, placeholder_count, FormatError};
pub use result::{ExecutionResult, RunOutput};
