//! Error types for bart.

use thiserror::Error;

use crate::execution::FormatError;

/// Main error type for bart operations.
#[derive(Error, Debug)]
pub enum BartError {
    /// Template placeholders did not line up with the arguments.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// A command run in fail-fast mode exited non-zero.
    #[error("Got bad status {exit_code} for {command}. Output: {output}")]
    CommandExecution {
        exit_code: i32,
        command: String,
        output: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No Gerrit change matched the given change id.
    #[error("change not found: {0}")]
    ChangeNotFound(String),

    /// Gerrit returned output that could not be decoded.
    #[error("gerrit parse error: {0}")]
    GerritParse(String),

    /// A gsql statement could not be bound to its parameters.
    #[error("gsql error: {0}")]
    Gsql(String),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl BartError {
    /// Exit code carried by a failed command, if this is one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandExecution { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

/// Convenience Result type for bart operations.
pub type Result<T> = std::result::Result<T, BartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_execution_display() {
        let err = BartError::CommandExecution {
            exit_code: 3,
            command: "'false'".into(),
            output: "a\nb".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bad status 3"));
        assert!(msg.contains("'false'"));
        assert!(msg.ends_with("Output: a\nb"));
        assert_eq!(err.exit_code(), Some(3));
    }

    #[test]
    fn test_format_error_conversion() {
        let err: BartError = FormatError::TooFewArguments {
            expected: 2,
            given: 1,
        }
        .into();
        assert!(matches!(err, BartError::Format(_)));
        assert!(err.to_string().contains("format error"));
        assert_eq!(err.exit_code(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "sh missing");
        let err: BartError = io_err.into();
        assert!(matches!(err, BartError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_change_not_found_display() {
        let err = BartError::ChangeNotFound("Iabc123".into());
        assert!(err.to_string().contains("Iabc123"));
        assert!(err.to_string().contains("not found"));
    }
}
