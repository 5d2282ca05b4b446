//! Command building and representation.

use std::fmt;

use tracing::debug;

use super::escape::{escape_shell_arg, escape_shell_cmd};
use super::executor::{CommandExecutor, OutputFormat, ShellRunner};
use super::format::format_template;
use super::result::{ExecutionResult, RunOutput};
use crate::logging::LogSink;
use crate::Result;

/// A shell command whose arguments have been escaped.
///
/// Only strings are accepted as arguments: shell quoting is string based,
/// so numbers and other values must be stringified by the caller.
///
/// Do not single-quote the `%s` placeholders in the template yourself. Each
/// argument is quoted on substitution and extra quotes would undo that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    template: String,
    args: Vec<String>,
    safe_command: String,
}

impl Command {
    /// Build a command from a printf-style template and its arguments.
    ///
    /// The template is metacharacter-escaped, each argument is
    /// single-quoted, then the quoted arguments replace the `%s`
    /// placeholders in order.
    pub fn new<S: AsRef<str>>(template: &str, args: &[S]) -> Result<Self> {
        Self::with_sink(template, args, &LogSink::global())
    }

    /// Same as [`Command::new`], logging through `sink`.
    pub fn with_sink<S: AsRef<str>>(template: &str, args: &[S], sink: &LogSink) -> Result<Self> {
        let safe_template = escape_shell_cmd(template);
        let safe_command = make_safe_string(&safe_template, args)?;
        sink.scope(|| debug!(command = %safe_command, "Set safe command string"));

        Ok(Self {
            template: template.to_string(),
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
            safe_command,
        })
    }

    /// Build a command through `factory`.
    ///
    /// Code that constructs commands deep inside a call chain takes a
    /// factory so tests can hand in a fake one.
    pub fn from_fmt_and_args<S: AsRef<str>>(
        factory: &dyn CommandFactory,
        template: &str,
        args: &[S],
    ) -> Result<Self> {
        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
        factory.create(template, &args)
    }

    /// The escaped command line.
    pub fn as_str(&self) -> &str {
        &self.safe_command
    }

    /// The template as given, before escaping.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The arguments as given, before quoting.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run with the default shell and report what happened.
    ///
    /// Never fails; inspect [`ExecutionResult::exit_code`].
    pub fn get_result(&self) -> ExecutionResult {
        CommandExecutor::<ShellRunner>::default().get_result(self)
    }

    /// Run with the default shell, failing on a non-zero exit status.
    pub fn run(&self, format: OutputFormat) -> Result<RunOutput> {
        CommandExecutor::<ShellRunner>::default().run(self, format)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.safe_command)
    }
}

impl AsRef<str> for Command {
    fn as_ref(&self) -> &str {
        &self.safe_command
    }
}

/// Safely format a string for the command line.
///
/// Prefer [`Command`] for anything that will be executed. This is for
/// building a fragment that ends up inside a larger command. The template
/// itself is not escaped here.
pub fn make_safe_string<S: AsRef<str>>(template: &str, args: &[S]) -> Result<String> {
    let quoted: Vec<String> = args.iter().map(|a| escape_shell_arg(a.as_ref())).collect();
    Ok(format_template(template, &quoted)?)
}

/// Creates commands on behalf of code that must not construct them directly.
pub trait CommandFactory {
    /// Build a command from a template and already-stringified arguments.
    fn create(&self, template: &str, args: &[String]) -> Result<Command>;
}

/// Factory that builds real commands.
#[derive(Debug, Clone, Default)]
pub struct DefaultCommandFactory {
    sink: LogSink,
}

impl DefaultCommandFactory {
    /// Create a factory that logs through the global subscriber.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory that logs through `sink`.
    pub fn with_sink(sink: LogSink) -> Self {
        Self { sink }
    }
}

impl CommandFactory for DefaultCommandFactory {
    fn create(&self, template: &str, args: &[String]) -> Result<Command> {
        Command::with_sink(template, args, &self.sink)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::BartError;
    use crate::execution::FormatError;
    use crate::logging::capture;

    #[test]
    fn test_command_quotes_arguments() {
        let cmd = Command::new("echo %s", &["hello world"]).unwrap();
        assert_eq!(cmd.as_str(), "echo 'hello world'");
        assert_eq!(cmd.template(), "echo %s");
        assert_eq!(cmd.args(), ["hello world".to_string()]);
    }

    #[test]
    fn test_command_injection_is_one_token() {
        let cmd = Command::new("echo %s", &["; rm -rf /"]).unwrap();
        assert_eq!(cmd.to_string(), "echo '; rm -rf /'");
    }

    #[test]
    fn test_command_escapes_template() {
        let cmd = Command::new("git log %s; whoami", &["HEAD"]).unwrap();
        assert_eq!(cmd.as_str(), "git log 'HEAD'\\; whoami");
    }

    #[test]
    fn test_template_escaping_does_not_touch_arguments() {
        let cmd = Command::new("grep %s | wc", &["a|b"]).unwrap();
        assert_eq!(cmd.as_str(), "grep 'a|b' \\| wc");
    }

    #[test]
    fn test_single_quote_argument() {
        let cmd = Command::new("echo %s", &["O'Brien"]).unwrap();
        assert_eq!(cmd.as_str(), "echo 'O'\\''Brien'");
    }

    #[test]
    fn test_make_safe_string_matches_display() {
        let args = ["a b", "it's", "$(id)"];
        let template = "printf %s %s %s";
        let cmd = Command::new(template, &args).unwrap();
        assert_eq!(make_safe_string(template, &args).unwrap(), cmd.to_string());
    }

    #[test]
    fn test_make_safe_string_keeps_template() {
        let safe = make_safe_string("--format=json %s | head", &["x"]).unwrap();
        assert_eq!(safe, "--format=json 'x' | head");
    }

    #[test]
    fn test_placeholder_mismatch_is_format_error() {
        let err = Command::new("echo %s %s", &["only-one"]).unwrap_err();
        assert!(matches!(
            err,
            BartError::Format(FormatError::TooFewArguments {
                expected: 2,
                given: 1
            })
        ));

        let err = make_safe_string("echo", &["extra"]).unwrap_err();
        assert!(matches!(
            err,
            BartError::Format(FormatError::TooManyArguments { .. })
        ));
    }

    #[test]
    fn test_build_logs_safe_string() {
        let (sink, captured) = capture::sink();
        let cmd = Command::with_sink("ls %s", &["dir name"], &sink).unwrap();

        let logs = captured.contents();
        assert!(logs.contains("DEBUG"));
        assert!(logs.contains("Set safe command string"));
        assert!(logs.contains(cmd.as_str()));
    }

    #[test]
    fn test_default_factory_builds_commands() {
        let factory = DefaultCommandFactory::new();
        let cmd = Command::from_fmt_and_args(&factory, "cat %s", &["a file"]).unwrap();
        assert_eq!(cmd, Command::new("cat %s", &["a file"]).unwrap());
    }

    struct RecordingFactory {
        calls: RefCell<Vec<(String, Vec<String>)>>,
    }

    impl CommandFactory for RecordingFactory {
        fn create(&self, template: &str, args: &[String]) -> Result<Command> {
            self.calls
                .borrow_mut()
                .push((template.to_string(), args.to_vec()));
            Command::new("true", &[] as &[&str])
        }
    }

    #[test]
    fn test_factory_can_be_substituted() {
        let factory = RecordingFactory {
            calls: RefCell::new(Vec::new()),
        };
        let cmd = Command::from_fmt_and_args(&factory, "rm %s", &["/tmp/x"]).unwrap();

        assert_eq!(cmd.as_str(), "true");
        let calls = factory.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "rm %s");
        assert_eq!(calls[0].1, vec!["/tmp/x".to_string()]);
    }
}
