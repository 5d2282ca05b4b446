//! Command-line interface for bart.
//!
//! Uses lexopt for minimal binary size overhead (~34KB).

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// printf-style command template.
    pub template: Option<String>,
    /// Values for the `%s` placeholders.
    pub args: Vec<String>,
    /// Print the escaped command instead of running it.
    pub dry_run: bool,
    /// Report the exit code instead of failing on non-zero status.
    pub no_fail: bool,
    /// Print output as one joined string.
    pub join: bool,
    /// Shell program (overrides config file).
    pub shell: Option<String>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
///
/// The first positional value is the template; every later one is an
/// argument. After `--`, values that look like options are taken as
/// arguments too.
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('n') | Long("dry-run") => {
                result.dry_run = true;
            }
            Long("no-fail") => {
                result.no_fail = true;
            }
            Short('j') | Long("join") => {
                result.join = true;
            }
            Short('s') | Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                let val = val.into_string().map_err(ArgsError::NotUnicode)?;
                if result.template.is_none() {
                    result.template = Some(val);
                } else {
                    result.args.push(val);
                }
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    if result.template.is_none() && !result.help && !result.version {
        return Err(ArgsError::MissingTemplate);
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"bart {version}
Run a shell command with every argument safely quoted

USAGE:
    bart [OPTIONS] <TEMPLATE> [ARG]...

TEMPLATE is a printf-style format; each %s is replaced by the next ARG,
single-quoted. %% is a literal percent sign.

OPTIONS:
    -n, --dry-run           Print the escaped command without running it
        --no-fail           Print output and exit with the command's status
    -j, --join              Print output as one string
    -s, --shell <PROGRAM>   Shell used to run the command [default: sh]
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    BART_SHELL              Shell program (overrides config)
    BART_LOG_LEVEL          Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Arguments stay single tokens
    bart 'grep -rn %s %s' 'a; rm -rf /' src

    # See what would run
    bart -n 'git log --author=%s' "O'Brien"

    # Keep going on failure, exit with the command's status
    bart --no-fail 'test -d %s' /tmp
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("bart {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// No template was given.
    MissingTemplate,
    /// A positional value was not valid UTF-8.
    NotUnicode(OsString),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::MissingTemplate => write!(f, "missing command template"),
            Self::NotUnicode(val) => {
                write!(f, "argument is not valid UTF-8: {}", val.to_string_lossy())
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        std::iter::once("bart")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_template_and_args() {
        let result = parse_args_from(args(&["echo %s %s", "a b", "c;d"])).unwrap();
        assert_eq!(result.template.as_deref(), Some("echo %s %s"));
        assert_eq!(result.args, vec!["a b", "c;d"]);
        assert!(!result.dry_run);
        assert!(!result.no_fail);
        assert!(!result.join);
    }

    #[test]
    fn test_missing_template() {
        let result = parse_args_from(args(&[]));
        assert!(matches!(result, Err(ArgsError::MissingTemplate)));
    }

    #[test]
    fn test_help_without_template() {
        let result = parse_args_from(args(&["-h"])).unwrap();
        assert!(result.help);

        let result = parse_args_from(args(&["--help"])).unwrap();
        assert!(result.help);
    }

    #[test]
    fn test_version_flag() {
        let result = parse_args_from(args(&["-V"])).unwrap();
        assert!(result.version);
    }

    #[test]
    fn test_mode_flags() {
        let result = parse_args_from(args(&["-n", "--no-fail", "-j", "ls"])).unwrap();
        assert!(result.dry_run);
        assert!(result.no_fail);
        assert!(result.join);
        assert_eq!(result.template.as_deref(), Some("ls"));
    }

    #[test]
    fn test_shell_config_and_log_level() {
        let result = parse_args_from(args(&[
            "-s",
            "bash",
            "-c",
            "/etc/bart.json",
            "-l",
            "debug",
            "true",
        ]))
        .unwrap();
        assert_eq!(result.shell.as_deref(), Some("bash"));
        assert_eq!(result.config, Some(PathBuf::from("/etc/bart.json")));
        assert_eq!(result.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_double_dash_passes_option_like_args() {
        let result = parse_args_from(args(&["rm %s", "--", "-rf"])).unwrap();
        assert_eq!(result.args, vec!["-rf"]);
    }

    #[test]
    fn test_unknown_option() {
        let result = parse_args_from(args(&["--bogus", "ls"]));
        assert!(matches!(result, Err(ArgsError::Lexopt(_))));
    }
}
