//! bart binary entry point.

use std::process::ExitCode;

use bart::cli::{self, Args};
use bart::config::Config;
use bart::{logging, Command, CommandExecutor, OutputFormat, ShellRunner};
use tracing::debug;

/// Exit status for usage, configuration and template errors.
const USAGE_ERROR: u8 = 2;

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Run 'bart --help' for usage.");
            return ExitCode::from(USAGE_ERROR);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(USAGE_ERROR);
        }
    };

    let _ = logging::init_with_filter(config.log_filter());
    debug!(shell = %config.shell.program, "bart v{}", env!("CARGO_PKG_VERSION"));

    match run(&args, &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            match e.exit_code() {
                Some(_) => ExitCode::FAILURE,
                None => ExitCode::from(USAGE_ERROR),
            }
        }
    }
}

fn run(args: &Args, config: &Config) -> bart::Result<ExitCode> {
    let template = args.template.as_deref().unwrap_or_default();
    let command = Command::new(template, &args.args)?;

    if args.dry_run {
        println!("{command}");
        return Ok(ExitCode::SUCCESS);
    }

    let executor = CommandExecutor::new(ShellRunner::from_config(&config.shell));
    let format = if args.join {
        OutputFormat::Joined
    } else {
        OutputFormat::Lines
    };

    if args.no_fail {
        let result = executor.get_result(&command);
        if args.join {
            println!("{}", result.joined_output());
        } else {
            result.output_lines().for_each(|line| println!("{line}"));
        }
        return Ok(ExitCode::from(u8::try_from(result.exit_code).unwrap_or(1)));
    }

    match executor.run(&command, format)? {
        bart::RunOutput::Joined(text) => println!("{text}"),
        bart::RunOutput::Lines(lines) => lines.iter().for_each(|line| println!("{line}")),
    }
    Ok(ExitCode::SUCCESS)
}
