//! Intake field-mapping resolver CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use ivr_cli::logging::{LogConfig, LogFormat, init_logging};

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::commands::{run_manufacturers, run_resolve, run_suggest, run_validate};
use crate::summary::{print_manufacturers, print_outcome, print_suggestions, print_validation};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let config_dir = cli.config_dir.as_deref();
    let exit_code = match cli.command {
        Command::Resolve(args) => match run_resolve(&args, config_dir) {
            Ok(outcome) => {
                if args.json {
                    match serde_json::to_string_pretty(&outcome) {
                        Ok(rendered) => println!("{rendered}"),
                        Err(error) => {
                            eprintln!("error: {error}");
                            std::process::exit(1);
                        }
                    }
                } else {
                    print_outcome(&outcome);
                }
                if outcome.validation.can_proceed { 0 } else { 1 }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Validate(args) => match run_validate(&args, config_dir) {
            Ok((validation, completeness)) => {
                print_validation(&validation, &completeness);
                if validation.can_proceed { 0 } else { 1 }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Suggest(args) => match run_suggest(&args, config_dir) {
            Ok(suggestions) => {
                print_suggestions(&args.field, &suggestions);
                if suggestions.is_empty() { 1 } else { 0 }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Manufacturers => match run_manufacturers(config_dir) {
            Ok(names) => {
                print_manufacturers(&names);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !cli.verbosity.is_present();
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
