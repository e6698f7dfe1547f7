//! CLI argument definitions for the intake field-mapping resolver.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ivr",
    version,
    about = "Intake field-mapping resolver",
    long_about = "Resolve intake episode fields onto manufacturer document templates.\n\n\
                  Runs the deterministic lookup chain, validates completeness against\n\
                  per-manufacturer requirements, and reports what a submission is missing."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient-level values in log output.
    ///
    /// Off by default: resolved values are replaced with a redaction
    /// token so logs stay free of PHI.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Directory of manufacturer profile JSON files.
    #[arg(long = "config-dir", value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve an episode's source fields onto a manufacturer template.
    Resolve(ResolveArgs),

    /// Validate already-resolved data against a manufacturer template.
    Validate(ValidateArgs),

    /// Suggest corrections for an invalid target field name.
    Suggest(SuggestArgs),

    /// List manufacturer profiles available in the config directory.
    Manufacturers,
}

#[derive(Parser)]
pub struct ResolveArgs {
    /// Manufacturer name the template belongs to.
    #[arg(value_name = "MANUFACTURER")]
    pub manufacturer: String,

    /// JSON file with the episode's source fields (an object of
    /// field name to value).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Emit the full resolution outcome as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Manufacturer name the template belongs to.
    #[arg(value_name = "MANUFACTURER")]
    pub manufacturer: String,

    /// JSON file with resolved data (an object of target field to value).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Parser)]
pub struct SuggestArgs {
    /// Manufacturer name whose template defines the valid fields.
    #[arg(value_name = "MANUFACTURER")]
    pub manufacturer: String,

    /// Candidate field name to correct.
    #[arg(value_name = "FIELD")]
    pub field: String,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
