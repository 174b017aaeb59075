use crate::report::OutputFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "update-urgency",
    version,
    about = "Report how urgently pending package updates should be applied"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score the pending updates and print the urgency
    Check(CheckCommand),
}

#[derive(Args)]
pub struct CheckCommand {
    /// Do not print the result; state and notifications are still updated
    #[arg(short, long)]
    pub quiet: bool,

    /// Reuse the cached update list instead of querying the package manager
    #[arg(short = 'U', long)]
    pub no_update: bool,

    /// Neither read nor write the state file
    #[arg(short, long)]
    pub no_cache: bool,

    #[arg(short, long, value_enum, default_value = "plain")]
    pub output_format: OutputFormatArg,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/update-urgency/config.toml)
    #[arg(short = 'C', long)]
    pub config_path: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormatArg {
    Plain,
    Fancy,
    Json,
    I3status,
    Custom,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Plain => OutputFormat::Plain,
            OutputFormatArg::Fancy => OutputFormat::Fancy,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::I3status => OutputFormat::I3status,
            OutputFormatArg::Custom => OutputFormat::Custom,
        }
    }
}
