//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    assess::AssessCommands, completions::CompletionsArgs, export::ExportArgs,
    hazard::HazardCommands, improvements::ImprovementsArgs, info::InfoCommands, init::InitArgs,
    process::ProcessCommands, rollup::RollupArgs,
};

#[derive(Parser, Debug)]
#[command(name = "riskreg")]
#[command(version, about = "Occupational risk assessment register")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Work file holding the register [default: assessment.yaml]
    #[arg(long, short = 'F', global = true)]
    pub file: Option<PathBuf>,

    /// Regulation lookup table (CSV or spreadsheet)
    #[arg(long, short = 'r', global = true)]
    pub regulations: Option<PathBuf>,

    /// Output format
    #[arg(id = "format", long = "format", short = 'f', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Answer yes to confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Install the stderr log subscriber
    pub fn setup_logging(&self) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Table for lists, YAML for single records
    #[default]
    Auto,
    Table,
    Json,
    Yaml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new work file
    Init(InitArgs),

    /// Company and workplace details
    #[command(subcommand)]
    Info(InfoCommands),

    /// Manage processes and their materials, equipment and chemicals
    #[command(subcommand)]
    Process(ProcessCommands),

    /// Browse the hazard catalog and select hazards for a process
    #[command(subcommand)]
    Hazard(HazardCommands),

    /// Build and edit the risk assessment table of a process
    #[command(subcommand)]
    Assess(AssessCommands),

    /// Show the reduction plan for high-risk entries
    Rollup(RollupArgs),

    /// Track progress of planned improvements
    Improvements(ImprovementsArgs),

    /// Export the register as a spreadsheet
    Export(ExportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
