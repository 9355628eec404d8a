//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `check`: Scan a source tree, validate SCIS metadata and the phase graph
//! - `init`: Write a default `.scisrc.json`

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Check(cmd)) => cmd.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Terminal output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Root of the source tree to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Write the structured JSON report to a file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Export one CSV row per metadata block
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Export a Markdown summary
    #[arg(long, value_name = "FILE")]
    pub markdown: Option<PathBuf>,

    /// Export the phase dependency graph in Graphviz DOT
    #[arg(long, value_name = "FILE")]
    pub dot: Option<PathBuf>,

    /// Repository identifier recorded in the structured report
    #[arg(long, value_name = "REPO", env = "SCIS_REPOSITORY")]
    pub repository: Option<String>,

    /// Report only: exit 0 even when errors are found
    #[arg(long)]
    pub audit: bool,

    /// Leave the per-phase summary table out of the human report
    #[arg(long)]
    pub no_phases: bool,

    /// Write a JSON trace artifact summarizing the scan
    #[arg(long, value_name = "FILE")]
    pub trace: Option<PathBuf>,

    /// Number of lines after a comment searched for the documented symbol
    /// (overrides config file)
    #[arg(long, value_name = "LINES")]
    pub symbol_lookahead: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate SCIS metadata comments and the phase dependency graph
    Check(CheckCommand),
    /// Initialize a new .scisrc.json configuration file
    Init,
}
