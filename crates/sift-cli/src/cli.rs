//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Sift - Extract structured records from documents and text.
#[derive(Debug, Parser)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SIFT_CONFIG")]
    pub config: Option<String>,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one JSON record per line)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract records from text and/or documents
    Extract(ExtractArgs),

    /// Re-run the analysis on the last saved session
    Analyze,

    /// Show or clear the instruction history
    History(HistoryArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// What to extract; defaults to the last instruction
    #[arg(short, long)]
    pub goal: Option<String>,

    /// Raw text to extract from
    #[arg(short, long, conflicts_with = "text_file")]
    pub text: Option<String>,

    /// Read raw text from a file ("-" for stdin)
    #[arg(long)]
    pub text_file: Option<String>,

    /// Document to extract from; repeat to compare documents
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<String>,

    /// Prefer the faster model
    #[arg(long)]
    pub fast: bool,

    /// Also run the analysis on the extracted records
    #[arg(short, long)]
    pub analyze: bool,
}

/// Arguments for the history command.
#[derive(Debug, Parser)]
pub struct HistoryArgs {
    /// Forget all past instructions
    #[arg(long)]
    pub clear: bool,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Use the conservative preset (free-tier quotas)
        #[arg(long, conflicts_with = "fast")]
        conservative: bool,

        /// Use the fast preset (paid-tier quotas)
        #[arg(long)]
        fast: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
