use super::enums::{EscapeArg, IndentArg, PlacementArg};
use crate::config::ReportFormat;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Render a JSONL event stream into a report")]
    Render(RenderArgs),

    #[command(about = "Check that calls are well nested and print per-thread statistics")]
    Validate {
        /// Event stream to read; stdin when omitted or '-'
        input: Option<PathBuf>,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    #[command(about = "Inspect or create the configuration file")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Event stream to read; stdin when omitted or '-'
    pub input: Option<PathBuf>,

    #[arg(long)]
    pub format: Option<ReportFormat>,

    /// Only show methods matching this pattern (repeatable)
    #[arg(long = "include", value_name = "REGEX")]
    pub include: Vec<String>,

    /// Hide methods matching this pattern (repeatable)
    #[arg(long = "exclude", value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Deepest call level to show, 0 being top-level calls
    #[arg(long)]
    pub max_depth: Option<usize>,

    #[arg(long)]
    pub hide_returns: bool,

    #[arg(long)]
    pub hide_logs: bool,

    /// Where log and exception lines go while a call is open
    #[arg(long)]
    pub placement: Option<PlacementArg>,

    /// How lines under a hidden call are re-indented
    #[arg(long)]
    pub escape: Option<EscapeArg>,

    /// How released lines are indented
    #[arg(long)]
    pub indent: Option<IndentArg>,

    /// Field delimiter for csv output
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Prefix text lines with the event number
    #[arg(long)]
    pub line_numbers: bool,

    /// Write the report here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Print the effective configuration")]
    Show,

    #[command(about = "Write the default configuration file")]
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
