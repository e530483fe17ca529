mod commands;
mod enums;

pub use commands::*;
pub use enums::*;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "yalf")]
#[command(about = "Render method-call traces into indented, filtered reports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: $YALF_CONFIG, then the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Diagnostic log level; RUST_LOG is used when omitted
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}
