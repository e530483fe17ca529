use super::args::{Cli, Commands, ConfigCommand, LogLevel};
use super::handlers;
use crate::config::resolve_config_path;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level);

    let config_path = resolve_config_path(cli.config.as_deref())?;
    log::debug!("configuration path: {}", config_path.display());

    match cli.command {
        Commands::Render(args) => handlers::render::handle(&config_path, args),

        Commands::Validate { input, json } => handlers::validate::handle(input.as_deref(), json),

        Commands::Config { command } => match command {
            ConfigCommand::Show => handlers::config::show(&config_path),
            ConfigCommand::Init { force } => handlers::config::init(&config_path, force),
        },
    }
}

/// Diagnostics go to stderr; reports go to stdout, so the two never mix
fn init_logging(level: Option<LogLevel>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level.into());
    }
    builder.format_timestamp(None);

    // A second run in the same process keeps the first logger
    if builder.try_init().is_ok()
        && let Some(level) = level
    {
        log::debug!("log level set to {}", level);
    }
}
