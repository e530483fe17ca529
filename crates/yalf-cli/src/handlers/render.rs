use crate::args::RenderArgs;
use crate::config::Config;
use crate::input::read_events;
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;
use yalf_engine::TraceDriver;

pub fn handle(config_path: &Path, args: RenderArgs) -> Result<()> {
    let mut config = Config::load_from(config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            config_path.display()
        )
    })?;
    apply_overrides(&mut config, &args);

    let renderer = config.renderer()?;
    let filter = config.filter()?;
    let mut driver = TraceDriver::new(renderer, filter, config.engine)?;

    let events = read_events(args.input.as_deref())?;

    if let Err(err) = driver.handle_all(&events) {
        let partial = driver.partial_report();
        log::warn!(
            "discarding partial report of {} line(s)",
            partial.text.lines().count()
        );
        return Err(err).with_context(|| {
            format!(
                "Rendering stopped after {} event(s)",
                driver.lines_handled()
            )
        });
    }

    let report = driver.complete()?;
    write_report(args.output.as_deref(), &report)
}

/// Flags win over file values; unset flags leave the file value alone
fn apply_overrides(config: &mut Config, args: &RenderArgs) {
    if let Some(format) = args.format {
        config.format = format;
    }
    if !args.include.is_empty() {
        config.filter.include = args.include.clone();
    }
    if !args.exclude.is_empty() {
        config.filter.exclude = args.exclude.clone();
    }
    if args.max_depth.is_some() {
        config.filter.max_depth = args.max_depth;
    }
    config.filter.hide_return_values |= args.hide_returns;
    config.filter.hide_log_events |= args.hide_logs;

    if let Some(placement) = args.placement {
        config.engine.placement = placement.into();
    }
    if let Some(escape) = args.escape {
        config.engine.escape = escape.into();
    }
    if let Some(indent) = args.indent {
        config.engine.indent = indent.into();
    }

    if let Some(delimiter) = args.delimiter {
        config.delimited.delimiter = delimiter;
    }
    config.text.line_numbers |= args.line_numbers;
}

fn write_report(output: Option<&Path>, report: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, report)
            .with_context(|| format!("Failed to write report to {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(report.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
