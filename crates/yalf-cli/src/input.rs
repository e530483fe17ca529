use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use yalf_types::{TraceEvent, read_jsonl, read_jsonl_file};

/// Read a whole event stream from `input`, or stdin when it is absent or `-`
pub fn read_events(input: Option<&Path>) -> Result<Vec<TraceEvent>> {
    let events = match input {
        Some(path) if path != Path::new("-") => read_jsonl_file(path)
            .with_context(|| format!("Failed to read events from {}", path.display()))?,
        _ => read_jsonl(io::stdin().lock()).context("Failed to read events from stdin")?,
    };

    log::debug!("read {} event(s)", events.len());
    Ok(events)
}
