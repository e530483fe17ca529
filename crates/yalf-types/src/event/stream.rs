use std::fs;
use std::io::BufRead;
use std::path::Path;

use super::event::TraceEvent;
use crate::{Error, Result};

/// Parse a JSON-lines event stream held in memory.
///
/// Blank lines are skipped. Line numbers in errors are 1-based.
pub fn parse_jsonl(content: &str) -> Result<Vec<TraceEvent>> {
    let mut events = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if let Some(event) = parse_line(line, idx + 1)? {
            events.push(event);
        }
    }

    Ok(events)
}

/// Parse a JSON-lines event stream from any buffered reader (stdin, pipes).
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<TraceEvent>> {
    let mut events = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(event) = parse_line(&line, idx + 1)? {
            events.push(event);
        }
    }

    Ok(events)
}

pub fn read_jsonl_file(path: &Path) -> Result<Vec<TraceEvent>> {
    let content = fs::read_to_string(path)?;
    parse_jsonl(&content)
}

fn parse_line(line: &str, line_no: usize) -> Result<Option<TraceEvent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|source| Error::Json {
            line: line_no,
            source,
        })
}
