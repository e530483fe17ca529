// NOTE: Renderer Roles
//
// - Independent renderers print a line when a call starts and another when it
//   returns. They never see RecordKind::Method.
// - Merging renderers (supports_deferred_exit) print one summary per call,
//   built after the exit. They never see MethodEntry/MethodExit records.
// - Asking a renderer for the other role is a wiring bug and fails with
//   Error::RendererUnsupported.

mod delimited;
mod single_line;
mod text;

pub use delimited::{
    DEFAULT_CONTEXT, DEFAULT_DELIMITED_TIME_FORMAT, DEFAULT_DELIMITER, DelimitedRenderer,
};
pub use single_line::SingleLineRenderer;
pub use text::TextRenderer;

use chrono::{DateTime, Utc};

use std::fmt::Write;

use crate::record::LineRecord;
use crate::{Error, Result};

pub const DEFAULT_INDENT: &str = "  ";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Turns resolved records into report lines
pub trait LineRenderer {
    /// Short name used in diagnostics and error messages
    fn name(&self) -> &'static str;

    /// Whether entries are merged into a single line emitted at exit
    fn supports_deferred_exit(&self) -> bool;

    /// Render one line; `Ok(None)` means the record produces no output
    fn render(&self, record: &LineRecord) -> Result<Option<String>>;

    /// Prefix placed before a line at `level`
    fn indent(&self, level: usize) -> String;

    /// Whether a rendered line opens a new nested call
    fn starts_nested_call(&self, _line: &str) -> bool {
        false
    }
}

/// Milliseconds with at most four decimals and no trailing zeros
pub fn format_duration(ms: f64) -> String {
    let fixed = format!("{:.4}", ms);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    // Negative zero and negatives that round to zero keep their sign otherwise
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        _ => trimmed.to_string(),
    }
}

/// Fails on a malformed strftime pattern instead of panicking inside `Display`
pub(crate) fn format_timestamp(timestamp: Option<DateTime<Utc>>, format: &str) -> Result<String> {
    let mut out = String::new();
    if let Some(t) = timestamp {
        write!(out, "{}", t.format(format))
            .map_err(|_| Error::Render(format!("invalid time format '{}'", format)))?;
    }
    Ok(out)
}

/// Collapse multi-line text (stack traces, messages) onto one line
pub(crate) fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
