use super::{DEFAULT_INDENT, DEFAULT_TIME_FORMAT, LineRenderer, format_duration, format_timestamp, single_line};
use crate::record::{LineRecord, RecordKind};
use crate::{Error, Result};

const CALL_MARKER: &str = "[Call]";

/// Indentable merging renderer: one `[Call]` line per call carrying both the
/// start time and the return value
#[derive(Debug, Clone)]
pub struct SingleLineRenderer {
    indent_unit: String,
    time_format: String,
}

impl Default for SingleLineRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_INDENT, DEFAULT_TIME_FORMAT)
    }
}

impl SingleLineRenderer {
    pub fn new(indent_unit: impl Into<String>, time_format: impl Into<String>) -> Self {
        Self {
            indent_unit: indent_unit.into(),
            time_format: time_format.into(),
        }
    }
}

impl LineRenderer for SingleLineRenderer {
    fn name(&self) -> &'static str {
        "single-line"
    }

    fn supports_deferred_exit(&self) -> bool {
        true
    }

    fn render(&self, record: &LineRecord) -> Result<Option<String>> {
        let timestamp = format_timestamp(record.timestamp, &self.time_format)?;

        let line = match record.kind {
            RecordKind::Thread => {
                if record.title.is_empty() {
                    format!("Thread {}", record.thread_id)
                } else {
                    format!("Thread {} [{}]", record.thread_id, record.title)
                }
            }
            RecordKind::Method => {
                let duration = format_duration(record.duration_ms);
                if record.detail.is_empty() {
                    format!(
                        "{} {} started {} ({} ms)",
                        CALL_MARKER, record.title, timestamp, duration
                    )
                } else {
                    format!(
                        "{} {} = {} started {} ({} ms)",
                        CALL_MARKER, record.title, record.detail, timestamp, duration
                    )
                }
            }
            RecordKind::MethodEntry | RecordKind::MethodExit => {
                return Err(Error::RendererUnsupported {
                    renderer: self.name(),
                    operation: "independent entry and exit lines",
                });
            }
            RecordKind::Exception => {
                let mut line = format!("[Exception] {} {}", timestamp, single_line(&record.title));
                if !record.detail.is_empty() {
                    line.push_str(" | ");
                    line.push_str(&single_line(&record.detail));
                }
                line
            }
            RecordKind::Log => format!("[Log] {} {}", timestamp, single_line(&record.title)),
        };

        Ok(Some(line))
    }

    fn indent(&self, level: usize) -> String {
        self.indent_unit.repeat(level)
    }

    fn starts_nested_call(&self, line: &str) -> bool {
        line.trim_start().starts_with(CALL_MARKER)
    }
}
