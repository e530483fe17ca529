use super::{DEFAULT_INDENT, DEFAULT_TIME_FORMAT, LineRenderer, format_duration, format_timestamp, single_line};
use crate::record::{LineRecord, RecordKind};
use crate::{Error, Result};

/// Multi-line renderer: one line when a call starts, another when it returns
#[derive(Debug, Clone)]
pub struct TextRenderer {
    indent_unit: String,
    time_format: String,
    show_line_numbers: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_INDENT, DEFAULT_TIME_FORMAT)
    }
}

impl TextRenderer {
    pub fn new(indent_unit: impl Into<String>, time_format: impl Into<String>) -> Self {
        Self {
            indent_unit: indent_unit.into(),
            time_format: time_format.into(),
            show_line_numbers: false,
        }
    }

    /// Prefix every line with the running event counter
    pub fn with_line_numbers(mut self, enabled: bool) -> Self {
        self.show_line_numbers = enabled;
        self
    }

    fn timestamp(&self, record: &LineRecord) -> Result<String> {
        format_timestamp(record.timestamp, &self.time_format)
    }
}

impl LineRenderer for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn supports_deferred_exit(&self) -> bool {
        false
    }

    fn render(&self, record: &LineRecord) -> Result<Option<String>> {
        let line = match record.kind {
            RecordKind::Thread => {
                if record.title.is_empty() {
                    format!("Thread {}", record.thread_id)
                } else {
                    format!("Thread {} [{}]", record.thread_id, record.title)
                }
            }
            RecordKind::MethodEntry => format!(
                "[Enter] {} {}({})",
                self.timestamp(record)?,
                record.title,
                record.detail
            ),
            RecordKind::MethodExit => {
                let duration = format_duration(record.duration_ms);
                if record.detail.is_empty() {
                    format!("[Exit] {} ({} ms)", record.title, duration)
                } else {
                    format!(
                        "[Exit] {} = {} ({} ms)",
                        record.title, record.detail, duration
                    )
                }
            }
            RecordKind::Method => {
                return Err(Error::RendererUnsupported {
                    renderer: self.name(),
                    operation: "merged method lines",
                });
            }
            RecordKind::Exception => {
                let mut line = format!(
                    "[Exception] {} {}",
                    self.timestamp(record)?,
                    single_line(&record.title)
                );
                if !record.detail.is_empty() {
                    line.push_str(" | ");
                    line.push_str(&single_line(&record.detail));
                }
                line
            }
            RecordKind::Log => format!(
                "[Log] {} {}",
                self.timestamp(record)?,
                single_line(&record.title)
            ),
        };

        if self.show_line_numbers && record.kind != RecordKind::Thread {
            Ok(Some(format!("{:>4} {}", record.line_no, line)))
        } else {
            Ok(Some(line))
        }
    }

    fn indent(&self, level: usize) -> String {
        self.indent_unit.repeat(level)
    }
}
