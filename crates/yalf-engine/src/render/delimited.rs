use super::{LineRenderer, format_duration, format_timestamp, single_line};
use crate::record::{LineRecord, RecordKind};
use crate::{Error, Result};

pub const DEFAULT_CONTEXT: &str = "Yalf";
pub const DEFAULT_DELIMITER: char = ',';
pub const DEFAULT_DELIMITED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Merging renderer producing one delimited row per line:
/// `context, type, title, details, timestamp, duration, level, thread`.
///
/// Rows carry their level as a column, so no indentation is applied.
#[derive(Debug, Clone)]
pub struct DelimitedRenderer {
    context: String,
    delimiter: u8,
    time_format: String,
    method_prefix: String,
}

impl DelimitedRenderer {
    pub fn new(
        context: impl Into<String>,
        delimiter: char,
        time_format: impl Into<String>,
    ) -> Result<Self> {
        if !delimiter.is_ascii() {
            return Err(Error::Render(format!(
                "delimiter '{}' is not a single-byte character",
                delimiter
            )));
        }

        let context = context.into();
        let delimiter = delimiter as u8;
        let mut method_prefix = write_row(delimiter, &[context.as_str(), "Method"])?;
        method_prefix.push(delimiter as char);

        Ok(Self {
            context,
            delimiter,
            time_format: time_format.into(),
            method_prefix,
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            context: DEFAULT_CONTEXT.to_string(),
            delimiter: DEFAULT_DELIMITER as u8,
            time_format: DEFAULT_DELIMITED_TIME_FORMAT.to_string(),
            method_prefix: format!("{}{}Method{}", DEFAULT_CONTEXT, DEFAULT_DELIMITER, DEFAULT_DELIMITER),
        }
    }

    fn row(&self, log_type: &str, title: &str, details: &str, record: &LineRecord) -> Result<String> {
        let timestamp = format_timestamp(record.timestamp, &self.time_format)?;
        let duration = format_duration(record.duration_ms);
        let level = record.level.to_string();
        let thread = record.thread_id.to_string();

        write_row(
            self.delimiter,
            &[
                self.context.as_str(),
                log_type,
                title,
                details,
                timestamp.as_str(),
                duration.as_str(),
                level.as_str(),
                thread.as_str(),
            ],
        )
    }
}

impl LineRenderer for DelimitedRenderer {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn supports_deferred_exit(&self) -> bool {
        true
    }

    fn render(&self, record: &LineRecord) -> Result<Option<String>> {
        match record.kind {
            RecordKind::Thread => Ok(None),
            RecordKind::Method => self
                .row("Method", &record.title, &record.detail, record)
                .map(Some),
            RecordKind::Exception => {
                let title = single_line(&record.title);
                let details = single_line(&record.detail);
                let exception = LineRecord {
                    duration_ms: 0.0,
                    ..record.clone()
                };
                self.row("Exception", &title, &details, &exception).map(Some)
            }
            RecordKind::Log => {
                let log = LineRecord {
                    duration_ms: 0.0,
                    ..record.clone()
                };
                self.row("Log", &single_line(&record.title), "", &log)
                    .map(Some)
            }
            RecordKind::MethodEntry | RecordKind::MethodExit => Err(Error::RendererUnsupported {
                renderer: self.name(),
                operation: "independent entry and exit lines",
            }),
        }
    }

    fn indent(&self, _level: usize) -> String {
        String::new()
    }

    fn starts_nested_call(&self, line: &str) -> bool {
        line.starts_with(&self.method_prefix)
    }
}

fn write_row(delimiter: u8, fields: &[&str]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(fields)?;

    let bytes = writer
        .into_inner()
        .map_err(|err| Error::Render(err.to_string()))?;
    let row = String::from_utf8(bytes).map_err(|err| Error::Render(err.to_string()))?;

    Ok(row.trim_end_matches('\n').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use yalf_types::ThreadId;

    fn at(kind: RecordKind, title: &str) -> LineRecord {
        LineRecord::new(kind, ThreadId(3), title)
            .at(Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()))
            .on_level(2)
    }

    #[test]
    fn test_method_row() -> Result<()> {
        let renderer = DelimitedRenderer::with_defaults();
        let row = renderer.render(&at(RecordKind::Method, "Foo").with_detail("42").lasting(12.5))?;
        assert_eq!(
            row.as_deref(),
            Some("Yalf,Method,Foo,42,2024-05-01 10:00:00.000,12.5,2,3")
        );
        Ok(())
    }

    #[test]
    fn test_fields_are_quoted_when_needed() -> Result<()> {
        let renderer = DelimitedRenderer::with_defaults();
        let row = renderer.render(&at(RecordKind::Log, "a, b"))?;
        assert_eq!(
            row.as_deref(),
            Some("Yalf,Log,\"a, b\",,2024-05-01 10:00:00.000,0,2,3")
        );
        Ok(())
    }

    #[test]
    fn test_exception_row_is_single_line() -> Result<()> {
        let renderer = DelimitedRenderer::new("App", ';', "%H:%M:%S")?;
        let row = renderer.render(
            &at(RecordKind::Exception, "boom\nagain")
                .with_detail("at Foo()\nat Main()")
                .lasting(5.0),
        )?;
        assert_eq!(
            row.as_deref(),
            Some("App;Exception;boom again;at Foo() at Main();10:00:00;0;2;3")
        );
        Ok(())
    }

    #[test]
    fn test_thread_header_suppressed() -> Result<()> {
        let renderer = DelimitedRenderer::with_defaults();
        assert_eq!(renderer.render(&at(RecordKind::Thread, "main"))?, None);
        assert_eq!(renderer.indent(4), "");
        Ok(())
    }

    #[test]
    fn test_nested_call_hint() -> Result<()> {
        let renderer = DelimitedRenderer::new("App", '|', "%H")?;
        let method = renderer.render(&at(RecordKind::Method, "Foo"))?.unwrap();
        let log = renderer.render(&at(RecordKind::Log, "Method"))?.unwrap();

        assert!(renderer.starts_nested_call(&method));
        assert!(!renderer.starts_nested_call(&log));
        Ok(())
    }

    #[test]
    fn test_bad_time_format() -> Result<()> {
        let renderer = DelimitedRenderer::new("App", ',', "%Y-%Q")?;
        let err = renderer.render(&at(RecordKind::Method, "Foo")).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
        Ok(())
    }

    #[test]
    fn test_rejects_multibyte_delimiter() {
        let err = DelimitedRenderer::new("App", '→', "%H").unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}
