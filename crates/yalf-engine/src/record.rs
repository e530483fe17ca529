use chrono::{DateTime, Utc};
use yalf_types::ThreadId;

/// Role of a line handed to a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Thread header
    Thread,
    /// Call start, for renderers that print entries and exits separately
    MethodEntry,
    /// Call end, for renderers that print entries and exits separately
    MethodExit,
    /// Entry and exit merged into one summary line
    Method,
    Exception,
    Log,
}

/// Fully-resolved content of one report line
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    pub kind: RecordKind,
    pub title: String,
    pub detail: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub duration_ms: f64,
    /// Display level after indent-escape
    pub level: usize,
    pub thread_id: ThreadId,
    /// Running counter of handled events; display only
    pub line_no: usize,
}

impl LineRecord {
    pub fn new(kind: RecordKind, thread_id: ThreadId, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            detail: String::new(),
            timestamp: None,
            duration_ms: 0.0,
            level: 0,
            thread_id,
            line_no: 0,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn at(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn lasting(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn on_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    pub fn numbered(mut self, line_no: usize) -> Self {
        self.line_no = line_no;
        self
    }
}

/// A rendered line handed back by the engine.
///
/// `indent_delta` is relative to the depth of the event that released the
/// line; it goes negative when suppressed ancestors were collapsed away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedOutput {
    pub text: String,
    pub seq: u64,
    pub indent_delta: isize,
}

/// Driver-assigned position of an event within its thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub seq: u64,
    pub line_no: usize,
}
