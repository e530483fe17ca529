//! Fluent builder for trace event streams.
//!
//! Timestamps start at 2024-05-01T10:00:00Z and advance one millisecond per
//! event, so elapsed times of exits are derived from the matching entry.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use yalf_types::{
    ExceptionTrace, LogEvent, MethodEntry, MethodExit, ThreadId, ThreadStart, TraceEvent,
};

pub struct TraceBuilder {
    events: Vec<TraceEvent>,
    thread: ThreadId,
    now: DateTime<Utc>,
    open: HashMap<ThreadId, Vec<(String, DateTime<Utc>)>>,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            thread: ThreadId(1),
            now: Self::epoch(),
            open: HashMap::new(),
        }
    }

    /// Time of the first event
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    /// Emit a thread start and make it the current thread
    pub fn thread(mut self, id: u32) -> Self {
        self.thread = ThreadId(id);
        self.events.push(TraceEvent::ThreadStart(ThreadStart {
            thread_id: self.thread,
            name: None,
        }));
        self
    }

    pub fn named_thread(mut self, id: u32, name: &str) -> Self {
        self.thread = ThreadId(id);
        self.events.push(TraceEvent::ThreadStart(ThreadStart {
            thread_id: self.thread,
            name: Some(name.to_string()),
        }));
        self
    }

    /// Switch the current thread without emitting a thread start
    pub fn on_thread(mut self, id: u32) -> Self {
        self.thread = ThreadId(id);
        self
    }

    pub fn enter(self, method: &str) -> Self {
        self.enter_with_args(method, &[])
    }

    pub fn enter_with_args(mut self, method: &str, args: &[&str]) -> Self {
        let time = self.tick();
        self.open
            .entry(self.thread)
            .or_default()
            .push((method.to_string(), time));
        self.events.push(TraceEvent::MethodEntry(MethodEntry {
            thread_id: self.thread,
            method: method.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            time,
        }));
        self
    }

    pub fn exit(self, method: &str) -> Self {
        self.push_exit(method, None, true)
    }

    pub fn exit_with(self, method: &str, return_value: &str) -> Self {
        self.push_exit(method, Some(return_value.to_string()), true)
    }

    /// Exit of a call that ended by throwing
    pub fn exit_threw(self, method: &str) -> Self {
        self.push_exit(method, None, false)
    }

    pub fn log(mut self, message: &str) -> Self {
        let time = self.tick();
        self.events.push(TraceEvent::LogEvent(LogEvent {
            thread_id: self.thread,
            message: message.to_string(),
            time,
        }));
        self
    }

    pub fn exception(mut self, message: &str, stack_trace: Option<&str>) -> Self {
        let time = self.tick();
        self.events.push(TraceEvent::Exception(ExceptionTrace {
            thread_id: self.thread,
            message: message.to_string(),
            stack_trace: stack_trace.map(str::to_string),
            time,
        }));
        self
    }

    pub fn build(self) -> Vec<TraceEvent> {
        self.events
    }

    /// JSON-lines encoding of the stream, as the CLI reads it
    pub fn to_jsonl(&self) -> String {
        self.events
            .iter()
            .map(|e| serde_json::to_string(e).expect("trace events serialize"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn push_exit(mut self, method: &str, return_value: Option<String>, completed: bool) -> Self {
        let time = self.tick();
        // An exit with no open entry is allowed so malformed streams can be built
        let started = self
            .open
            .get_mut(&self.thread)
            .and_then(|stack| stack.pop())
            .map(|(_, start)| start)
            .unwrap_or(time);
        let elapsed_ms = (time - started).num_microseconds().unwrap_or(0) as f64 / 1000.0;

        self.events.push(TraceEvent::MethodExit(MethodExit {
            thread_id: self.thread,
            method: method.to_string(),
            return_value,
            elapsed_ms,
            completed,
        }));
        self
    }

    fn tick(&mut self) -> DateTime<Utc> {
        let time = self.now;
        self.now += TimeDelta::milliseconds(1);
        time
    }
}
