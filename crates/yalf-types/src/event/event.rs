use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payload::{ExceptionTrace, LogEvent, MethodEntry, MethodExit, ThreadStart};
use super::thread::ThreadId;

// NOTE: Stream Contract
//
// - Events arrive in the order the instrumentation observed them. That order is
//   authoritative; nothing downstream reorders across threads.
// - Entries and exits on one thread are well-nested. A violation is a defect of
//   the producer and is reported, never repaired.
// - Sequence numbers and nesting depth are not part of the wire format: the
//   driver assigns them when it accepts an event.

/// One record of the instrumentation stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
#[serde(rename_all = "snake_case")]
pub enum TraceEvent {
    /// A thread became current; resets that thread's timeline
    ThreadStart(ThreadStart),

    /// A call began
    MethodEntry(MethodEntry),

    /// The innermost open call on the thread returned (or threw)
    MethodExit(MethodExit),

    /// An exception was observed at the current depth
    Exception(ExceptionTrace),

    /// Free-form message logged at the current depth
    LogEvent(LogEvent),
}

impl TraceEvent {
    pub fn thread_id(&self) -> ThreadId {
        match self {
            TraceEvent::ThreadStart(e) => e.thread_id,
            TraceEvent::MethodEntry(e) => e.thread_id,
            TraceEvent::MethodExit(e) => e.thread_id,
            TraceEvent::Exception(e) => e.thread_id,
            TraceEvent::LogEvent(e) => e.thread_id,
        }
    }

    /// Timestamp carried by the event; thread starts and exits have none
    pub fn time(&self) -> Option<DateTime<Utc>> {
        match self {
            TraceEvent::MethodEntry(e) => Some(e.time),
            TraceEvent::Exception(e) => Some(e.time),
            TraceEvent::LogEvent(e) => Some(e.time),
            TraceEvent::ThreadStart(_) | TraceEvent::MethodExit(_) => None,
        }
    }

    /// Wire name of the variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            TraceEvent::ThreadStart(_) => "thread_start",
            TraceEvent::MethodEntry(_) => "method_entry",
            TraceEvent::MethodExit(_) => "method_exit",
            TraceEvent::Exception(_) => "exception",
            TraceEvent::LogEvent(_) => "log_event",
        }
    }

    /// Method name for entries and exits
    pub fn method(&self) -> Option<&str> {
        match self {
            TraceEvent::MethodEntry(e) => Some(&e.method),
            TraceEvent::MethodExit(e) => Some(&e.method),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serialization() {
        let event = TraceEvent::MethodEntry(MethodEntry {
            thread_id: ThreadId(1),
            method: "Orders.Submit".to_string(),
            args: vec!["42".to_string()],
            time: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""kind":"method_entry""#));

        let deserialized: TraceEvent = serde_json::from_str(&json).unwrap();
        match deserialized {
            TraceEvent::MethodEntry(entry) => {
                assert_eq!(entry.method, "Orders.Submit");
                assert_eq!(entry.args, vec!["42"]);
            }
            _ => panic!("Wrong event kind"),
        }
    }

    #[test]
    fn test_accessors() {
        let exit = TraceEvent::MethodExit(MethodExit {
            thread_id: ThreadId(4),
            method: "Foo".to_string(),
            return_value: None,
            elapsed_ms: 1.5,
            completed: true,
        });

        assert_eq!(exit.thread_id(), ThreadId(4));
        assert_eq!(exit.kind(), "method_exit");
        assert_eq!(exit.method(), Some("Foo"));
        assert_eq!(exit.time(), None);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<TraceEvent, _> =
            serde_json::from_str(r#"{"kind": "method_enter", "thread_id": 1}"#);
        assert!(result.is_err());
    }
}
