use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::thread::ThreadId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadStart {
    pub thread_id: ThreadId,

    /// Human-readable thread name, if the runtime provided one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodEntry {
    pub thread_id: ThreadId,

    /// Fully qualified method name
    pub method: String,

    /// Rendered argument values, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Call start time
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodExit {
    pub thread_id: ThreadId,

    /// Must match the method of the innermost open entry on this thread
    pub method: String,

    /// Rendered return value; None for void methods or when not recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<String>,

    /// Wall time spent in the call
    #[serde(default)]
    pub elapsed_ms: f64,

    /// False when the call ended by throwing
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionTrace {
    pub thread_id: ThreadId,
    pub message: String,

    /// Multi-line stack text as captured at the throw site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,

    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub thread_id: ThreadId,
    pub message: String,
    pub time: DateTime<Utc>,
}
