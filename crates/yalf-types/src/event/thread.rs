use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the logical execution thread an event was recorded on.
///
/// Each thread has its own timeline; events of different threads are never
/// related to one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub u32);

impl ThreadId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for ThreadId {
    fn from(id: u32) -> Self {
        ThreadId(id)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
