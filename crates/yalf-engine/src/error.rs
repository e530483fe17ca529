use std::fmt;

use yalf_types::ThreadId;

/// Result type for yalf-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while rendering a trace session
#[derive(Debug)]
pub enum Error {
    /// An exit arrived with no matching open entry on its thread.
    /// `expected` names the innermost open call, if there was one.
    UnmatchedExit {
        thread_id: ThreadId,
        method: String,
        expected: Option<String>,
    },

    /// A renderer was asked for a role it does not support
    RendererUnsupported {
        renderer: &'static str,
        operation: &'static str,
    },

    /// The display filter failed or could not be built
    Filter(String),

    /// A renderer failed to produce its line
    Render(String),

    /// The session already failed; carries the original failure
    SessionAborted(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnmatchedExit {
                thread_id,
                method,
                expected: Some(expected),
            } => write!(
                f,
                "Unmatched exit on thread {}: '{}' returned while '{}' is the innermost open call",
                thread_id, method, expected
            ),
            Error::UnmatchedExit {
                thread_id,
                method,
                expected: None,
            } => write!(
                f,
                "Unmatched exit on thread {}: '{}' returned but no call is open",
                thread_id, method
            ),
            Error::RendererUnsupported {
                renderer,
                operation,
            } => write!(
                f,
                "Renderer '{}' does not support {}",
                renderer, operation
            ),
            Error::Filter(msg) => write!(f, "Filter error: {}", msg),
            Error::Render(msg) => write!(f, "Render error: {}", msg),
            Error::SessionAborted(msg) => write!(f, "Trace session aborted: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Render(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Filter(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_exit_messages() {
        let err = Error::UnmatchedExit {
            thread_id: ThreadId(2),
            method: "Bar".to_string(),
            expected: Some("Foo".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Unmatched exit on thread 2: 'Bar' returned while 'Foo' is the innermost open call"
        );

        let err = Error::UnmatchedExit {
            thread_id: ThreadId(2),
            method: "Bar".to_string(),
            expected: None,
        };
        assert!(err.to_string().ends_with("no call is open"));
    }

    #[test]
    fn test_regex_error_maps_to_filter() {
        let err: Error = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, Error::Filter(_)));
    }
}
