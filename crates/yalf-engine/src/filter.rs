use regex::Regex;
use serde::{Deserialize, Serialize};
use yalf_types::{ThreadId, TraceEvent};

use crate::Result;

/// What the filter knows about the position of the event being judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterContext {
    pub thread_id: ThreadId,
    /// Nesting depth of the event (number of open calls on its thread)
    pub depth: usize,
    /// Whether the innermost open call is shown; true at top level
    pub enclosing_visible: bool,
}

/// Decides display eligibility of entries, exceptions and log events.
///
/// Queried once per event; the answer for an entry is cached on its frame
/// until the matching exit. Errors abort the session.
pub trait DisplayFilter {
    fn is_display_eligible(&self, event: &TraceEvent, ctx: &FilterContext) -> Result<bool>;

    /// Strip return values from merged and exit lines
    fn hide_return_values(&self) -> bool {
        false
    }
}

/// Shows everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl DisplayFilter for AllowAll {
    fn is_display_eligible(&self, _event: &TraceEvent, _ctx: &FilterContext) -> Result<bool> {
        Ok(true)
    }
}

/// Serializable filter rules, as found in the configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// When non-empty, only methods matching one of these patterns are shown
    pub include: Vec<String>,
    /// Methods matching any of these patterns are hidden; wins over `include`
    pub exclude: Vec<String>,
    /// Deepest call level shown, 0 being top-level calls
    pub max_depth: Option<usize>,
    pub hide_log_events: bool,
    pub hide_return_values: bool,
}

/// Pattern and depth based filter compiled from [`FilterRules`]
#[derive(Debug, Clone)]
pub struct RuleFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    max_depth: Option<usize>,
    hide_log_events: bool,
    hide_return_values: bool,
}

impl RuleFilter {
    pub fn from_rules(rules: &FilterRules) -> Result<Self> {
        Ok(Self {
            include: compile_all(&rules.include)?,
            exclude: compile_all(&rules.exclude)?,
            max_depth: rules.max_depth,
            hide_log_events: rules.hide_log_events,
            hide_return_values: rules.hide_return_values,
        })
    }

    fn method_visible(&self, method: &str, depth: usize) -> bool {
        if let Some(max) = self.max_depth
            && depth > max
        {
            return false;
        }

        if self.exclude.iter().any(|re| re.is_match(method)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|re| re.is_match(method))
    }
}

impl DisplayFilter for RuleFilter {
    fn is_display_eligible(&self, event: &TraceEvent, ctx: &FilterContext) -> Result<bool> {
        Ok(match event {
            TraceEvent::MethodEntry(entry) => self.method_visible(&entry.method, ctx.depth),
            TraceEvent::LogEvent(_) => !self.hide_log_events,
            TraceEvent::ThreadStart(_) | TraceEvent::MethodExit(_) | TraceEvent::Exception(_) => {
                true
            }
        })
    }

    fn hide_return_values(&self) -> bool {
        self.hide_return_values
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(Into::into))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use chrono::{TimeZone, Utc};
    use yalf_types::{ExceptionTrace, LogEvent, MethodEntry};

    fn entry(method: &str) -> TraceEvent {
        TraceEvent::MethodEntry(MethodEntry {
            thread_id: ThreadId(1),
            method: method.to_string(),
            args: Vec::new(),
            time: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        })
    }

    fn ctx(depth: usize) -> FilterContext {
        FilterContext {
            thread_id: ThreadId(1),
            depth,
            enclosing_visible: true,
        }
    }

    #[test]
    fn test_exclude_wins_over_include() -> Result<()> {
        let filter = RuleFilter::from_rules(&FilterRules {
            include: vec!["^Orders\\.".to_string()],
            exclude: vec!["Internal".to_string()],
            ..Default::default()
        })?;

        assert!(filter.is_display_eligible(&entry("Orders.Submit"), &ctx(0))?);
        assert!(!filter.is_display_eligible(&entry("Orders.InternalCheck"), &ctx(0))?);
        assert!(!filter.is_display_eligible(&entry("Billing.Charge"), &ctx(0))?);
        Ok(())
    }

    #[test]
    fn test_max_depth() -> Result<()> {
        let filter = RuleFilter::from_rules(&FilterRules {
            max_depth: Some(1),
            ..Default::default()
        })?;

        assert!(filter.is_display_eligible(&entry("A"), &ctx(0))?);
        assert!(filter.is_display_eligible(&entry("B"), &ctx(1))?);
        assert!(!filter.is_display_eligible(&entry("C"), &ctx(2))?);
        Ok(())
    }

    #[test]
    fn test_log_events_and_exceptions() -> Result<()> {
        let filter = RuleFilter::from_rules(&FilterRules {
            hide_log_events: true,
            exclude: vec![".*".to_string()],
            ..Default::default()
        })?;
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();

        let log = TraceEvent::LogEvent(LogEvent {
            thread_id: ThreadId(1),
            message: "hello".to_string(),
            time,
        });
        let exception = TraceEvent::Exception(ExceptionTrace {
            thread_id: ThreadId(1),
            message: "boom".to_string(),
            stack_trace: None,
            time,
        });

        assert!(!filter.is_display_eligible(&log, &ctx(0))?);
        assert!(filter.is_display_eligible(&exception, &ctx(0))?);
        Ok(())
    }

    #[test]
    fn test_invalid_pattern() {
        let err = RuleFilter::from_rules(&FilterRules {
            exclude: vec!["[unclosed".to_string()],
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(err, Error::Filter(_)));
    }

    #[test]
    fn test_allow_all() -> Result<()> {
        assert!(AllowAll.is_display_eligible(&entry("Anything"), &ctx(9))?);
        assert!(!AllowAll.hide_return_values());
        Ok(())
    }
}
