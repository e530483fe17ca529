// Engine crate - turns a per-thread event stream into report lines.
// Sits between the event types and whatever writes the report out.

pub mod driver;
pub mod error;
pub mod filter;
pub mod merge;
pub mod options;
pub mod record;
pub mod render;

pub use driver::{PartialReport, TraceDriver};
pub use error::{Error, Result};
pub use filter::{AllowAll, DisplayFilter, FilterContext, FilterRules, RuleFilter};
pub use merge::MergeEngine;
pub use options::{EngineOptions, EscapePolicy, EventPlacement, IndentStrategy};
pub use record::{LineRecord, OrderedOutput, RecordKind, Stamp};
pub use render::{DelimitedRenderer, LineRenderer, SingleLineRenderer, TextRenderer};

use yalf_types::TraceEvent;

/// Render a complete event stream in one go
pub fn render_report(
    events: &[TraceEvent],
    renderer: Box<dyn LineRenderer>,
    filter: Box<dyn DisplayFilter>,
    options: EngineOptions,
) -> Result<String> {
    let mut driver = TraceDriver::new(renderer, filter, options)?;
    driver.handle_all(events)?;
    driver.complete()
}
