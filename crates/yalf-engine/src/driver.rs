use std::collections::BTreeMap;

use yalf_types::{ThreadId, ThreadStart, TraceEvent};

use crate::filter::{DisplayFilter, FilterContext};
use crate::merge::MergeEngine;
use crate::options::{EngineOptions, EventPlacement, IndentStrategy};
use crate::record::{LineRecord, OrderedOutput, RecordKind, Stamp};
use crate::render::LineRenderer;
use crate::{Error, Result};

/// Text of a session that failed part-way, kept apart from `complete()` so it
/// cannot be mistaken for a finished report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialReport {
    pub text: String,
    /// Why the session stopped, if it did
    pub failure: Option<String>,
}

impl PartialReport {
    pub fn is_partial(&self) -> bool {
        self.failure.is_some()
    }
}

/// Feeds one trace session through the merge engine and collects the report
pub struct TraceDriver {
    renderer: Box<dyn LineRenderer>,
    filter: Box<dyn DisplayFilter>,
    engine: MergeEngine,
    buffer: String,
    current_thread: Option<ThreadId>,
    indent: BTreeMap<ThreadId, usize>,
    next_seq: BTreeMap<ThreadId, u64>,
    line_number: usize,
    failure: Option<String>,
}

impl TraceDriver {
    /// Build a driver, rejecting option combinations the renderer cannot honour
    pub fn new(
        renderer: Box<dyn LineRenderer>,
        filter: Box<dyn DisplayFilter>,
        options: EngineOptions,
    ) -> Result<Self> {
        if !renderer.supports_deferred_exit() {
            if options.placement == EventPlacement::Nested {
                return Err(Error::RendererUnsupported {
                    renderer: renderer.name(),
                    operation: "nested event placement",
                });
            }
            if options.indent == IndentStrategy::NestedCallHint {
                return Err(Error::RendererUnsupported {
                    renderer: renderer.name(),
                    operation: "nested-call indent hints",
                });
            }
        }

        let mut driver = Self {
            renderer,
            filter,
            engine: MergeEngine::new(options),
            buffer: String::new(),
            current_thread: None,
            indent: BTreeMap::new(),
            next_seq: BTreeMap::new(),
            line_number: 0,
            failure: None,
        };
        driver.initialise();
        Ok(driver)
    }

    /// Start a fresh session: empty buffer, no open calls, counters at zero
    pub fn initialise(&mut self) {
        self.buffer = String::with_capacity(4096);
        self.engine.reset();
        self.current_thread = None;
        self.indent.clear();
        self.next_seq.clear();
        self.line_number = 0;
        self.failure = None;
    }

    pub fn current_thread(&self) -> Option<ThreadId> {
        self.current_thread
    }

    /// Events that produced or could produce a line so far
    pub fn lines_handled(&self) -> usize {
        self.line_number
    }

    pub fn engine(&self) -> &MergeEngine {
        &self.engine
    }

    pub fn handle_all<'a, I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a TraceEvent>,
    {
        for event in events {
            self.handle(event)?;
        }
        Ok(())
    }

    /// Process one event. The first failure aborts the session: later calls
    /// return `SessionAborted` and the report is only reachable through
    /// `partial_report`.
    pub fn handle(&mut self, event: &TraceEvent) -> Result<()> {
        if let Some(failure) = &self.failure {
            return Err(Error::SessionAborted(failure.clone()));
        }

        self.dispatch(event).inspect_err(|err| {
            log::debug!("aborting trace session on {}: {}", event.kind(), err);
            self.failure = Some(err.to_string());
        })
    }

    /// Release what unfinished calls were holding and hand out the report.
    /// The driver is re-initialised afterwards.
    pub fn complete(&mut self) -> Result<String> {
        if let Some(failure) = &self.failure {
            return Err(Error::SessionAborted(failure.clone()));
        }

        for line in self.engine.drain_unfinished() {
            let level = offset_level(0, line.indent_delta);
            self.add_line(&line.text, level);
        }

        let report = std::mem::take(&mut self.buffer);
        self.initialise();
        Ok(report)
    }

    pub fn partial_report(&self) -> PartialReport {
        PartialReport {
            text: self.buffer.clone(),
            failure: self.failure.clone(),
        }
    }

    fn dispatch(&mut self, event: &TraceEvent) -> Result<()> {
        let thread_id = event.thread_id();

        match event {
            TraceEvent::ThreadStart(start) => {
                self.handle_thread(start)?;
            }
            TraceEvent::MethodEntry(entry) => {
                let level = self.indent_of(thread_id);
                let eligible = self.evaluate(event, level)?;
                let stamp = self.stamp(thread_id);
                let output =
                    self.engine
                        .on_method_entry(entry, stamp, eligible, self.renderer.as_ref())?;
                self.indent.insert(thread_id, level + 1);
                self.append_at_delta(&output, level);
            }
            TraceEvent::MethodExit(exit) => {
                let level = self.indent_of(thread_id).saturating_sub(1);
                let stamp = self.stamp(thread_id);
                let hide = self.filter.hide_return_values();
                let output =
                    self.engine
                        .on_method_exit(exit, stamp, hide, self.renderer.as_ref())?;
                self.indent.insert(thread_id, level);
                self.append_exit_batch(&output, level);
            }
            TraceEvent::Exception(exception) => {
                let level = self.indent_of(thread_id);
                // Exceptions are always shown; only a filter failure matters here
                self.evaluate(event, level)?;
                let stamp = self.stamp(thread_id);
                let output = self
                    .engine
                    .on_exception(exception, stamp, self.renderer.as_ref())?;
                self.append_content(&output, level);
            }
            TraceEvent::LogEvent(log_event) => {
                let level = self.indent_of(thread_id);
                let eligible = self.evaluate(event, level)?;
                let stamp = self.stamp(thread_id);
                let output = self.engine.on_log_event(
                    log_event,
                    stamp,
                    eligible,
                    self.renderer.as_ref(),
                )?;
                self.append_content(&output, level);
            }
        }

        Ok(())
    }

    fn handle_thread(&mut self, start: &ThreadStart) -> Result<()> {
        self.current_thread = Some(start.thread_id);
        self.engine.on_thread_start(start.thread_id);
        self.indent.insert(start.thread_id, 0);

        let record = LineRecord::new(
            RecordKind::Thread,
            start.thread_id,
            start.name.clone().unwrap_or_default(),
        );
        if let Some(text) = self.renderer.render(&record)? {
            self.add_line(&text, 0);
        }
        Ok(())
    }

    fn evaluate(&self, event: &TraceEvent, depth: usize) -> Result<bool> {
        let thread_id = event.thread_id();
        let ctx = FilterContext {
            thread_id,
            depth,
            enclosing_visible: self.engine.innermost_visibility(thread_id).unwrap_or(true),
        };
        self.filter.is_display_eligible(event, &ctx)
    }

    fn indent_of(&self, thread_id: ThreadId) -> usize {
        self.indent.get(&thread_id).copied().unwrap_or(0)
    }

    fn stamp(&mut self, thread_id: ThreadId) -> Stamp {
        let seq = self.next_seq.entry(thread_id).or_insert(0);
        *seq += 1;
        self.line_number += 1;
        Stamp {
            seq: *seq,
            line_no: self.line_number,
        }
    }

    fn append_at_delta(&mut self, output: &[OrderedOutput], base: usize) {
        for line in output {
            self.add_line(&line.text, offset_level(base, line.indent_delta));
        }
    }

    fn append_exit_batch(&mut self, output: &[OrderedOutput], base: usize) {
        match self.engine.options().indent {
            IndentStrategy::Engine => self.append_at_delta(output, base),
            IndentStrategy::NestedCallHint => {
                let mut offset = 0;
                for line in output {
                    self.add_line(&line.text, base + offset);
                    if self.renderer.starts_nested_call(&line.text) {
                        offset += 1;
                    }
                }
            }
        }
    }

    fn append_content(&mut self, output: &[OrderedOutput], level: usize) {
        match self.engine.options().indent {
            IndentStrategy::Engine => self.append_at_delta(output, level),
            IndentStrategy::NestedCallHint => {
                for line in output {
                    self.add_line(&line.text, level);
                }
            }
        }
    }

    fn add_line(&mut self, text: &str, level: usize) {
        self.buffer.push_str(&self.renderer.indent(level));
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}

fn offset_level(base: usize, delta: isize) -> usize {
    base.saturating_add_signed(delta)
}
