// NOTE: Deferred Merge Model
//
// - Each thread owns a stack of open frames (a Vec used as an arena; push and
//   pop only ever touch the end). The stack mirrors call nesting exactly.
// - A merging renderer prints one summary per call, so nothing can be printed
//   for an entry until its exit arrives. The summary must precede whatever the
//   call produced, so a finished call with an open parent parks its lines in
//   the parent's pending list; only a call returning to top level releases
//   lines to the driver.
// - Pending lines are released in sequence order. A summary carries its
//   entry's sequence number, which puts it ahead of everything produced inside
//   the call and keeps sibling subtrees in call order.
// - Display levels are fixed when a frame or line is created. Eligibility of
//   every ancestor is known at that point (filters run at entry), so the
//   indent-escape through suppressed ancestors is resolved up front and lines
//   keep their level when they move to a parent's pending list.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use yalf_types::{ExceptionTrace, LogEvent, MethodEntry, MethodExit, ThreadId};

use crate::options::{EngineOptions, EscapePolicy, EventPlacement};
use crate::record::{LineRecord, OrderedOutput, RecordKind, Stamp};
use crate::render::LineRenderer;
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct PendingLine {
    text: String,
    seq: u64,
    level: usize,
}

#[derive(Debug, Clone)]
struct OpenFrame {
    entry: MethodEntry,
    seq: u64,
    depth: usize,
    level: usize,
    display_eligible: bool,
    pending: Vec<PendingLine>,
}

#[derive(Debug, Default)]
struct Timeline {
    frames: Vec<OpenFrame>,
}

impl Timeline {
    /// Display level for something created at the current top of the stack
    fn level_for_next(&self, policy: EscapePolicy) -> usize {
        let depth = self.frames.len();
        match policy {
            EscapePolicy::Collapse => {
                let suppressed = self.frames.iter().filter(|f| !f.display_eligible).count();
                depth - suppressed
            }
            EscapePolicy::Flatten => self
                .frames
                .iter()
                .find(|f| !f.display_eligible)
                .map(|f| f.level)
                .unwrap_or(depth),
        }
    }
}

/// Per-thread open-frame stacks and the emit/defer decisions made on them
#[derive(Debug, Default)]
pub struct MergeEngine {
    timelines: BTreeMap<ThreadId, Timeline>,
    options: EngineOptions,
}

impl MergeEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            timelines: BTreeMap::new(),
            options,
        }
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn reset(&mut self) {
        self.timelines.clear();
    }

    /// Number of calls still waiting for their exit on `thread_id`
    pub fn open_frames(&self, thread_id: ThreadId) -> usize {
        self.timelines
            .get(&thread_id)
            .map(|t| t.frames.len())
            .unwrap_or(0)
    }

    /// True when no thread has an open call
    pub fn is_idle(&self) -> bool {
        self.timelines.values().all(|t| t.frames.is_empty())
    }

    /// Visibility of the innermost open call; None at top level
    pub fn innermost_visibility(&self, thread_id: ThreadId) -> Option<bool> {
        self.timelines
            .get(&thread_id)
            .and_then(|t| t.frames.last())
            .map(|f| f.display_eligible)
    }

    pub fn on_thread_start(&mut self, thread_id: ThreadId) {
        let timeline = self.timelines.entry(thread_id).or_default();
        if !timeline.frames.is_empty() {
            log::warn!(
                "thread {} restarted with {} open call(s); discarding them",
                thread_id,
                timeline.frames.len()
            );
        }
        timeline.frames.clear();
    }

    /// Open a frame for `entry`.
    ///
    /// Merging renderers get nothing back. Independent renderers get the
    /// entry line right away when the call is shown.
    pub fn on_method_entry(
        &mut self,
        entry: &MethodEntry,
        stamp: Stamp,
        display_eligible: bool,
        renderer: &dyn LineRenderer,
    ) -> Result<Vec<OrderedOutput>> {
        let timeline = self.timelines.entry(entry.thread_id).or_default();
        let depth = timeline.frames.len();
        let level = timeline.level_for_next(self.options.escape);

        let mut output = Vec::new();
        if !renderer.supports_deferred_exit() && display_eligible {
            let record = LineRecord::new(RecordKind::MethodEntry, entry.thread_id, &entry.method)
                .with_detail(entry.args.join(", "))
                .at(Some(entry.time))
                .on_level(level)
                .numbered(stamp.line_no);
            if let Some(text) = renderer.render(&record)? {
                output.push(OrderedOutput {
                    text,
                    seq: stamp.seq,
                    indent_delta: delta(level, depth),
                });
            }
        }

        timeline.frames.push(OpenFrame {
            entry: entry.clone(),
            seq: stamp.seq,
            depth,
            level,
            display_eligible,
            pending: Vec::new(),
        });

        Ok(output)
    }

    /// Close the innermost frame of the exit's thread.
    ///
    /// Returns the lines released to the driver, with deltas relative to the
    /// depth of the closed call. Fails without touching the stack when no open
    /// call matches.
    pub fn on_method_exit(
        &mut self,
        exit: &MethodExit,
        stamp: Stamp,
        hide_return_value: bool,
        renderer: &dyn LineRenderer,
    ) -> Result<Vec<OrderedOutput>> {
        let timeline = self.timelines.entry(exit.thread_id).or_default();

        let Some(frame) = timeline
            .frames
            .pop_if(|top| top.entry.method == exit.method)
        else {
            return Err(Error::UnmatchedExit {
                thread_id: exit.thread_id,
                method: exit.method.clone(),
                expected: timeline.frames.last().map(|f| f.entry.method.clone()),
            });
        };

        let detail = exit_detail(exit, hide_return_value);

        if !renderer.supports_deferred_exit() {
            let mut output = Vec::new();
            if frame.display_eligible {
                let record = LineRecord::new(RecordKind::MethodExit, exit.thread_id, &exit.method)
                    .with_detail(detail)
                    .at(exit_time(&frame.entry, exit))
                    .lasting(exit.elapsed_ms)
                    .on_level(frame.level)
                    .numbered(stamp.line_no);
                if let Some(text) = renderer.render(&record)? {
                    output.push(OrderedOutput {
                        text,
                        seq: stamp.seq,
                        indent_delta: delta(frame.level, frame.depth),
                    });
                }
            }
            output.extend(release(frame.pending, frame.depth));
            return Ok(output);
        }

        let mut lines = Vec::with_capacity(frame.pending.len() + 1);
        if frame.display_eligible {
            let record = LineRecord::new(RecordKind::Method, exit.thread_id, &exit.method)
                .with_detail(detail)
                .at(Some(frame.entry.time))
                .lasting(exit.elapsed_ms)
                .on_level(frame.level)
                .numbered(stamp.line_no);
            if let Some(text) = renderer.render(&record)? {
                lines.push(PendingLine {
                    text,
                    seq: frame.seq,
                    level: frame.level,
                });
            }
        }
        lines.extend(frame.pending);

        if let Some(parent) = timeline.frames.last_mut() {
            if !lines.is_empty() {
                log::debug!(
                    "thread {}: deferring {} line(s) of '{}' into '{}'",
                    exit.thread_id,
                    lines.len(),
                    exit.method,
                    parent.entry.method
                );
            }
            parent.pending.extend(lines);
            return Ok(Vec::new());
        }

        log::debug!(
            "thread {}: '{}' returned to top level, flushing {} line(s)",
            exit.thread_id,
            exit.method,
            lines.len()
        );
        Ok(release(lines, frame.depth))
    }

    /// Exceptions are always shown
    pub fn on_exception(
        &mut self,
        exception: &ExceptionTrace,
        stamp: Stamp,
        renderer: &dyn LineRenderer,
    ) -> Result<Vec<OrderedOutput>> {
        let record = LineRecord::new(RecordKind::Exception, exception.thread_id, &exception.message)
            .with_detail(exception.stack_trace.clone().unwrap_or_default())
            .at(Some(exception.time))
            .numbered(stamp.line_no);
        self.place_content(exception.thread_id, record, stamp, renderer)
    }

    pub fn on_log_event(
        &mut self,
        event: &LogEvent,
        stamp: Stamp,
        display_eligible: bool,
        renderer: &dyn LineRenderer,
    ) -> Result<Vec<OrderedOutput>> {
        if !display_eligible {
            return Ok(Vec::new());
        }

        let record = LineRecord::new(RecordKind::Log, event.thread_id, &event.message)
            .at(Some(event.time))
            .numbered(stamp.line_no);
        self.place_content(event.thread_id, record, stamp, renderer)
    }

    /// Close every frame that never saw its exit.
    ///
    /// Unfinished calls get no summary, but the lines they were holding are
    /// returned (deltas relative to level 0) so a truncated trace loses nothing.
    pub fn drain_unfinished(&mut self) -> Vec<OrderedOutput> {
        let mut output = Vec::new();

        for (thread_id, timeline) in self.timelines.iter_mut() {
            if timeline.frames.is_empty() {
                continue;
            }

            log::warn!(
                "thread {}: {} call(s) never returned, innermost '{}'",
                thread_id,
                timeline.frames.len(),
                timeline
                    .frames
                    .last()
                    .map(|f| f.entry.method.as_str())
                    .unwrap_or_default()
            );

            let mut lines: Vec<PendingLine> = timeline
                .frames
                .drain(..)
                .flat_map(|f| f.pending)
                .collect();
            lines.sort_by_key(|l| l.seq);
            output.extend(release(lines, 0));
        }

        output
    }

    fn place_content(
        &mut self,
        thread_id: ThreadId,
        record: LineRecord,
        stamp: Stamp,
        renderer: &dyn LineRenderer,
    ) -> Result<Vec<OrderedOutput>> {
        let timeline = self.timelines.entry(thread_id).or_default();
        let depth = timeline.frames.len();
        let level = timeline.level_for_next(self.options.escape);

        let Some(text) = renderer.render(&record.on_level(level))? else {
            return Ok(Vec::new());
        };

        if self.options.placement == EventPlacement::Nested
            && let Some(top) = timeline.frames.last_mut()
        {
            top.pending.push(PendingLine {
                text,
                seq: stamp.seq,
                level,
            });
            return Ok(Vec::new());
        }

        Ok(vec![OrderedOutput {
            text,
            seq: stamp.seq,
            indent_delta: delta(level, depth),
        }])
    }
}

fn delta(level: usize, base: usize) -> isize {
    level as isize - base as isize
}

fn release(mut lines: Vec<PendingLine>, base: usize) -> Vec<OrderedOutput> {
    lines.sort_by_key(|l| l.seq);
    lines
        .into_iter()
        .map(|l| OrderedOutput {
            indent_delta: delta(l.level, base),
            text: l.text,
            seq: l.seq,
        })
        .collect()
}

fn exit_detail(exit: &MethodExit, hide_return_value: bool) -> String {
    if !exit.completed {
        return "<threw>".to_string();
    }
    if hide_return_value {
        return String::new();
    }
    exit.return_value.clone().unwrap_or_default()
}

/// Entry time plus elapsed; None when the sum leaves chrono's range
fn exit_time(entry: &MethodEntry, exit: &MethodExit) -> Option<chrono::DateTime<chrono::Utc>> {
    let micros = (exit.elapsed_ms * 1000.0).round() as i64;
    entry
        .time
        .checked_add_signed(TimeDelta::microseconds(micros))
}
