use crate::input::read_events;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use yalf_engine::{AllowAll, EngineOptions, SingleLineRenderer, TraceDriver};
use yalf_types::{ThreadId, TraceEvent};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadStats {
    pub thread: ThreadId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub calls: usize,
    /// Most calls open at once
    pub max_depth: usize,
    pub exceptions: usize,
    pub log_events: usize,
    /// Calls still open when the stream ended
    pub unfinished: usize,
}

impl ThreadStats {
    fn new(thread: ThreadId) -> Self {
        Self {
            thread,
            name: None,
            calls: 0,
            max_depth: 0,
            exceptions: 0,
            log_events: 0,
            unfinished: 0,
        }
    }
}

pub fn handle(input: Option<&Path>, json: bool) -> Result<()> {
    let events = read_events(input)?;
    let stats = collect_stats(&events)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    for thread in &stats {
        println!("{}", describe(thread));
    }
    println!(
        "{} event(s) on {} thread(s), well nested",
        events.len(),
        stats.len()
    );
    Ok(())
}

/// Dry-run the events through the engine, which rejects broken nesting, and
/// count what each thread did on the way
fn collect_stats(events: &[TraceEvent]) -> Result<Vec<ThreadStats>> {
    let mut driver = TraceDriver::new(
        Box::new(SingleLineRenderer::default()),
        Box::new(AllowAll),
        EngineOptions::default(),
    )?;
    let mut threads: BTreeMap<ThreadId, ThreadStats> = BTreeMap::new();

    for (index, event) in events.iter().enumerate() {
        driver
            .handle(event)
            .with_context(|| format!("Event {} breaks call nesting", index + 1))?;

        let thread_id = event.thread_id();
        let stats = threads
            .entry(thread_id)
            .or_insert_with(|| ThreadStats::new(thread_id));

        match event {
            TraceEvent::ThreadStart(start) => stats.name = start.name.clone(),
            TraceEvent::MethodEntry(_) => stats.calls += 1,
            TraceEvent::Exception(_) => stats.exceptions += 1,
            TraceEvent::LogEvent(_) => stats.log_events += 1,
            TraceEvent::MethodExit(_) => {}
        }
        stats.max_depth = stats.max_depth.max(driver.engine().open_frames(thread_id));
    }

    for (thread_id, stats) in threads.iter_mut() {
        stats.unfinished = driver.engine().open_frames(*thread_id);
    }
    driver.complete()?;

    Ok(threads.into_values().collect())
}

fn describe(stats: &ThreadStats) -> String {
    let mut line = match &stats.name {
        Some(name) => format!("Thread {} [{}]:", stats.thread, name),
        None => format!("Thread {}:", stats.thread),
    };
    line.push_str(&format!(
        " {} call(s), max depth {}, {} exception(s), {} log event(s)",
        stats.calls, stats.max_depth, stats.exceptions, stats.log_events
    ));
    if stats.unfinished > 0 {
        line.push_str(&format!(", {} unfinished", stats.unfinished));
    }
    line
}
