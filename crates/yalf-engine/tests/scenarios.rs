use yalf_engine::{
    AllowAll, DisplayFilter, EngineOptions, Error, EventPlacement, FilterContext, FilterRules,
    IndentStrategy, RuleFilter, SingleLineRenderer, TextRenderer, TraceDriver, render_report,
};
use yalf_testing::TraceBuilder;
use yalf_testing::assertions::{assert_line_count, assert_line_order, indent_level};
use yalf_types::TraceEvent;

fn excluding(pattern: &str) -> Box<dyn DisplayFilter> {
    Box::new(
        RuleFilter::from_rules(&FilterRules {
            exclude: vec![pattern.to_string()],
            ..Default::default()
        })
        .expect("valid pattern"),
    )
}

fn suppressed_bar_trace() -> Vec<TraceEvent> {
    TraceBuilder::new()
        .thread(1)
        .enter("Foo")
        .enter("Bar")
        .log("hello")
        .exit("Bar")
        .exit("Foo")
        .build()
}

#[test]
fn test_log_under_suppressed_call_moves_up_one_level() {
    let report = render_report(
        &suppressed_bar_trace(),
        Box::new(SingleLineRenderer::default()),
        excluding("^Bar$"),
        EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(
        report,
        "Thread 1\n  [Log] 10:00:00.002 hello\n[Call] Foo started 10:00:00.000 (4 ms)\n"
    );
}

#[test]
fn test_nested_placement_flushes_log_after_caller() {
    let report = render_report(
        &suppressed_bar_trace(),
        Box::new(SingleLineRenderer::default()),
        excluding("^Bar$"),
        EngineOptions {
            placement: EventPlacement::Nested,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(
        report,
        "Thread 1\n[Call] Foo started 10:00:00.000 (4 ms)\n  [Log] 10:00:00.002 hello\n"
    );
    assert_line_count(&report, "Bar", 0).unwrap();
}

#[test]
fn test_independent_renderer_prints_entry_then_exit() {
    let events = TraceBuilder::new().thread(1).enter("A").exit("A").build();

    let report = render_report(
        &events,
        Box::new(TextRenderer::default()),
        Box::new(AllowAll),
        EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(report, "Thread 1\n[Enter] 10:00:00.000 A()\n[Exit] A (1 ms)\n");
}

#[test]
fn test_exception_precedes_summary_of_its_call() {
    let events = TraceBuilder::new()
        .thread(1)
        .enter("A")
        .exception("boom", None)
        .exit("A")
        .build();

    let report = render_report(
        &events,
        Box::new(SingleLineRenderer::default()),
        Box::new(AllowAll),
        EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(
        report,
        "Thread 1\n  [Exception] 10:00:00.001 boom\n[Call] A started 10:00:00.000 (2 ms)\n"
    );
    assert_line_count(&report, "[Exception]", 1).unwrap();
}

#[test]
fn test_unmatched_exit_aborts_session() {
    let events = TraceBuilder::new()
        .thread(1)
        .enter("A")
        .exit("A")
        .exit("Ghost")
        .log("after")
        .build();

    let mut driver = TraceDriver::new(
        Box::new(SingleLineRenderer::default()),
        Box::new(AllowAll),
        EngineOptions::default(),
    )
    .unwrap();

    let mut results = events.iter().map(|e| driver.handle(e));
    assert!(results.next().unwrap().is_ok());
    assert!(results.next().unwrap().is_ok());
    assert!(results.next().unwrap().is_ok());
    assert!(matches!(
        results.next().unwrap(),
        Err(Error::UnmatchedExit { .. })
    ));
    assert!(matches!(
        results.next().unwrap(),
        Err(Error::SessionAborted(_))
    ));
    drop(results);

    assert!(matches!(driver.complete(), Err(Error::SessionAborted(_))));

    let partial = driver.partial_report();
    assert!(partial.is_partial());
    assert!(partial.failure.unwrap().contains("Ghost"));
    assert_line_count(&partial.text, "Ghost", 0).unwrap();
    assert_line_count(&partial.text, "after", 0).unwrap();
    assert_line_count(&partial.text, "[Call] A", 1).unwrap();
}

#[test]
fn test_interleaved_threads_keep_separate_stacks() {
    let events = TraceBuilder::new()
        .thread(1)
        .enter("A")
        .thread(2)
        .enter("B")
        .enter("B.inner")
        .on_thread(1)
        .exit("A")
        .on_thread(2)
        .exit("B.inner")
        .exit("B")
        .build();

    let report = render_report(
        &events,
        Box::new(SingleLineRenderer::default()),
        Box::new(AllowAll),
        EngineOptions::default(),
    )
    .unwrap();

    assert_line_order(
        &report,
        &["Thread 1", "Thread 2", "[Call] A", "[Call] B ", "[Call] B.inner"],
    )
    .unwrap();
    assert_eq!(indent_level(&report, "[Call] A", "  ").unwrap(), 0);
    assert_eq!(indent_level(&report, "[Call] B.inner", "  ").unwrap(), 1);
}

#[test]
fn test_nested_call_hint_reconstructs_indentation() {
    let events = TraceBuilder::new()
        .thread(1)
        .enter("A")
        .enter("B")
        .log("in b")
        .exit("B")
        .enter("C")
        .exit("C")
        .exit("A")
        .build();

    let render = |indent| {
        render_report(
            &events,
            Box::new(SingleLineRenderer::default()),
            Box::new(AllowAll),
            EngineOptions {
                placement: EventPlacement::Nested,
                indent,
                ..Default::default()
            },
        )
        .unwrap()
    };

    assert_eq!(
        render(IndentStrategy::Engine),
        "Thread 1\n\
         [Call] A started 10:00:00.000 (6 ms)\n\
         \x20 [Call] B started 10:00:00.001 (2 ms)\n\
         \x20   [Log] 10:00:00.002 in b\n\
         \x20 [Call] C started 10:00:00.004 (1 ms)\n"
    );

    // The hint only ever deepens, so C lands under B
    assert_eq!(
        render(IndentStrategy::NestedCallHint),
        "Thread 1\n\
         [Call] A started 10:00:00.000 (6 ms)\n\
         \x20 [Call] B started 10:00:00.001 (2 ms)\n\
         \x20   [Log] 10:00:00.002 in b\n\
         \x20   [Call] C started 10:00:00.004 (1 ms)\n"
    );
}

#[test]
fn test_unfinished_calls_release_their_content() {
    let events = TraceBuilder::new()
        .thread(1)
        .enter("A")
        .enter("B")
        .exit("B")
        .log("still running")
        .build();

    let report = render_report(
        &events,
        Box::new(SingleLineRenderer::default()),
        Box::new(AllowAll),
        EngineOptions {
            placement: EventPlacement::Nested,
            ..Default::default()
        },
    )
    .unwrap();

    assert_line_order(&report, &["[Call] B", "still running"]).unwrap();
    assert_line_count(&report, "[Call] A", 0).unwrap();
}

struct FailingFilter;

impl DisplayFilter for FailingFilter {
    fn is_display_eligible(
        &self,
        event: &TraceEvent,
        _ctx: &FilterContext,
    ) -> yalf_engine::Result<bool> {
        match event.method() {
            Some("Broken") => Err(Error::Filter("rule store unavailable".to_string())),
            _ => Ok(true),
        }
    }
}

#[test]
fn test_filter_failure_propagates() {
    let events = TraceBuilder::new()
        .thread(1)
        .enter("Fine")
        .enter("Broken")
        .exit("Broken")
        .exit("Fine")
        .build();

    let err = render_report(
        &events,
        Box::new(SingleLineRenderer::default()),
        Box::new(FailingFilter),
        EngineOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::Filter(ref msg) if msg == "rule store unavailable"));
}

struct ExceptionRulesUnavailable;

impl DisplayFilter for ExceptionRulesUnavailable {
    fn is_display_eligible(
        &self,
        event: &TraceEvent,
        _ctx: &FilterContext,
    ) -> yalf_engine::Result<bool> {
        match event {
            TraceEvent::Exception(_) => Err(Error::Filter("exception rules unavailable".to_string())),
            _ => Ok(true),
        }
    }
}

#[test]
fn test_filter_failure_on_exception_aborts_session() {
    let events = TraceBuilder::new()
        .thread(1)
        .enter("A")
        .exception("boom", None)
        .exit("A")
        .build();

    let mut driver = TraceDriver::new(
        Box::new(SingleLineRenderer::default()),
        Box::new(ExceptionRulesUnavailable),
        EngineOptions::default(),
    )
    .unwrap();

    let err = driver.handle_all(&events).unwrap_err();
    assert!(matches!(err, Error::Filter(ref msg) if msg == "exception rules unavailable"));

    let partial = driver.partial_report();
    assert!(partial.is_partial());
    assert_line_count(&partial.text, "boom", 0).unwrap();
}

struct HidesEverything;

impl DisplayFilter for HidesEverything {
    fn is_display_eligible(
        &self,
        _event: &TraceEvent,
        _ctx: &FilterContext,
    ) -> yalf_engine::Result<bool> {
        Ok(false)
    }
}

#[test]
fn test_exceptions_shown_even_when_filter_declines() {
    let events = TraceBuilder::new()
        .thread(1)
        .enter("A")
        .exception("boom", None)
        .exit("A")
        .build();

    let report = render_report(
        &events,
        Box::new(SingleLineRenderer::default()),
        Box::new(HidesEverything),
        EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(report, "Thread 1\n[Exception] 10:00:00.001 boom\n");
}

#[test]
fn test_bad_time_format_is_reported_not_panicked() {
    let events = TraceBuilder::new().thread(1).enter("A").exit("A").build();

    let err = render_report(
        &events,
        Box::new(SingleLineRenderer::new("  ", "%Q")),
        Box::new(AllowAll),
        EngineOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::Render(ref msg) if msg.contains("%Q")));
}

#[test]
fn test_hidden_return_values() {
    let events = TraceBuilder::new()
        .thread(1)
        .enter("Answer")
        .exit_with("Answer", "42")
        .build();

    let filter = RuleFilter::from_rules(&FilterRules {
        hide_return_values: true,
        ..Default::default()
    })
    .unwrap();

    let report = render_report(
        &events,
        Box::new(SingleLineRenderer::default()),
        Box::new(filter),
        EngineOptions::default(),
    )
    .unwrap();

    assert_line_count(&report, "42", 0).unwrap();
    assert_line_count(&report, "[Call] Answer started", 1).unwrap();
}
