//! End-to-end patch passes over realistic component sources

use design_patcher::{
    apply_design_changes, ChangeCollector, ChangeStatus, DesignPatcher, PatchEvent,
    PatcherConfig, PendingChange, ReplaceError, Subscribers,
};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

const PAIR: &str = "<div class=\"a\">hi</div>\n<span>bye</span>";
const PAIR_PATCHED: &str = "<div class=\"a\">hello</div>\n<span>later</span>";

#[test]
fn test_pair_in_document_order() {
    let changes = vec![
        PendingChange::content(1, 1, "div", "hello"),
        PendingChange::content(2, 1, "span", "later"),
    ];
    assert_eq!(apply_design_changes(PAIR, &changes), PAIR_PATCHED);
}

#[test]
fn test_pair_in_reverse_order() {
    let changes = vec![
        PendingChange::content(2, 1, "span", "later"),
        PendingChange::content(1, 1, "div", "hello"),
    ];
    assert_eq!(apply_design_changes(PAIR, &changes), PAIR_PATCHED);
}

#[test]
fn test_pair_without_columns() {
    let changes = vec![
        PendingChange::content(2, 0, "span", "later"),
        PendingChange::content(1, 0, "div", "hello"),
    ];
    assert_eq!(apply_design_changes(PAIR, &changes), PAIR_PATCHED);
}

#[test]
fn test_line_beyond_eof_is_skipped() {
    let changes = vec![
        PendingChange::content(1, 1, "div", "hello"),
        PendingChange::content(99, 1, "p", "nowhere"),
        PendingChange::content(2, 1, "span", "later"),
    ];
    let report = DesignPatcher::default().apply(PAIR, &changes);

    assert_eq!(report.content, PAIR_PATCHED);
    assert_eq!(report.applied(), 2);
    let (outcome, err) = report.failures().next().unwrap();
    assert_eq!(outcome.index, 1);
    assert!(matches!(err, ReplaceError::LineOutOfRange { line: 99, line_count: 2 }));
}

#[test]
fn test_deleted_element_is_skipped() {
    let changes = vec![
        PendingChange::content(1, 5, "section", "gone"),
        PendingChange::content(2, 1, "span", "later"),
    ];
    let report = DesignPatcher::default().apply(PAIR, &changes);

    assert_eq!(report.content, "<div class=\"a\">hi</div>\n<span>later</span>");
    assert_eq!(report.failed(), 1);
}

#[test]
fn test_original_text_in_sibling_is_left_alone() {
    let source = "const form = (\n  <div>\n    <p>Save</p><button>Save</button>\n  </div>\n);";
    let column = "    <p>Save</p>".len() + 1;
    let changes = vec![PendingChange::content(3, column, "button", "Submit").with_original("Save")];
    let report = DesignPatcher::default().apply(source, &changes);

    assert_eq!(report.applied(), 1);
    assert_eq!(
        report.content,
        "const form = (\n  <div>\n    <p>Save</p><button>Submit</button>\n  </div>\n);"
    );
}

#[test]
fn test_reapplying_reports_unchanged() {
    let changes = vec![
        PendingChange::content(1, 1, "div", "hello"),
        PendingChange::content(2, 1, "span", "later"),
    ];
    let patcher = DesignPatcher::default();
    let first = patcher.apply(PAIR, &changes);
    let second = patcher.apply(&first.content, &changes);

    assert_eq!(second.content, PAIR_PATCHED);
    assert_eq!(second.unchanged(), 2);
}

#[test]
fn test_component_with_mixed_changes() {
    let source = r#"export default function Hero() {
  return (
    <section className="hero">
      <h1 className="title">Welcome</h1>
      <p>
        Build faster
      </p>
      <a href="/start" className="btn">Start</a>
    </section>
  );
}
"#;
    let changes = vec![
        PendingChange::style(3, 5, "section", "hero hero-dark"),
        PendingChange::content(4, 7, "h1", "Hello there").with_original("Welcome"),
        PendingChange::content(5, 7, "p", "Ship sooner"),
        PendingChange::attribute(8, 7, "a", "href", "/signup"),
        PendingChange::style(8, 7, "a", "btn btn-primary"),
    ];
    let report = DesignPatcher::default().apply(source, &changes);

    assert_eq!(report.failed(), 0, "{:?}", report.outcomes);
    let expected = r#"export default function Hero() {
  return (
    <section className="hero hero-dark">
      <h1 className="title">Hello there</h1>
      <p>Ship sooner</p>
      <a href="/signup" className="btn btn-primary">Start</a>
    </section>
  );
}
"#;
    assert_eq!(report.content, expected);
}

#[test]
fn test_collector_feeds_patcher_and_observers() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut subscribers = Subscribers::new();
    let log = Arc::clone(&seen);
    subscribers.subscribe(move |event| log.lock().unwrap().push(event.clone()));

    let mut collector = ChangeCollector::new();
    collector.record(PendingChange::content(1, 1, "div", "hello"));
    collector.record(PendingChange::content(2, 1, "span", "later"));

    let patcher = DesignPatcher::new(PatcherConfig::default()).with_sink(subscribers);
    let report = patcher.apply(PAIR, &collector.take());

    assert!(collector.is_empty());
    assert_eq!(report.content, PAIR_PATCHED);
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.status == ChangeStatus::Applied));

    let events = seen.lock().unwrap();
    assert_eq!(
        events.last(),
        Some(&PatchEvent::PassCompleted {
            applied: 2,
            unchanged: 0,
            failed: 0
        })
    );
}

fn list_source(n: usize) -> String {
    (0..n)
        .map(|i| format!("  <li>item {i}</li>"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A list length and a shuffled, non-empty selection of its line indices.
fn edited_lines() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (2usize..12).prop_flat_map(|n| {
        let lines: Vec<usize> = (0..n).collect();
        (Just(n), prop::sample::subsequence(lines, 1..=n).prop_shuffle())
    })
}

proptest! {
    #[test]
    fn order_does_not_matter((n, picked) in edited_lines()) {
        let source = list_source(n);
        let changes: Vec<PendingChange> = picked
            .iter()
            .map(|&i| PendingChange::content(i + 1, 3, "li", format!("changed {i}")))
            .collect();

        let expected: String = (0..n)
            .map(|i| {
                if picked.contains(&i) {
                    format!("  <li>changed {i}</li>")
                } else {
                    format!("  <li>item {i}</li>")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        prop_assert_eq!(apply_design_changes(&source, &changes), expected);
    }
}
