//! Accumulates pending changes between saves.

use crate::change::PendingChange;
use crate::events::{EventSink, PatchEvent};

/// Pending edits made in a live preview, waiting for the next save.
///
/// No deduplication happens here: two edits of the same element are both
/// kept and both attempted by the patcher, in collection order.
#[derive(Default)]
pub struct ChangeCollector {
    changes: Vec<PendingChange>,
    sink: Option<Box<dyn EventSink>>,
}

impl ChangeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn record(&mut self, change: PendingChange) {
        if let Some(sink) = &self.sink {
            sink.emit(&PatchEvent::ChangeRecorded {
                position: change.position(),
                kind: change.kind.to_string(),
            });
        }
        self.changes.push(change);
    }

    pub fn pending(&self) -> &[PendingChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Hand every pending change to a save and start over.
    pub fn take(&mut self) -> Vec<PendingChange> {
        std::mem::take(&mut self.changes)
    }
}

impl std::fmt::Debug for ChangeCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeCollector")
            .field("changes", &self.changes)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl Extend<PendingChange> for ChangeCollector {
    fn extend<I: IntoIterator<Item = PendingChange>>(&mut self, iter: I) {
        for change in iter {
            self.record(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn keeps_duplicates_and_drains() {
        let mut collector = ChangeCollector::new();
        collector.record(PendingChange::style(3, 5, "div", "a"));
        collector.record(PendingChange::style(3, 5, "div", "b"));
        assert_eq!(collector.len(), 2);

        let taken = collector.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[1].new_value, "b");
        assert!(collector.is_empty());
    }

    #[test]
    fn emits_recorded_events() {
        let (tx, rx) = mpsc::channel();
        let mut collector = ChangeCollector::new().with_sink(tx);
        collector.extend([PendingChange::content(2, 1, "p", "x")]);

        match rx.try_recv().unwrap() {
            PatchEvent::ChangeRecorded { position, kind } => {
                assert_eq!(position.line, 2);
                assert_eq!(kind, "content");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
