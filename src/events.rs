//! Typed patch events.
//!
//! Instead of a process-wide event bus, each [`DesignPatcher`] or
//! [`ChangeCollector`] is handed its own [`EventSink`]. A sink is either a
//! channel sender or a [`Subscribers`] registry owned by whoever created
//! the patcher.
//!
//! [`DesignPatcher`]: crate::patcher::DesignPatcher
//! [`ChangeCollector`]: crate::collector::ChangeCollector

use crate::change::SourcePosition;
use crate::replace::ReplaceError;
use std::sync::mpsc::Sender;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchEvent {
    /// A change was added to a collector
    ChangeRecorded { position: SourcePosition, kind: String },
    /// A change rewrote the source
    ChangeApplied { index: usize, position: SourcePosition },
    /// A change matched but produced identical text
    ChangeUnchanged { index: usize, position: SourcePosition },
    /// A change was skipped because it could not be applied
    ChangeFailed {
        index: usize,
        position: SourcePosition,
        error: ReplaceError,
    },
    /// A patch pass finished
    PassCompleted {
        applied: usize,
        unchanged: usize,
        failed: usize,
    },
}

/// Receiver of [`PatchEvent`]s.
pub trait EventSink {
    fn emit(&self, event: &PatchEvent);
}

impl EventSink for Sender<PatchEvent> {
    fn emit(&self, event: &PatchEvent) {
        if self.send(event.clone()).is_err() {
            trace!("event receiver dropped");
        }
    }
}

/// Handle returned by [`Subscribers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Handler = Box<dyn Fn(&PatchEvent) + Send + Sync>;

/// An observer registry scoped to its owner.
#[derive(Default)]
pub struct Subscribers {
    next_id: usize,
    handlers: Vec<(SubscriptionId, Handler)>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl Fn(&PatchEvent) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        self.handlers.len() != before
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl EventSink for Subscribers {
    fn emit(&self, event: &PatchEvent) {
        for (_, handler) in &self.handlers {
            handler(event);
        }
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};

    fn completed() -> PatchEvent {
        PatchEvent::PassCompleted {
            applied: 1,
            unchanged: 0,
            failed: 0,
        }
    }

    #[test]
    fn channel_sink_delivers() {
        let (tx, rx) = mpsc::channel();
        tx.emit(&completed());
        assert_eq!(rx.recv().unwrap(), completed());
    }

    #[test]
    fn channel_sink_ignores_dropped_receiver() {
        let (tx, rx) = mpsc::channel::<PatchEvent>();
        drop(rx);
        tx.emit(&completed());
    }

    #[test]
    fn subscribers_fan_out_and_unsubscribe() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut subscribers = Subscribers::new();

        let first = {
            let hits = Arc::clone(&hits);
            subscribers.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        {
            let hits = Arc::clone(&hits);
            subscribers.subscribe(move |_| {
                hits.fetch_add(10, Ordering::SeqCst);
            });
        }

        subscribers.emit(&completed());
        assert_eq!(hits.load(Ordering::SeqCst), 11);

        assert!(subscribers.unsubscribe(first));
        assert!(!subscribers.unsubscribe(first));
        subscribers.emit(&completed());
        assert_eq!(hits.load(Ordering::SeqCst), 21);
        assert_eq!(subscribers.len(), 1);
    }
}
