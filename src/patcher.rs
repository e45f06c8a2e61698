//! Design patcher: applies a batch of pending changes to one file's text.
//!
//! This module provides the save-time pass that:
//! - Orders changes bottom-to-top, right-to-left so earlier replacements
//!   never shift the coordinates of changes still waiting
//! - Applies each change against the running content
//! - Optionally refuses replacements that break TSX parsing
//! - Isolates failures: a change that cannot be applied is logged and
//!   skipped, and the pass continues

use crate::change::{application_order, PendingChange, SourcePosition};
use crate::config::PatcherConfig;
use crate::events::{EventSink, PatchEvent};
use crate::fallback::run_with_fallback;
use crate::replace::{plan_replacement_cached, ElementCache, ReplaceError, ReplaceRequest};
use crate::validate::{error_count, SyntaxGuard, ValidationError};
use std::fmt;
use tracing::{debug, warn};

/// What happened to a single change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeStatus {
    /// The change rewrote the content
    Applied,
    /// The target was found but already had the new value
    Unchanged,
    /// The change was skipped
    Failed(ReplaceError),
}

/// Outcome of one change, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeOutcome {
    /// Index of the change in the input slice
    pub index: usize,
    pub position: SourcePosition,
    pub status: ChangeStatus,
}

impl fmt::Display for ChangeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            ChangeStatus::Applied => write!(f, "#{} at {}: applied", self.index, self.position),
            ChangeStatus::Unchanged => write!(f, "#{} at {}: unchanged", self.index, self.position),
            ChangeStatus::Failed(err) => write!(f, "#{} at {}: failed: {}", self.index, self.position, err),
        }
    }
}

/// Result of a patch pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchReport holds the patched content"]
pub struct PatchReport {
    pub content: String,
    pub outcomes: Vec<ChangeOutcome>,
}

impl PatchReport {
    fn count(&self, pred: impl Fn(&ChangeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn applied(&self) -> usize {
        self.count(|s| matches!(s, ChangeStatus::Applied))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|s| matches!(s, ChangeStatus::Unchanged))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ChangeStatus::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ChangeOutcome, &ReplaceError)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            ChangeStatus::Failed(err) => Some((o, err)),
            _ => None,
        })
    }
}

enum Step {
    /// New text, and its parse error count when it was validated
    Applied(String, Option<usize>),
    Unchanged,
    Failed(ReplaceError),
}

/// Applies pending changes to file text.
///
/// # Example
///
/// ```
/// use design_patcher::{DesignPatcher, PatcherConfig, PendingChange};
///
/// let source = "<div className=\"a\">hi</div>";
/// let changes = vec![PendingChange::style(1, 1, "div", "b")];
///
/// let report = DesignPatcher::new(PatcherConfig::default()).apply(source, &changes);
/// assert_eq!(report.content, "<div className=\"b\">hi</div>");
/// assert_eq!(report.applied(), 1);
/// ```
#[derive(Default)]
pub struct DesignPatcher {
    config: PatcherConfig,
    guard: SyntaxGuard,
    sink: Option<Box<dyn EventSink>>,
}

impl DesignPatcher {
    pub fn new(config: PatcherConfig) -> Self {
        Self {
            config,
            guard: SyntaxGuard,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn config(&self) -> &PatcherConfig {
        &self.config
    }

    /// Apply `changes` to `file_content`.
    ///
    /// Never fails as a whole; per-change failures are reported in the
    /// returned [`PatchReport`] and the content reflects every change that
    /// could be applied.
    pub fn apply(&self, file_content: &str, changes: &[PendingChange]) -> PatchReport {
        let mut content = file_content.to_string();
        let mut outcomes = Vec::with_capacity(changes.len());
        // Both describe `content` and are refreshed only when an edit lands.
        let mut elements = ElementCache::new();
        let mut baseline_errors: Option<usize> = None;

        for index in application_order(changes) {
            let change = &changes[index];
            let position = change.position();
            let label = format!(
                "change #{index} ({} at {position}, <{}>)",
                change.kind, change.source_info.element_type
            );

            let step = run_with_fallback(
                &label,
                || self.apply_one(&content, change, &elements, &mut baseline_errors),
                |err| Step::Failed(err.clone()),
            );

            let (status, event) = match step {
                Step::Applied(next, errors) => {
                    content = next;
                    elements.invalidate();
                    baseline_errors = errors;
                    (ChangeStatus::Applied, PatchEvent::ChangeApplied { index, position })
                }
                Step::Unchanged => (
                    ChangeStatus::Unchanged,
                    PatchEvent::ChangeUnchanged { index, position },
                ),
                Step::Failed(error) => (
                    ChangeStatus::Failed(error.clone()),
                    PatchEvent::ChangeFailed {
                        index,
                        position,
                        error,
                    },
                ),
            };

            self.emit(&event);
            outcomes.push(ChangeOutcome {
                index,
                position,
                status,
            });
        }

        let report = PatchReport { content, outcomes };
        debug!(
            applied = report.applied(),
            unchanged = report.unchanged(),
            failed = report.failed(),
            "patch pass complete"
        );
        self.emit(&PatchEvent::PassCompleted {
            applied: report.applied(),
            unchanged: report.unchanged(),
            failed: report.failed(),
        });
        report
    }

    fn apply_one(
        &self,
        content: &str,
        change: &PendingChange,
        elements: &ElementCache,
        baseline_errors: &mut Option<usize>,
    ) -> Result<Step, ReplaceError> {
        let request = ReplaceRequest::from(change);
        let edit = plan_replacement_cached(content, &request, &self.config, elements)?;
        if edit.is_noop(content) {
            return Ok(Step::Unchanged);
        }

        let next = edit.apply(content)?;
        let errors = if self.config.validate_syntax {
            self.check_syntax(content, &next, request.line_number, baseline_errors)?
        } else {
            None
        };
        Ok(Step::Applied(next, errors))
    }

    /// Returns the error count of `after` when validation ran.
    fn check_syntax(
        &self,
        before: &str,
        after: &str,
        line: usize,
        baseline_errors: &mut Option<usize>,
    ) -> Result<Option<usize>, ReplaceError> {
        let result = match *baseline_errors {
            Some(count) => self.guard.check_against(count, after),
            None => error_count(before).and_then(|count| {
                *baseline_errors = Some(count);
                self.guard.check_against(count, after)
            }),
        };

        match result {
            Ok(count) => Ok(Some(count)),
            Err(ValidationError::ParseErrorIntroduced { before, after, .. }) => {
                Err(ReplaceError::SyntaxRegression {
                    line,
                    before,
                    after,
                })
            }
            Err(ValidationError::TreeSitter(err)) => {
                warn!(error = %err, "syntax validation unavailable, accepting edit");
                Ok(None)
            }
        }
    }

    fn emit(&self, event: &PatchEvent) {
        if let Some(sink) = &self.sink {
            sink.emit(event);
        }
    }
}

impl fmt::Debug for DesignPatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesignPatcher")
            .field("config", &self.config)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

/// Apply `changes` with the default configuration and return the new text.
pub fn apply_design_changes(file_content: &str, changes: &[PendingChange]) -> String {
    DesignPatcher::default().apply(file_content, changes).content
}
