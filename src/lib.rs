//! Design Patcher: writes visual design edits back into JSX/TSX source
//!
//! A design-mode UI lets a user restyle or rewrite rendered elements. Each
//! edit is recorded as a [`PendingChange`] carrying the source line/column the
//! element was rendered from. On save, [`DesignPatcher`] rewrites the file
//! text so it reflects every change it can place.
//!
//! # Architecture
//!
//! All replacements compile down to a single primitive: [`TextEdit`], a
//! verified byte-span replacement. Intelligence lives in span acquisition
//! (line/column anchors, tag scanning, the tree-sitter element index), not
//! in the application logic.
//!
//! # Guarantees
//!
//! - Changes apply bottom-to-top, right-to-left, so positions of changes not
//!   yet applied stay valid
//! - A change that cannot be placed is skipped and reported; the pass goes on
//! - Edits verify their expected before-text before applying
//! - With `validate_syntax`, edits that introduce TSX parse errors are refused
//!
//! # Example
//!
//! ```
//! use design_patcher::{apply_design_changes, PendingChange};
//!
//! let source = "<div class=\"a\">hi</div>\n<span>bye</span>";
//! let changes = vec![
//!     PendingChange::content(1, 1, "div", "hello"),
//!     PendingChange::content(2, 1, "span", "later"),
//! ];
//!
//! let patched = apply_design_changes(source, &changes);
//! assert_eq!(patched, "<div class=\"a\">hello</div>\n<span>later</span>");
//! ```

pub mod change;
pub mod collector;
pub mod config;
pub mod edit;
pub mod events;
pub mod fallback;
pub mod jsx;
pub mod node_id;
pub mod patcher;
pub mod pool;
pub mod replace;
pub mod validate;

// Re-exports
pub use change::{application_order, ChangeKind, PendingChange, SourceInfo, SourcePosition};
pub use collector::ChangeCollector;
pub use config::{ConfigError, PatcherConfig};
pub use edit::{EditError, EditVerification, TextEdit};
pub use events::{EventSink, PatchEvent, Subscribers, SubscriptionId};
pub use jsx::{ElementIndex, JsxElement, JsxParser, TreeSitterError};
pub use node_id::{generate_node_id, node_id_at, resolve_node_id, NodeIdError};
pub use patcher::{apply_design_changes, ChangeOutcome, ChangeStatus, DesignPatcher, PatchReport};
pub use replace::{
    plan_replacement, plan_replacement_cached, smart_replace_in_source, ElementCache, ReplaceError,
    ReplaceRequest,
};
pub use validate::{ErrorLocation, SyntaxGuard, ValidationError};
