//! # Cyclenotes Editor
//!
//! Editing engine for transaction notes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ recovery: persisted payload → Document      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: Document + mutations               │
//! │  - Validated mutations                      │
//! │  - Dirty tracking per top-level block       │
//! │  - Save: stamp → serialize → sink           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ viewer: canonical JSON → static HTML        │
//! │         (or read-only fallback)             │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use cyclenotes_editor::{
//!     resolve, AttributionTracker, EditSession, KeyPress, ResolveOptions, TrackerOptions,
//! };
//! use cyclenotes_document::User;
//!
//! let state = resolve("These are existing notes", &ResolveOptions::default());
//! let mut tracker = AttributionTracker::new(TrackerOptions::default());
//! tracker.set_current_user(User::new("u-1", "Dana"));
//!
//! let mut saved = Vec::new();
//! let mut session = EditSession::new(state.document, tracker, |json: String| saved.push(json));
//! session.insert_text(" and more").unwrap();
//! session.handle_key(KeyPress::enter()).unwrap();
//! drop(session);
//!
//! assert_eq!(saved.len(), 1);
//! ```

mod attribution;
mod errors;
mod mutations;
mod recovery;
mod session;
mod viewer;

pub use attribution::{
    AttributionMeta, AttributionTracker, StampReport, TrackerOptions, INLINE_MARKER_PREFIX,
};
pub use errors::{AttributionStampError, EditorError};
pub use mutations::{Mutation, MutationError, MutationResult};
pub use recovery::{
    extract_embedded_json, resolve, template_document, InitialDocumentState, PayloadSource,
    ResolveOptions, DEFAULT_TEMPLATE_HEADING,
};
pub use session::{EditSession, Key, KeyOutcome, KeyPress, NoteSink, SaveReport, Selection};
pub use viewer::{display, DisplayState, ViewerOptions, DEFAULT_EMPTY_MESSAGE, FALLBACK_NOTICE};

// Re-export document types for convenience
pub use cyclenotes_document::{Document, Node, NodeKey, User};
