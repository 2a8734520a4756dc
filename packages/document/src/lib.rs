//! # Cyclenotes Document
//!
//! Node model and canonical JSON format for transaction notes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ registry: node kinds + their contracts      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: root → blocks → inline leaves     │
//! │  - session-local keys                       │
//! │  - per-block attribution records            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ serializer: Document ⇄ canonical JSON       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use cyclenotes_document::{deserialize, serialize, Document, Node};
//!
//! let doc = Document::from_nodes(vec![Node::paragraph(vec![Node::text("Swap cassette")])]);
//! let json = serialize(&doc).unwrap();
//! let restored = deserialize(&json).unwrap();
//! assert!(doc.content_eq(&restored));
//! ```

pub mod attribution;
pub mod datetime;
mod document;
mod error;
mod key_generator;
pub mod node;
pub mod registry;
pub mod serializer;

pub use attribution::{AttributionRecord, User};
pub use document::Document;
pub use error::{DeserializationError, DocumentError};
pub use key_generator::{KeyGenerator, NodeKey};
pub use node::{
    DateTimeValue, HeadingTag, ListType, Node, NodeKind, Poll, PollOption, TextFormat, TextRun,
    TextStyle,
};
pub use registry::{markers, NodeType, NodeTypeSpec};
pub use serializer::{deserialize, is_canonical, serialize, serialize_pretty};
