//! Error types for the editor

use cyclenotes_document::{DocumentError, NodeKey};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Selection points at a missing node: {0}")]
    StaleSelection(NodeKey),
}

/// Stamping one dirty key failed; the other keys and the save proceed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributionStampError {
    #[error("Node {0} no longer exists")]
    NodeMissing(NodeKey),

    #[error("Node {0} cannot carry attribution")]
    NotAttributable(NodeKey),
}
