//! Error types for the document crate

use crate::key_generator::NodeKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeKey),

    #[error("Node cannot have children: {0}")]
    NotAContainer(NodeKey),

    #[error("Cannot move {0} into its own subtree")]
    CycleDetected(NodeKey),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Raw input was not accepted as canonical JSON
#[derive(Error, Debug)]
pub enum DeserializationError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}
