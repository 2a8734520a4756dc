//! Error types for static export and hydration

use cyclenotes_document::DeserializationError;
use thiserror::Error;

/// Errors that abort a static export (the caller falls back to a live,
/// read-only editor)
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Cannot read canonical JSON: {0}")]
    Deserialize(#[from] DeserializationError),

    #[error("Malformed {kind} placeholder: {reason}")]
    MalformedPlaceholder { kind: &'static str, reason: String },

    #[error("HTML generation failed: {0}")]
    Generation(String),
}

/// Errors for a single poll placeholder; other placeholders still hydrate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HydrationError {
    #[error("Poll \"{question}\" has malformed options: {reason}")]
    MalformedOptions { question: String, reason: String },

    #[error("Unknown poll widget: {0}")]
    UnknownWidget(usize),

    #[error("Unknown poll option: {0}")]
    UnknownOption(String),
}
