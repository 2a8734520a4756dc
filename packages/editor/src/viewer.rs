//! Read-only display of a persisted note.
//!
//! Static HTML when the export succeeds; otherwise the resolved document is
//! shown in a read-only editor together with the attribution summary and the
//! raw payload.

use crate::recovery::{resolve, PayloadSource, ResolveOptions};
use cyclenotes_compiler_html::{
    export_static, AttributionSummary, ExportOptions, ExportOutcome, StaticExport,
};
use cyclenotes_document::{serialize, Document};
use tracing::warn;

pub const DEFAULT_EMPTY_MESSAGE: &str = "No notes yet. Click 'Add Notes' to get started.";
pub const FALLBACK_NOTICE: &str =
    "These notes could not be rendered as static HTML and are shown read-only.";

#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub empty_message: String,
    pub export: ExportOptions,
    pub resolve: ResolveOptions,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
            export: ExportOptions::default(),
            resolve: ResolveOptions::default(),
        }
    }
}

#[derive(Debug)]
pub enum DisplayState {
    Empty {
        message: String,
    },
    Static(StaticExport),
    Fallback {
        notice: String,
        document: Document,
        attributions_summary: Vec<AttributionSummary>,
        raw: String,
    },
}

/// Decide how a stored note is displayed
pub fn display(initial_value: &str, options: &ViewerOptions) -> DisplayState {
    let state = resolve(initial_value, &options.resolve);
    if state.source == PayloadSource::Empty {
        return DisplayState::Empty {
            message: options.empty_message.clone(),
        };
    }

    // Legacy payloads are exported from their recovered form
    let canonical = if state.source == PayloadSource::Canonical {
        initial_value.to_string()
    } else {
        match serialize(&state.document) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "Cannot serialize recovered note");
                return fallback(state.document, Vec::new(), initial_value);
            }
        }
    };

    match export_static(&canonical, &options.export) {
        ExportOutcome::Exported(export) => DisplayState::Static(export),
        ExportOutcome::Fallback(fallback_state) => fallback(
            state.document,
            fallback_state.attributions_summary,
            initial_value,
        ),
    }
}

fn fallback(
    document: Document,
    attributions_summary: Vec<AttributionSummary>,
    raw: &str,
) -> DisplayState {
    DisplayState::Fallback {
        notice: FALLBACK_NOTICE.to_string(),
        document,
        attributions_summary,
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_shows_message_not_template() {
        match display("", &ViewerOptions::default()) {
            DisplayState::Empty { message } => {
                assert_eq!(message, "No notes yet. Click 'Add Notes' to get started.")
            }
            other => panic!("expected empty state, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_text_is_exported() {
        match display("Check spoke tension", &ViewerOptions::default()) {
            DisplayState::Static(export) => {
                assert!(export.html.contains("<p>Check spoke tension</p>"))
            }
            other => panic!("expected static export, got {:?}", other),
        }
    }

    #[test]
    fn test_canonical_payload_is_exported_as_is() {
        let raw = r#"{"root":{"type":"root","children":[{"type":"quote","children":[{"type":"text","text":"Q"}]}]}}"#;
        match display(raw, &ViewerOptions::default()) {
            DisplayState::Static(export) => {
                assert!(export.html.contains(r#"<blockquote class="notes-quote">Q</blockquote>"#));
                assert!(export.html.contains(raw));
            }
            other => panic!("expected static export, got {:?}", other),
        }
    }
}
