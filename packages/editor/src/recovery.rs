//! # Recovery Resolver
//!
//! Turns whatever was last persisted for a note into a document. Notes must
//! never silently vanish, so every input maps to some document:
//!
//! | input                                   | result                      |
//! |-----------------------------------------|-----------------------------|
//! | empty / whitespace                      | empty document              |
//! | JSON object                             | canonical document          |
//! | HTML with embedded canonical JSON       | the embedded document       |
//! | HTML without usable embedded JSON       | template                    |
//! | anything else                           | one paragraph, text as-is   |

use cyclenotes_compiler_html::{find_all, parse_fragment, HtmlNode};
use cyclenotes_document::{deserialize, is_canonical, markers, Document, HeadingTag, Node};
use tracing::{debug, info, warn};

pub const DEFAULT_TEMPLATE_HEADING: &str = "Transaction Notes";

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Text of the template's single heading
    pub template_heading: String,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            template_heading: DEFAULT_TEMPLATE_HEADING.to_string(),
        }
    }
}

/// Which rule produced the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    Empty,
    Canonical,
    EmbeddedJson,
    Template,
    PlainText,
}

impl PayloadSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadSource::Empty => "empty",
            PayloadSource::Canonical => "canonical",
            PayloadSource::EmbeddedJson => "embedded-json",
            PayloadSource::Template => "template",
            PayloadSource::PlainText => "plain-text",
        }
    }
}

impl std::fmt::Display for PayloadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct InitialDocumentState {
    pub source: PayloadSource,
    pub document: Document,
}

impl InitialDocumentState {
    fn new(source: PayloadSource, document: Document) -> Self {
        debug!(source = %source, blocks = document.len(), "Resolved initial document");
        Self { source, document }
    }
}

/// Resolve a persisted payload into the initial document
pub fn resolve(raw: &str, options: &ResolveOptions) -> InitialDocumentState {
    if raw.trim().is_empty() {
        return InitialDocumentState::new(PayloadSource::Empty, Document::new());
    }

    // Canonical acceptance is attempted before any fallback
    if is_canonical(raw) {
        match deserialize(raw) {
            Ok(document) => return InitialDocumentState::new(PayloadSource::Canonical, document),
            Err(err) => warn!(error = %err, "Canonical payload rejected"),
        }
    }

    if looks_like_html(raw) {
        let nodes = parse_fragment(raw);
        if let Some(document) = extract_embedded_json(&nodes) {
            info!("Recovered note from embedded JSON");
            return InitialDocumentState::new(PayloadSource::EmbeddedJson, document);
        }
        warn!("HTML payload has no usable embedded JSON; using template");
        return InitialDocumentState::new(PayloadSource::Template, template_document(options));
    }

    InitialDocumentState::new(
        PayloadSource::PlainText,
        Document::from_nodes(vec![Node::paragraph(vec![Node::text(raw)])]),
    )
}

/// The prepopulated document for a brand-new note
pub fn template_document(options: &ResolveOptions) -> Document {
    Document::from_nodes(vec![Node::heading(
        HeadingTag::H1,
        vec![Node::text(options.template_heading.as_str())],
    )])
}

/// First `<script type="application/lexical+json">` holding canonical JSON
pub fn extract_embedded_json(nodes: &[HtmlNode]) -> Option<Document> {
    find_all(nodes, &|el| {
        el.is("script") && el.attr_is("type", markers::EMBEDDED_JSON_TYPE)
    })
    .into_iter()
    .find_map(|script| {
        let json: String = script
            .children
            .iter()
            .map(|child| match child {
                HtmlNode::Raw(text) | HtmlNode::Text(text) => text.as_str(),
                HtmlNode::Element(_) => "",
            })
            .collect::<String>()
            .replace("<\\/", "</");

        if !is_canonical(&json) {
            warn!("Embedded JSON is not a canonical payload");
            return None;
        }
        deserialize(&json).ok()
    })
}

fn looks_like_html(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    trimmed.starts_with('<')
        && parse_fragment(trimmed)
            .iter()
            .any(|node| matches!(node, HtmlNode::Element(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclenotes_document::NodeKind;

    #[test]
    fn test_empty_input() {
        let state = resolve("  \n", &ResolveOptions::default());
        assert_eq!(state.source, PayloadSource::Empty);
        assert!(state.document.is_empty());
    }

    #[test]
    fn test_plain_text_is_preserved_verbatim() {
        let state = resolve("These are existing notes", &ResolveOptions::default());

        assert_eq!(state.source, PayloadSource::PlainText);
        assert_eq!(state.document.len(), 1);
        assert!(matches!(state.document.children()[0].kind, NodeKind::Paragraph { .. }));
        assert_eq!(state.document.text_content(), "These are existing notes");
    }

    #[test]
    fn test_non_object_json_is_plain_text() {
        let state = resolve("[1, 2]", &ResolveOptions::default());
        assert_eq!(state.source, PayloadSource::PlainText);
        assert_eq!(state.document.text_content(), "[1, 2]");
    }

    #[test]
    fn test_text_starting_with_angle_bracket() {
        let state = resolve("<3 the new bars", &ResolveOptions::default());
        assert_eq!(state.source, PayloadSource::PlainText);
    }

    #[test]
    fn test_custom_template_heading() {
        let options = ResolveOptions {
            template_heading: "Repair log".to_string(),
        };
        let state = resolve("<p>old export</p>", &options);

        assert_eq!(state.source, PayloadSource::Template);
        assert_eq!(state.document.text_content(), "Repair log");
    }

    #[test]
    fn test_broken_embedded_json_uses_template() {
        let html = r#"<p>x</p><script type="application/lexical+json">{"root": </script>"#;
        let state = resolve(html, &ResolveOptions::default());
        assert_eq!(state.source, PayloadSource::Template);
    }
}
