//! Static export pipeline
//!
//! ```text
//! canonical JSON ─→ Document ─→ baseline tree ─→ transforms ─→ printer
//!                                                               │
//!            <link> + <div class="notes-static">…</div> + <script>
//! ```
//!
//! Any failure along the way yields [`ExportOutcome::Fallback`]; partial HTML
//! is never returned.

use crate::dom::{HtmlElement, HtmlNode};
use crate::error::ExportError;
use crate::generator::generate;
use crate::printer::{print_html, PrintOptions};
use crate::transforms::TransformEngine;
use cyclenotes_document::serializer::{from_value, META_FIELD};
use cyclenotes_document::{markers, AttributionRecord, Document, KeyGenerator};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

pub const STATIC_ROOT_CLASS: &str = "notes-static";

/// Options for static export
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Stylesheet linked ahead of the exported markup
    pub stylesheet_href: String,
    /// Hashtag links point at `{tag_base_path}/{tag}`
    pub tag_base_path: String,
    pub pretty: bool,
    pub indent: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            stylesheet_href: "/static/notes-export.css".to_string(),
            tag_base_path: "/tags".to_string(),
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

impl ExportOptions {
    fn print_options(&self) -> PrintOptions {
        PrintOptions {
            pretty: self.pretty,
            indent: self.indent.clone(),
        }
    }
}

/// Who last edited a block, for display next to the export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionSummary {
    pub key: String,
    pub name: String,
    pub at: Option<String>,
}

impl AttributionSummary {
    fn from_record(key: impl Into<String>, record: &AttributionRecord) -> Self {
        Self {
            key: key.into(),
            name: record.editor_name().unwrap_or("Unknown").to_string(),
            at: record.edited_at_iso(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StaticExport {
    pub html: String,
    /// The printed tree; hydration mounts onto this
    pub tree: Vec<HtmlNode>,
    pub attributions_summary: Vec<AttributionSummary>,
}

#[derive(Debug)]
pub struct ExportFallback {
    pub error: ExportError,
    pub attributions_summary: Vec<AttributionSummary>,
}

#[derive(Debug)]
pub enum ExportOutcome {
    Exported(StaticExport),
    Fallback(ExportFallback),
}

impl ExportOutcome {
    pub fn is_exported(&self) -> bool {
        matches!(self, ExportOutcome::Exported(_))
    }

    pub fn attributions_summary(&self) -> &[AttributionSummary] {
        match self {
            ExportOutcome::Exported(export) => &export.attributions_summary,
            ExportOutcome::Fallback(fallback) => &fallback.attributions_summary,
        }
    }
}

/// Export canonical JSON to static HTML
#[instrument(skip_all, fields(bytes = canonical_json.len()))]
pub fn export_static(canonical_json: &str, options: &ExportOptions) -> ExportOutcome {
    let value = match serde_json::from_str::<Value>(canonical_json) {
        Ok(value) => value,
        Err(err) => {
            return fallback(ExportError::Deserialize(err.into()), Vec::new());
        }
    };

    let meta_summary = meta_attributions(&value);
    let document = match from_value(value, KeyGenerator::new()) {
        Ok(document) => document,
        Err(err) => return fallback(err.into(), meta_summary),
    };

    let node_summary = node_attributions(&document);
    let attributions_summary = if node_summary.is_empty() {
        meta_summary
    } else {
        node_summary
    };

    match render(&document, canonical_json, options) {
        Ok(tree) => {
            let html = print_html(&tree, &options.print_options());
            debug!(html_bytes = html.len(), "Static export complete");
            ExportOutcome::Exported(StaticExport {
                html,
                tree,
                attributions_summary,
            })
        }
        Err(err) => fallback(err, attributions_summary),
    }
}

fn fallback(error: ExportError, attributions_summary: Vec<AttributionSummary>) -> ExportOutcome {
    warn!(error = %error, "Static export failed; falling back to read-only editor");
    ExportOutcome::Fallback(ExportFallback {
        error,
        attributions_summary,
    })
}

fn render(
    document: &Document,
    canonical_json: &str,
    options: &ExportOptions,
) -> Result<Vec<HtmlNode>, ExportError> {
    let mut content = generate(document)?;
    TransformEngine::new().run(&mut content, options)?;

    Ok(vec![
        HtmlElement::new("link")
            .with_attr("rel", "stylesheet")
            .with_attr("href", options.stylesheet_href.as_str())
            .into(),
        HtmlElement::new("div")
            .with_class(STATIC_ROOT_CLASS)
            .with_children(content)
            .into(),
        embedded_json_script(canonical_json).into(),
    ])
}

/// `<script type="application/lexical+json">` carrying the canonical JSON
pub fn embedded_json_script(canonical_json: &str) -> HtmlElement {
    HtmlElement::new("script")
        .with_attr("type", markers::EMBEDDED_JSON_TYPE)
        .with_child(HtmlNode::Raw(canonical_json.replace("</", "<\\/")))
}

fn node_attributions(document: &Document) -> Vec<AttributionSummary> {
    let mut summary = Vec::new();
    document.walk(&mut |node| {
        if let Some(record) = node.attribution.as_ref().filter(|r| !r.is_empty()) {
            summary.push(AttributionSummary::from_record(node.key.as_str(), record));
        }
    });
    summary
}

fn meta_attributions(value: &Value) -> Vec<AttributionSummary> {
    let Some(attributions) = value
        .get(META_FIELD)
        .and_then(|meta| meta.get("attributions"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    attributions
        .iter()
        .filter_map(|(key, raw)| {
            let record = AttributionRecord::from_value(raw)?;
            (!record.is_empty()).then(|| AttributionSummary::from_record(key.as_str(), &record))
        })
        .collect()
}
