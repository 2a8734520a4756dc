//! Baseline HTML generator
//!
//! Produces the generic, node-agnostic HTML for a document. Kinds that need
//! richer static output are emitted as marked placeholder elements which the
//! transforms in [`crate::transforms`] rewrite afterwards.

use crate::dom::{HtmlElement, HtmlNode};
use crate::error::ExportError;
use cyclenotes_document::{markers, Document, ListType, Node, NodeKind, TextFormat, TextRun};

/// Generate baseline HTML for every top-level block
pub fn generate(document: &Document) -> Result<Vec<HtmlNode>, ExportError> {
    document
        .children()
        .iter()
        .map(|node| generate_node(node, false))
        .collect()
}

fn generate_node(node: &Node, in_list: bool) -> Result<HtmlNode, ExportError> {
    let element = match &node.kind {
        NodeKind::Paragraph { children } => {
            let el = HtmlElement::new("p");
            if children.is_empty() {
                el.with_child(HtmlElement::new("br"))
            } else {
                el.with_children(generate_children(children, false)?)
            }
        }

        NodeKind::Heading { tag, children } => {
            HtmlElement::new(tag.as_str()).with_children(generate_children(children, false)?)
        }

        NodeKind::List {
            list_type,
            start,
            children,
        } => {
            let mut el = match list_type {
                ListType::Number => HtmlElement::new("ol"),
                ListType::Bullet => HtmlElement::new("ul"),
                ListType::Check => HtmlElement::new("ul").with_class("notes-checklist"),
            };
            if *list_type == ListType::Number && *start != 1 {
                el.set_attr("start", start.to_string());
            }
            el.with_children(generate_children(children, true)?)
        }

        NodeKind::ListItem {
            value,
            checked,
            children,
        } => {
            let mut el = HtmlElement::new("li").with_attr("value", value.to_string());
            if let Some(checked) = checked {
                el.set_attr("role", "checkbox");
                el.set_attr("aria-checked", checked.to_string());
                el.set_attr(markers::CHECKLIST, "true");
            }
            el.with_children(generate_children(children, false)?)
        }

        NodeKind::ChecklistItem { checked, children } => {
            HtmlElement::new(if in_list { "li" } else { "div" })
                .with_class(markers::CHECKLIST_ITEM_CLASS)
                .with_attr("role", "checkbox")
                .with_attr("aria-checked", checked.to_string())
                .with_attr(markers::CHECKLIST, "true")
                .with_children(generate_children(children, false)?)
        }

        NodeKind::Quote { children } => HtmlElement::new("blockquote")
            .with_attr(markers::QUOTE, "true")
            .with_children(generate_children(children, false)?),

        NodeKind::Text(run) => return Ok(generate_text(run)),

        NodeKind::LineBreak => HtmlElement::new("br"),

        NodeKind::Mention { mention_name } => HtmlElement::new("span")
            .with_attr(markers::MENTION, "true")
            .with_attr(markers::MENTION_NAME, mention_name.as_str())
            .with_text(mention_name.as_str()),

        NodeKind::Hashtag { tag } => HtmlElement::new("span")
            .with_class(markers::HASHTAG_CLASS)
            .with_attr(markers::HASHTAG, tag.as_str())
            .with_text(format!("#{}", tag)),

        NodeKind::DateTime(value) => {
            let mut el = HtmlElement::new("span").with_attr(markers::DATETIME, value.raw.as_str());
            if let Some(iso) = value.resolved_iso() {
                el.set_attr(markers::DATETIME_RESOLVED, iso);
            }
            el.with_text(value.raw.as_str())
        }

        NodeKind::Poll(poll) => {
            let options = serde_json::to_string(&poll.options)
                .map_err(|err| ExportError::Generation(format!("poll options: {}", err)))?;
            HtmlElement::new("span")
                .with_attr(markers::POLL_QUESTION, poll.question.as_str())
                .with_attr(markers::POLL_OPTIONS, options)
        }

        NodeKind::YouTube { video_id } => HtmlElement::new("iframe")
            .with_attr(markers::YOUTUBE, video_id.as_str())
            .with_attr("width", "560")
            .with_attr("height", "315")
            .with_attr(
                "src",
                format!("https://www.youtube-nocookie.com/embed/{}", video_id),
            )
            .with_attr("frameborder", "0")
            .with_attr(
                "allow",
                "accelerometer; encrypted-media; gyroscope; picture-in-picture",
            )
            .with_attr("allowfullscreen", "true")
            .with_attr("title", "YouTube video"),

        // No HTML form; the embedded JSON keeps it
        NodeKind::Opaque { type_name, .. } => {
            HtmlElement::new("div").with_attr(markers::OPAQUE, type_name.as_str())
        }
    };

    Ok(HtmlNode::Element(element))
}

fn generate_children(children: &[Node], in_list: bool) -> Result<Vec<HtmlNode>, ExportError> {
    children
        .iter()
        .map(|child| generate_node(child, in_list))
        .collect()
}

/// Text runs nest format tags innermost-first: code, s, u, em, strong
fn generate_text(run: &TextRun) -> HtmlNode {
    let mut node = HtmlNode::text(run.text.as_str());

    let wrappers = [
        (TextFormat::CODE, "code"),
        (TextFormat::STRIKETHROUGH, "s"),
        (TextFormat::UNDERLINE, "u"),
        (TextFormat::ITALIC, "em"),
        (TextFormat::BOLD, "strong"),
    ];
    for (flag, tag) in wrappers {
        if run.format.contains(flag) {
            node = HtmlElement::new(tag).with_child(node).into();
        }
    }

    if !run.style.is_empty() {
        node = HtmlElement::new("span")
            .with_attr("style", run.style.to_css())
            .with_child(node)
            .into();
    }

    node
}
