use super::{visit_elements, Transform, Visit};
use crate::dom::{HtmlElement, HtmlNode};
use crate::error::ExportError;
use crate::export::ExportOptions;
use cyclenotes_document::markers;

const EDITOR_QUOTE_CLASS: &str = "editor-quote";

#[derive(Debug)]
pub struct QuoteRendering;

impl Transform for QuoteRendering {
    fn name(&self) -> &'static str {
        "quote"
    }

    fn apply(&self, nodes: &mut [HtmlNode], _options: &ExportOptions) -> Result<usize, ExportError> {
        let mut count = 0;
        visit_elements(nodes, None, &mut |node, _parent| {
            let HtmlNode::Element(element) = node else {
                return Ok(Visit::Descend);
            };
            if !is_quote(element) {
                return Ok(Visit::Descend);
            }

            let children = std::mem::take(&mut element.children);
            *node = HtmlElement::new("blockquote")
                .with_class(markers::QUOTE_CLASS)
                .with_children(children)
                .into();
            count += 1;
            // Nested quotes still get rewritten
            Ok(Visit::Descend)
        })?;
        Ok(count)
    }
}

fn is_quote(element: &HtmlElement) -> bool {
    if element.is("blockquote") {
        return element.has_attr(markers::QUOTE) || !element.has_class(markers::QUOTE_CLASS);
    }
    element.has_attr(markers::QUOTE)
        || element.has_class(markers::QUOTE_CLASS)
        || element.has_class(EDITOR_QUOTE_CLASS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fragment;
    use crate::printer::{print_html, PrintOptions};

    fn run(html: &str) -> String {
        let mut nodes = parse_fragment(html);
        QuoteRendering.apply(&mut nodes, &ExportOptions::default()).unwrap();
        print_html(&nodes, &PrintOptions::default())
    }

    #[test]
    fn test_quote_variants() {
        assert_eq!(
            run(r#"<blockquote data-lexical-quote="true">Ride on</blockquote>"#),
            r#"<blockquote class="notes-quote">Ride on</blockquote>"#
        );
        assert_eq!(
            run(r#"<div class="editor-quote"><b>Pedal</b></div>"#),
            r#"<blockquote class="notes-quote"><b>Pedal</b></blockquote>"#
        );
        assert_eq!(
            run("<blockquote>plain</blockquote>"),
            r#"<blockquote class="notes-quote">plain</blockquote>"#
        );
    }

    #[test]
    fn test_nested_and_idempotent() {
        let once = run("<blockquote>a<blockquote>b</blockquote></blockquote>");
        assert_eq!(
            once,
            r#"<blockquote class="notes-quote">a<blockquote class="notes-quote">b</blockquote></blockquote>"#
        );
        assert_eq!(run(&once), once);
    }
}
