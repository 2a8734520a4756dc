use super::{visit_elements, Transform, Visit};
use crate::dom::{HtmlElement, HtmlNode};
use crate::error::ExportError;
use crate::export::ExportOptions;
use cyclenotes_document::markers;

const EDITOR_HASHTAG_CLASS: &str = "editor-hashtag";

/// Hashtags become links to the tag listing under
/// [`ExportOptions::tag_base_path`]
#[derive(Debug)]
pub struct HashtagRendering;

impl Transform for HashtagRendering {
    fn name(&self) -> &'static str {
        "hashtag"
    }

    fn apply(&self, nodes: &mut [HtmlNode], options: &ExportOptions) -> Result<usize, ExportError> {
        let mut count = 0;
        visit_elements(nodes, None, &mut |node, _parent| {
            let HtmlNode::Element(element) = node else {
                return Ok(Visit::Descend);
            };
            if !is_hashtag(element) {
                return Ok(Visit::Descend);
            }

            let tag = match element.attr(markers::HASHTAG) {
                Some(tag) if !tag.trim().is_empty() => tag.trim().to_string(),
                _ => element.text_content().trim().trim_start_matches('#').to_string(),
            };
            if tag.is_empty() {
                return Ok(Visit::Skip);
            }

            *node = HtmlElement::new("a")
                .with_class(markers::HASHTAG_CLASS)
                .with_attr("href", tag_href(&options.tag_base_path, &tag))
                .with_attr("data-hashtag", tag.as_str())
                .with_text(format!("#{}", tag))
                .into();
            count += 1;
            Ok(Visit::Skip)
        })?;
        Ok(count)
    }
}

fn is_hashtag(element: &HtmlElement) -> bool {
    if element.is("a") && element.has_attr("data-hashtag") {
        return false;
    }
    (element.is("span") || element.is("a"))
        && (element.has_attr(markers::HASHTAG)
            || element.has_class(markers::HASHTAG_CLASS)
            || element.has_class(EDITOR_HASHTAG_CLASS))
}

fn tag_href(base: &str, tag: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), urlencoding::encode(tag))
}
