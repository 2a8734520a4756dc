use super::{visit_elements, Transform, Visit};
use crate::dom::{HtmlElement, HtmlNode};
use crate::error::ExportError;
use crate::export::ExportOptions;
use cyclenotes_document::markers;

#[derive(Debug)]
pub struct MentionRendering;

impl Transform for MentionRendering {
    fn name(&self) -> &'static str {
        "mention"
    }

    fn apply(&self, nodes: &mut [HtmlNode], _options: &ExportOptions) -> Result<usize, ExportError> {
        let mut count = 0;
        visit_elements(nodes, None, &mut |node, _parent| {
            let HtmlNode::Element(element) = node else {
                return Ok(Visit::Descend);
            };
            if !element.has_attr(markers::MENTION) {
                return Ok(Visit::Descend);
            }

            let name = match element.attr(markers::MENTION_NAME) {
                Some(name) if !name.trim().is_empty() => name.trim().to_string(),
                _ => element.text_content().trim().trim_start_matches('@').to_string(),
            };

            *node = HtmlElement::new("span")
                .with_class(markers::MENTION_CLASS)
                .with_attr("data-mention", name.as_str())
                .with_text(format!("@{}", name))
                .into();
            count += 1;
            Ok(Visit::Skip)
        })?;
        Ok(count)
    }
}
