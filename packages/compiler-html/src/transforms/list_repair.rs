use super::{visit_elements, Transform, Visit};
use crate::dom::HtmlNode;
use crate::error::ExportError;
use crate::export::ExportOptions;
use cyclenotes_document::markers;

/// Checklist wrappers that ended up directly inside `<ul>`/`<ol>` become
/// `<li>` so the list stays valid HTML
#[derive(Debug)]
pub struct ListRepair;

impl Transform for ListRepair {
    fn name(&self) -> &'static str {
        "list-repair"
    }

    fn apply(&self, nodes: &mut [HtmlNode], _options: &ExportOptions) -> Result<usize, ExportError> {
        let mut count = 0;
        visit_elements(nodes, None, &mut |node, parent| {
            let in_list = matches!(parent, Some(tag) if tag.eq_ignore_ascii_case("ul") || tag.eq_ignore_ascii_case("ol"));
            if let HtmlNode::Element(element) = node {
                if in_list && element.is("div") && element.has_class(markers::CHECKLIST_ITEM_CLASS) {
                    element.tag = "li".to_string();
                    count += 1;
                }
            }
            Ok(Visit::Descend)
        })?;
        Ok(count)
    }
}
