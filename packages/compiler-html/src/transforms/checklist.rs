use super::{visit_elements, Transform, Visit};
use crate::dom::{HtmlElement, HtmlNode};
use crate::error::ExportError;
use crate::export::ExportOptions;
use cyclenotes_document::markers;

/// Set on rewritten items; the transform never looks inside them again
pub const NORMALIZED_ATTR: &str = "data-checklist-normalized";

const CHECKED_MARKS: &[char] = &['☑', '☒', '✓', '✔', '✅'];
const UNCHECKED_MARKS: &[char] = &['☐', '□'];

/// Rewrites checkbox-like elements into a disabled checkbox + label pair
///
/// Recognized shapes: `<input type=checkbox>`, containers with such an input
/// as a direct child, `role=checkbox` / `aria-checked` / data markers, and
/// text-only elements led by a check-mark character. `<li>` items are
/// rewritten in place so the parent list keeps its numbering and markers.
#[derive(Debug)]
pub struct ChecklistNormalization;

struct Checkbox {
    checked: bool,
    label: Vec<HtmlNode>,
}

impl Transform for ChecklistNormalization {
    fn name(&self) -> &'static str {
        "checklist"
    }

    fn apply(&self, nodes: &mut [HtmlNode], _options: &ExportOptions) -> Result<usize, ExportError> {
        let mut count = 0;
        visit_elements(nodes, None, &mut |node, _parent| {
            let HtmlNode::Element(element) = node else {
                return Ok(Visit::Descend);
            };
            if element.has_attr(NORMALIZED_ATTR) {
                return Ok(Visit::Skip);
            }
            let Some(checkbox) = detect(element) else {
                return Ok(Visit::Descend);
            };

            let original = std::mem::replace(element, HtmlElement::new("div"));
            *node = HtmlNode::Element(rewrite(original, checkbox));
            count += 1;
            Ok(Visit::Skip)
        })?;
        Ok(count)
    }
}

fn is_checkbox_input(element: &HtmlElement) -> bool {
    element.is("input") && element.attr_is("type", "checkbox")
}

fn detect(element: &HtmlElement) -> Option<Checkbox> {
    if is_checkbox_input(element) {
        return Some(Checkbox {
            checked: element.has_attr("checked"),
            label: Vec::new(),
        });
    }

    let is_item_container = ["li", "div", "p", "label"].iter().any(|tag| element.is(tag));

    if is_item_container {
        if let Some(input) = element.child_elements().find(|child| is_checkbox_input(child)) {
            let checked = input.has_attr("checked");
            let label = element
                .children
                .iter()
                .filter(|child| !child.as_element().map(is_checkbox_input).unwrap_or(false))
                .cloned()
                .collect();
            return Some(Checkbox {
                checked,
                label: trim_leading_text(label),
            });
        }
    }

    if element.attr_is("role", "checkbox")
        || element.has_attr("aria-checked")
        || element.has_attr(markers::CHECKLIST)
        || element.has_attr("data-checked")
    {
        let checked = element.attr_is("aria-checked", "true") || element.attr_is("data-checked", "true");
        return Some(Checkbox {
            checked,
            label: element.children.clone(),
        });
    }

    let accepts_mark = is_item_container || element.is("span");
    if accepts_mark && !element.has_element_children() {
        if let Some((checked, rest)) = split_check_mark(&element.text_content()) {
            let label = if rest.is_empty() {
                Vec::new()
            } else {
                vec![HtmlNode::text(rest)]
            };
            return Some(Checkbox { checked, label });
        }
    }

    None
}

/// `"☑ Tighten headset"` → `(true, "Tighten headset")`
fn split_check_mark(text: &str) -> Option<(bool, String)> {
    let trimmed = text.trim();
    let mark = trimmed.chars().next()?;
    let checked = if CHECKED_MARKS.contains(&mark) {
        true
    } else if UNCHECKED_MARKS.contains(&mark) {
        false
    } else {
        return None;
    };

    let rest = &trimmed[mark.len_utf8()..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((checked, rest.trim().to_string()))
}

fn trim_leading_text(mut label: Vec<HtmlNode>) -> Vec<HtmlNode> {
    if let Some(HtmlNode::Text(text)) = label.first_mut() {
        *text = text.trim_start().to_string();
        if text.is_empty() {
            label.remove(0);
        }
    }
    label
}

fn rewrite(original: HtmlElement, checkbox: Checkbox) -> HtmlElement {
    let mut input = HtmlElement::new("input")
        .with_attr("type", "checkbox")
        .with_attr("disabled", "");
    if checkbox.checked {
        input.set_attr("checked", "");
    }
    let label = HtmlElement::new("label")
        .with_class("notes-checklist-label")
        .with_children(checkbox.label);

    let mut item = if original.is("li") {
        let mut li = original;
        for attr in ["role", "aria-checked", "tabindex", "data-checked", markers::CHECKLIST] {
            li.remove_attr(attr);
        }
        li.children.clear();
        li
    } else {
        let tag = if original.is("span") || original.is("input") {
            "span"
        } else {
            "div"
        };
        let mut wrapper = HtmlElement::new(tag);
        if !original.is("input") {
            if let Some(class) = original.attr("class") {
                wrapper.set_attr("class", class);
            }
        }
        wrapper
    };

    item.add_class(markers::CHECKLIST_ITEM_CLASS);
    item.set_attr(NORMALIZED_ATTR, "true");
    item.set_attr("data-checked", checkbox.checked.to_string());
    item.children = vec![input.into(), label.into()];
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fragment;
    use crate::printer::{print_html, PrintOptions};

    fn run(html: &str) -> String {
        let mut nodes = parse_fragment(html);
        ChecklistNormalization
            .apply(&mut nodes, &ExportOptions::default())
            .unwrap();
        print_html(&nodes, &PrintOptions::default())
    }

    #[test]
    fn test_list_item_is_rewritten_in_place() {
        let html = run(r#"<ol><li role="checkbox" aria-checked="true" class="x">Pump tires</li></ol>"#);
        assert_eq!(
            html,
            "<ol><li class=\"x notes-checklist-item\" data-checklist-normalized=\"true\" data-checked=\"true\">\
             <input type=\"checkbox\" disabled=\"\" checked=\"\" />\
             <label class=\"notes-checklist-label\">Pump tires</label></li></ol>"
        );
    }

    #[test]
    fn test_existing_input_inside_item() {
        let html = run(r#"<ul><li><input type="checkbox"> Order tube</li></ul>"#);
        assert!(html.contains("data-checked=\"false\""));
        assert!(html.contains("<label class=\"notes-checklist-label\">Order tube</label>"));
        assert_eq!(html.matches("<input").count(), 1);
    }

    #[test]
    fn test_check_mark_text() {
        let html = run("<p>✔ Wheel trued</p><p>☐ Call customer</p><p>Plain</p>");
        assert!(html.starts_with("<div class=\"notes-checklist-item\" data-checklist-normalized=\"true\" data-checked=\"true\">"));
        assert!(html.contains("data-checked=\"false\""));
        assert!(html.ends_with("<p>Plain</p>"));
    }

    #[test]
    fn test_bare_input_becomes_span_pair() {
        let html = run(r#"<span>Done? <input type="checkbox" checked></span>"#);
        assert!(html.starts_with("<span>Done? <span class=\"notes-checklist-item\""));
        assert!(html.contains("checked=\"\" />"));
    }

    #[test]
    fn test_idempotent() {
        let once = run(r#"<ul><li role="checkbox" aria-checked="false">a</li></ul><div data-checked="true">b</div>"#);
        assert_eq!(run(&once), once);
    }

    #[test]
    fn test_mark_must_be_followed_by_space() {
        assert_eq!(split_check_mark("✓"), Some((true, String::new())));
        assert_eq!(split_check_mark("☐ x"), Some((false, "x".to_string())));
        assert_eq!(split_check_mark("✓ok"), None);
        assert_eq!(split_check_mark("ok ✓"), None);
    }
}
