use super::{visit_elements, Transform, Visit};
use crate::dom::{HtmlElement, HtmlNode};
use crate::error::ExportError;
use crate::export::ExportOptions;
use cyclenotes_document::datetime::{parse_datetime, to_iso};
use cyclenotes_document::markers;
use tracing::debug;

/// Date-time placeholders become `<time>`; the `datetime` attribute is only
/// set when the value could be resolved
#[derive(Debug)]
pub struct DateTimeRendering;

impl Transform for DateTimeRendering {
    fn name(&self) -> &'static str {
        "datetime"
    }

    fn apply(&self, nodes: &mut [HtmlNode], _options: &ExportOptions) -> Result<usize, ExportError> {
        let mut count = 0;
        visit_elements(nodes, None, &mut |node, _parent| {
            let HtmlNode::Element(element) = node else {
                return Ok(Visit::Descend);
            };
            let Some(raw) = element.attr(markers::DATETIME) else {
                return Ok(Visit::Descend);
            };
            let raw = raw.to_string();

            let resolved = match element.attr(markers::DATETIME_RESOLVED) {
                Some(iso) if !iso.trim().is_empty() => Some(iso.trim().to_string()),
                _ => parse_datetime(&raw).map(|value| to_iso(&value)),
            };
            if resolved.is_none() {
                debug!(raw = %raw, "Date-time value could not be resolved");
            }

            let mut time = HtmlElement::new("time").with_class(markers::DATETIME_CLASS);
            if let Some(iso) = resolved {
                time.set_attr("datetime", iso);
            }
            *node = time.with_text(raw).into();
            count += 1;
            Ok(Visit::Skip)
        })?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fragment;
    use crate::printer::{print_html, PrintOptions};

    fn run(html: &str) -> String {
        let mut nodes = parse_fragment(html);
        DateTimeRendering.apply(&mut nodes, &ExportOptions::default()).unwrap();
        print_html(&nodes, &PrintOptions::default())
    }

    #[test]
    fn test_resolved_attribute_wins() {
        assert_eq!(
            run(r#"<span data-lexical-datetime="next Tuesday" data-lexical-datetime-resolved="2024-05-07T09:00:00.000Z">next Tuesday</span>"#),
            r#"<time class="notes-datetime" datetime="2024-05-07T09:00:00.000Z">next Tuesday</time>"#
        );
    }

    #[test]
    fn test_raw_value_is_parsed() {
        assert_eq!(
            run(r#"<span data-lexical-datetime="2024-03-01">2024-03-01</span>"#),
            r#"<time class="notes-datetime" datetime="2024-03-01T00:00:00.000Z">2024-03-01</time>"#
        );
    }

    #[test]
    fn test_unparseable_value_has_no_datetime_attribute() {
        assert_eq!(
            run(r#"<span data-lexical-datetime="whenever">whenever</span>"#),
            r#"<time class="notes-datetime">whenever</time>"#
        );
    }
}
