use super::{visit_elements, Transform, Visit};
use crate::dom::{HtmlElement, HtmlNode};
use crate::error::ExportError;
use crate::export::ExportOptions;
use crate::poll_view::{render_poll, PollMode};
use cyclenotes_document::{markers, PollOption};

/// Replaces poll placeholders with a static poll snapshot.
///
/// The container keeps the question and options attributes so a page can
/// later hydrate it into a live widget.
#[derive(Debug)]
pub struct PollRendering;

impl Transform for PollRendering {
    fn name(&self) -> &'static str {
        "poll"
    }

    fn apply(&self, nodes: &mut [HtmlNode], _options: &ExportOptions) -> Result<usize, ExportError> {
        let mut count = 0;
        visit_elements(nodes, None, &mut |node, _parent| {
            let HtmlNode::Element(element) = node else {
                return Ok(Visit::Descend);
            };
            if element.has_attr(markers::POLL_CONTAINER) || !element.has_attr(markers::POLL_QUESTION) {
                return Ok(Visit::Descend);
            }

            let question = element.attr(markers::POLL_QUESTION).unwrap_or_default().to_string();
            let raw_options = element.attr(markers::POLL_OPTIONS).unwrap_or("[]").to_string();
            let options = parse_options(&raw_options)?;

            *node = HtmlElement::new("div")
                .with_class(markers::POLL_CONTAINER_CLASS)
                .with_attr(markers::POLL_CONTAINER, "true")
                .with_attr(markers::POLL_QUESTION, question.as_str())
                .with_attr(markers::POLL_OPTIONS, raw_options)
                .with_child(render_poll(&question, &options, PollMode::Static))
                .into();
            count += 1;
            Ok(Visit::Skip)
        })?;
        Ok(count)
    }
}

/// Options as stored in the placeholder attribute
pub(crate) fn parse_options(raw: &str) -> Result<Vec<PollOption>, ExportError> {
    serde_json::from_str(raw).map_err(|err| ExportError::MalformedPlaceholder {
        kind: "poll",
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::find_all;
    use crate::parser::parse_fragment;

    #[test]
    fn test_placeholder_becomes_static_poll() {
        let mut nodes = parse_fragment(
            r#"<p>Vote:</p><span data-lexical-poll-question="Open Sundays?" data-lexical-poll-options="[{&quot;uid&quot;:&quot;a&quot;,&quot;text&quot;:&quot;Yes&quot;,&quot;votes&quot;:[&quot;u1&quot;]}]"></span>"#,
        );
        let count = PollRendering.apply(&mut nodes, &ExportOptions::default()).unwrap();
        assert_eq!(count, 1);

        let container = nodes[1].as_element().unwrap();
        assert!(container.is("div"));
        assert!(container.has_class("PollNode__container"));
        assert_eq!(container.attr("data-lexical-poll-question"), Some("Open Sundays?"));
        assert!(container.text_content().contains("1 voteYes"));
        assert_eq!(find_all(&nodes, &|el| el.is("button")).len(), 0);
    }

    #[test]
    fn test_second_run_is_noop() {
        let mut nodes = parse_fragment(
            r#"<span data-lexical-poll-question="Q" data-lexical-poll-options="[]"></span>"#,
        );
        PollRendering.apply(&mut nodes, &ExportOptions::default()).unwrap();
        let once = nodes.clone();
        let count = PollRendering.apply(&mut nodes, &ExportOptions::default()).unwrap();

        assert_eq!(count, 0);
        assert_eq!(nodes, once);
    }

    #[test]
    fn test_malformed_options_abort() {
        let mut nodes = parse_fragment(
            r#"<span data-lexical-poll-question="Q" data-lexical-poll-options="{not json"></span>"#,
        );
        let err = PollRendering
            .apply(&mut nodes, &ExportOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExportError::MalformedPlaceholder { kind: "poll", .. }));
    }
}
