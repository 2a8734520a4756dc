//! Poll markup shared by the static poll transform and hydrated widgets.
//!
//! Both variants use the interactive poll component's class names so one
//! stylesheet covers the editor, static exports and hydrated pages.

use crate::dom::HtmlElement;
use cyclenotes_document::PollOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode<'a> {
    /// Non-interactive snapshot
    Static,
    /// Mounted widget; `voter` decides which options render as checked
    Interactive {
        widget_id: usize,
        voter: Option<&'a str>,
    },
}

pub const WIDGET_ATTR: &str = "data-poll-widget";
pub const OPTION_UID_ATTR: &str = "data-option-uid";

pub fn render_poll(question: &str, options: &[PollOption], mode: PollMode) -> HtmlElement {
    let total: usize = options.iter().map(PollOption::vote_count).sum();

    let mut inner = HtmlElement::new("div").with_class("PollNode__inner");
    if let PollMode::Interactive { widget_id, .. } = mode {
        inner.set_attr(WIDGET_ATTR, widget_id.to_string());
    }

    inner = inner.with_child(
        HtmlElement::new("h2")
            .with_class("PollNode__heading")
            .with_text(question),
    );

    for option in options {
        inner = inner.with_child(render_option(option, total, mode));
    }

    inner.with_child(
        HtmlElement::new("div")
            .with_class("PollNode__footer")
            .with_child(HtmlElement::new("span").with_text(format!("Total: {}", vote_label(total)))),
    )
}

fn render_option(option: &PollOption, total: usize, mode: PollMode) -> HtmlElement {
    let votes = option.vote_count();
    let percent = if total == 0 { 0 } else { votes * 100 / total };

    let checkbox = match mode {
        PollMode::Static => HtmlElement::new("span")
            .with_class("PollNode__optionCheckbox")
            .with_attr("aria-hidden", "true"),
        PollMode::Interactive { voter, .. } => {
            let checked = voter.map(|id| option.has_voted(id)).unwrap_or(false);
            let mut button = HtmlElement::new("button")
                .with_attr("type", "button")
                .with_class("PollNode__optionCheckbox")
                .with_attr("aria-pressed", checked.to_string())
                .with_attr(OPTION_UID_ATTR, option.uid.as_str());
            if checked {
                button.add_class("PollNode__optionCheckboxChecked");
            }
            button
        }
    };

    HtmlElement::new("div")
        .with_class("PollNode__optionContainer")
        .with_attr(OPTION_UID_ATTR, option.uid.as_str())
        .with_child(
            HtmlElement::new("div")
                .with_class("PollNode__optionCheckboxWrapper")
                .with_child(checkbox),
        )
        .with_child(
            HtmlElement::new("div")
                .with_class("PollNode__optionInputWrapper")
                .with_child(
                    HtmlElement::new("div")
                        .with_class("PollNode__optionInputVotes")
                        .with_attr("style", format!("width: {}%;", percent)),
                )
                .with_child(
                    HtmlElement::new("span")
                        .with_class("PollNode__optionInputVotesCount")
                        .with_text(vote_label(votes)),
                )
                .with_child(
                    HtmlElement::new("span")
                        .with_class("PollNode__optionText")
                        .with_text(option.text.as_str()),
                ),
        )
}

fn vote_label(count: usize) -> String {
    if count == 1 {
        "1 vote".to_string()
    } else {
        format!("{} votes", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{find_all, HtmlNode};

    fn options() -> Vec<PollOption> {
        let mut yes = PollOption::new("a", "Yes");
        yes.toggle_vote("u1");
        yes.toggle_vote("u2");
        let mut no = PollOption::new("b", "No");
        no.toggle_vote("u3");
        vec![yes, no]
    }

    #[test]
    fn test_static_poll_shows_counts() {
        let el = render_poll("Replace chain?", &options(), PollMode::Static);
        let text = el.text_content();

        assert!(text.starts_with("Replace chain?"));
        assert!(text.contains("2 votesYes"));
        assert!(text.contains("1 voteNo"));
        assert!(text.ends_with("Total: 3 votes"));
        assert!(!el.has_attr(WIDGET_ATTR));
    }

    #[test]
    fn test_interactive_poll_marks_voter_choice() {
        let el = render_poll(
            "Replace chain?",
            &options(),
            PollMode::Interactive {
                widget_id: 4,
                voter: Some("u3"),
            },
        );
        let nodes = vec![HtmlNode::from(el)];
        let buttons = find_all(&nodes, &|el| el.is("button"));

        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].attr("aria-pressed"), Some("false"));
        assert_eq!(buttons[1].attr("aria-pressed"), Some("true"));
        assert_eq!(nodes[0].as_element().unwrap().attr(WIDGET_ATTR), Some("4"));
    }
}
