//! Hydration of static poll containers into interactive widgets.
//!
//! Works on the exported tree (or a tree read back with
//! [`crate::parse_fragment`]). Widget state is local to the [`Hydrator`];
//! nothing is written back to the canonical document.
//!
//! Widget ids are unique within the tree: a hydrator continues numbering
//! after the largest `data-poll-widget-id` already present, so several
//! hydrators can share one page. Widgets always render from the
//! hydrator's configured voter.

use crate::dom::{find_all, HtmlElement, HtmlNode};
use crate::error::HydrationError;
use crate::poll_view::{render_poll, PollMode};
use cyclenotes_document::{markers, Poll, PollOption};
use tracing::{debug, warn};

/// One-shot flag set on a container once its widget is mounted
pub const HYDRATED_FLAG: &str = "data-poll-hydrated";
pub const WIDGET_ID_ATTR: &str = "data-poll-widget-id";

/// Local state of a mounted poll
#[derive(Debug, Clone, PartialEq)]
pub struct PollWidget {
    pub id: usize,
    pub poll: Poll,
}

impl PollWidget {
    /// Flip `voter`'s vote on an option; returns whether the vote is now present
    pub fn toggle_vote(&mut self, option_uid: &str, voter: &str) -> Result<bool, HydrationError> {
        self.poll
            .toggle_vote(option_uid, voter)
            .ok_or_else(|| HydrationError::UnknownOption(option_uid.to_string()))
    }

    fn render(&self, voter: Option<&str>) -> HtmlElement {
        render_poll(
            &self.poll.question,
            &self.poll.options,
            PollMode::Interactive {
                widget_id: self.id,
                voter,
            },
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct HydrationReport {
    /// Widget ids mounted by this call
    pub mounted: Vec<usize>,
    /// Containers already hydrated by an earlier call
    pub skipped: usize,
    /// Placeholders left static
    pub failed: Vec<HydrationError>,
}

#[derive(Debug, Default)]
pub struct Hydrator {
    widgets: Vec<PollWidget>,
    voter: Option<String>,
    next_id: usize,
}

impl Hydrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render widgets from this voter's point of view
    pub fn with_voter(voter: impl Into<String>) -> Self {
        Self {
            voter: Some(voter.into()),
            ..Self::default()
        }
    }

    pub fn widgets(&self) -> &[PollWidget] {
        &self.widgets
    }

    pub fn widget(&self, id: usize) -> Option<&PollWidget> {
        self.widgets.iter().find(|widget| widget.id == id)
    }

    /// Mount a widget into every poll container not hydrated yet
    pub fn hydrate(&mut self, nodes: &mut [HtmlNode]) -> HydrationReport {
        let mut report = HydrationReport::default();
        if let Some(largest) = largest_widget_id(nodes) {
            self.next_id = self.next_id.max(largest + 1);
        }
        self.hydrate_nodes(nodes, &mut report);
        debug!(
            mounted = report.mounted.len(),
            skipped = report.skipped,
            failed = report.failed.len(),
            "Hydration pass complete"
        );
        report
    }

    fn hydrate_nodes(&mut self, nodes: &mut [HtmlNode], report: &mut HydrationReport) {
        for node in nodes.iter_mut() {
            let HtmlNode::Element(element) = node else {
                continue;
            };

            if !is_poll_container(element) {
                self.hydrate_nodes(&mut element.children, report);
                continue;
            }

            if element.has_attr(HYDRATED_FLAG) {
                report.skipped += 1;
                continue;
            }

            match self.mount(element) {
                Ok(id) => report.mounted.push(id),
                Err(err) => {
                    warn!(error = %err, "Poll placeholder left static");
                    report.failed.push(err);
                }
            }
        }
    }

    fn mount(&mut self, container: &mut HtmlElement) -> Result<usize, HydrationError> {
        let question = container
            .attr(markers::POLL_QUESTION)
            .unwrap_or_default()
            .to_string();
        let raw_options = container.attr(markers::POLL_OPTIONS).unwrap_or("[]");
        let options: Vec<PollOption> =
            serde_json::from_str(raw_options).map_err(|err| HydrationError::MalformedOptions {
                question: question.clone(),
                reason: err.to_string(),
            })?;

        let widget = PollWidget {
            id: self.next_id,
            poll: Poll::new(question, options),
        };
        self.next_id += 1;

        container.set_attr(HYDRATED_FLAG, "true");
        container.set_attr(WIDGET_ID_ATTR, widget.id.to_string());
        container.children = vec![widget.render(self.voter.as_deref()).into()];

        let id = widget.id;
        self.widgets.push(widget);
        Ok(id)
    }

    /// Toggle a vote and re-render only that widget's subtree
    pub fn toggle_vote(
        &mut self,
        nodes: &mut [HtmlNode],
        widget_id: usize,
        option_uid: &str,
        voter: &str,
    ) -> Result<bool, HydrationError> {
        let widget = self
            .widgets
            .iter_mut()
            .find(|widget| widget.id == widget_id)
            .ok_or(HydrationError::UnknownWidget(widget_id))?;
        let container =
            find_container(nodes, widget_id).ok_or(HydrationError::UnknownWidget(widget_id))?;

        let voted = widget.toggle_vote(option_uid, voter)?;
        container.children = vec![widget.render(self.voter.as_deref()).into()];
        Ok(voted)
    }
}

fn is_poll_container(element: &HtmlElement) -> bool {
    element.has_attr(markers::POLL_CONTAINER) && element.has_attr(markers::POLL_QUESTION)
}

fn largest_widget_id(nodes: &[HtmlNode]) -> Option<usize> {
    find_all(nodes, &|el| el.has_attr(WIDGET_ID_ATTR))
        .into_iter()
        .filter_map(|el| el.attr(WIDGET_ID_ATTR)?.parse().ok())
        .max()
}

fn find_container(nodes: &mut [HtmlNode], widget_id: usize) -> Option<&mut HtmlElement> {
    let id = widget_id.to_string();
    for node in nodes.iter_mut() {
        let HtmlNode::Element(element) = node else {
            continue;
        };
        if element.attr(WIDGET_ID_ATTR) == Some(id.as_str()) {
            return Some(element);
        }
        if let Some(found) = find_container(&mut element.children, widget_id) {
            return Some(found);
        }
    }
    None
}
