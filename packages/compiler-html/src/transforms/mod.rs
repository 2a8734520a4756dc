//! # Export Transforms
//!
//! Node-specific rewrites applied to the baseline HTML tree.
//!
//! ## Design
//!
//! Each transform:
//! - **Keys on its own marker**: only elements carrying its attribute/class
//!   are touched, so transforms never interfere with each other
//! - **Is idempotent**: its output never matches its own marker again
//! - **Fails loudly**: a malformed placeholder aborts the export, which
//!   falls back to a live read-only editor instead of emitting broken HTML

mod checklist;
mod datetime;
mod hashtag;
mod list_repair;
mod mention;
mod poll;
mod quote;

pub use checklist::ChecklistNormalization;
pub use datetime::DateTimeRendering;
pub use hashtag::HashtagRendering;
pub use list_repair::ListRepair;
pub use mention::MentionRendering;
pub use poll::PollRendering;
pub use quote::QuoteRendering;

use crate::dom::HtmlNode;
use crate::error::ExportError;
use crate::export::ExportOptions;
use tracing::debug;

/// A tree-to-tree rewrite over the exported HTML
pub trait Transform: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Rewrite matching elements in place; returns how many were rewritten
    fn apply(&self, nodes: &mut [HtmlNode], options: &ExportOptions) -> Result<usize, ExportError>;
}

/// Ordered set of transforms run by the export pipeline
#[derive(Debug)]
pub struct TransformEngine {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformEngine {
    /// Create engine with the default transforms, in pipeline order
    pub fn new() -> Self {
        Self {
            transforms: vec![
                Box::new(ChecklistNormalization),
                Box::new(ListRepair),
                Box::new(PollRendering),
                Box::new(MentionRendering),
                Box::new(DateTimeRendering),
                Box::new(HashtagRendering),
                Box::new(QuoteRendering),
            ],
        }
    }

    pub fn with_transforms(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    /// Run every transform in order
    pub fn run(&self, nodes: &mut [HtmlNode], options: &ExportOptions) -> Result<usize, ExportError> {
        let mut rewritten = 0;
        for transform in &self.transforms {
            let count = transform.apply(nodes, options)?;
            debug!(transform = transform.name(), count, "Applied export transform");
            rewritten += count;
        }
        Ok(rewritten)
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// What to do after visiting a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    /// Continue into the (possibly replaced) node's children
    Descend,
    /// Do not look inside this node
    Skip,
}

/// Pre-order walk over elements; `visit` may replace the node it is given.
/// The second argument is the parent element's tag, if any.
pub(crate) fn visit_elements<F>(
    nodes: &mut [HtmlNode],
    parent_tag: Option<&str>,
    visit: &mut F,
) -> Result<(), ExportError>
where
    F: FnMut(&mut HtmlNode, Option<&str>) -> Result<Visit, ExportError>,
{
    for node in nodes.iter_mut() {
        if !matches!(node, HtmlNode::Element(_)) {
            continue;
        }
        if visit(node, parent_tag)? == Visit::Skip {
            continue;
        }
        if let HtmlNode::Element(element) = node {
            let tag = element.tag.clone();
            visit_elements(&mut element.children, Some(&tag), visit)?;
        }
    }
    Ok(())
}
