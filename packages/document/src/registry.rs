//! # Node Type Registry
//!
//! Declares every node kind the notes engine understands and the contract
//! each one follows:
//!
//! - **Wire name**: the `type` string in canonical JSON
//! - **Shape**: container (has `children`) or leaf
//! - **Placement**: block-level or inline
//! - **Decorator**: no lossless HTML form, so a static export can only be
//!   recovered through the embedded JSON script
//! - **Export marker**: the attribute the HTML generator puts on the kind's
//!   placeholder element, which the matching export transform keys on
//!
//! The serializer, deserializer and the static export pipeline all dispatch
//! through [`NodeType::spec`] instead of hard-coding per-kind facts.

/// Closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Root,
    Paragraph,
    Heading,
    List,
    ListItem,
    ChecklistItem,
    Quote,
    Text,
    LineBreak,
    Mention,
    Hashtag,
    DateTime,
    Poll,
    YouTube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Container,
    Leaf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Block,
    Inline,
}

/// Serialization and rendering contract of one node kind
#[derive(Debug, Clone, Copy)]
pub struct NodeTypeSpec {
    pub node_type: NodeType,
    pub name: &'static str,
    pub shape: NodeShape,
    pub placement: Placement,
    pub decorator: bool,
    pub export_marker: Option<&'static str>,
}

/// Attribute and class names shared by the HTML generator, the export
/// transforms and the hydration mounter.
pub mod markers {
    pub const POLL_QUESTION: &str = "data-lexical-poll-question";
    pub const POLL_OPTIONS: &str = "data-lexical-poll-options";
    pub const POLL_CONTAINER: &str = "data-lexical-poll-container";
    pub const POLL_CONTAINER_CLASS: &str = "PollNode__container";

    pub const MENTION: &str = "data-lexical-mention";
    pub const MENTION_NAME: &str = "data-lexical-mention-name";
    pub const MENTION_CLASS: &str = "notes-mention";

    pub const HASHTAG: &str = "data-lexical-hashtag";
    pub const HASHTAG_CLASS: &str = "notes-hashtag";

    pub const DATETIME: &str = "data-lexical-datetime";
    pub const DATETIME_RESOLVED: &str = "data-lexical-datetime-resolved";
    pub const DATETIME_CLASS: &str = "notes-datetime";

    pub const CHECKLIST: &str = "data-lexical-checklist";
    pub const CHECKLIST_ITEM_CLASS: &str = "notes-checklist-item";

    pub const QUOTE: &str = "data-lexical-quote";
    pub const QUOTE_CLASS: &str = "notes-quote";

    pub const YOUTUBE: &str = "data-lexical-youtube";

    pub const OPAQUE: &str = "data-lexical-opaque";

    /// `type` of the script tag carrying the canonical JSON in exported HTML
    pub const EMBEDDED_JSON_TYPE: &str = "application/lexical+json";
}

/// Indexed by `NodeType as usize`; order must match the enum.
pub const NODE_TYPES: &[NodeTypeSpec] = &[
    NodeTypeSpec {
        node_type: NodeType::Root,
        name: "root",
        shape: NodeShape::Container,
        placement: Placement::Block,
        decorator: false,
        export_marker: None,
    },
    NodeTypeSpec {
        node_type: NodeType::Paragraph,
        name: "paragraph",
        shape: NodeShape::Container,
        placement: Placement::Block,
        decorator: false,
        export_marker: None,
    },
    NodeTypeSpec {
        node_type: NodeType::Heading,
        name: "heading",
        shape: NodeShape::Container,
        placement: Placement::Block,
        decorator: false,
        export_marker: None,
    },
    NodeTypeSpec {
        node_type: NodeType::List,
        name: "list",
        shape: NodeShape::Container,
        placement: Placement::Block,
        decorator: false,
        export_marker: None,
    },
    NodeTypeSpec {
        node_type: NodeType::ListItem,
        name: "listitem",
        shape: NodeShape::Container,
        placement: Placement::Block,
        decorator: false,
        export_marker: None,
    },
    NodeTypeSpec {
        node_type: NodeType::ChecklistItem,
        name: "checklist-item",
        shape: NodeShape::Container,
        placement: Placement::Block,
        decorator: false,
        export_marker: Some(markers::CHECKLIST),
    },
    NodeTypeSpec {
        node_type: NodeType::Quote,
        name: "quote",
        shape: NodeShape::Container,
        placement: Placement::Block,
        decorator: false,
        export_marker: Some(markers::QUOTE),
    },
    NodeTypeSpec {
        node_type: NodeType::Text,
        name: "text",
        shape: NodeShape::Leaf,
        placement: Placement::Inline,
        decorator: false,
        export_marker: None,
    },
    NodeTypeSpec {
        node_type: NodeType::LineBreak,
        name: "linebreak",
        shape: NodeShape::Leaf,
        placement: Placement::Inline,
        decorator: false,
        export_marker: None,
    },
    NodeTypeSpec {
        node_type: NodeType::Mention,
        name: "mention",
        shape: NodeShape::Leaf,
        placement: Placement::Inline,
        decorator: false,
        export_marker: Some(markers::MENTION),
    },
    NodeTypeSpec {
        node_type: NodeType::Hashtag,
        name: "hashtag",
        shape: NodeShape::Leaf,
        placement: Placement::Inline,
        decorator: false,
        export_marker: Some(markers::HASHTAG),
    },
    NodeTypeSpec {
        node_type: NodeType::DateTime,
        name: "datetime",
        shape: NodeShape::Leaf,
        placement: Placement::Inline,
        decorator: false,
        export_marker: Some(markers::DATETIME),
    },
    NodeTypeSpec {
        node_type: NodeType::Poll,
        name: "poll",
        shape: NodeShape::Leaf,
        placement: Placement::Block,
        decorator: true,
        export_marker: Some(markers::POLL_QUESTION),
    },
    NodeTypeSpec {
        node_type: NodeType::YouTube,
        name: "youtube",
        shape: NodeShape::Leaf,
        placement: Placement::Block,
        decorator: true,
        export_marker: Some(markers::YOUTUBE),
    },
];

impl NodeType {
    pub fn spec(self) -> &'static NodeTypeSpec {
        &NODE_TYPES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look up a kind by its wire name
    pub fn from_name(name: &str) -> Option<NodeType> {
        NODE_TYPES
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.node_type)
    }

    pub fn is_container(self) -> bool {
        self.spec().shape == NodeShape::Container
    }

    pub fn is_block(self) -> bool {
        self.spec().placement == Placement::Block
    }

    pub fn is_decorator(self) -> bool {
        self.spec().decorator
    }

    /// Kinds whose static rendering loses information
    pub fn decorators() -> impl Iterator<Item = NodeType> {
        NODE_TYPES
            .iter()
            .filter(|spec| spec.decorator)
            .map(|spec| spec.node_type)
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_enum() {
        for (index, spec) in NODE_TYPES.iter().enumerate() {
            assert_eq!(spec.node_type as usize, index, "{} is out of order", spec.name);
        }
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(NodeType::from_name("poll"), Some(NodeType::Poll));
        assert_eq!(NodeType::from_name("checklist-item"), Some(NodeType::ChecklistItem));
        assert_eq!(NodeType::from_name("table"), None);
        assert_eq!(NodeType::YouTube.name(), "youtube");
    }

    #[test]
    fn test_decorators() {
        let decorators: Vec<_> = NodeType::decorators().collect();
        assert_eq!(decorators, vec![NodeType::Poll, NodeType::YouTube]);
        assert!(!NodeType::Mention.is_decorator());
    }

    #[test]
    fn test_shapes() {
        assert!(NodeType::Quote.is_container());
        assert!(!NodeType::Text.is_container());
        assert!(NodeType::Poll.is_block());
        assert!(!NodeType::Hashtag.is_block());
    }
}
