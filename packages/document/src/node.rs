//! # Node Tree
//!
//! Nodes are a closed tagged union ([`NodeKind`]) wrapped in a [`Node`] that
//! carries the session-local key and, for top-level blocks, the attribution
//! record.
//!
//! Detached nodes built with the constructors below carry an unassigned key;
//! a [`crate::Document`] assigns real keys when it adopts them.

use crate::attribution::AttributionRecord;
use crate::datetime::{parse_datetime, to_iso};
use crate::key_generator::NodeKey;
use crate::registry::NodeType;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub attribution: Option<AttributionRecord>,
    /// Wire fields this build does not model (alignment, indent, ...),
    /// written back unchanged
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Paragraph { children: Vec<Node> },
    Heading { tag: HeadingTag, children: Vec<Node> },
    List { list_type: ListType, start: u32, children: Vec<Node> },
    /// `checked` is set for items of a `check` list
    ListItem {
        value: u32,
        checked: Option<bool>,
        children: Vec<Node>,
    },
    ChecklistItem { checked: bool, children: Vec<Node> },
    Quote { children: Vec<Node> },
    Text(TextRun),
    LineBreak,
    Mention { mention_name: String },
    Hashtag { tag: String },
    DateTime(DateTimeValue),
    Poll(Poll),
    YouTube { video_id: String },
    /// A `type` this build does not know; kept verbatim so it round-trips
    Opaque { type_name: String, fields: Map<String, Value> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingTag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingTag {
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingTag::H1 => "h1",
            HeadingTag::H2 => "h2",
            HeadingTag::H3 => "h3",
            HeadingTag::H4 => "h4",
            HeadingTag::H5 => "h5",
            HeadingTag::H6 => "h6",
        }
    }
}

impl Default for HeadingTag {
    fn default() -> Self {
        HeadingTag::H1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Bullet,
    Number,
    Check,
}

impl Default for ListType {
    fn default() -> Self {
        ListType::Bullet
    }
}

/// Inline formatting bitmask (same bit layout as the editor surface)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextFormat(pub u32);

impl TextFormat {
    pub const BOLD: u32 = 1;
    pub const ITALIC: u32 = 1 << 1;
    pub const STRIKETHROUGH: u32 = 1 << 2;
    pub const UNDERLINE: u32 = 1 << 3;
    pub const CODE: u32 = 1 << 4;

    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag != 0
    }

    pub fn with(self, flag: u32) -> Self {
        Self(self.0 | flag)
    }

    pub fn toggle(&mut self, flag: u32) {
        self.0 ^= flag;
    }
}

/// Inline CSS of a text run
///
/// `font-size` and `color` are modelled; any other declaration is kept
/// verbatim so the style string round-trips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub font_size: Option<String>,
    pub color: Option<String>,
    pub extra: Vec<(String, String)>,
}

impl TextStyle {
    pub fn parse(css: &str) -> Self {
        let mut style = TextStyle::default();
        for declaration in css.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if property.is_empty() || value.is_empty() {
                continue;
            }
            match property.as_str() {
                "font-size" => style.font_size = Some(value),
                "color" => style.color = Some(value),
                _ => style.extra.push((property, value)),
            }
        }
        style
    }

    pub fn to_css(&self) -> String {
        let mut declarations = Vec::new();
        if let Some(size) = &self.font_size {
            declarations.push(format!("font-size: {};", size));
        }
        if let Some(color) = &self.color {
            declarations.push(format!("color: {};", color));
        }
        for (property, value) in &self.extra {
            declarations.push(format!("{}: {};", property, value));
        }
        declarations.join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.font_size.is_none() && self.color.is_none() && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub format: TextFormat,
    pub style: TextStyle,
}

/// Raw user input plus the instant it resolved to, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeValue {
    pub raw: String,
    pub resolved: Option<DateTime<FixedOffset>>,
}

impl DateTimeValue {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let resolved = parse_datetime(&raw);
        Self { raw, resolved }
    }

    pub fn resolved_iso(&self) -> Option<String> {
        self.resolved.as_ref().map(to_iso)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollOption {
    pub uid: String,
    pub text: String,
    pub votes: BTreeSet<String>,
}

impl PollOption {
    pub fn new(uid: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            text: text.into(),
            votes: BTreeSet::new(),
        }
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub fn has_voted(&self, voter_id: &str) -> bool {
        self.votes.contains(voter_id)
    }

    /// Flip the voter's membership; returns whether they now vote for this option
    pub fn toggle_vote(&mut self, voter_id: &str) -> bool {
        if self.votes.remove(voter_id) {
            false
        } else {
            self.votes.insert(voter_id.to_string());
            true
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Poll {
    pub question: String,
    pub options: Vec<PollOption>,
}

impl Poll {
    pub fn new(question: impl Into<String>, options: Vec<PollOption>) -> Self {
        Self {
            question: question.into(),
            options,
        }
    }

    pub fn option(&self, uid: &str) -> Option<&PollOption> {
        self.options.iter().find(|option| option.uid == uid)
    }

    /// Toggle a vote on one option; `None` if the option does not exist
    pub fn toggle_vote(&mut self, option_uid: &str, voter_id: &str) -> Option<bool> {
        self.options
            .iter_mut()
            .find(|option| option.uid == option_uid)
            .map(|option| option.toggle_vote(voter_id))
    }

    pub fn total_votes(&self) -> usize {
        self.options.iter().map(PollOption::vote_count).sum()
    }
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            key: NodeKey::unassigned(),
            kind,
            attribution: None,
            extra: Map::new(),
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Paragraph { children })
    }

    pub fn heading(tag: HeadingTag, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Heading { tag, children })
    }

    pub fn list(list_type: ListType, children: Vec<Node>) -> Self {
        Self::new(NodeKind::List {
            list_type,
            start: 1,
            children,
        })
    }

    pub fn list_item(children: Vec<Node>) -> Self {
        Self::new(NodeKind::ListItem {
            value: 1,
            checked: None,
            children,
        })
    }

    pub fn checklist_item(checked: bool, children: Vec<Node>) -> Self {
        Self::new(NodeKind::ChecklistItem { checked, children })
    }

    pub fn quote(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Quote { children })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(TextRun {
            text: text.into(),
            ..TextRun::default()
        }))
    }

    pub fn styled_text(text: impl Into<String>, format: TextFormat, style: TextStyle) -> Self {
        Self::new(NodeKind::Text(TextRun {
            text: text.into(),
            format,
            style,
        }))
    }

    pub fn line_break() -> Self {
        Self::new(NodeKind::LineBreak)
    }

    pub fn mention(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Mention {
            mention_name: name.into(),
        })
    }

    pub fn hashtag(tag: impl Into<String>) -> Self {
        Self::new(NodeKind::Hashtag { tag: tag.into() })
    }

    pub fn datetime(raw: impl Into<String>) -> Self {
        Self::new(NodeKind::DateTime(DateTimeValue::parse(raw)))
    }

    pub fn poll(poll: Poll) -> Self {
        Self::new(NodeKind::Poll(poll))
    }

    pub fn youtube(video_id: impl Into<String>) -> Self {
        Self::new(NodeKind::YouTube {
            video_id: video_id.into(),
        })
    }

    /// Registry entry for this node; `None` for opaque nodes
    pub fn node_type(&self) -> Option<NodeType> {
        self.kind.node_type()
    }

    pub fn type_name(&self) -> &str {
        match &self.kind {
            NodeKind::Opaque { type_name, .. } => type_name,
            kind => kind.node_type().map(NodeType::name).unwrap_or("unknown"),
        }
    }

    pub fn children(&self) -> Option<&Vec<Node>> {
        match &self.kind {
            NodeKind::Paragraph { children }
            | NodeKind::Heading { children, .. }
            | NodeKind::List { children, .. }
            | NodeKind::ListItem { children, .. }
            | NodeKind::ChecklistItem { children, .. }
            | NodeKind::Quote { children } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.kind {
            NodeKind::Paragraph { children }
            | NodeKind::Heading { children, .. }
            | NodeKind::List { children, .. }
            | NodeKind::ListItem { children, .. }
            | NodeKind::ChecklistItem { children, .. }
            | NodeKind::Quote { children } => Some(children),
            _ => None,
        }
    }

    /// Plain-text projection of the subtree
    pub fn text_content(&self) -> String {
        match &self.kind {
            NodeKind::Text(run) => run.text.clone(),
            NodeKind::LineBreak => "\n".to_string(),
            NodeKind::Mention { mention_name } => format!("@{}", mention_name),
            NodeKind::Hashtag { tag } => format!("#{}", tag),
            NodeKind::DateTime(value) => value.raw.clone(),
            NodeKind::Poll(poll) => poll.question.clone(),
            NodeKind::YouTube { .. } | NodeKind::Opaque { .. } => String::new(),
            _ => self
                .children()
                .map(|children| children.iter().map(Node::text_content).collect())
                .unwrap_or_default(),
        }
    }

    pub fn find(&self, key: &NodeKey) -> Option<&Node> {
        if &self.key == key {
            return Some(self);
        }
        self.children()?
            .iter()
            .find_map(|child| child.find(key))
    }

    pub fn find_mut(&mut self, key: &NodeKey) -> Option<&mut Node> {
        if &self.key == key {
            return Some(self);
        }
        self.children_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(key))
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.find(key).is_some()
    }

    /// Remove a descendant (not `self`) and return it
    pub fn remove_descendant(&mut self, key: &NodeKey) -> Option<Node> {
        let children = self.children_mut()?;
        if let Some(pos) = children.iter().position(|child| &child.key == key) {
            return Some(children.remove(pos));
        }
        children
            .iter_mut()
            .find_map(|child| child.remove_descendant(key))
    }

    /// Same kinds, order, leaf content and attribution; keys are ignored
    pub fn content_eq(&self, other: &Node) -> bool {
        if self.attribution != other.attribution
            || self.extra != other.extra
            || !self.kind.header_eq(&other.kind)
        {
            return false;
        }
        match (self.children(), other.children()) {
            (Some(left), Some(right)) => {
                left.len() == right.len()
                    && left.iter().zip(right).all(|(l, r)| l.content_eq(r))
            }
            (None, None) => true,
            _ => false,
        }
    }

    /// Visit the subtree depth-first, parents before children
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        if let Some(children) = self.children() {
            for child in children {
                child.walk(visit);
            }
        }
    }

    pub(crate) fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Node)) {
        visit(self);
        if let Some(children) = self.children_mut() {
            for child in children {
                child.walk_mut(visit);
            }
        }
    }
}

impl NodeKind {
    pub fn node_type(&self) -> Option<NodeType> {
        Some(match self {
            NodeKind::Paragraph { .. } => NodeType::Paragraph,
            NodeKind::Heading { .. } => NodeType::Heading,
            NodeKind::List { .. } => NodeType::List,
            NodeKind::ListItem { .. } => NodeType::ListItem,
            NodeKind::ChecklistItem { .. } => NodeType::ChecklistItem,
            NodeKind::Quote { .. } => NodeType::Quote,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::LineBreak => NodeType::LineBreak,
            NodeKind::Mention { .. } => NodeType::Mention,
            NodeKind::Hashtag { .. } => NodeType::Hashtag,
            NodeKind::DateTime(_) => NodeType::DateTime,
            NodeKind::Poll(_) => NodeType::Poll,
            NodeKind::YouTube { .. } => NodeType::YouTube,
            NodeKind::Opaque { .. } => return None,
        })
    }

    /// Compare everything except children
    fn header_eq(&self, other: &NodeKind) -> bool {
        match (self, other) {
            (NodeKind::Paragraph { .. }, NodeKind::Paragraph { .. })
            | (NodeKind::Quote { .. }, NodeKind::Quote { .. }) => true,
            (NodeKind::Heading { tag: a, .. }, NodeKind::Heading { tag: b, .. }) => a == b,
            (
                NodeKind::List { list_type: a, start: s, .. },
                NodeKind::List { list_type: b, start: t, .. },
            ) => a == b && s == t,
            (
                NodeKind::ListItem { value: a, checked: x, .. },
                NodeKind::ListItem { value: b, checked: y, .. },
            ) => a == b && x == y,
            (
                NodeKind::ChecklistItem { checked: a, .. },
                NodeKind::ChecklistItem { checked: b, .. },
            ) => a == b,
            (left, right) => left == right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_toggle_is_membership_flip() {
        let mut poll = Poll::new(
            "Which tire?",
            vec![PollOption::new("a", "Gravel"), PollOption::new("b", "Road")],
        );

        assert_eq!(poll.toggle_vote("a", "u1"), Some(true));
        assert_eq!(poll.option("a").unwrap().vote_count(), 1);

        assert_eq!(poll.toggle_vote("a", "u1"), Some(false));
        assert_eq!(poll.option("a").unwrap().vote_count(), 0);
        assert!(poll.option("a").unwrap().votes.is_empty());

        assert_eq!(poll.toggle_vote("missing", "u1"), None);
    }

    #[test]
    fn test_vote_count_tracks_set() {
        let mut option = PollOption::new("a", "Yes");
        option.toggle_vote("u1");
        option.toggle_vote("u2");
        option.toggle_vote("u1");

        assert_eq!(option.vote_count(), option.votes.len());
        assert!(option.has_voted("u2"));
        assert!(!option.has_voted("u1"));
    }

    #[test]
    fn test_text_style_round_trip() {
        let style = TextStyle::parse("font-size: 15px; color: #ff0000; background-color: yellow;");

        assert_eq!(style.font_size.as_deref(), Some("15px"));
        assert_eq!(style.color.as_deref(), Some("#ff0000"));
        assert_eq!(TextStyle::parse(&style.to_css()), style);
    }

    #[test]
    fn test_text_content_and_find() {
        let paragraph = Node::paragraph(vec![
            Node::text("Call "),
            Node::mention("Sam"),
            Node::text(" about "),
            Node::hashtag("brakes"),
        ]);

        assert_eq!(paragraph.text_content(), "Call @Sam about #brakes");
        assert!(paragraph.find(&NodeKey::from("missing")).is_none());
    }

    #[test]
    fn test_content_eq_ignores_keys() {
        let mut left = Node::paragraph(vec![Node::text("a")]);
        let right = Node::paragraph(vec![Node::text("a")]);
        left.key = NodeKey::from("x-1");

        assert!(left.content_eq(&right));
        assert!(!left.content_eq(&Node::paragraph(vec![Node::text("b")])));
        assert!(!left.content_eq(&Node::quote(vec![Node::text("a")])));
    }

    #[test]
    fn test_format_flags() {
        let mut format = TextFormat::default().with(TextFormat::BOLD);
        assert!(format.contains(TextFormat::BOLD));
        format.toggle(TextFormat::BOLD);
        format.toggle(TextFormat::UNDERLINE);
        assert!(!format.contains(TextFormat::BOLD));
        assert!(format.contains(TextFormat::UNDERLINE));
    }
}
