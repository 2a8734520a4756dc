//! # Note Mutations
//!
//! Semantic operations on a note document.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each mutation is one editing action
//! 2. **Validated**: structural constraints are checked before anything changes
//! 3. **Key-stable**: only `InsertNode` mints keys; moves keep them
//!
//! ## Mutation Semantics
//!
//! ### MoveNode
//! - Atomic relocation, keys preserved
//! - Fails if the target parent is inside the moved subtree
//!
//! ### UpdateText
//! - Atomic replacement of the run's text (not a character diff)
//!
//! ### TogglePollVote
//! - Flips the voter's membership in one option; toggling twice is a no-op

use cyclenotes_document::{
    DateTimeValue, Document, DocumentError, Node, NodeKey, NodeKind, NodeType, PollOption,
    TextFormat,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert a detached node under `parent` (`None` = root) at `index`
    InsertNode {
        parent: Option<NodeKey>,
        index: usize,
        node: Node,
    },

    /// Remove a node and its subtree
    RemoveNode { key: NodeKey },

    /// Move a node to a new parent at index
    MoveNode {
        key: NodeKey,
        new_parent: Option<NodeKey>,
        index: usize,
    },

    /// Replace the text of a text run
    UpdateText { key: NodeKey, content: String },

    /// Replace the format bitmask of a text run
    SetTextFormat { key: NodeKey, format: TextFormat },

    SetChecked { key: NodeKey, checked: bool },

    /// Re-enter a date-time value; it is re-resolved from `raw`
    SetDateTime { key: NodeKey, raw: String },

    AddPollOption { key: NodeKey, text: String },

    TogglePollVote {
        key: NodeKey,
        option_uid: String,
        voter: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeKey),

    #[error("Parent not found: {0}")]
    ParentNotFound(NodeKey),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Node {key} is a {found}, expected {expected}")]
    WrongKind {
        key: NodeKey,
        expected: &'static str,
        found: String,
    },

    #[error("Unknown poll option: {0}")]
    UnknownPollOption(String),

    #[error("Poll option text is empty")]
    EmptyOptionText,
}

/// What a successful mutation touched
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// The inserted, moved or edited node (the removed one for `RemoveNode`)
    pub key: NodeKey,
    /// For `TogglePollVote`: whether the vote is now present
    pub voted: Option<bool>,
}

impl MutationResult {
    fn touched(key: &NodeKey) -> Self {
        Self {
            key: key.clone(),
            voted: None,
        }
    }
}

impl Mutation {
    /// Key of the existing node this mutation targets (`None` for inserts)
    pub fn target(&self) -> Option<&NodeKey> {
        match self {
            Mutation::InsertNode { .. } => None,
            Mutation::RemoveNode { key }
            | Mutation::MoveNode { key, .. }
            | Mutation::UpdateText { key, .. }
            | Mutation::SetTextFormat { key, .. }
            | Mutation::SetChecked { key, .. }
            | Mutation::SetDateTime { key, .. }
            | Mutation::AddPollOption { key, .. }
            | Mutation::TogglePollVote { key, .. } => Some(key),
        }
    }

    /// Apply mutation to the document with validation
    pub fn apply(&self, doc: &mut Document) -> Result<MutationResult, MutationError> {
        self.validate(doc)?;

        match self {
            Mutation::InsertNode {
                parent,
                index,
                node,
            } => {
                let key = doc
                    .insert(parent.as_ref(), *index, node.clone())
                    .map_err(from_document_error)?;
                Ok(MutationResult::touched(&key))
            }

            Mutation::RemoveNode { key } => {
                doc.remove(key)
                    .ok_or_else(|| MutationError::NodeNotFound(key.clone()))?;
                Ok(MutationResult::touched(key))
            }

            Mutation::MoveNode {
                key,
                new_parent,
                index,
            } => {
                doc.move_node(key, new_parent.as_ref(), *index)
                    .map_err(from_document_error)?;
                Ok(MutationResult::touched(key))
            }

            Mutation::UpdateText { key, content } => {
                if let NodeKind::Text(run) = &mut node_mut(doc, key)?.kind {
                    run.text = content.clone();
                }
                Ok(MutationResult::touched(key))
            }

            Mutation::SetTextFormat { key, format } => {
                if let NodeKind::Text(run) = &mut node_mut(doc, key)?.kind {
                    run.format = *format;
                }
                Ok(MutationResult::touched(key))
            }

            Mutation::SetChecked { key, checked } => {
                match &mut node_mut(doc, key)?.kind {
                    NodeKind::ChecklistItem { checked: current, .. } => *current = *checked,
                    NodeKind::ListItem { checked: current, .. } => *current = Some(*checked),
                    _ => {}
                }
                Ok(MutationResult::touched(key))
            }

            Mutation::SetDateTime { key, raw } => {
                if let NodeKind::DateTime(value) = &mut node_mut(doc, key)?.kind {
                    *value = DateTimeValue::parse(raw.as_str());
                }
                Ok(MutationResult::touched(key))
            }

            Mutation::AddPollOption { key, text } => {
                let uid = doc.next_uid();
                if let NodeKind::Poll(poll) = &mut node_mut(doc, key)?.kind {
                    poll.options.push(PollOption::new(uid, text.trim()));
                }
                Ok(MutationResult::touched(key))
            }

            Mutation::TogglePollVote {
                key,
                option_uid,
                voter,
            } => {
                let voted = match &mut node_mut(doc, key)?.kind {
                    NodeKind::Poll(poll) => poll.toggle_vote(option_uid, voter),
                    _ => None,
                };
                let voted =
                    voted.ok_or_else(|| MutationError::UnknownPollOption(option_uid.clone()))?;
                Ok(MutationResult {
                    key: key.clone(),
                    voted: Some(voted),
                })
            }
        }
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::InsertNode { parent, node, .. } => {
                match parent {
                    Some(parent_key) => {
                        let parent = doc
                            .find(parent_key)
                            .ok_or_else(|| MutationError::ParentNotFound(parent_key.clone()))?;
                        if parent.children().is_none() {
                            return Err(MutationError::InvalidStructure(format!(
                                "{} cannot have children",
                                parent.type_name()
                            )));
                        }
                    }
                    None => {
                        if let Some(node_type) = node.node_type() {
                            if !node_type.is_block() {
                                return Err(MutationError::InvalidStructure(format!(
                                    "{} cannot be a top-level block",
                                    node_type
                                )));
                            }
                        }
                    }
                }
                Ok(())
            }

            Mutation::RemoveNode { key } => {
                find(doc, key)?;
                Ok(())
            }

            Mutation::MoveNode {
                key, new_parent, ..
            } => {
                let node = find(doc, key)?;
                if let Some(parent_key) = new_parent {
                    let parent = doc
                        .find(parent_key)
                        .ok_or_else(|| MutationError::ParentNotFound(parent_key.clone()))?;
                    if node.contains(parent_key) {
                        return Err(MutationError::CycleDetected);
                    }
                    if parent.children().is_none() {
                        return Err(MutationError::InvalidStructure(format!(
                            "{} cannot have children",
                            parent.type_name()
                        )));
                    }
                }
                Ok(())
            }

            Mutation::UpdateText { key, .. } | Mutation::SetTextFormat { key, .. } => {
                expect_kind(doc, key, "text", |kind| matches!(kind, NodeKind::Text(_)))
            }

            Mutation::SetChecked { key, .. } => expect_kind(doc, key, "checklist-item", |kind| {
                matches!(
                    kind,
                    NodeKind::ChecklistItem { .. } | NodeKind::ListItem { checked: Some(_), .. }
                )
            }),

            Mutation::SetDateTime { key, .. } => {
                expect_kind(doc, key, "datetime", |kind| matches!(kind, NodeKind::DateTime(_)))
            }

            Mutation::AddPollOption { key, text } => {
                expect_kind(doc, key, "poll", |kind| matches!(kind, NodeKind::Poll(_)))?;
                if text.trim().is_empty() {
                    return Err(MutationError::EmptyOptionText);
                }
                Ok(())
            }

            Mutation::TogglePollVote {
                key, option_uid, ..
            } => match &find(doc, key)?.kind {
                NodeKind::Poll(poll) if poll.option(option_uid).is_some() => Ok(()),
                NodeKind::Poll(_) => Err(MutationError::UnknownPollOption(option_uid.clone())),
                other => Err(wrong_kind(key, "poll", other)),
            },
        }
    }
}

fn find<'a>(doc: &'a Document, key: &NodeKey) -> Result<&'a Node, MutationError> {
    doc.find(key)
        .ok_or_else(|| MutationError::NodeNotFound(key.clone()))
}

fn node_mut<'a>(doc: &'a mut Document, key: &NodeKey) -> Result<&'a mut Node, MutationError> {
    doc.find_mut(key)
        .ok_or_else(|| MutationError::NodeNotFound(key.clone()))
}

fn expect_kind(
    doc: &Document,
    key: &NodeKey,
    expected: &'static str,
    is_expected: impl Fn(&NodeKind) -> bool,
) -> Result<(), MutationError> {
    let node = find(doc, key)?;
    if is_expected(&node.kind) {
        Ok(())
    } else {
        Err(wrong_kind(key, expected, &node.kind))
    }
}

fn wrong_kind(key: &NodeKey, expected: &'static str, found: &NodeKind) -> MutationError {
    let found = match found {
        NodeKind::Opaque { type_name, .. } => type_name.clone(),
        other => other
            .node_type()
            .map(NodeType::name)
            .unwrap_or("unknown")
            .to_string(),
    };
    MutationError::WrongKind {
        key: key.clone(),
        expected,
        found,
    }
}

fn from_document_error(err: DocumentError) -> MutationError {
    match err {
        DocumentError::NodeNotFound(key) => MutationError::NodeNotFound(key),
        DocumentError::NotAContainer(key) => {
            MutationError::InvalidStructure(format!("{} cannot have children", key))
        }
        DocumentError::CycleDetected(_) => MutationError::CycleDetected,
        DocumentError::Serialize(err) => MutationError::InvalidStructure(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclenotes_document::{ListType, Poll};

    fn doc_with_text() -> (Document, NodeKey, NodeKey) {
        let mut doc = Document::new();
        let para = doc.append(Node::paragraph(vec![Node::text("Hello")]));
        let text = doc.find(&para).unwrap().children().unwrap()[0].key.clone();
        (doc, para, text)
    }

    #[test]
    fn test_update_text() {
        let (mut doc, _, text) = doc_with_text();
        let mutation = Mutation::UpdateText {
            key: text.clone(),
            content: "Hi".to_string(),
        };

        assert!(mutation.apply(&mut doc).is_ok());
        assert_eq!(doc.text_content(), "Hi");
    }

    #[test]
    fn test_update_text_on_paragraph_fails() {
        let (mut doc, para, _) = doc_with_text();
        let result = Mutation::UpdateText {
            key: para,
            content: "x".to_string(),
        }
        .apply(&mut doc);

        assert!(matches!(
            result,
            Err(MutationError::WrongKind { expected: "text", .. })
        ));
    }

    #[test]
    fn test_validation_rejects_unknown_keys() {
        let (doc, _, _) = doc_with_text();
        let mutation = Mutation::RemoveNode {
            key: NodeKey::from("missing"),
        };
        assert_eq!(
            mutation.validate(&doc),
            Err(MutationError::NodeNotFound(NodeKey::from("missing")))
        );
    }

    #[test]
    fn test_inline_node_cannot_be_top_level() {
        let (mut doc, _, _) = doc_with_text();
        let result = Mutation::InsertNode {
            parent: None,
            index: 0,
            node: Node::text("loose"),
        }
        .apply(&mut doc);

        assert!(matches!(result, Err(MutationError::InvalidStructure(_))));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_move_rejects_cycle() {
        let mut doc = Document::new();
        let list = doc.append(Node::list(
            ListType::Bullet,
            vec![Node::list_item(vec![Node::text("a")])],
        ));
        let item = doc.find(&list).unwrap().children().unwrap()[0].key.clone();

        let result = Mutation::MoveNode {
            key: list.clone(),
            new_parent: Some(item),
            index: 0,
        }
        .apply(&mut doc);

        assert_eq!(result, Err(MutationError::CycleDetected));
        assert!(doc.is_top_level(&list));
    }

    #[test]
    fn test_poll_mutations() {
        let mut doc = Document::new();
        let poll = doc.append(Node::poll(Poll::new("Open late?", vec![])));

        Mutation::AddPollOption {
            key: poll.clone(),
            text: " Yes ".to_string(),
        }
        .apply(&mut doc)
        .unwrap();

        let uid = match &doc.find(&poll).unwrap().kind {
            NodeKind::Poll(p) => p.options[0].uid.clone(),
            _ => unreachable!(),
        };
        let toggle = Mutation::TogglePollVote {
            key: poll.clone(),
            option_uid: uid,
            voter: "u1".to_string(),
        };

        assert_eq!(toggle.apply(&mut doc).unwrap().voted, Some(true));
        assert_eq!(toggle.apply(&mut doc).unwrap().voted, Some(false));
        match &doc.find(&poll).unwrap().kind {
            NodeKind::Poll(p) => {
                assert_eq!(p.options[0].text, "Yes");
                assert_eq!(p.total_votes(), 0);
            }
            _ => unreachable!(),
        }

        let empty = Mutation::AddPollOption {
            key: poll,
            text: "  ".to_string(),
        };
        assert_eq!(empty.validate(&doc), Err(MutationError::EmptyOptionText));
    }

    #[test]
    fn test_set_checked_on_check_list_item() {
        let mut doc = Document::new();
        let list = doc.append(Node::list(
            ListType::Check,
            vec![Node::new(NodeKind::ListItem {
                value: 1,
                checked: Some(false),
                children: vec![Node::text("Lube chain")],
            })],
        ));
        let item = doc.find(&list).unwrap().children().unwrap()[0].key.clone();

        Mutation::SetChecked {
            key: item.clone(),
            checked: true,
        }
        .apply(&mut doc)
        .unwrap();

        assert!(matches!(
            doc.find(&item).unwrap().kind,
            NodeKind::ListItem { checked: Some(true), .. }
        ));

        let plain = doc.append(Node::list(ListType::Bullet, vec![Node::list_item(vec![])]));
        let plain_item = doc.find(&plain).unwrap().children().unwrap()[0].key.clone();
        let result = Mutation::SetChecked {
            key: plain_item,
            checked: true,
        }
        .validate(&doc);
        assert!(matches!(result, Err(MutationError::WrongKind { .. })));
    }
}
