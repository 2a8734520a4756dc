//! # Edit Session
//!
//! One editing surface over one note. The session owns the document, routes
//! every change through [`Mutation`] so the [`AttributionTracker`] sees it,
//! and hands the serialized note to an injected [`NoteSink`] on save.

use crate::attribution::{AttributionTracker, StampReport};
use crate::errors::EditorError;
use crate::mutations::{Mutation, MutationResult};
use chrono::{DateTime, Utc};
use cyclenotes_document::{serialize, Document, Node, NodeKey, NodeKind};
use tracing::{debug, info};

/// Receives the canonical JSON once per save
pub trait NoteSink {
    fn save(&mut self, serialized: String);
}

impl<F> NoteSink for F
where
    F: FnMut(String),
{
    fn save(&mut self, serialized: String) {
        self(serialized)
    }
}

/// Where typed text goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Append to this text run
    Text(NodeKey),
    /// Append new runs at the end of this block
    Block(NodeKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn enter() -> Self {
        Self {
            key: Key::Enter,
            shift: false,
        }
    }

    pub fn shift_enter() -> Self {
        Self {
            key: Key::Enter,
            shift: true,
        }
    }

    pub fn char(c: char) -> Self {
        Self {
            key: Key::Char(c),
            shift: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    Saved(SaveReport),
    LineBreak,
    Typed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    /// Exactly what the sink received
    pub payload: String,
    pub stamps: StampReport,
}

pub struct EditSession<S: NoteSink> {
    document: Document,
    tracker: AttributionTracker,
    sink: S,
    selection: Option<Selection>,
    saves: usize,
}

impl<S: NoteSink> EditSession<S> {
    pub fn new(document: Document, mut tracker: AttributionTracker, sink: S) -> Self {
        tracker.observe(&document);
        Self {
            document,
            tracker,
            sink,
            selection: None,
            saves: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tracker(&self) -> &AttributionTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut AttributionTracker {
        &mut self.tracker
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Apply a mutation and mark the enclosing top-level block(s) dirty
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let block_before = mutation
            .target()
            .and_then(|key| self.document.top_level_key_of(key));

        let result = mutation.apply(&mut self.document)?;

        let block_after = self.document.top_level_key_of(&result.key);
        for block in [block_before, block_after].into_iter().flatten() {
            if self.document.find(&block).is_some() {
                self.tracker.mark_dirty(block);
            }
        }

        if !self.selection_is_valid() {
            self.selection = None;
        }
        Ok(result)
    }

    /// Typing: extends the selected run, or starts a new run/paragraph
    pub fn insert_text(&mut self, text: &str) -> Result<(), EditorError> {
        if text.is_empty() {
            return Ok(());
        }

        if let Some(Selection::Text(key)) = self.valid_selection() {
            let current = match self.document.find(&key).map(|node| &node.kind) {
                Some(NodeKind::Text(run)) => run.text.clone(),
                _ => return Err(EditorError::StaleSelection(key)),
            };
            self.apply(Mutation::UpdateText {
                key,
                content: current + text,
            })?;
            return Ok(());
        }

        let block = match self.valid_selection() {
            Some(Selection::Block(block)) => Some(block),
            _ => self.last_text_block(),
        };

        let text_key = match block {
            Some(block) => {
                let index = self.child_count(&block);
                self.apply(Mutation::InsertNode {
                    parent: Some(block),
                    index,
                    node: Node::text(text),
                })?
                .key
            }
            None => {
                let paragraph = self
                    .apply(Mutation::InsertNode {
                        parent: None,
                        index: self.document.len(),
                        node: Node::paragraph(vec![Node::text(text)]),
                    })?
                    .key;
                self.first_child_key(&paragraph)
                    .ok_or(EditorError::StaleSelection(paragraph))?
            }
        };

        self.selection = Some(Selection::Text(text_key));
        Ok(())
    }

    /// Enter saves; Shift+Enter inserts a line break
    pub fn handle_key(&mut self, press: KeyPress) -> Result<KeyOutcome, EditorError> {
        match press.key {
            Key::Enter if !press.shift => Ok(KeyOutcome::Saved(self.save()?)),
            Key::Enter => {
                self.insert_line_break()?;
                Ok(KeyOutcome::LineBreak)
            }
            Key::Char(c) => {
                let mut buffer = [0u8; 4];
                self.insert_text(c.encode_utf8(&mut buffer))?;
                Ok(KeyOutcome::Typed)
            }
        }
    }

    fn insert_line_break(&mut self) -> Result<(), EditorError> {
        let (block, index) = match self.valid_selection() {
            Some(Selection::Text(key)) => {
                let parent = self
                    .document
                    .parent_of(&key)
                    .ok_or_else(|| EditorError::StaleSelection(key.clone()))?;
                let position = self
                    .document
                    .find(&parent)
                    .and_then(Node::children)
                    .and_then(|children| children.iter().position(|child| child.key == key))
                    .ok_or(EditorError::StaleSelection(key))?;
                (parent, position + 1)
            }
            Some(Selection::Block(block)) => {
                let index = self.child_count(&block);
                (block, index)
            }
            None => match self.last_text_block() {
                Some(block) => {
                    let index = self.child_count(&block);
                    (block, index)
                }
                None => {
                    let block = self
                        .apply(Mutation::InsertNode {
                            parent: None,
                            index: self.document.len(),
                            node: Node::paragraph(vec![]),
                        })?
                        .key;
                    (block, 0)
                }
            },
        };

        self.apply(Mutation::InsertNode {
            parent: Some(block.clone()),
            index,
            node: Node::line_break(),
        })?;
        self.selection = Some(Selection::Block(block));
        Ok(())
    }

    /// Stamp attribution, serialize, and hand the payload to the sink once
    pub fn save(&mut self) -> Result<SaveReport, EditorError> {
        self.save_at(Utc::now())
    }

    pub fn save_at(&mut self, now: DateTime<Utc>) -> Result<SaveReport, EditorError> {
        let user_name = self
            .tracker
            .current_user()
            .map(|user| user.name.clone())
            .unwrap_or_default();
        let stamps = self
            .tracker
            .apply_attribution_lines(&mut self.document, &user_name, now);

        let payload = serialize(&self.document)?;
        self.sink.save(payload.clone());
        self.saves += 1;

        info!(
            bytes = payload.len(),
            stamped = stamps.stamped.len(),
            "Saved note"
        );
        Ok(SaveReport { payload, stamps })
    }

    fn selection_is_valid(&self) -> bool {
        match &self.selection {
            None => true,
            Some(Selection::Text(key)) | Some(Selection::Block(key)) => {
                self.document.find(key).is_some()
            }
        }
    }

    fn valid_selection(&self) -> Option<Selection> {
        let selection = self.selection.clone()?;
        let valid = match &selection {
            Selection::Text(key) => matches!(
                self.document.find(key).map(|node| &node.kind),
                Some(NodeKind::Text(_))
            ),
            Selection::Block(key) => self
                .document
                .find(key)
                .and_then(Node::children)
                .is_some(),
        };
        valid.then_some(selection)
    }

    /// Last top-level block that holds inline text
    fn last_text_block(&self) -> Option<NodeKey> {
        let last = self.document.children().last()?;
        match last.kind {
            NodeKind::Paragraph { .. } | NodeKind::Heading { .. } | NodeKind::Quote { .. } => {
                Some(last.key.clone())
            }
            _ => None,
        }
    }

    fn child_count(&self, key: &NodeKey) -> usize {
        self.document
            .find(key)
            .and_then(Node::children)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn first_child_key(&self, key: &NodeKey) -> Option<NodeKey> {
        let child = self.document.find(key)?.children()?.first()?;
        debug!(key = %child.key, "Selecting new text run");
        Some(child.key.clone())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
