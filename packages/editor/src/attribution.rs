//! # Attribution Tracker
//!
//! Records which top-level blocks changed since the last save and stamps
//! them with the current user right before serialization.
//!
//! Dirty keys are only cleared when stamped, so several edits to one block
//! between two saves produce a single stamp.

use crate::errors::AttributionStampError;
use chrono::{DateTime, Utc};
use cyclenotes_document::{AttributionRecord, Document, Node, NodeKey, NodeKind, TextFormat, User};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Prefix of the optional inline marker run
pub const INLINE_MARKER_PREFIX: &str = "Last edited by: ";

#[derive(Debug, Clone, Default)]
pub struct TrackerOptions {
    /// Also append a "Last edited by: NAME" run to stamped blocks
    pub inline_marker: bool,
}

/// Snapshot of the tracker state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributionMeta {
    pub dirty_keys: BTreeSet<NodeKey>,
    pub last_edited_by: Option<User>,
    pub per_node_attribution: BTreeMap<NodeKey, AttributionRecord>,
}

/// Outcome of one stamping pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StampReport {
    pub stamped: Vec<NodeKey>,
    pub failed: Vec<AttributionStampError>,
}

#[derive(Debug, Default)]
pub struct AttributionTracker {
    current_user: Option<User>,
    last_edited_by: Option<User>,
    dirty: BTreeSet<NodeKey>,
    per_node: BTreeMap<NodeKey, AttributionRecord>,
    options: TrackerOptions,
}

impl AttributionTracker {
    pub fn new(options: TrackerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Identity attributed to subsequent edits
    pub fn set_current_user(&mut self, user: User) {
        self.current_user = Some(user);
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn mark_dirty(&mut self, key: NodeKey) {
        if self.dirty.insert(key) {
            debug!(dirty = self.dirty.len(), "Marked block dirty");
        }
        if self.current_user.is_some() {
            self.last_edited_by = self.current_user.clone();
        }
    }

    pub fn is_dirty(&self, key: &NodeKey) -> bool {
        self.dirty.contains(key)
    }

    pub fn meta(&self) -> AttributionMeta {
        AttributionMeta {
            dirty_keys: self.dirty.clone(),
            last_edited_by: self.last_edited_by.clone(),
            per_node_attribution: self.per_node.clone(),
        }
    }

    /// Pick up the attribution records already present in a loaded document
    pub fn observe(&mut self, document: &Document) {
        self.per_node = document
            .children()
            .iter()
            .filter_map(|node| Some((node.key.clone(), node.attribution.clone()?)))
            .collect();
    }

    /// Stamp every dirty block with the current user and `now`, then clear
    /// the dirty set. Failures are per key and never abort the pass.
    pub fn apply_attribution_lines(
        &mut self,
        document: &mut Document,
        user_name: &str,
        now: DateTime<Utc>,
    ) -> StampReport {
        let user = self
            .current_user
            .clone()
            .unwrap_or_else(|| User::new("", user_name));
        let mut report = StampReport::default();

        for key in std::mem::take(&mut self.dirty) {
            match self.stamp(document, &key, &user, user_name, now) {
                Ok(block_key) => report.stamped.push(block_key),
                Err(err) => {
                    warn!(error = %err, "Skipping attribution stamp");
                    report.failed.push(err);
                }
            }
        }

        debug!(
            stamped = report.stamped.len(),
            failed = report.failed.len(),
            "Applied attribution"
        );
        report
    }

    fn stamp(
        &mut self,
        document: &mut Document,
        key: &NodeKey,
        user: &User,
        user_name: &str,
        now: DateTime<Utc>,
    ) -> Result<NodeKey, AttributionStampError> {
        let block_key = document
            .top_level_key_of(key)
            .ok_or_else(|| AttributionStampError::NodeMissing(key.clone()))?;
        let block = document
            .find_mut(&block_key)
            .ok_or_else(|| AttributionStampError::NodeMissing(block_key.clone()))?;
        if matches!(block.kind, NodeKind::Opaque { .. }) {
            return Err(AttributionStampError::NotAttributable(block_key));
        }

        let record = AttributionRecord::stamped(user.clone(), now);
        block.attribution = Some(record.clone());
        if self.options.inline_marker {
            refresh_inline_marker(block, user_name);
        }

        self.per_node.insert(block_key.clone(), record);
        Ok(block_key)
    }
}

/// Append or refresh the trailing "Last edited by" run of a text block
fn refresh_inline_marker(block: &mut Node, user_name: &str) {
    let text = format!("{}{}", INLINE_MARKER_PREFIX, user_name);
    let is_text_block = matches!(
        block.kind,
        NodeKind::Paragraph { .. } | NodeKind::Heading { .. } | NodeKind::Quote { .. }
    );
    let Some(children) = block.children_mut().filter(|_| is_text_block) else {
        return;
    };

    if let Some(NodeKind::Text(run)) = children.last_mut().map(|last| &mut last.kind) {
        if run.text.starts_with(INLINE_MARKER_PREFIX) {
            run.text = text;
            return;
        }
    }

    if !children.is_empty() {
        children.push(Node::line_break());
    }
    children.push(Node::styled_text(
        text,
        TextFormat::default().with(TextFormat::ITALIC),
        Default::default(),
    ));
}
