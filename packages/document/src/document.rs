//! # Document
//!
//! The in-memory note: one implicit root holding an ordered list of block
//! children. A document with zero children is valid and renders as empty.
//!
//! The document owns its [`KeyGenerator`]; every node it adopts gets a fresh
//! key, so keys are unique within the document for its whole lifetime.

use crate::attribution::AttributionRecord;
use crate::error::DocumentError;
use crate::key_generator::{KeyGenerator, NodeKey};
use crate::node::Node;

#[derive(Debug, Clone)]
pub struct Document {
    children: Vec<Node>,
    keys: KeyGenerator,
    /// Document-level attribution (`__meta.defaultAttribution`)
    pub default_attribution: Option<AttributionRecord>,
}

impl Document {
    pub fn new() -> Self {
        Self::with_keys(KeyGenerator::new())
    }

    pub fn with_keys(keys: KeyGenerator) -> Self {
        Self {
            children: Vec::new(),
            keys,
            default_attribution: None,
        }
    }

    /// Build a document from detached nodes
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut document = Self::new();
        for node in nodes {
            document.append(node);
        }
        document
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Assign fresh keys to a detached subtree
    pub fn adopt(&mut self, mut node: Node) -> Node {
        let keys = &mut self.keys;
        node.walk_mut(&mut |n| n.key = keys.next_key());
        node
    }

    /// Append a top-level block and return its key
    pub fn append(&mut self, node: Node) -> NodeKey {
        let node = self.adopt(node);
        let key = node.key.clone();
        self.children.push(node);
        key
    }

    /// Insert under `parent` (`None` = root) at `index`, clamped to the end
    pub fn insert(
        &mut self,
        parent: Option<&NodeKey>,
        index: usize,
        node: Node,
    ) -> Result<NodeKey, DocumentError> {
        let node = self.adopt(node);
        let key = node.key.clone();

        let siblings = match parent {
            None => &mut self.children,
            Some(parent_key) => self
                .find_mut(parent_key)
                .ok_or_else(|| DocumentError::NodeNotFound(parent_key.clone()))?
                .children_mut()
                .ok_or_else(|| DocumentError::NotAContainer(parent_key.clone()))?,
        };

        let index = index.min(siblings.len());
        siblings.insert(index, node);
        Ok(key)
    }

    /// Remove a node anywhere in the tree
    pub fn remove(&mut self, key: &NodeKey) -> Option<Node> {
        if let Some(pos) = self.children.iter().position(|child| &child.key == key) {
            return Some(self.children.remove(pos));
        }
        self.children
            .iter_mut()
            .find_map(|child| child.remove_descendant(key))
    }

    /// Relocate an existing node, keeping its key and subtree keys
    pub fn move_node(
        &mut self,
        key: &NodeKey,
        parent: Option<&NodeKey>,
        index: usize,
    ) -> Result<(), DocumentError> {
        let node = self
            .find(key)
            .ok_or_else(|| DocumentError::NodeNotFound(key.clone()))?;
        if let Some(parent_key) = parent {
            if node.contains(parent_key) {
                return Err(DocumentError::CycleDetected(key.clone()));
            }
            let target = self
                .find(parent_key)
                .ok_or_else(|| DocumentError::NodeNotFound(parent_key.clone()))?;
            if target.children().is_none() {
                return Err(DocumentError::NotAContainer(parent_key.clone()));
            }
        }

        let node = self
            .remove(key)
            .ok_or_else(|| DocumentError::NodeNotFound(key.clone()))?;
        let siblings = match parent {
            None => &mut self.children,
            Some(parent_key) => self
                .find_mut(parent_key)
                .and_then(Node::children_mut)
                .ok_or_else(|| DocumentError::NodeNotFound(parent_key.clone()))?,
        };
        let index = index.min(siblings.len());
        siblings.insert(index, node);
        Ok(())
    }

    pub fn find(&self, key: &NodeKey) -> Option<&Node> {
        self.children.iter().find_map(|child| child.find(key))
    }

    pub fn find_mut(&mut self, key: &NodeKey) -> Option<&mut Node> {
        self.children.iter_mut().find_map(|child| child.find_mut(key))
    }

    /// Key of the top-level block containing `key` (itself if top-level)
    pub fn top_level_key_of(&self, key: &NodeKey) -> Option<NodeKey> {
        self.children
            .iter()
            .find(|child| child.contains(key))
            .map(|child| child.key.clone())
    }

    pub fn is_top_level(&self, key: &NodeKey) -> bool {
        self.children.iter().any(|child| &child.key == key)
    }

    /// Key of the direct parent; `None` for top-level blocks and unknown keys
    pub fn parent_of(&self, key: &NodeKey) -> Option<NodeKey> {
        fn search(node: &Node, key: &NodeKey) -> Option<NodeKey> {
            let children = node.children()?;
            if children.iter().any(|child| &child.key == key) {
                return Some(node.key.clone());
            }
            children.iter().find_map(|child| search(child, key))
        }
        self.children.iter().find_map(|child| search(child, key))
    }

    /// Generate a uid for a new poll option
    pub fn next_uid(&mut self) -> String {
        self.keys.next_uid()
    }

    /// Plain-text projection, one line per top-level block
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .map(Node::text_content)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Same blocks in the same order with the same content; keys ignored
    pub fn content_eq(&self, other: &Document) -> bool {
        self.default_attribution == other.default_attribution
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(left, right)| left.content_eq(right))
    }

    /// Depth-first visit of every node
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        for child in &self.children {
            child.walk(visit);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
