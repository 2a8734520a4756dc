use serde::{Deserialize, Serialize};
use std::fmt;

/// Session-local node identifier
///
/// Unique within one in-memory document. Keys are regenerated on every load
/// and are never written into the node tree of canonical JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    /// Placeholder carried by detached nodes until a document adopts them
    pub fn unassigned() -> Self {
        Self(String::new())
    }

    pub fn is_assigned(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Sequential key generator for the nodes of one document
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    seed: String,
    count: u32,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::from_seed("n")
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential key
    pub fn next_key(&mut self) -> NodeKey {
        self.count += 1;
        NodeKey(format!("{}-{}", self.seed, self.count))
    }

    /// Generate a uid for a poll option
    pub fn next_uid(&mut self) -> String {
        self.count += 1;
        format!("{}-opt-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}
