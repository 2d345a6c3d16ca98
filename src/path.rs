//! Structural addressing of suite and test nodes.
//!
//! Every node is addressed by the order in which it was declared among its
//! siblings, one index per tree level. Because the same declaration function
//! is run once for registration and once per replay, the address of a node is
//! stable across passes as long as the declaration order is deterministic.

use serde::{Deserialize, Serialize};

/// Separator used between segments of a display name.
pub const NAME_SEPARATOR: &str = "::";

/// Position of a node in the declaration tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The path of the implicit root scope.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(index);
        Self(segments)
    }

    /// Number of levels below the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Get the raw sibling indices.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Returns `true` if `self` is an ancestor of `other` or equal to it.
    pub fn is_prefix_of(&self, other: &NodePath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Returns `true` if `other` lies strictly below `self`.
    pub fn is_ancestor_of(&self, other: &NodePath) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(segments: Vec<usize>) -> Self {
        Self(segments)
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str(".");
        }
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}

/// Join a parent display name and a child name, skipping empty segments.
pub fn join_name(parent: &str, child: &str) -> String {
    match (parent.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{}{}{}", parent, NAME_SEPARATOR, child),
    }
}
