//! Errors raised by the hide engine
//!
//! Every hide-family operation validates its labels, pattern and group indexes
//! before touching the tree, so a returned error always means the tree is
//! exactly as it was before the call.

use crate::node::NodeId;
use std::fmt;

/// Errors that can occur while building, hiding or editing a tree
#[derive(Debug, Clone, PartialEq)]
pub enum HideError {
    /// A label used as hide target or inside a pattern was never defined
    UndefinedLabel(String),

    /// `hide_node_group` asked for a capture group the source node does not have
    GroupIndexOutOfRange {
        node: NodeId,
        group: usize,
        available: usize,
    },

    /// The pattern (after label expansion) is not a valid regex
    PatternCompile { pattern: String, message: String },

    /// The reserved glyph pool has no unused glyph left
    PlaceholderExhaustion { label: String },

    /// No node with this id exists in the tree
    UnknownNode(NodeId),

    /// The record string handed to `Tree::from_records` is inconsistent
    MalformedRecords(String),
}

impl fmt::Display for HideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HideError::UndefinedLabel(label) => write!(f, "Undefined label '{}'", label),
            HideError::GroupIndexOutOfRange {
                node,
                group,
                available,
            } => write!(
                f,
                "Group {} requested on node {}, which has {} group(s)",
                group, node, available
            ),
            HideError::PatternCompile { pattern, message } => {
                write!(f, "Invalid pattern '{}': {}", pattern, message)
            }
            HideError::PlaceholderExhaustion { label } => {
                write!(f, "No glyph left to define label '{}'", label)
            }
            HideError::UnknownNode(id) => write!(f, "Node {} not found", id),
            HideError::MalformedRecords(msg) => write!(f, "Malformed records: {}", msg),
        }
    }
}

impl std::error::Error for HideError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            HideError::UndefinedLabel("<Word>".into()).to_string(),
            "Undefined label '<Word>'"
        );
        assert_eq!(
            HideError::GroupIndexOutOfRange {
                node: 3,
                group: 2,
                available: 1
            }
            .to_string(),
            "Group 2 requested on node 3, which has 1 group(s)"
        );
        assert_eq!(HideError::UnknownNode(7).to_string(), "Node 7 not found");
    }
}
