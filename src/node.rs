//! Node - a tagged unit of text in the tree
//!
//! Nodes live in the tree's arena and refer to each other by [`NodeId`]. A node
//! never owns its relatives: the parent link is a plain id, and the ordered list
//! of hidden children is kept by the tree next to the node.
//!
//! ## Key fields
//!
//! - `text` is the source of truth: literal runs interleaved with glyphs, one
//!   per hidden child.
//! - `span` is the byte range the node occupies in its parent's text: one glyph
//!   while hidden, the open marker through the close marker while unfolded.
//! - `groups` are the capture groups of the match that created the node, as
//!   byte ranges into the node's own text. They follow every edit of the text.

use serde::{Deserialize, Serialize};
use std::ops::Range as ByteRange;

/// Index of a node in a tree (arena)
pub type NodeId = usize;

/// Capture groups recorded for a node.
///
/// `None` for the whole table means the creating pattern declared no groups.
/// A `None` entry is a group that did not take part in the match. Index 0 of
/// the vector is regex group 1.
pub type Groups = Option<Vec<Option<ByteRange<usize>>>>;

/// Glyphs bounding an unfolded node inside its parent's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldRecord {
    /// Glyph the node stood for before it was unfolded
    pub glyph: char,
    pub open: char,
    pub close: char,
}

/// A node of the tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) text: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) span: Option<ByteRange<usize>>,
    pub(crate) groups: Groups,
    pub(crate) fold: Option<FoldRecord>,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: &str, text: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            text: text.to_string(),
            parent: None,
            span: None,
            groups: None,
            fold: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current text, glyphs of hidden children included
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn span(&self) -> Option<ByteRange<usize>> {
        self.span.clone()
    }

    pub fn groups(&self) -> &Groups {
        &self.groups
    }

    /// Text of capture group `index` (1-based), if recorded
    pub fn group_text(&self, index: usize) -> Option<&str> {
        let range = self
            .groups
            .as_ref()?
            .get(index.checked_sub(1)?)?
            .as_ref()?;
        self.text.get(range.clone())
    }

    pub fn fold(&self) -> Option<FoldRecord> {
        self.fold
    }

    pub fn is_folded(&self) -> bool {
        self.fold.is_some()
    }

    /// Byte ranges this node occupies in its parent's text that are not
    /// literal: the glyph, or both fold markers while unfolded.
    pub(crate) fn atoms(&self) -> Vec<ByteRange<usize>> {
        let Some(span) = self.span.clone() else {
            return Vec::new();
        };
        match self.fold {
            Some(fold) => vec![
                span.start..span.start + fold.open.len_utf8(),
                span.end - fold.close.len_utf8()..span.end,
            ],
            None => vec![span],
        }
    }
}
