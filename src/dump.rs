//! Dump and snapshot projections of a tree
//!
//! Two read-only views:
//!
//! - `Display` for [`Tree`]: a line per live node in document order, for
//!   eyeballing what a sequence of passes did.
//! - [`NodeSnapshot`]: the same walk as a serde-serializable structure, for
//!   tooling and JSON output.
//!
//! ## Dump format
//!
//! ```text
//! 0#Groot# "foo [#1] bar" root no groups
//!   1#comment# "<a foo>" => 0#(4 7) #i <- 1 -> no groups
//! #### Total number of nodes defined = 2.
//! ```
//!
//! Per node: id, name, text (escaped; `[#id]` for a hidden child's glyph,
//! `[#id>` / `<#id]` for the markers of an unfolded child), the parent id with
//! the span in the parent, the `<previous id next>` sibling triple, `#i` when
//! ignored, `folded` while unfolded or `expanded` after `unhide_all`, and the
//! capture groups.

use crate::node::NodeId;
use crate::tree::{Tree, ROOT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range as ByteRange;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out
}

impl Tree {
    /// Text of a node with hidden children shown by id
    pub fn annotated_text(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };

        let mut marks: Vec<(ByteRange<usize>, String)> = Vec::new();
        for &child in self.children(id) {
            let Some(child_node) = self.node(child) else {
                continue;
            };
            let atoms = child_node.atoms();
            if child_node.is_folded() && atoms.len() == 2 {
                marks.push((atoms[0].clone(), format!("[#{}>", child)));
                marks.push((atoms[1].clone(), format!("<#{}]", child)));
            } else if let Some(atom) = atoms.into_iter().next() {
                marks.push((atom, format!("[#{}]", child)));
            }
        }
        marks.sort_by_key(|(range, _)| range.start);

        let text = node.text();
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for (range, mark) in marks {
            out.push_str(&escape(&text[cursor..range.start]));
            out.push_str(&mark);
            cursor = range.end;
        }
        out.push_str(&escape(&text[cursor..]));
        out
    }

    fn describe_groups(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        let Some(groups) = node.groups() else {
            return "no groups".to_string();
        };
        // Groups of an unfolded node index its parent's text.
        let source = if node.is_folded() {
            node.parent().and_then(|parent| self.text(parent))
        } else {
            Some(node.text())
        };
        let mut out = format!("{} groups", groups.len());
        for group in groups {
            match group {
                Some(range) => {
                    let text = source.and_then(|t| t.get(range.clone())).unwrap_or("?");
                    out.push_str(&format!(
                        " \"{}\"({},{})",
                        escape(text),
                        range.start,
                        range.end
                    ));
                }
                None => out.push_str(" -"),
            }
        }
        out
    }

    fn describe(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        let mut line = format!("{}#{}# \"{}\"", id, node.name(), self.annotated_text(id));

        match (node.parent(), node.span()) {
            (Some(parent), Some(span)) => {
                let hidden = self.children(parent);
                let siblings = if hidden.contains(&id) {
                    hidden
                } else {
                    self.expanded_children(parent)
                };
                let position = siblings.iter().position(|&s| s == id);
                let show = |sibling: Option<&NodeId>| {
                    sibling.map_or("-".to_string(), |s| s.to_string())
                };
                let prev = position
                    .and_then(|p| p.checked_sub(1))
                    .and_then(|p| siblings.get(p));
                let next = position.and_then(|p| siblings.get(p + 1));
                line.push_str(&format!(" => {}#({} {})", parent, span.start, span.end));
                if self.is_ignored(id) {
                    line.push_str(" #i");
                }
                line.push_str(&format!(" <{} {} {}>", show(prev), id, show(next)));
            }
            _ => {
                line.push_str(" root");
                if self.is_ignored(id) {
                    line.push_str(" #i");
                }
            }
        }

        if node.is_folded() {
            line.push_str(" folded");
        } else if node.parent().is_some_and(|p| self.expanded_children(p).contains(&id)) {
            line.push_str(" expanded");
        }
        line.push(' ');
        line.push_str(&self.describe_groups(id));
        line
    }

    fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.node(current).and_then(|n| n.parent()) {
            depth += 1;
            current = parent;
        }
        depth
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.document_order() {
            writeln!(f, "{}{}", "  ".repeat(self.depth(id)), self.describe(id))?;
        }
        write!(f, "#### Total number of nodes defined = {}.", self.len())
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Serializable view of a node and its hidden children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    pub text: String,
    pub span: Option<(usize, usize)>,
    /// Label whose glyph stands for the node in its parent
    pub label: Option<String>,
    pub groups: Option<Vec<Option<(usize, usize)>>>,
    pub ignored: bool,
    pub folded: bool,
    pub children: Vec<NodeSnapshot>,
}

impl Tree {
    /// Snapshot of the whole live tree
    pub fn snapshot(&self) -> NodeSnapshot {
        self.snapshot_of(ROOT)
    }

    /// Snapshot of one node and the hidden children below it
    pub fn snapshot_of(&self, id: NodeId) -> NodeSnapshot {
        let node = self.node(id);
        NodeSnapshot {
            id,
            name: node.map(|n| n.name().to_string()).unwrap_or_default(),
            text: node.map(|n| n.text().to_string()).unwrap_or_default(),
            span: node.and_then(|n| n.span()).map(|s| (s.start, s.end)),
            label: self.glyph_of(id).and_then(|glyph| {
                self.labels().label_for(glyph).map(str::to_string)
            }),
            groups: node.and_then(|n| {
                n.groups().as_ref().map(|groups| {
                    groups
                        .iter()
                        .map(|g| g.as_ref().map(|r| (r.start, r.end)))
                        .collect()
                })
            }),
            ignored: self.is_ignored(id),
            folded: node.is_some_and(|n| n.is_folded()),
            children: self
                .children(id)
                .iter()
                .map(|&child| self.snapshot_of(child))
                .collect(),
        }
    }

    /// Glyph standing for a hidden node in its parent's text
    fn glyph_of(&self, id: NodeId) -> Option<char> {
        let node = self.node(id)?;
        if let Some(fold) = node.fold() {
            return Some(fold.glyph);
        }
        let span = node.span()?;
        self.text(node.parent()?)?.get(span)?.chars().next()
    }

    /// The snapshot as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}
