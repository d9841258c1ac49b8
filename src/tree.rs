//! Tree registry - owns every node of one document
//!
//! The tree is an arena of [`Node`]s indexed by [`NodeId`]. Two independent
//! indexes sit on top of it:
//!
//! - a per-parent list of hidden children, sorted by span start, matching the
//!   left-to-right glyphs in the parent's text (text reconstruction, dumps)
//! - a name -> ids index (iteration by name, grouping, renaming)
//!
//! Alongside them live the per-name iteration cursors, the ignore set, the
//! stack of outstanding folds, the label registry and the configuration. None
//! of it is shared between documents: every tree numbers its nodes from 0.
//!
//! ## Live and expanded nodes
//!
//! The root is live, and so is every node listed as a hidden child of a live
//! node. `unhide_all` expands children back into their parents: they move to
//! the parent's list of expanded children and keep their ids and records.
//! Expanded nodes are still found by name, but no longer targeted by hides
//! and edits since their text is part of the parent's text now.
//!
//! Document order is the pre-order walk over the root, hidden children (span
//! order) and expanded children (expansion order). Live order is the same
//! walk restricted to live nodes.
//!
//! ## Submodules
//!
//! - `edit`: text edits and offset remapping
//! - `hide`: the hide family, splicing and `unhide_all`
//! - `fold`: `unfold` / `fold_all`
//! - `query`: name-based queries and the mutation API

pub(crate) mod edit;
mod fold;
mod hide;
mod query;

use crate::config::TreeConfig;
use crate::error::HideError;
use crate::labels::LabelRegistry;
use crate::node::{Node, NodeId};
use edit::{apply, literal_runs, remap_range, Edit};
use std::collections::{HashMap, HashSet};
use std::ops::Range as ByteRange;

/// Id of the root node of every tree
pub const ROOT: NodeId = 0;

/// A document: the node arena and its registries
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    children: Vec<Vec<NodeId>>,
    expanded: Vec<Vec<NodeId>>,
    by_name: HashMap<String, Vec<NodeId>>,
    cursors: HashMap<String, usize>,
    ignored: HashSet<NodeId>,
    folds: Vec<NodeId>,
    labels: LabelRegistry,
    config: TreeConfig,
}

// ============================================================================
// Construction
// ============================================================================

impl Tree {
    /// Create a tree whose root, named `""`, holds `text`
    pub fn new(text: &str) -> Self {
        Self::with_config(text, TreeConfig::default())
    }

    pub fn with_config(text: &str, config: TreeConfig) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            children: Vec::new(),
            expanded: Vec::new(),
            by_name: HashMap::new(),
            cursors: HashMap::new(),
            ignored: HashSet::new(),
            folds: Vec::new(),
            labels: LabelRegistry::new(config.glyph_pool),
            config,
        };
        tree.alloc("", text);
        tree
    }

    /// Build a tree from hand-assembled records.
    ///
    /// `serialized` is a sequence of `name field_sep text record_sep` records.
    /// The first record is the root; every further record becomes a hidden
    /// child of the root, bound in order to the next `placeholder` character
    /// of the root text.
    ///
    /// ```text
    /// "Groot:AAA¤BBB¤;comment:X;comment:Y;"  with ':' ';' '¤'
    /// ```
    pub fn from_records(
        serialized: &str,
        field_sep: char,
        record_sep: char,
        placeholder: char,
    ) -> Result<Self, HideError> {
        let records = serialized
            .split(record_sep)
            .filter(|record| !record.is_empty())
            .map(|record| {
                record.split_once(field_sep).ok_or_else(|| {
                    HideError::MalformedRecords(format!(
                        "record '{}' has no field separator '{}'",
                        record, field_sep
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let Some((&(root_name, root_text), rest)) = records.split_first() else {
            return Err(HideError::MalformedRecords("no records".to_string()));
        };

        let slots: Vec<usize> = root_text
            .match_indices(placeholder)
            .map(|(start, _)| start)
            .collect();
        if slots.len() != rest.len() {
            return Err(HideError::MalformedRecords(format!(
                "{} placeholder(s) in the root but {} child record(s)",
                slots.len(),
                rest.len()
            )));
        }

        let mut tree = Self::new(root_text);
        tree.set_node_name(ROOT, root_name)?;
        for (&(name, text), start) in rest.iter().zip(slots) {
            let id = tree.alloc(name, text);
            tree.nodes[id].parent = Some(ROOT);
            tree.nodes[id].span = Some(start..start + placeholder.len_utf8());
            tree.children[ROOT].push(id);
        }
        Ok(tree)
    }

    /// Create a parentless scratch node in this tree's arena.
    ///
    /// Scratch nodes are never live; they exist to stage content, e.g. while
    /// swapping two nodes with [`Tree::replace`].
    pub fn detached(&mut self, text: &str) -> NodeId {
        self.alloc("", text)
    }

    pub(crate) fn alloc(&mut self, name: &str, text: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, name, text));
        self.children.push(Vec::new());
        self.expanded.push(Vec::new());
        self.by_name.entry(name.to_string()).or_default().push(id);
        id
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Tree {
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Number of nodes ever created, live or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Current text of a node, glyphs included; no expansion
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(|node| node.text())
    }

    /// Hidden children of a node, in span order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// Children expanded into a node by `unhide_all`, in expansion order
    pub fn expanded_children(&self, id: NodeId) -> &[NodeId] {
        self.expanded.get(id).map(|c| c.as_slice()).unwrap_or(&[])
    }

    pub fn is_ignored(&self, id: NodeId) -> bool {
        self.ignored.contains(&id)
    }

    pub fn labels(&self) -> &LabelRegistry {
        &self.labels
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Register a label, see [`LabelRegistry::define`]
    pub fn define(&mut self, label: &str) -> Result<char, HideError> {
        self.labels.define(label)
    }

    /// Register a label with a macro body, see [`LabelRegistry::define_macro`]
    pub fn define_macro(&mut self, label: &str, body: &str) -> Result<char, HideError> {
        self.labels.define_macro(label, body)
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> Result<&Node, HideError> {
        self.nodes.get(id).ok_or(HideError::UnknownNode(id))
    }

    /// Whether the node is reachable from the root through hidden children
    pub fn is_live(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == ROOT {
                return true;
            }
            let Some(parent) = self.nodes.get(current).and_then(|n| n.parent) else {
                return false;
            };
            if !self.children[parent].contains(&current) {
                return false;
            }
            current = parent;
        }
    }

    /// Nodes of the tree in pre-order: hidden children in span order, then
    /// expanded children
    pub fn document_order(&self) -> Vec<NodeId> {
        self.walk(true)
    }

    /// Live nodes in pre-order, children in span order
    pub fn live_order(&self) -> Vec<NodeId> {
        self.walk(false)
    }

    fn walk(&self, with_expanded: bool) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            let expanded = if with_expanded {
                self.expanded[id].as_slice()
            } else {
                &[]
            };
            stack.extend(self.children[id].iter().chain(expanded).rev());
        }
        order
    }

    /// Nodes named `name`, expanded ones included, in document order
    pub fn named(&self, name: &str) -> Vec<NodeId> {
        let Some(ids) = self.by_name.get(name) else {
            return Vec::new();
        };
        let ranks: HashMap<NodeId, usize> = self
            .document_order()
            .into_iter()
            .enumerate()
            .map(|(rank, id)| (id, rank))
            .collect();
        let mut live: Vec<(usize, NodeId)> = ids
            .iter()
            .filter_map(|id| ranks.get(id).map(|rank| (*rank, *id)))
            .collect();
        live.sort_unstable();
        live.into_iter().map(|(_, id)| id).collect()
    }

    /// Fully resolved text of a node, without changing the tree
    pub fn expanded_text(&self, id: NodeId) -> Option<String> {
        let node = self.nodes.get(id)?;
        let mut edits = Vec::new();
        for &child in &self.children[id] {
            let child_node = &self.nodes[child];
            if child_node.is_folded() {
                // The body already sits between the markers; drop the markers.
                for atom in child_node.atoms() {
                    edits.push(Edit::new(atom, ""));
                }
            } else if let Some(span) = child_node.span() {
                edits.push(Edit::new(span, self.expanded_text(child)?));
            }
        }
        edits.sort_by_key(|edit| edit.range.start);
        Some(apply(&node.text, &edits))
    }
}

// ============================================================================
// Target selection
// ============================================================================

impl Tree {
    /// Target form: wildcard selects every non-ignored node, a name selects
    /// the nodes carrying it.
    pub(crate) fn is_target(&self, id: NodeId, filter: &str) -> bool {
        if self.config.is_wildcard(filter) {
            !self.ignored.contains(&id)
        } else {
            self.nodes[id].name == filter
        }
    }

    /// Scope form: wildcard selects every non-ignored node, a name selects the
    /// nodes that carry it or sit below a node that does.
    pub(crate) fn in_scope(&self, id: NodeId, filter: &str) -> bool {
        if self.config.is_wildcard(filter) {
            return !self.ignored.contains(&id);
        }
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(c)) {
            if node.name == filter {
                return true;
            }
            current = node.parent;
        }
        false
    }

    /// Live target nodes in live order
    pub(crate) fn targets(&self, filter: &str) -> Vec<NodeId> {
        self.live_order()
            .into_iter()
            .filter(|&id| self.is_target(id, filter))
            .collect()
    }
}

// ============================================================================
// Structural helpers
// ============================================================================

impl Tree {
    /// Non-literal byte ranges of a node's text, sorted
    pub(crate) fn hidden_atoms(&self, id: NodeId) -> Vec<ByteRange<usize>> {
        let mut atoms: Vec<ByteRange<usize>> = self.children[id]
            .iter()
            .flat_map(|&child| self.nodes[child].atoms())
            .collect();
        atoms.sort_by_key(|atom| atom.start);
        atoms
    }

    /// Maximal literal runs of a node's text
    pub(crate) fn literal_runs(&self, id: NodeId) -> Vec<ByteRange<usize>> {
        literal_runs(self.nodes[id].text.len(), &self.hidden_atoms(id))
    }

    /// Apply edits to a node's text and carry its children's spans and its
    /// groups over to the new text. Children inside an edited range must be
    /// detached by the caller first.
    pub(crate) fn rewrite(&mut self, id: NodeId, edits: &[Edit]) {
        if edits.is_empty() {
            return;
        }
        let text = apply(&self.nodes[id].text, edits);
        self.nodes[id].text = text;

        for &child in &self.children[id] {
            let node = &mut self.nodes[child];
            if let Some(span) = node.span.as_mut() {
                *span = remap_range(span, edits);
            }
            // An unfolded child's groups index this text.
            if node.fold.is_some() {
                for group in node.groups.iter_mut().flatten().flatten() {
                    *group = remap_range(group, edits);
                }
            }
        }
        if let Some(groups) = self.nodes[id].groups.as_mut() {
            for group in groups.iter_mut().flatten() {
                *group = remap_range(group, edits);
            }
        }
    }

    /// Insert `child` into `parent`'s child list, keeping span order
    pub(crate) fn insert_child(&mut self, parent: NodeId, child: NodeId) {
        let start = self.nodes[child].span.as_ref().map_or(0, |s| s.start);
        let nodes = &self.nodes;
        let list = &mut self.children[parent];
        let position = list
            .iter()
            .position(|&c| nodes[c].span.as_ref().map_or(0, |s| s.start) > start)
            .unwrap_or(list.len());
        list.insert(position, child);
        self.nodes[child].parent = Some(parent);
    }

    /// Move every group of a node from offset `from` to offset `to`, e.g.
    /// between its own text and its parent's while it is unfolded. Groups
    /// that end up outside the node's text are dropped to `None`.
    pub(crate) fn move_groups(&mut self, id: NodeId, from: usize, to: usize) {
        let node = &mut self.nodes[id];
        let bound = if node.fold.is_some() {
            None
        } else {
            Some(node.text.as_str())
        };
        for group in node.groups.iter_mut().flatten() {
            let moved = group.as_ref().and_then(|range| {
                let start = (range.start + to).checked_sub(from)?;
                let end = (range.end + to).checked_sub(from)?;
                match bound {
                    Some(text) if text.get(start..end).is_none() => None,
                    _ => Some(start..end),
                }
            });
            *group = moved;
        }
    }

    pub(crate) fn rename(&mut self, id: NodeId, name: &str) {
        let old = std::mem::replace(&mut self.nodes[id].name, name.to_string());
        if old == name {
            return;
        }
        if let Some(ids) = self.by_name.get_mut(&old) {
            ids.retain(|&other| other != id);
            if ids.is_empty() {
                self.by_name.remove(&old);
            }
        }
        self.by_name.entry(name.to_string()).or_default().push(id);
    }
}
