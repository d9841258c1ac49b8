//! Name-based queries and the mutation API
//!
//! Iteration by name follows document order over live nodes. `get_node`
//! keeps one cursor per name in the tree; running off the end returns `None`
//! and resets the cursor, so a plain `while let` loop can be run again later.

use super::edit::Edit;
use super::Tree;
use crate::error::HideError;
use crate::node::NodeId;
use std::collections::BTreeMap;

impl Tree {
    /// Next live node named `name`, or `None` (and a reset) once exhausted
    pub fn get_node(&mut self, name: &str) -> Option<NodeId> {
        let position = self.cursors.get(name).copied().unwrap_or(0);
        match self.named(name).get(position) {
            Some(&id) => {
                self.cursors.insert(name.to_string(), position + 1);
                Some(id)
            }
            None => {
                self.cursors.remove(name);
                None
            }
        }
    }

    /// Reset the `get_node` cursor of `name`, e.g. after leaving a loop early
    pub fn get_node_reset(&mut self, name: &str) {
        self.cursors.remove(name);
    }

    /// First live node named `name`; leaves the cursor alone
    pub fn get_first_node(&self, name: &str) -> Option<NodeId> {
        self.named(name).first().copied()
    }

    /// Group the live nodes named `child_name` by their text.
    ///
    /// Only nodes whose parent is named `parent_filter` count, unless the
    /// filter is the wildcard. Lists are in document order.
    pub fn make_map(&self, parent_filter: &str, child_name: &str) -> BTreeMap<String, Vec<NodeId>> {
        let any_parent = self.config.is_wildcard(parent_filter);
        let mut map: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();
        for id in self.named(child_name) {
            let node = &self.nodes[id];
            let parent_matches = any_parent
                || node
                    .parent
                    .is_some_and(|parent| self.nodes[parent].name == parent_filter);
            if parent_matches {
                map.entry(node.text.clone()).or_default().push(id);
            }
        }
        map
    }

    /// Replace every occurrence of `from` by `to` in the literal text of the
    /// target nodes. Glyphs are never part of a match.
    ///
    /// Returns the number of replacements made.
    pub fn replace_all(&mut self, from: &str, to: &str, target: &str) -> usize {
        if from.is_empty() {
            return 0;
        }

        let mut replaced = 0;
        for id in self.targets(target) {
            let text = &self.nodes[id].text;
            let edits: Vec<Edit> = self
                .literal_runs(id)
                .into_iter()
                .flat_map(|run| {
                    text[run.clone()]
                        .match_indices(from)
                        .map(move |(at, found)| {
                            let start = run.start + at;
                            Edit::new(start..start + found.len(), to)
                        })
                        .collect::<Vec<_>>()
                })
                .collect();
            replaced += edits.len();
            self.rewrite(id, &edits);
        }
        log::debug!(
            target: "hidetree",
            "replaced {} occurrence(s) of '{}' in '{}' nodes",
            replaced,
            from,
            target
        );
        replaced
    }

    /// Add every node currently named `name` to the ignore set.
    ///
    /// Nodes given that name later are not covered.
    pub fn ignore_all(&mut self, name: &str) {
        if let Some(ids) = self.by_name.get(name) {
            self.ignored.extend(ids.iter().copied());
        }
    }

    /// Empty the ignore set
    pub fn unignore_all(&mut self) {
        self.ignored.clear();
    }

    /// Rename the in-scope live nodes named `old_name` to `new_name`.
    ///
    /// Returns the number of nodes renamed.
    pub fn set_node_name_all(&mut self, new_name: &str, scope: &str, old_name: &str) -> usize {
        let ids: Vec<NodeId> = self
            .named(old_name)
            .into_iter()
            .filter(|&id| self.in_scope(id, scope))
            .collect();
        for &id in &ids {
            self.rename(id, new_name);
        }
        ids.len()
    }

    /// Rename a single node
    pub fn set_node_name(&mut self, id: NodeId, name: &str) -> Result<(), HideError> {
        self.node_ref(id)?;
        self.rename(id, name);
        Ok(())
    }

    /// Overwrite `target`'s name, text and groups with `source`'s.
    ///
    /// Id, parent, span and position among siblings of `target` stay. The
    /// glyphs in the copied text belong to `source`'s hidden children, so
    /// those children are handed over to `target` with it.
    pub fn replace(&mut self, target: NodeId, source: NodeId) -> Result<(), HideError> {
        let source_node = self.node_ref(source)?.clone();
        self.node_ref(target)?;
        if target == source {
            return Ok(());
        }

        self.rename(target, &source_node.name);
        self.nodes[target].text = source_node.text;
        self.nodes[target].groups = source_node.groups;

        let adopted = std::mem::take(&mut self.children[source]);
        for &child in &adopted {
            self.nodes[child].parent = Some(target);
        }
        self.children[target] = adopted;
        Ok(())
    }

    /// Exchange the content of two nodes through a fresh scratch node.
    pub fn swap(&mut self, a: NodeId, b: NodeId) -> Result<(), HideError> {
        self.node_ref(a)?;
        self.node_ref(b)?;
        let scratch = self.detached("");
        self.replace(scratch, a)?;
        self.replace(a, b)?;
        self.replace(b, scratch)
    }
}
