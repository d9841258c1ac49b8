//! The hide family
//!
//! Every hide operation works in two phases:
//!
//! 1. **Plan** (read-only): resolve the label, expand and compile the pattern,
//!    select the targets and compute every region to hide against the
//!    unmodified texts. Any error surfaces here, before the tree changes.
//! 2. **Splice**: for each target, replace all its regions by glyphs in one
//!    pass, create the children, move already hidden children that fall
//!    inside a region under the new child, and remap the remaining spans and
//!    groups.
//!
//! ```text
//! "foo <a> bar <b>"  hide "<.*?>"  ->  "foo ◆ bar ◆"
//!                                        |       `- 2 "<b>"
//!                                        `- 1 "<a>"
//! ```

use super::edit::{remap_start, Edit};
use super::Tree;
use crate::error::HideError;
use crate::node::{Groups, NodeId};
use regex::Regex;
use std::ops::Range as ByteRange;

/// A region of a parent's text to collapse into one glyph
#[derive(Debug, Clone)]
pub(crate) struct Cut {
    pub range: ByteRange<usize>,
    pub glyph: char,
    pub kind: CutKind,
}

#[derive(Debug, Clone)]
pub(crate) enum CutKind {
    /// Hide the region into a new child
    New { name: String, groups: Groups },
    /// Collapse an unfolded node; `inner` is the text between its markers
    Refold { node: NodeId, inner: ByteRange<usize> },
}

impl Cut {
    fn new_child(range: ByteRange<usize>, glyph: char, name: &str, groups: Groups) -> Self {
        Self {
            range,
            glyph,
            kind: CutKind::New {
                name: name.to_string(),
                groups,
            },
        }
    }
}

fn overlaps(a: &ByteRange<usize>, b: &ByteRange<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn encloses(outer: &ByteRange<usize>, inner: &ByteRange<usize>) -> bool {
    !outer.is_empty() && outer.start <= inner.start && inner.end <= outer.end
}

impl Tree {
    /// Hide every match of `pattern` in the target nodes into children named
    /// `child_name`, leaving the glyph of `label` in place of each match.
    pub fn hide_all(
        &mut self,
        child_name: &str,
        pattern: &str,
        label: &str,
        target: &str,
    ) -> Result<(), HideError> {
        self.hide_matches(child_name, pattern, label, target).map(|_| ())
    }

    /// Like [`Tree::hide_all`], reporting whether anything was hidden.
    ///
    /// Calling it until it returns `false` extracts nested structures from
    /// the inside out, since every round exposes regions that only match once
    /// their inner parts have become glyphs.
    pub fn hide_any(
        &mut self,
        child_name: &str,
        pattern: &str,
        label: &str,
        target: &str,
    ) -> Result<bool, HideError> {
        Ok(self.hide_matches(child_name, pattern, label, target)? > 0)
    }

    /// Promote capture group `group` (1-based) of every live, in-scope node
    /// named `source_name` into its own child.
    ///
    /// Unfolded sources are skipped: their body is part of the parent's text
    /// until they are folded again. So are groups that did not take part in
    /// the match.
    pub fn hide_node_group(
        &mut self,
        child_name: &str,
        label: &str,
        group: usize,
        target: &str,
        source_name: &str,
    ) -> Result<(), HideError> {
        let glyph = self.labels.glyph(label)?;

        let mut plan = Vec::new();
        for source in self.named(source_name) {
            if !self.is_live(source) || !self.in_scope(source, target) {
                continue;
            }
            let node = &self.nodes[source];
            let available = node.groups.as_ref().map_or(0, |groups| groups.len());
            if group == 0 || group > available {
                return Err(HideError::GroupIndexOutOfRange {
                    node: source,
                    group,
                    available,
                });
            }
            if node.is_folded() {
                log::trace!(target: "hidetree", "skipping unfolded node {}", source);
                continue;
            }
            let Some(range) = node.groups.as_ref().and_then(|g| g[group - 1].clone()) else {
                continue;
            };
            if node.text.get(range.clone()).is_none() {
                log::trace!(
                    target: "hidetree",
                    "skipping group {} of node {}: {:?} is not inside its text",
                    group,
                    source,
                    range
                );
                continue;
            }
            let cut = Cut::new_child(range, glyph, child_name, None);
            plan.push((source, self.whole_cuts(source, vec![cut])));
        }

        self.apply_plan(plan, child_name);
        Ok(())
    }

    /// Wrap every literal run of the target nodes into a child, so that their
    /// text is made of glyphs only.
    ///
    /// Only targets that already hold hidden children are wrapped: the rest
    /// is what lies between them. Leaves keep their text.
    pub fn hide_the_rest(
        &mut self,
        child_name: &str,
        label: &str,
        target: &str,
    ) -> Result<(), HideError> {
        let glyph = self.labels.glyph(label)?;

        let plan: Vec<(NodeId, Vec<Cut>)> = self
            .targets(target)
            .into_iter()
            .filter(|&id| !self.children[id].is_empty())
            .map(|id| {
                let cuts = self
                    .literal_runs(id)
                    .into_iter()
                    .map(|run| Cut::new_child(run, glyph, child_name, None))
                    .collect::<Vec<_>>();
                (id, cuts)
            })
            .collect();

        self.apply_plan(plan, child_name);
        Ok(())
    }

    /// Expand every hidden child back into its parent, bottom-up, after
    /// closing outstanding folds. Ids, names, parents and spans stay as they
    /// were; only texts (and the groups indexing them) change. The children
    /// move to their parent's expanded list, where name queries still see them.
    pub fn unhide_all(&mut self) {
        self.fold_all();

        for id in self.live_order().into_iter().rev() {
            let children = std::mem::take(&mut self.children[id]);
            let edits: Vec<Edit> = children
                .iter()
                .filter_map(|&child| {
                    let node = &self.nodes[child];
                    node.span().map(|span| Edit::new(span, node.text.clone()))
                })
                .collect();
            self.rewrite(id, &edits);
            self.expanded[id].extend(children);
        }
        log::debug!(target: "hidetree", "unhide_all: tree flattened");
    }

    pub(crate) fn compile(&self, pattern: &str) -> Result<Regex, HideError> {
        let expanded = self.labels.expand(pattern)?;
        Regex::new(&expanded).map_err(|e| HideError::PatternCompile {
            pattern: expanded.clone(),
            message: e.to_string(),
        })
    }

    fn hide_matches(
        &mut self,
        child_name: &str,
        pattern: &str,
        label: &str,
        target: &str,
    ) -> Result<usize, HideError> {
        let glyph = self.labels.glyph(label)?;
        let regex = self.compile(pattern)?;
        let group_count = regex.captures_len() - 1;

        let mut plan = Vec::new();
        for id in self.targets(target) {
            let text = &self.nodes[id].text;
            let cuts: Vec<Cut> = regex
                .captures_iter(text)
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    let groups = (group_count > 0).then(|| {
                        (1..=group_count)
                            .map(|i| {
                                caps.get(i).map(|m| {
                                    m.start() - whole.start()..m.end() - whole.start()
                                })
                            })
                            .collect()
                    });
                    Some(Cut::new_child(whole.range(), glyph, child_name, groups))
                })
                .collect();
            plan.push((id, self.whole_cuts(id, cuts)));
        }

        Ok(self.apply_plan(plan, child_name))
    }

    fn apply_plan(&mut self, plan: Vec<(NodeId, Vec<Cut>)>, child_name: &str) -> usize {
        let mut created = 0;
        let mut parents = 0;
        for (parent, cuts) in plan {
            if cuts.is_empty() {
                continue;
            }
            created += self.splice(parent, cuts).len();
            parents += 1;
        }
        log::debug!(
            target: "hidetree",
            "hid {} region(s) as '{}' in {} node(s)",
            created,
            child_name,
            parents
        );
        created
    }

    /// Drop cuts that would separate the two markers of an unfolded child.
    pub(crate) fn whole_cuts(&self, parent: NodeId, cuts: Vec<Cut>) -> Vec<Cut> {
        cuts.into_iter()
            .filter(|cut| {
                let keep = self.children[parent].iter().all(|&child| {
                    let atoms = self.nodes[child].atoms();
                    let inside = atoms.iter().filter(|a| encloses(&cut.range, a)).count();
                    let touched = atoms.iter().filter(|a| overlaps(&cut.range, a)).count();
                    touched == inside && (inside == 0 || inside == atoms.len())
                });
                if !keep {
                    log::trace!(
                        target: "hidetree",
                        "skipping region {:?} of node {}: splits an unfolded node",
                        cut.range,
                        parent
                    );
                }
                keep
            })
            .collect()
    }

    /// Collapse sorted, non-overlapping `cuts` of `parent`'s text into glyphs.
    ///
    /// Returns the ids of the nodes created, left to right.
    pub(crate) fn splice(&mut self, parent: NodeId, cuts: Vec<Cut>) -> Vec<NodeId> {
        let parent_text = self.nodes[parent].text.clone();

        // Children falling inside a cut move under the node standing for it.
        let mut moving: Vec<Vec<NodeId>> = vec![Vec::new(); cuts.len()];
        let mut staying = Vec::new();
        for child in std::mem::take(&mut self.children[parent]) {
            let span = self.nodes[child].span.clone().unwrap_or_default();
            match cuts.iter().position(|cut| encloses(&cut.range, &span)) {
                Some(index) => moving[index].push(child),
                None => staying.push(child),
            }
        }
        self.children[parent] = staying;

        let edits: Vec<Edit> = cuts
            .iter()
            .map(|cut| Edit::new(cut.range.clone(), cut.glyph.to_string()))
            .collect();
        self.rewrite(parent, &edits);

        let mut created = Vec::new();
        for (cut, moved) in cuts.into_iter().zip(moving) {
            let start = remap_start(cut.range.start, &edits);
            let span = start..start + cut.glyph.len_utf8();

            let (node, offset) = match cut.kind {
                CutKind::New { name, groups } => {
                    let id = self.alloc(&name, &parent_text[cut.range.clone()]);
                    self.nodes[id].groups = groups;
                    created.push(id);
                    (id, cut.range.start)
                }
                CutKind::Refold { node, inner } => {
                    self.nodes[node].text = parent_text[inner.clone()].to_string();
                    self.nodes[node].fold = None;
                    self.move_groups(node, inner.start, 0);
                    (node, inner.start)
                }
            };

            self.nodes[node].span = Some(span);
            for child in moved {
                if let Some(span) = self.nodes[child].span.as_mut() {
                    *span = span.start - offset..span.end - offset;
                }
                if self.nodes[child].is_folded() {
                    self.move_groups(child, offset, 0);
                }
                self.insert_child(node, child);
            }
            self.insert_child(parent, node);
            log::trace!(
                target: "hidetree",
                "node {} now stands at {:?} in node {}",
                node,
                self.nodes[node].span,
                parent
            );
        }
        created
    }
}
