//! Unfold / fold: temporarily reverse one hide for editing
//!
//! Unfolding a node puts its text back into the parent between an open and a
//! close marker. While unfolded, the region is ordinary parent text: parent-level
//! operations such as `replace_all` see and edit it. Folding re-extracts
//! whatever is between the markers and collapses it to the original glyph.
//!
//! While a node is unfolded its capture groups index the parent's text, where
//! its body now lives, so they follow every edit made there. Folding moves
//! them back; a group no longer inside the body is dropped to `None`.
//!
//! ```text
//! parent "foo ◆ bar"          node "<a foo>"
//! unfold  ->  "foo [<a foo>] bar"    node ""  (markers [ ])
//! replace_all foo -> baz      "baz [<a baz>] bar"
//! fold    ->  "baz ◆ bar"          node "<a baz>"
//! ```

use super::edit::Edit;
use super::hide::{Cut, CutKind};
use super::{Tree, ROOT};
use crate::error::HideError;
use crate::node::{FoldRecord, NodeId};

impl Tree {
    /// Unfold a hidden node into its parent between the glyphs of
    /// `open_label` and `close_label`.
    ///
    /// Returns `false` and changes nothing for the root, nodes that are not
    /// live, and nodes already unfolded.
    pub fn unfold(
        &mut self,
        id: NodeId,
        open_label: &str,
        close_label: &str,
    ) -> Result<bool, HideError> {
        self.node_ref(id)?;
        let open = self.labels.glyph(open_label)?;
        let close = self.labels.glyph(close_label)?;

        if id == ROOT || !self.is_live(id) || self.nodes[id].is_folded() {
            return Ok(false);
        }
        let (Some(parent), Some(span)) = (self.nodes[id].parent, self.nodes[id].span.clone())
        else {
            return Ok(false);
        };
        let Some(glyph) = self.nodes[parent].text[span.clone()].chars().next() else {
            return Ok(false);
        };

        let body = std::mem::take(&mut self.nodes[id].text);
        let region = format!("{}{}{}", open, body, close);
        let region_len = region.len();

        self.children[parent].retain(|&child| child != id);
        self.rewrite(parent, &[Edit::new(span.clone(), region)]);

        // The node's own children now sit in the parent, inside the region.
        let offset = span.start + open.len_utf8();
        for child in std::mem::take(&mut self.children[id]) {
            if let Some(child_span) = self.nodes[child].span.as_mut() {
                *child_span = child_span.start + offset..child_span.end + offset;
            }
            if self.nodes[child].is_folded() {
                self.move_groups(child, 0, offset);
            }
            self.insert_child(parent, child);
        }

        self.nodes[id].span = Some(span.start..span.start + region_len);
        self.nodes[id].fold = Some(FoldRecord { glyph, open, close });
        self.move_groups(id, 0, offset);
        self.insert_child(parent, id);
        self.folds.push(id);

        log::debug!(target: "hidetree", "unfolded node {} into node {}", id, parent);
        Ok(true)
    }

    /// Fold back every unfolded node, most recent first.
    ///
    /// Returns the number of nodes folded.
    pub fn fold_all(&mut self) -> usize {
        let mut folded = 0;
        while let Some(id) = self.folds.pop() {
            if self.refold(id) {
                folded += 1;
            }
        }
        folded
    }

    /// Nodes currently unfolded, oldest first
    pub fn unfolded(&self) -> &[NodeId] {
        &self.folds
    }

    fn refold(&mut self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        let (Some(fold), Some(parent), Some(span)) = (node.fold, node.parent, node.span.clone())
        else {
            return false;
        };
        if !self.children[parent].contains(&id) {
            return false;
        }

        let inner = span.start + fold.open.len_utf8()..span.end - fold.close.len_utf8();
        self.children[parent].retain(|&child| child != id);
        self.splice(
            parent,
            vec![Cut {
                range: span,
                glyph: fold.glyph,
                kind: CutKind::Refold { node: id, inner },
            }],
        );
        log::debug!(target: "hidetree", "folded node {} back into node {}", id, parent);
        true
    }
}
