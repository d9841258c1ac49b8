//! Text edits and offset remapping
//!
//! Every change to a node's text is expressed as a list of [`Edit`]s computed
//! against the unmodified text, sorted and non-overlapping. The edits are
//! applied in one pass, and every byte offset that pointed into the old text
//! (child spans, capture groups) is carried over with [`remap_start`] /
//! [`remap_end`].
//!
//! An offset strictly inside an edited range collapses onto the replacement:
//! a range start maps to the replacement's first byte, a range end to the byte
//! after it. So a capture group that was hidden shrinks to its glyph.

use std::ops::Range as ByteRange;

/// Replace `range` of the old text by `replacement`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Edit {
    pub range: ByteRange<usize>,
    pub replacement: String,
}

impl Edit {
    pub fn new(range: ByteRange<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    fn delta(&self) -> isize {
        self.replacement.len() as isize - self.range.len() as isize
    }
}

fn shifted(pos: usize, shift: isize) -> usize {
    (pos as isize + shift) as usize
}

/// Apply sorted, non-overlapping edits to `text`
pub(crate) fn apply(text: &str, edits: &[Edit]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in edits {
        out.push_str(&text[cursor..edit.range.start]);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// New offset of a range start at `pos`.
///
/// Insertions (empty edits) at `pos` land before it.
pub(crate) fn remap_start(pos: usize, edits: &[Edit]) -> usize {
    let mut shift = 0isize;
    for edit in edits {
        if edit.range.end <= pos {
            shift += edit.delta();
        } else if edit.range.start < pos {
            return shifted(edit.range.start, shift);
        } else {
            break;
        }
    }
    shifted(pos, shift)
}

/// New offset of a range end at `pos`.
///
/// Insertions (empty edits) at `pos` land after it.
pub(crate) fn remap_end(pos: usize, edits: &[Edit]) -> usize {
    let mut shift = 0isize;
    for edit in edits {
        if edit.range.end < pos || (edit.range.end == pos && edit.range.start < pos) {
            shift += edit.delta();
        } else if edit.range.start < pos {
            return shifted(edit.range.start, shift) + edit.replacement.len();
        } else {
            break;
        }
    }
    shifted(pos, shift)
}

pub(crate) fn remap_range(range: &ByteRange<usize>, edits: &[Edit]) -> ByteRange<usize> {
    let start = remap_start(range.start, edits);
    let end = remap_end(range.end, edits).max(start);
    start..end
}

/// Split `0..len` into the maximal runs not covered by `atoms` (sorted).
pub(crate) fn literal_runs(len: usize, atoms: &[ByteRange<usize>]) -> Vec<ByteRange<usize>> {
    let mut runs = Vec::new();
    let mut cursor = 0;
    for atom in atoms {
        if atom.start > cursor {
            runs.push(cursor..atom.start);
        }
        cursor = cursor.max(atom.end);
    }
    if cursor < len {
        runs.push(cursor..len);
    }
    runs
}
