//! Text splicer: applies a validated edit set in a single pass.

use std::ops::Range;

use super::mapping::{PositionMap, Segment, SegmentKind};
use super::types::Edit;

/// Why a list of edits cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditConflict {
    #[error("edit {first:?} overlaps edit {second:?}")]
    Overlap {
        first: Range<usize>,
        second: Range<usize>,
    },

    #[error("edit {range:?} is outside the text or splits a character")]
    OutOfBounds { range: Range<usize> },
}

/// Edits sorted by start offset and known to be pairwise disjoint.
///
/// Insertions at an offset sort before a replacement starting at the same
/// offset. An insertion strictly inside a replaced range is an overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    /// Validate `edits` against `text`.
    pub fn new(text: &str, mut edits: Vec<Edit>) -> Result<Self, EditConflict> {
        for edit in &edits {
            let Range { start, end } = edit.range;
            if start > end
                || end > text.len()
                || !text.is_char_boundary(start)
                || !text.is_char_boundary(end)
            {
                return Err(EditConflict::OutOfBounds {
                    range: edit.range.clone(),
                });
            }
        }

        edits.sort_by_key(|e| (e.range.start, e.range.end));

        for pair in edits.windows(2) {
            if pair[0].range.end > pair[1].range.start {
                return Err(EditConflict::Overlap {
                    first: pair[0].range.clone(),
                    second: pair[1].range.clone(),
                });
            }
        }

        Ok(Self { edits })
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edit> {
        self.edits.iter()
    }
}

/// Apply `edits` to `text`.
///
/// Same input always gives the same output. Text between edits is copied
/// verbatim.
pub fn splice(text: &str, edits: &EditSet) -> (String, PositionMap) {
    let growth: usize = edits.iter().map(|e| e.replacement.len()).sum();
    let mut out = String::with_capacity(text.len() + growth);
    let mut segments = Vec::with_capacity(edits.len() * 2 + 1);
    let mut cursor = 0;

    for edit in edits.iter() {
        if cursor < edit.range.start {
            let generated = out.len();
            out.push_str(&text[cursor..edit.range.start]);
            segments.push(Segment {
                original: cursor..edit.range.start,
                generated: generated..out.len(),
                kind: SegmentKind::Unchanged,
            });
        }

        if !(edit.range.is_empty() && edit.replacement.is_empty()) {
            let generated = out.len();
            out.push_str(&edit.replacement);
            segments.push(Segment {
                original: edit.range.clone(),
                generated: generated..out.len(),
                kind: SegmentKind::Edited,
            });
        }

        cursor = edit.range.end;
    }

    if cursor < text.len() {
        let generated = out.len();
        out.push_str(&text[cursor..]);
        segments.push(Segment {
            original: cursor..text.len(),
            generated: generated..out.len(),
            kind: SegmentKind::Unchanged,
        });
    }

    (out, PositionMap::new(segments))
}
