//! Position mapping between original and rewritten text.
//!
//! The map is an ordered list of segments that tile both texts. Unchanged
//! segments map byte for byte; edited segments map every generated byte to
//! the start of the original range they replaced.

use std::ops::Range;

use sourcemap::{SourceMap, SourceMapBuilder};

/// Whether a segment was copied or produced by an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Unchanged,
    Edited,
}

/// One original range and the generated range it became.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub original: Range<usize>,
    pub generated: Range<usize>,
    pub kind: SegmentKind,
}

/// Ordered segment list produced by the splicer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMap {
    segments: Vec<Segment>,
}

impl PositionMap {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// The identity map for `len` bytes of untouched text.
    pub fn identity(len: usize) -> Self {
        if len == 0 {
            return Self::default();
        }
        Self::new(vec![Segment {
            original: 0..len,
            generated: 0..len,
            kind: SegmentKind::Unchanged,
        }])
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true if no edited segment is present.
    pub fn is_identity(&self) -> bool {
        self.segments
            .iter()
            .all(|s| s.kind == SegmentKind::Unchanged)
    }

    fn original_len(&self) -> usize {
        self.segments.last().map_or(0, |s| s.original.end)
    }

    /// Map a byte offset of the generated text back to the original.
    ///
    /// Offsets past the end map to the end of the original text.
    pub fn original_offset(&self, generated: usize) -> usize {
        let idx = self
            .segments
            .partition_point(|s| s.generated.end <= generated);

        match self.segments.get(idx) {
            Some(seg) => match seg.kind {
                SegmentKind::Unchanged => seg.original.start + (generated - seg.generated.start),
                SegmentKind::Edited => seg.original.start,
            },
            None => self.original_len(),
        }
    }

    /// Map an original byte offset forward.
    ///
    /// Returns `None` when the offset lies inside text that was replaced.
    pub fn generated_offset(&self, original: usize) -> Option<usize> {
        self.segments
            .iter()
            .find(|s| s.kind == SegmentKind::Unchanged && s.original.contains(&original))
            .map(|s| s.generated.start + (original - s.original.start))
    }

    /// Build a source map for `generated` pointing back into `original`.
    ///
    /// Emits a token at the start of every segment and at every line start
    /// inside unchanged segments. Columns are UTF-16 code units.
    pub fn to_source_map(&self, file: &str, original: &str, generated: &str) -> SourceMap {
        let original_lines = LineIndex::new(original);
        let generated_lines = LineIndex::new(generated);

        let mut builder = SourceMapBuilder::new(Some(file));
        let mut src_id = None;

        for seg in self.segments.iter().filter(|s| !s.generated.is_empty()) {
            let mut starts = vec![seg.generated.start];
            if seg.kind == SegmentKind::Unchanged {
                starts.extend(
                    generated_lines
                        .starts_within(seg.generated.clone())
                        .filter(|&s| s != seg.generated.start),
                );
            }

            for dst in starts {
                let src = match seg.kind {
                    SegmentKind::Unchanged => seg.original.start + (dst - seg.generated.start),
                    SegmentKind::Edited => seg.original.start,
                };
                let (dst_line, dst_col) = generated_lines.line_col(generated, dst);
                let (src_line, src_col) = original_lines.line_col(original, src);
                let token = builder.add(
                    dst_line,
                    dst_col,
                    src_line,
                    src_col,
                    Some(file),
                    None,
                    false,
                );
                src_id.get_or_insert(token.src_id);
            }
        }

        if let Some(id) = src_id {
            builder.set_source_contents(id, Some(original));
        }
        builder.into_sourcemap()
    }
}

/// Byte offsets of line starts.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// Zero-based line and UTF-16 column of `offset`.
    fn line_col(&self, text: &str, offset: usize) -> (u32, u32) {
        let line = self.starts.partition_point(|&s| s <= offset) - 1;
        let col = text[self.starts[line]..offset].encode_utf16().count();
        (to_u32(line), to_u32(col))
    }

    fn starts_within(&self, range: Range<usize>) -> impl Iterator<Item = usize> + '_ {
        self.starts
            .iter()
            .copied()
            .filter(move |s| range.contains(s))
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edited_map() -> PositionMap {
        // "ab|cd|ef" -> "ab|XYZ|ef"
        PositionMap::new(vec![
            Segment {
                original: 0..2,
                generated: 0..2,
                kind: SegmentKind::Unchanged,
            },
            Segment {
                original: 2..4,
                generated: 2..5,
                kind: SegmentKind::Edited,
            },
            Segment {
                original: 4..6,
                generated: 5..7,
                kind: SegmentKind::Unchanged,
            },
        ])
    }

    #[test]
    fn test_identity_map() {
        let map = PositionMap::identity(10);
        assert!(map.is_identity());
        assert_eq!(map.original_offset(7), 7);
        assert_eq!(map.generated_offset(7), Some(7));
        assert!(PositionMap::identity(0).segments().is_empty());
    }

    #[test]
    fn test_original_offset_through_edit() {
        let map = edited_map();
        assert_eq!(map.original_offset(1), 1);
        assert_eq!(map.original_offset(2), 2);
        assert_eq!(map.original_offset(4), 2);
        assert_eq!(map.original_offset(5), 4);
        assert_eq!(map.original_offset(6), 5);
        assert_eq!(map.original_offset(7), 6);
        assert!(!map.is_identity());
    }

    #[test]
    fn test_generated_offset_skips_edited_text() {
        let map = edited_map();
        assert_eq!(map.generated_offset(1), Some(1));
        assert_eq!(map.generated_offset(3), None);
        assert_eq!(map.generated_offset(4), Some(5));
    }

    #[test]
    fn test_line_col_counts_utf16() {
        let text = "a\néz\n";
        let index = LineIndex::new(text);
        assert_eq!(index.line_col(text, 0), (0, 0));
        assert_eq!(index.line_col(text, 2), (1, 0));
        // 'é' is two bytes but one UTF-16 unit
        assert_eq!(index.line_col(text, 4), (1, 1));
        assert_eq!(index.line_col(text, 6), (2, 0));
    }

    #[test]
    fn test_source_map_points_back_to_original_lines() {
        let original = "line0\nline1\nline2\n";
        // Insert one line at the top.
        let generated = "new\nline0\nline1\nline2\n";
        let map = PositionMap::new(vec![
            Segment {
                original: 0..0,
                generated: 0..4,
                kind: SegmentKind::Edited,
            },
            Segment {
                original: 0..original.len(),
                generated: 4..generated.len(),
                kind: SegmentKind::Unchanged,
            },
        ]);

        let sm = map.to_source_map("out.js", original, generated);
        let token = sm.lookup_token(2, 0).unwrap();
        assert_eq!(token.get_src_line(), 1);
        assert_eq!(token.get_src_col(), 0);
        assert_eq!(sm.get_token_count(), 4);
    }
}
