//! Plain-text views of document nodes.
//!
//! `strip` walks a node's inline structure and produces the text a reader
//! perceives together with an `OffsetMap` back to the node's source text.
//! All offsets are byte offsets; source offsets are relative to the start of
//! the node being stripped.
//!
//! Lookups never guess. An index that is out of range, not on a character
//! boundary, or covered by a malformed segment yields `None` and callers skip
//! the match.

use crate::document::{Document, NodeId, NodeKind};
use std::ops::Range;

/// One contiguous contribution to the plain text.
///
/// `source` is None for separators the stripper inserts itself (newlines
/// between block children). `exact` segments are byte-identical to their
/// source slice, so offsets inside them translate one to one; inexact segments
/// (escapes, entities, line breaks) only map their boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub plain: Range<usize>,
    pub source: Option<Range<usize>>,
    pub exact: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetMap {
    segments: Vec<Segment>,
    plain_len: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainText {
    pub text: String,
    pub map: OffsetMap,
}

impl OffsetMap {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn is_well_formed(segment: &Segment) -> bool {
        if segment.plain.start > segment.plain.end {
            return false;
        }
        match &segment.source {
            Some(source) if source.start > source.end => false,
            Some(source) if segment.exact => source.len() == segment.plain.len(),
            _ => true,
        }
    }

    fn first_source_from(&self, index: usize) -> Option<usize> {
        self.segments[index..]
            .iter()
            .find_map(|segment| segment.source.as_ref().map(|source| source.start))
    }

    fn last_source_until(&self, index: usize) -> Option<usize> {
        self.segments[..=index]
            .iter()
            .rev()
            .find_map(|segment| segment.source.as_ref().map(|source| source.end))
    }

    /// Source offset of the character starting at plain offset `plain`.
    /// Rounds down inside inexact segments.
    fn start_of(&self, plain: usize) -> Option<usize> {
        if plain > self.plain_len {
            return None;
        }
        if plain == self.plain_len {
            let last = self.segments.len().checked_sub(1)?;
            return self.last_source_until(last);
        }
        let index = self
            .segments
            .iter()
            .position(|segment| segment.plain.start <= plain && plain < segment.plain.end)?;
        let segment = &self.segments[index];
        if !Self::is_well_formed(segment) {
            return None;
        }
        match &segment.source {
            Some(source) if segment.exact => Some(source.start + (plain - segment.plain.start)),
            Some(source) => Some(source.start),
            None => self
                .first_source_from(index)
                .or_else(|| self.last_source_until(index)),
        }
    }

    /// Source offset just past the character ending at plain offset `plain`.
    /// Rounds up inside inexact segments.
    fn end_of(&self, plain: usize) -> Option<usize> {
        if plain > self.plain_len {
            return None;
        }
        if plain == 0 {
            return self.first_source_from(0).or(Some(0));
        }
        let index = self
            .segments
            .iter()
            .position(|segment| segment.plain.start < plain && plain <= segment.plain.end)?;
        let segment = &self.segments[index];
        if !Self::is_well_formed(segment) {
            return None;
        }
        match &segment.source {
            Some(source) if segment.exact => Some(source.start + (plain - segment.plain.start)),
            Some(source) => Some(source.end),
            None => self
                .last_source_until(index)
                .or_else(|| self.first_source_from(index)),
        }
    }

    /// Plain offset for a source offset. Offsets inside markup resolve to the
    /// next plain character; inside inexact segments they resolve to the
    /// segment start.
    fn plain_of(&self, source_offset: usize) -> Option<usize> {
        for segment in &self.segments {
            let Some(source) = &segment.source else {
                continue;
            };
            if !Self::is_well_formed(segment) {
                return None;
            }
            if source_offset < source.start {
                return Some(segment.plain.start);
            }
            if source_offset < source.end {
                return Some(if segment.exact {
                    segment.plain.start + (source_offset - source.start)
                } else {
                    segment.plain.start
                });
            }
        }
        Some(self.plain_len)
    }
}

impl PlainText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Source offset (node-relative) where the plain character at `plain`
    /// begins.
    pub fn to_source_start(&self, plain: usize) -> Option<usize> {
        if !self.text.is_char_boundary(plain) {
            return None;
        }
        self.map.start_of(plain)
    }

    /// Source offset (node-relative) just past the plain character that ends
    /// at `plain`. Never lands inside a multi-byte character.
    pub fn to_source_end(&self, plain: usize) -> Option<usize> {
        if !self.text.is_char_boundary(plain) {
            return None;
        }
        self.map.end_of(plain)
    }

    pub fn to_plain(&self, source_offset: usize) -> Option<usize> {
        self.map.plain_of(source_offset)
    }

    /// Translate a plain-text range into a node-relative source range that
    /// fully covers the rendered text.
    pub fn source_range(&self, plain: Range<usize>) -> Option<Range<usize>> {
        if plain.start > plain.end {
            return None;
        }
        let start = self.to_source_start(plain.start)?;
        if plain.is_empty() {
            return Some(start..start);
        }
        let end = self.to_source_end(plain.end)?;
        (start <= end).then_some(start..end)
    }
}

/// Produce the markup-free text of a node.
///
/// Text leaves contribute their rendered value, line breaks contribute a
/// newline, inline containers contribute their children, and code, HTML and
/// thematic breaks contribute nothing. Block children are separated by a
/// single newline.
pub fn strip(document: &Document, id: NodeId) -> PlainText {
    let base = document.node(id).range.start;
    let mut stripper = Stripper {
        document,
        base,
        text: String::new(),
        segments: Vec::new(),
    };
    stripper.walk(id);
    let plain_len = stripper.text.len();
    PlainText {
        text: stripper.text,
        map: OffsetMap {
            segments: stripper.segments,
            plain_len,
        },
    }
}

struct Stripper<'a> {
    document: &'a Document,
    base: usize,
    text: String,
    segments: Vec<Segment>,
}

impl Stripper<'_> {
    fn walk(&mut self, id: NodeId) {
        let node = self.document.node(id);
        match &node.kind {
            NodeKind::Str => {
                let value = node.value.as_deref().unwrap_or("");
                let exact = self.document.source().get(node.range.clone()) == Some(value);
                self.push(value, node.range.clone(), exact);
            }
            NodeKind::Break { .. } => {
                let exact = self.document.source().get(node.range.clone()) == Some("\n");
                self.push("\n", node.range.clone(), exact);
            }
            NodeKind::InlineCode
            | NodeKind::Html
            | NodeKind::CodeBlock
            | NodeKind::ThematicBreak => {}
            NodeKind::Emphasis
            | NodeKind::Strong
            | NodeKind::Delete
            | NodeKind::Link
            | NodeKind::Image
            | NodeKind::Other => {
                for child in &node.children {
                    self.walk(*child);
                }
            }
            NodeKind::Document
            | NodeKind::Paragraph
            | NodeKind::Heading { .. }
            | NodeKind::List { .. }
            | NodeKind::ListItem
            | NodeKind::BlockQuote
            | NodeKind::Table
            | NodeKind::TableRow
            | NodeKind::TableCell => {
                for child in &node.children {
                    if is_block(&self.document.node(*child).kind) {
                        self.separate();
                    }
                    self.walk(*child);
                }
            }
        }
    }

    fn push(&mut self, value: &str, range: Range<usize>, exact: bool) {
        if value.is_empty() {
            return;
        }
        let Some(source) = range
            .start
            .checked_sub(self.base)
            .zip(range.end.checked_sub(self.base))
            .map(|(start, end)| start..end)
        else {
            return;
        };
        let start = self.text.len();
        self.text.push_str(value);
        self.segments.push(Segment {
            plain: start..self.text.len(),
            source: Some(source),
            exact,
        });
    }

    fn separate(&mut self) {
        if self.text.is_empty() || self.text.ends_with('\n') {
            return;
        }
        let start = self.text.len();
        self.text.push('\n');
        self.segments.push(Segment {
            plain: start..self.text.len(),
            source: None,
            exact: false,
        });
    }
}

fn is_block(kind: &NodeKind) -> bool {
    match kind {
        NodeKind::Paragraph
        | NodeKind::Heading { .. }
        | NodeKind::List { .. }
        | NodeKind::ListItem
        | NodeKind::BlockQuote
        | NodeKind::CodeBlock
        | NodeKind::Table
        | NodeKind::TableRow
        | NodeKind::TableCell
        | NodeKind::ThematicBreak => true,
        NodeKind::Document
        | NodeKind::Html
        | NodeKind::Str
        | NodeKind::Emphasis
        | NodeKind::Strong
        | NodeKind::Delete
        | NodeKind::Link
        | NodeKind::Image
        | NodeKind::InlineCode
        | NodeKind::Break { .. }
        | NodeKind::Other => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBuilder;

    /// "手順は**以下のような**"
    fn emphasized() -> Document {
        let source = "手順は**以下のような**";
        let mut builder = DocumentBuilder::new(source);
        builder.open(NodeKind::Paragraph, 0..source.len());
        builder.leaf(NodeKind::Str, 0..9, Some("手順は".to_string()));
        builder.open(NodeKind::Strong, 9..source.len());
        builder.leaf(NodeKind::Str, 11..29, Some("以下のような".to_string()));
        builder.close();
        builder.close();
        builder.build()
    }

    fn paragraph(document: &Document) -> NodeId {
        document.node(document.root()).children[0]
    }

    #[test]
    fn strips_emphasis_markers() {
        let document = emphasized();
        let plain = strip(&document, paragraph(&document));
        assert_eq!(plain.as_str(), "手順は以下のような");
        assert_eq!(plain.map.segments().len(), 2);
    }

    #[test]
    fn ranges_skip_markup() {
        let document = emphasized();
        let plain = strip(&document, paragraph(&document));
        let found = plain.as_str().find("以下のような").expect("phrase present");
        let range = plain
            .source_range(found..found + "以下のような".len())
            .expect("range maps");
        assert_eq!(range, 11..29);
        assert_eq!(&document.source_text(paragraph(&document))[range], "以下のような");
    }

    #[test]
    fn rejects_indices_inside_characters() {
        let document = emphasized();
        let plain = strip(&document, paragraph(&document));
        assert_eq!(plain.to_source_start(1), None);
        assert_eq!(plain.to_source_end(4), None);
        assert_eq!(plain.to_source_start(plain.len() + 1), None);
    }

    #[test]
    fn inverse_lookup_rounds_forward_over_markup() {
        let document = emphasized();
        let plain = strip(&document, paragraph(&document));
        // offset 9 is the opening "**"
        assert_eq!(plain.to_plain(9), Some(9));
        assert_eq!(plain.to_plain(12), Some(10));
        assert_eq!(plain.to_plain(31), Some(plain.len()));
    }

    #[test]
    fn inexact_segments_cover_their_whole_source() {
        // "a\*b" renders as "a*b"
        let source = "a\\*b";
        let mut builder = DocumentBuilder::new(source);
        builder.open(NodeKind::Paragraph, 0..4);
        builder.leaf(NodeKind::Str, 0..1, Some("a".to_string()));
        builder.leaf(NodeKind::Str, 1..3, Some("*".to_string()));
        builder.leaf(NodeKind::Str, 3..4, Some("b".to_string()));
        builder.close();
        let document = builder.build();

        let plain = strip(&document, paragraph(&document));
        assert_eq!(plain.as_str(), "a*b");
        assert_eq!(plain.source_range(1..2), Some(1..3));
        assert_eq!(plain.source_range(0..3), Some(0..4));
    }

    #[test]
    fn inline_code_contributes_nothing() {
        let source = "実行`npm`します";
        let mut builder = DocumentBuilder::new(source);
        builder.open(NodeKind::Paragraph, 0..source.len());
        builder.leaf(NodeKind::Str, 0..6, Some("実行".to_string()));
        builder.leaf(NodeKind::InlineCode, 6..11, Some("npm".to_string()));
        builder.leaf(NodeKind::Str, 11..20, Some("します".to_string()));
        builder.close();
        let document = builder.build();

        let plain = strip(&document, paragraph(&document));
        assert_eq!(plain.as_str(), "実行します");
        assert_eq!(plain.source_range(6..15), Some(11..20));
    }

    #[test]
    fn malformed_segments_do_not_translate() {
        let plain = PlainText {
            text: "abc".to_string(),
            map: OffsetMap {
                segments: vec![Segment {
                    plain: 0..3,
                    source: Some(0..5),
                    exact: true,
                }],
                plain_len: 3,
            },
        };
        assert_eq!(plain.to_source_start(1), None);
        assert_eq!(plain.source_range(0..2), None);
    }
}
