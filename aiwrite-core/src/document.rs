use serde::{Deserialize, Serialize};
use std::ops::Range;

// ===== DOCUMENT TREE =====
// The linter never mutates a document. Hosts build one (see preprocessors/)
// and hand it to the Linter by reference for the duration of a traversal.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Closed node vocabulary. Every match over this enum in the crate is
/// exhaustive so a new kind has to be wired through the evaluator explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading { level: u8 },
    List { ordered: bool },
    ListItem,
    BlockQuote,
    CodeBlock,
    Table,
    TableRow,
    TableCell,
    ThematicBreak,
    Html,
    Str,
    Emphasis,
    Strong,
    Delete,
    Link,
    Image,
    InlineCode,
    Break { hard: bool },
    Other,
}

impl NodeKind {
    /// Block nodes whose presence right after a paragraph can make a trailing
    /// colon read as a calque.
    pub fn block_trigger(&self) -> Option<BlockTrigger> {
        match self {
            NodeKind::CodeBlock => Some(BlockTrigger::CodeBlock),
            NodeKind::List { .. } => Some(BlockTrigger::List),
            NodeKind::BlockQuote => Some(BlockTrigger::Quote),
            NodeKind::Table => Some(BlockTrigger::Table),
            NodeKind::Document
            | NodeKind::Paragraph
            | NodeKind::Heading { .. }
            | NodeKind::ListItem
            | NodeKind::TableRow
            | NodeKind::TableCell
            | NodeKind::ThematicBreak
            | NodeKind::Html
            | NodeKind::Str
            | NodeKind::Emphasis
            | NodeKind::Strong
            | NodeKind::Delete
            | NodeKind::Link
            | NodeKind::Image
            | NodeKind::InlineCode
            | NodeKind::Break { .. }
            | NodeKind::Other => None,
        }
    }

    /// Block content inside a list item other than the item's own
    /// paragraphs. Each is evaluated as its own node, or not at all.
    pub fn is_nested_block(&self) -> bool {
        match self {
            NodeKind::Heading { .. }
            | NodeKind::List { .. }
            | NodeKind::BlockQuote
            | NodeKind::CodeBlock
            | NodeKind::Table
            | NodeKind::ThematicBreak
            | NodeKind::Html => true,
            NodeKind::Document
            | NodeKind::Paragraph
            | NodeKind::ListItem
            | NodeKind::TableRow
            | NodeKind::TableCell
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

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::Paragraph => "Paragraph",
            NodeKind::Heading { .. } => "Heading",
            NodeKind::List { .. } => "List",
            NodeKind::ListItem => "ListItem",
            NodeKind::BlockQuote => "BlockQuote",
            NodeKind::CodeBlock => "CodeBlock",
            NodeKind::Table => "Table",
            NodeKind::TableRow => "TableRow",
            NodeKind::TableCell => "TableCell",
            NodeKind::ThematicBreak => "ThematicBreak",
            NodeKind::Html => "Html",
            NodeKind::Str => "Str",
            NodeKind::Emphasis => "Emphasis",
            NodeKind::Strong => "Strong",
            NodeKind::Delete => "Delete",
            NodeKind::Link => "Link",
            NodeKind::Image => "Image",
            NodeKind::InlineCode => "InlineCode",
            NodeKind::Break { .. } => "Break",
            NodeKind::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockTrigger {
    CodeBlock,
    List,
    Quote,
    Table,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Byte range into the document source
    pub range: Range<usize>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Rendered value for leaf nodes (Str, InlineCode, CodeBlock, Html)
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    nodes: Vec<Node>,
    line_starts: Vec<usize>,
}

impl Document {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Exact source substring of a node, markup included.
    /// Returns an empty string when the host recorded an out-of-bounds range.
    pub fn source_text(&self, id: NodeId) -> &str {
        let range = &self.node(id).range;
        self.source.get(range.clone()).unwrap_or("")
    }

    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self.node(id).parent.map(|parent| self.node(parent))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        self.node(id).children.iter().map(|child| self.node(*child))
    }

    /// Following sibling in document order; None for the final child.
    pub fn next_sibling(&self, id: NodeId) -> Option<&Node> {
        let parent = self.parent(id)?;
        let position = parent.children.iter().position(|child| *child == id)?;
        parent
            .children
            .get(position + 1)
            .map(|sibling| self.node(*sibling))
    }

    /// 1-based line and column (column counted in characters) for a byte offset
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(0);
        (line + 1, column + 1)
    }
}

/// Incremental tree construction for hosts and tests.
///
/// Nodes are opened and closed in document order; `leaf` adds a childless
/// node to whatever container is currently open.
pub struct DocumentBuilder {
    source: String,
    nodes: Vec<Node>,
    open: Vec<NodeId>,
}

impl DocumentBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let root = Node {
            id: NodeId(0),
            kind: NodeKind::Document,
            range: 0..source.len(),
            parent: None,
            children: Vec::new(),
            value: None,
        };
        Self {
            source,
            nodes: vec![root],
            open: vec![NodeId(0)],
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn current(&self) -> NodeId {
        *self.open.last().unwrap_or(&NodeId(0))
    }

    pub fn current_kind(&self) -> &NodeKind {
        &self.nodes[self.current().0].kind
    }

    pub fn open(&mut self, kind: NodeKind, range: Range<usize>) -> NodeId {
        let id = self.push(kind, range, None);
        self.open.push(id);
        id
    }

    /// Close the innermost open container. The root is never closed.
    pub fn close(&mut self) -> Option<NodeId> {
        if self.open.len() > 1 {
            self.open.pop()
        } else {
            None
        }
    }

    pub fn leaf(&mut self, kind: NodeKind, range: Range<usize>, value: Option<String>) -> NodeId {
        self.push(kind, range, value)
    }

    /// Adjust the end of an already pushed node (used when a synthetic
    /// container's extent is only known after its content).
    pub fn set_end(&mut self, id: NodeId, end: usize) {
        let node = &mut self.nodes[id.0];
        node.range.end = end.max(node.range.start);
    }

    pub fn set_value(&mut self, id: NodeId, value: String) {
        self.nodes[id.0].value = Some(value);
    }

    pub fn last_child(&self, of: NodeId) -> Option<&Node> {
        self.nodes[of.0]
            .children
            .last()
            .map(|child| &self.nodes[child.0])
    }

    /// Extend the last Str child of the current container when the new text
    /// is contiguous with it. Returns false when the text cannot be merged.
    pub fn extend_str(&mut self, range: Range<usize>, value: &str) -> bool {
        let current = self.current();
        let Some(last) = self.nodes[current.0].children.last().copied() else {
            return false;
        };
        let source = &self.source;
        let node = &mut self.nodes[last.0];
        if node.kind != NodeKind::Str || node.range.end != range.start {
            return false;
        }
        let exact = |node: &Node| {
            node.value.as_deref() == source.get(node.range.clone())
        };
        if !exact(node) || source.get(range.clone()) != Some(value) {
            return false;
        }
        node.range.end = range.end;
        if let Some(existing) = node.value.as_mut() {
            existing.push_str(value);
        }
        true
    }

    pub fn build(self) -> Document {
        let mut line_starts = vec![0];
        line_starts.extend(
            self.source
                .char_indices()
                .filter(|(_, ch)| *ch == '\n')
                .map(|(index, _)| index + 1),
        );
        Document {
            source: self.source,
            nodes: self.nodes,
            line_starts,
        }
    }

    fn push(&mut self, kind: NodeKind, range: Range<usize>, value: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = self.current();
        self.nodes.push(Node {
            id,
            kind,
            range,
            parent: Some(parent),
            children: Vec::new(),
            value,
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        // "段落です。\n\n- 項目"
        let source = "段落です。\n\n- 項目";
        let mut builder = DocumentBuilder::new(source);
        builder.open(NodeKind::Paragraph, 0..15);
        builder.leaf(NodeKind::Str, 0..15, Some("段落です。".to_string()));
        builder.close();
        builder.open(NodeKind::List { ordered: false }, 17..25);
        builder.open(NodeKind::ListItem, 17..25);
        builder.close();
        builder.close();
        builder.build()
    }

    #[test]
    fn siblings_and_parents() {
        let document = sample();
        let root = document.node(document.root());
        assert_eq!(root.children.len(), 2);

        let paragraph = root.children[0];
        let list = document.next_sibling(paragraph).expect("list follows paragraph");
        assert_eq!(list.kind, NodeKind::List { ordered: false });
        assert!(document.next_sibling(list.id).is_none());
        assert_eq!(document.parent(paragraph).map(|n| n.id), Some(document.root()));
    }

    #[test]
    fn source_text_slices_by_range() {
        let document = sample();
        let paragraph = document.node(document.root()).children[0];
        assert_eq!(document.source_text(paragraph), "段落です。");
    }

    #[test]
    fn line_col_counts_characters() {
        let document = sample();
        assert_eq!(document.line_col(0), (1, 1));
        assert_eq!(document.line_col(3), (1, 2));
        assert_eq!(document.line_col(17), (3, 1));
        assert_eq!(document.line_col(19), (3, 3));
    }
}
