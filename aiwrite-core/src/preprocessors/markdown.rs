//! Markdown Preprocessor
//!
//! Builds the Document tree from pulldown-cmark's offset iterator. Node ranges
//! are the parser's byte ranges, so every offset reported later points back
//! into the original file.
//!
//! Two normalizations happen here:
//! - adjacent text events that are exact slices of the source are coalesced
//!   into one Str node
//! - inline content of tight list items is wrapped in a synthetic Paragraph,
//!   so loose and tight lists have the same shape

use crate::document::{Document, DocumentBuilder, NodeId, NodeKind};
use crate::preprocessors::traits::Preprocessor;
use anyhow::Result;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use std::ops::Range;
use std::path::Path;
use tracing::debug;

pub struct MarkdownPreprocessor {
    options: Options,
}

impl MarkdownPreprocessor {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        Self { options }
    }
}

impl Default for MarkdownPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor for MarkdownPreprocessor {
    fn parse(&self, source: &str) -> Result<Document> {
        let mut writer = TreeWriter::new(source);
        for (event, range) in Parser::new_ext(source, self.options).into_offset_iter() {
            writer.event(event, range);
        }
        let document = writer.finish();
        debug!(nodes = document.len(), bytes = source.len(), "parsed markdown");
        Ok(document)
    }

    fn name(&self) -> &str {
        "markdown"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                ext == "md" || ext == "markdown" || ext == "mdown"
            })
            .unwrap_or(false)
    }
}

struct TreeWriter {
    builder: DocumentBuilder,
    /// Paragraph opened around the inline run of a tight list item
    synthetic: Option<NodeId>,
    /// Code or HTML block currently collecting its literal content
    raw: Option<(NodeId, String)>,
}

impl TreeWriter {
    fn new(source: &str) -> Self {
        Self {
            builder: DocumentBuilder::new(source),
            synthetic: None,
            raw: None,
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(tag) => self.end(tag, range),
            Event::Text(text) => self.text(&text, range),
            Event::Code(code) => {
                self.inline_leaf(NodeKind::InlineCode, range, Some(code.to_string()));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                if let Some((_, buffer)) = self.raw.as_mut() {
                    buffer.push_str(&html);
                } else {
                    self.inline_leaf(NodeKind::Html, range, Some(html.to_string()));
                }
            }
            Event::SoftBreak => self.inline_leaf(NodeKind::Break { hard: false }, range, None),
            Event::HardBreak => self.inline_leaf(NodeKind::Break { hard: true }, range, None),
            Event::Rule => {
                self.close_synthetic();
                self.builder.leaf(NodeKind::ThematicBreak, range, None);
            }
            // footnote references, task list markers, math
            _ => self.inline_leaf(NodeKind::Other, range, None),
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let kind = match &tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading { level, .. } => NodeKind::Heading {
                level: *level as u8,
            },
            Tag::BlockQuote(_) => NodeKind::BlockQuote,
            Tag::CodeBlock(_) => NodeKind::CodeBlock,
            Tag::HtmlBlock => NodeKind::Html,
            Tag::List(start) => NodeKind::List {
                ordered: start.is_some(),
            },
            Tag::Item => NodeKind::ListItem,
            Tag::Table(_) => NodeKind::Table,
            Tag::TableHead | Tag::TableRow => NodeKind::TableRow,
            Tag::TableCell => NodeKind::TableCell,
            Tag::Emphasis => NodeKind::Emphasis,
            Tag::Strong => NodeKind::Strong,
            Tag::Strikethrough => NodeKind::Delete,
            Tag::Link { .. } => NodeKind::Link,
            Tag::Image { .. } => NodeKind::Image,
            _ => NodeKind::Other,
        };

        let inline = matches!(
            kind,
            NodeKind::Emphasis
                | NodeKind::Strong
                | NodeKind::Delete
                | NodeKind::Link
                | NodeKind::Image
        );
        if inline {
            self.open_synthetic(range.start);
        } else {
            self.close_synthetic();
        }

        let raw = matches!(kind, NodeKind::CodeBlock | NodeKind::Html);
        let end = range.end;
        let id = self.builder.open(kind, range);
        if raw {
            self.raw = Some((id, String::new()));
        }
        self.touch(end);
    }

    fn end(&mut self, _tag: TagEnd, range: Range<usize>) {
        // an End while the synthetic paragraph is innermost closes its item
        if self.synthetic == Some(self.builder.current()) {
            self.close_synthetic();
        }
        if let Some((id, value)) = self.raw.take() {
            self.builder.set_value(id, value);
        }
        self.builder.close();
        self.touch(range.end);
    }

    fn text(&mut self, text: &str, range: Range<usize>) {
        if let Some((_, buffer)) = self.raw.as_mut() {
            buffer.push_str(text);
            return;
        }
        self.open_synthetic(range.start);
        let end = range.end;
        if !self.builder.extend_str(range.clone(), text) {
            self.builder.leaf(NodeKind::Str, range, Some(text.to_string()));
        }
        self.touch(end);
    }

    fn inline_leaf(&mut self, kind: NodeKind, range: Range<usize>, value: Option<String>) {
        self.open_synthetic(range.start);
        let end = range.end;
        self.builder.leaf(kind, range, value);
        self.touch(end);
    }

    fn open_synthetic(&mut self, start: usize) {
        if self.synthetic.is_none() && *self.builder.current_kind() == NodeKind::ListItem {
            let id = self.builder.open(NodeKind::Paragraph, start..start);
            self.synthetic = Some(id);
        }
    }

    fn close_synthetic(&mut self) {
        if let Some(id) = self.synthetic.take() {
            if self.builder.current() == id {
                self.builder.close();
            }
        }
    }

    fn touch(&mut self, end: usize) {
        if let Some(id) = self.synthetic {
            self.builder.set_end(id, end);
        }
    }

    fn finish(mut self) -> Document {
        self.close_synthetic();
        self.builder.build()
    }
}
