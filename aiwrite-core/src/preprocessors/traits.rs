// Preprocessor abstraction for document parsing
//
// This module defines the boundary between format parsing (Markdown -> Document tree)
// and linting (Document tree -> Diagnostics). The linter only ever sees the
// format-agnostic tree, so other markup parsers can be plugged in here.

use crate::document::Document;
use anyhow::{Context, Result};
use std::path::Path;

/// Preprocessor trait - converts source text into a Document tree
///
/// Preprocessors handle:
/// - Markup parsing
/// - Node ranges as byte offsets into the original source
/// - Rendered values for text leaves (escapes and entities resolved)
pub trait Preprocessor {
    /// Parse source text into a tree. Every node range must lie within `source`.
    fn parse(&self, source: &str) -> Result<Document>;

    /// Convenience method: read a UTF-8 file and parse it
    fn process_file(&self, input: &Path) -> Result<Document> {
        let source = std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        self.parse(&source)
    }

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}
