// aiwrite core library
//
// Flags mechanically generated Japanese prose in markdown documents.
// A host adapter (preprocessors/) turns text into a Document tree; the
// Linter walks it, runs the enabled rule families and reports diagnostics
// in document order.

pub mod allow;
pub mod classifier;
pub mod config;
pub mod document;
pub mod error;
pub mod offsets;
pub mod patterns;
pub mod preprocessors;
pub mod processor;
pub mod report;
pub mod rules;
pub mod types;

// Re-export main types and functions for easy use
pub use types::*;
pub use config::{LintConfig, Preset};
pub use document::{Document, DocumentBuilder, Node, NodeId, NodeKind};
pub use error::{ConfigError, TokenizeError};
pub use preprocessors::{MarkdownPreprocessor, Preprocessor};
pub use processor::DocumentProcessor;
pub use report::ReportFormat;
pub use rules::{DiagnosticSink, Linter};
