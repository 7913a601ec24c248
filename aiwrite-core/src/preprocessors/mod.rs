//! Document Preprocessors
//!
//! This module provides the parsing layer that turns markup into the
//! Document tree consumed by the linter.
//!
//! ## Architecture
//!
//! ```text
//! Source text (Markdown)
//!     ↓
//! [Format-specific Preprocessor]
//!     ↓
//! Document (arena tree, byte ranges into the source)
//!     ↓
//! [Linter]
//!     ↓
//! Diagnostics
//! ```
//!
//! ## Available Preprocessors
//!
//! - `MarkdownPreprocessor` - CommonMark with tables and strikethrough (pulldown-cmark)

pub mod markdown;
pub mod traits;

pub use markdown::MarkdownPreprocessor;
pub use traits::Preprocessor;
