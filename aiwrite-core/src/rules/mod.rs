// Rule evaluation. The engine walks the document and owns overlap
// suppression and reporting; each rule family lives in its own module:
// - engine.rs: Linter, Rule trait, node context, overlap suppression
// - aggregator.rs: document-level summary for the writing guidelines
// - list_formatting.rs, formal_expressions.rs, hype_expressions.rs,
//   emphasis_patterns.rs, tech_writing.rs, colon_continuation.rs

pub mod aggregator;
pub mod colon_continuation;
pub mod emphasis_patterns;
pub mod engine;
pub mod formal_expressions;
pub mod hype_expressions;
pub mod list_formatting;
pub mod tech_writing;

pub use aggregator::{CategoryTally, DocumentAggregator};
pub use engine::{
    suppress_overlaps, DiagnosticSink, LintOutcome, Linter, NodeContext, Rule, Target, TextView,
};
