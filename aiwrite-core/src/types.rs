use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::document::NodeId;

/// The schema version stamped on every JSON report.
/// Bump this when the output shape changes.
pub const SCHEMA_VERSION: &str = "0.3.0";

// ===== SEVERITY =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    #[default]
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

// ===== RULE FAMILIES =====
// One family per independently configurable rule. Ids are the names users
// write in configuration files.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleFamily {
    #[serde(rename = "no-ai-list-formatting")]
    ListFormatting,
    #[serde(rename = "no-ai-formal-expressions")]
    FormalExpressions,
    #[serde(rename = "no-ai-hype-expressions")]
    HypeExpressions,
    #[serde(rename = "no-ai-emphasis-patterns")]
    EmphasisPatterns,
    #[serde(rename = "ai-tech-writing-guideline")]
    TechWriting,
    #[serde(rename = "no-ai-colon-continuation")]
    ColonContinuation,
}

impl RuleFamily {
    pub const ALL: [RuleFamily; 6] = [
        RuleFamily::ListFormatting,
        RuleFamily::FormalExpressions,
        RuleFamily::HypeExpressions,
        RuleFamily::EmphasisPatterns,
        RuleFamily::TechWriting,
        RuleFamily::ColonContinuation,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            RuleFamily::ListFormatting => "no-ai-list-formatting",
            RuleFamily::FormalExpressions => "no-ai-formal-expressions",
            RuleFamily::HypeExpressions => "no-ai-hype-expressions",
            RuleFamily::EmphasisPatterns => "no-ai-emphasis-patterns",
            RuleFamily::TechWriting => "ai-tech-writing-guideline",
            RuleFamily::ColonContinuation => "no-ai-colon-continuation",
        }
    }
}

impl fmt::Display for RuleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ===== CATEGORIES =====

/// Detector categories, in declaration order. The aggregator reports its
/// breakdown in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    DecorativeSymbol,
    LabelColonList,
    SymbolEmphasis,
    EmphasisLabel,
    HeadingEmphasis,
    StockPhrase,
    HypeAbsoluteness,
    HypeAbstract,
    HypePredictive,
    Redundancy,
    Voice,
    Clarity,
    Consistency,
    Structure,
    ColonBeforeBlock,
}

impl Category {
    pub fn family(&self) -> RuleFamily {
        match self {
            Category::DecorativeSymbol | Category::LabelColonList => RuleFamily::ListFormatting,
            Category::SymbolEmphasis | Category::EmphasisLabel | Category::HeadingEmphasis => {
                RuleFamily::EmphasisPatterns
            }
            Category::StockPhrase => RuleFamily::FormalExpressions,
            Category::HypeAbsoluteness | Category::HypeAbstract | Category::HypePredictive => {
                RuleFamily::HypeExpressions
            }
            Category::Redundancy
            | Category::Voice
            | Category::Clarity
            | Category::Consistency
            | Category::Structure => RuleFamily::TechWriting,
            Category::ColonBeforeBlock => RuleFamily::ColonContinuation,
        }
    }

    /// Rank used when matches from different categories overlap on one node.
    /// Higher wins.
    pub fn specificity(&self) -> u8 {
        match self {
            Category::SymbolEmphasis => 3,
            Category::LabelColonList | Category::DecorativeSymbol => 2,
            Category::EmphasisLabel
            | Category::HeadingEmphasis
            | Category::StockPhrase
            | Category::HypeAbsoluteness
            | Category::HypeAbstract
            | Category::HypePredictive
            | Category::Redundancy
            | Category::Voice
            | Category::Clarity
            | Category::Consistency
            | Category::Structure
            | Category::ColonBeforeBlock => 1,
        }
    }

    /// Short label used in the document summary breakdown
    pub fn label(&self) -> &'static str {
        match self {
            Category::DecorativeSymbol => "装飾記号",
            Category::LabelColonList => "ラベル+コロン",
            Category::SymbolEmphasis => "絵文字+強調",
            Category::EmphasisLabel => "強調ラベル",
            Category::HeadingEmphasis => "見出し強調",
            Category::StockPhrase => "定型表現",
            Category::HypeAbsoluteness => "絶対性の誇張",
            Category::HypeAbstract => "抽象的な誇張",
            Category::HypePredictive => "予言的な誇張",
            Category::Redundancy => "簡潔性",
            Category::Voice => "明確性",
            Category::Clarity => "具体性",
            Category::Consistency => "一貫性",
            Category::Structure => "構造化",
            Category::ColonBeforeBlock => "コロン",
        }
    }
}

// ===== MATCHES AND DIAGNOSTICS =====

/// A candidate finding produced by a rule for one node.
/// `range` is relative to the start of the node's source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub detector: &'static str,
    pub category: Category,
    pub range: Range<usize>,
    pub message: String,
}

/// A reported finding. `range` is an absolute byte range into the document
/// source; document-level findings carry no range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule: RuleFamily,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub severity: Severity,
    pub message: String,
    pub node: NodeId,
    pub range: Option<Range<usize>>,
}

// ===== MORPHOLOGY =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    AuxiliaryVerb,
    Particle,
    Conjunction,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morpheme {
    pub surface: String,
    pub pos: PartOfSpeech,
}

impl Morpheme {
    pub fn new(surface: impl Into<String>, pos: PartOfSpeech) -> Self {
        Self {
            surface: surface.into(),
            pos,
        }
    }
}

// ===== REPORTS =====

/// Rendered finding with display coordinates, as written to output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatedDiagnostic {
    pub rule: RuleFamily,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub severity: Severity,
    pub message: String,
    /// 1-based line of the range start (or of the node for document-level findings)
    pub line: usize,
    /// 1-based column in characters
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range<usize>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: String,
    pub diagnostics: Vec<LocatedDiagnostic>,
}

impl FileReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintReport {
    pub schema_version: String,
    pub created_at: DateTime<Utc>,
    pub files: Vec<FileReport>,
}

impl LintReport {
    pub fn new(files: Vec<FileReport>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            created_at: Utc::now(),
            files,
        }
    }

    pub fn total(&self) -> usize {
        self.files.iter().map(|file| file.diagnostics.len()).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.files.iter().any(FileReport::has_errors)
    }
}
