use crate::classifier::FallbackPolicy;
use crate::document::BlockTrigger;
use crate::error::ConfigError;
use crate::patterns::PatternTable;
use crate::types::{Category, RuleFamily, Severity};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ===== PRESETS =====

/// Which rule families run when a rule block does not say `enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// List formatting and stock phrases only
    #[default]
    Recommended,
    All,
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recommended" => Ok(Preset::Recommended),
            "all" => Ok(Preset::All),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Recommended => write!(f, "recommended"),
            Preset::All => write!(f, "all"),
        }
    }
}

// ===== TOP LEVEL =====

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LintConfig {
    #[serde(default)]
    pub preset: Preset,
    /// Per rule family settings, keyed by rule id
    #[serde(default)]
    pub rules: RulesConfig,
    /// Colon classifier backend and failure policy
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    #[serde(rename = "no-ai-list-formatting", default)]
    pub list_formatting: ListFormattingConfig,
    #[serde(rename = "no-ai-formal-expressions", default)]
    pub formal_expressions: FormalExpressionsConfig,
    #[serde(rename = "no-ai-hype-expressions", default)]
    pub hype_expressions: HypeExpressionsConfig,
    #[serde(rename = "no-ai-emphasis-patterns", default)]
    pub emphasis_patterns: EmphasisPatternsConfig,
    #[serde(rename = "ai-tech-writing-guideline", default)]
    pub tech_writing: TechWritingConfig,
    #[serde(rename = "no-ai-colon-continuation", default)]
    pub colon_continuation: ColonContinuationConfig,
}

/// Settings every rule family accepts
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommonRuleConfig {
    /// Overrides the preset when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub severity: Severity,
    /// Literal substrings or `/pattern/flags` strings that exempt a node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allows: Vec<String>,
}

// ===== RULE FAMILIES =====

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListFormattingConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    /// Keys no option claims; rejected when the linter is built
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_bold_list_items: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_emoji_list_items: bool,
}

impl ListFormattingConfig {
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::new();
        if !self.disable_bold_list_items {
            categories.push(Category::LabelColonList);
        }
        if !self.disable_emoji_list_items {
            categories.push(Category::DecorativeSymbol);
        }
        categories
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FormalExpressionsConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    /// Keys no option claims; rejected when the linter is built
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HypeExpressionsConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    /// Keys no option claims; rejected when the linter is built
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_absoluteness_patterns: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_abstract_patterns: bool,
    /// Older configurations spell this `disabledPredictivePatterns`
    #[serde(default, alias = "disabledPredictivePatterns", skip_serializing_if = "is_false")]
    pub disable_predictive_patterns: bool,
}

impl HypeExpressionsConfig {
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::new();
        if !self.disable_absoluteness_patterns {
            categories.push(Category::HypeAbsoluteness);
        }
        if !self.disable_abstract_patterns {
            categories.push(Category::HypeAbstract);
        }
        if !self.disable_predictive_patterns {
            categories.push(Category::HypePredictive);
        }
        categories
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmphasisPatternsConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    /// Keys no option claims; rejected when the linter is built
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_emoji_emphasis_patterns: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_info_patterns: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_heading_emphasis_patterns: bool,
}

impl EmphasisPatternsConfig {
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::new();
        if !self.disable_emoji_emphasis_patterns {
            categories.push(Category::SymbolEmphasis);
        }
        if !self.disable_info_patterns {
            categories.push(Category::EmphasisLabel);
        }
        if !self.disable_heading_emphasis_patterns {
            categories.push(Category::HeadingEmphasis);
        }
        categories
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechWritingConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    /// Keys no option claims; rejected when the linter is built
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_redundancy_guidance: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_voice_guidance: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_clarity_guidance: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_consistency_guidance: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_structure_guidance: bool,
    /// Emit one summary diagnostic per document
    #[serde(default = "default_true")]
    pub enable_document_analysis: bool,
}

impl Default for TechWritingConfig {
    fn default() -> Self {
        Self {
            common: CommonRuleConfig::default(),
            extra: BTreeMap::new(),
            disable_redundancy_guidance: false,
            disable_voice_guidance: false,
            disable_clarity_guidance: false,
            disable_consistency_guidance: false,
            disable_structure_guidance: false,
            enable_document_analysis: true,
        }
    }
}

impl TechWritingConfig {
    pub fn categories(&self) -> Vec<Category> {
        [
            (self.disable_redundancy_guidance, Category::Redundancy),
            (self.disable_voice_guidance, Category::Voice),
            (self.disable_clarity_guidance, Category::Clarity),
            (self.disable_consistency_guidance, Category::Consistency),
            (self.disable_structure_guidance, Category::Structure),
        ]
        .into_iter()
        .filter(|(disabled, _)| !disabled)
        .map(|(_, category)| category)
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ColonContinuationConfig {
    #[serde(flatten)]
    pub common: CommonRuleConfig,
    /// Keys no option claims; rejected when the linter is built
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_code_block: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_list: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_quote: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_table: bool,
}

impl ColonContinuationConfig {
    pub fn triggers(&self) -> Vec<BlockTrigger> {
        [
            (self.disable_code_block, BlockTrigger::CodeBlock),
            (self.disable_list, BlockTrigger::List),
            (self.disable_quote, BlockTrigger::Quote),
            (self.disable_table, BlockTrigger::Table),
        ]
        .into_iter()
        .filter(|(disabled, _)| !disabled)
        .map(|(_, trigger)| trigger)
        .collect()
    }
}

// ===== CLASSIFIER =====

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    #[serde(default)]
    pub on_tokenizer_error: FallbackPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum TokenizerConfig {
    /// lindera with the embedded IPADIC dictionary
    #[default]
    Ipadic,
    /// Built-in lexicon segmenter, no dictionary needed
    Lexicon,
    /// External MeCab-compatible analyzer
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

// ===== LOADING AND RESOLUTION =====

impl LintConfig {
    pub fn with_preset(preset: Preset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Load config from a YAML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), preset = %config.preset, "loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|err| {
                warn!(error = %err, "failed to load config, using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn common(&self, family: RuleFamily) -> &CommonRuleConfig {
        match family {
            RuleFamily::ListFormatting => &self.rules.list_formatting.common,
            RuleFamily::FormalExpressions => &self.rules.formal_expressions.common,
            RuleFamily::HypeExpressions => &self.rules.hype_expressions.common,
            RuleFamily::EmphasisPatterns => &self.rules.emphasis_patterns.common,
            RuleFamily::TechWriting => &self.rules.tech_writing.common,
            RuleFamily::ColonContinuation => &self.rules.colon_continuation.common,
        }
    }

    /// Options under a rule key that the family does not know
    pub fn unknown_options(&self, family: RuleFamily) -> impl Iterator<Item = &str> {
        let extra = match family {
            RuleFamily::ListFormatting => &self.rules.list_formatting.extra,
            RuleFamily::FormalExpressions => &self.rules.formal_expressions.extra,
            RuleFamily::HypeExpressions => &self.rules.hype_expressions.extra,
            RuleFamily::EmphasisPatterns => &self.rules.emphasis_patterns.extra,
            RuleFamily::TechWriting => &self.rules.tech_writing.extra,
            RuleFamily::ColonContinuation => &self.rules.colon_continuation.extra,
        };
        extra.keys().map(String::as_str)
    }

    /// Reject misspelled rule options. Every family is checked, enabled or not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for family in RuleFamily::ALL {
            if let Some(option) = self.unknown_options(family).next() {
                return Err(ConfigError::UnknownOption {
                    rule: family.id(),
                    option: option.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether a family runs: an explicit `enabled` wins, otherwise the
    /// preset decides. The recommended preset runs the families whose
    /// detectors are marked enabled by default in the pattern table.
    pub fn is_enabled(&self, family: RuleFamily, table: &PatternTable) -> bool {
        if let Some(enabled) = self.common(family).enabled {
            return enabled;
        }
        match self.preset {
            Preset::All => true,
            Preset::Recommended => table.detectors().iter().any(|detector| {
                detector.category.family() == family && detector.enabled_by_default
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PatternTable {
        PatternTable::builtin().unwrap()
    }

    #[test]
    fn recommended_preset_runs_two_families() {
        let config = LintConfig::default();
        let table = table();
        let enabled: Vec<_> = RuleFamily::ALL
            .into_iter()
            .filter(|family| config.is_enabled(*family, &table))
            .collect();
        assert_eq!(
            enabled,
            vec![RuleFamily::ListFormatting, RuleFamily::FormalExpressions]
        );
    }

    #[test]
    fn explicit_enabled_overrides_preset() {
        let yaml = r#"
preset: recommended
rules:
  no-ai-hype-expressions:
    enabled: true
    severity: warning
  no-ai-list-formatting:
    enabled: false
"#;
        let config = LintConfig::from_yaml(yaml).unwrap();
        let table = table();
        assert!(config.is_enabled(RuleFamily::HypeExpressions, &table));
        assert!(!config.is_enabled(RuleFamily::ListFormatting, &table));
        assert_eq!(config.rules.hype_expressions.common.severity, Severity::Warning);
    }

    #[test]
    fn camel_case_toggles_and_legacy_alias() {
        let yaml = r#"
rules:
  no-ai-list-formatting:
    disableEmojiListItems: true
    allows: ["/重要.*/"]
  no-ai-hype-expressions:
    disabledPredictivePatterns: true
  ai-tech-writing-guideline:
    enableDocumentAnalysis: false
"#;
        let config = LintConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.rules.list_formatting.categories(),
            vec![Category::LabelColonList]
        );
        assert_eq!(config.rules.list_formatting.common.allows, vec!["/重要.*/"]);
        assert!(config.rules.hype_expressions.disable_predictive_patterns);
        assert!(!config.rules.tech_writing.enable_document_analysis);
    }

    #[test]
    fn document_analysis_defaults_on() {
        let config = LintConfig::from_yaml("preset: all").unwrap();
        assert!(config.rules.tech_writing.enable_document_analysis);
        assert_eq!(config.preset, Preset::All);
    }

    #[test]
    fn unknown_rule_is_rejected() {
        let yaml = "rules:\n  no-such-rule:\n    enabled: true\n";
        assert!(LintConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn misspelled_option_fails_validation() {
        let yaml = "rules:\n  no-ai-list-formatting:\n    disableEmojiListItem: true\n";
        let config = LintConfig::from_yaml(yaml).unwrap();
        assert!(!config.rules.list_formatting.disable_emoji_list_items);
        assert_eq!(
            config
                .unknown_options(RuleFamily::ListFormatting)
                .collect::<Vec<_>>(),
            vec!["disableEmojiListItem"]
        );
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownOption {
                rule: "no-ai-list-formatting",
                ..
            }
        ));
    }

    #[test]
    fn known_options_validate() {
        let yaml = r#"
rules:
  no-ai-hype-expressions:
    enabled: true
    severity: warning
    disabledPredictivePatterns: true
"#;
        let config = LintConfig::from_yaml(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.unknown_options(RuleFamily::HypeExpressions).count(), 0);
        assert!(config.to_yaml().unwrap().contains("disablePredictivePatterns"));
    }

    #[test]
    fn classifier_backend_is_tagged() {
        let yaml = r#"
classifier:
  tokenizer:
    backend: command
    program: mecab
  onTokenizerError: exceptionList
"#;
        assert_eq!(
            LintConfig::default().classifier.tokenizer,
            TokenizerConfig::Ipadic
        );
        let config = LintConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.classifier.tokenizer,
            TokenizerConfig::Command {
                program: "mecab".to_string(),
                args: Vec::new()
            }
        );
        assert_eq!(config.classifier.on_tokenizer_error, FallbackPolicy::ExceptionList);
    }

    #[test]
    fn colon_triggers_follow_toggles() {
        let config = ColonContinuationConfig {
            disable_list: true,
            ..Default::default()
        };
        assert_eq!(
            config.triggers(),
            vec![BlockTrigger::CodeBlock, BlockTrigger::Quote, BlockTrigger::Table]
        );
    }

    #[test]
    fn preset_parses_from_str() {
        assert_eq!("all".parse::<Preset>().unwrap(), Preset::All);
        assert!("strict".parse::<Preset>().is_err());
    }

    #[test]
    fn empty_file_means_defaults() {
        let config = LintConfig::from_yaml("  \n").unwrap();
        assert_eq!(config.preset, Preset::Recommended);
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let err = LintConfig::load_from_file("/nonexistent/aiwrite.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn fallback_loader_tolerates_broken_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"preset: [not, a, preset]\n").unwrap();
        let config = LintConfig::load_with_fallback(Some(file.path()));
        assert_eq!(config.preset, Preset::Recommended);

        let mut good = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut good, b"preset: all\n").unwrap();
        assert_eq!(LintConfig::load_with_fallback(Some(good.path())).preset, Preset::All);
        assert_eq!(LintConfig::load_with_fallback(None).preset, Preset::Recommended);
    }

    #[test]
    fn yaml_round_trip_keeps_overrides() {
        let mut config = LintConfig::with_preset(Preset::All);
        config.rules.colon_continuation.disable_table = true;
        let yaml = config.to_yaml().unwrap();
        let back = LintConfig::from_yaml(&yaml).unwrap();
        assert!(back.rules.colon_continuation.disable_table);
        assert_eq!(back.preset, Preset::All);
    }
}
