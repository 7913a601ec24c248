//! Morphological classification of colon-terminated fragments.
//!
//! Decides whether the text in front of a trailing colon ends in a noun
//! (`使用方法:` reads naturally) or in a predicate/connective (`実行します:`
//! reads like a literal translation of an English lead-in).

pub mod command;
pub mod dictionary;
pub mod lexicon;
pub mod tokenizer;

pub use command::CommandTokenizer;
pub use dictionary::DictionaryTokenizer;
pub use lexicon::LexiconTokenizer;
pub use tokenizer::Tokenizer;

use crate::config::{ClassifierConfig, TokenizerConfig};
use crate::types::PartOfSpeech;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColonClass {
    Noun,
    Predicate,
}

/// What to decide when the tokenizer fails outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FallbackPolicy {
    /// Never report on analysis failure
    #[default]
    FailOpen,
    /// Fragments ending in a known compound noun are nouns, everything else
    /// is a predicate
    ExceptionList,
}

/// Compound-noun suffixes used by `FallbackPolicy::ExceptionList`
pub const NOUN_SUFFIXES: &[&str] = &[
    "方法",
    "仕様",
    "手順",
    "設定",
    "例",
    "使い方",
    "一覧",
    "結果",
    "概要",
    "構成",
    "方式",
    "形式",
    "条件",
    "内容",
    "手法",
    "機能",
    "項目",
    "注意点",
    "ポイント",
    "コマンド",
    "コード",
    "ファイル",
    "オプション",
    "パラメータ",
];

pub struct MorphologicalClassifier {
    tokenizer: Arc<dyn Tokenizer>,
    fallback: FallbackPolicy,
}

impl Default for MorphologicalClassifier {
    fn default() -> Self {
        Self::new(Arc::new(DictionaryTokenizer::new()), FallbackPolicy::default())
    }
}

impl MorphologicalClassifier {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, fallback: FallbackPolicy) -> Self {
        Self {
            tokenizer,
            fallback,
        }
    }

    /// Build the configured backend
    pub fn from_config(config: &ClassifierConfig) -> Self {
        let tokenizer: Arc<dyn Tokenizer> = match &config.tokenizer {
            TokenizerConfig::Ipadic => Arc::new(DictionaryTokenizer::new()),
            TokenizerConfig::Lexicon => Arc::new(LexiconTokenizer::new()),
            TokenizerConfig::Command { program, args } => {
                Arc::new(CommandTokenizer::new(program.clone(), args.clone()))
            }
        };
        Self::new(tokenizer, config.on_tokenizer_error)
    }

    pub fn tokenizer_name(&self) -> &str {
        self.tokenizer.name()
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Classify the text in front of a trailing colon.
    pub async fn classify_trailing_colon(&self, fragment: &str) -> ColonClass {
        if is_latin_fragment(fragment) {
            return ColonClass::Noun;
        }
        if fragment.chars().count() <= 2 {
            return ColonClass::Noun;
        }

        let morphemes = match self.tokenizer.tokenize(fragment).await {
            Ok(morphemes) => morphemes,
            Err(err) => {
                let decision = self.fallback_for(fragment);
                warn!(
                    tokenizer = self.tokenizer.name(),
                    error = %err,
                    ?decision,
                    "tokenizer failed, using fallback"
                );
                return decision;
            }
        };

        let Some(last) = morphemes.last() else {
            return ColonClass::Noun;
        };
        let decision = match last.pos {
            PartOfSpeech::Noun => ColonClass::Noun,
            PartOfSpeech::Verb
            | PartOfSpeech::Adjective
            | PartOfSpeech::AuxiliaryVerb
            | PartOfSpeech::Conjunction
            | PartOfSpeech::Particle
            | PartOfSpeech::Other => ColonClass::Predicate,
        };
        debug!(
            fragment,
            last = %last.surface,
            pos = ?last.pos,
            ?decision,
            "classified colon fragment"
        );
        decision
    }

    fn fallback_for(&self, fragment: &str) -> ColonClass {
        match self.fallback {
            FallbackPolicy::FailOpen => ColonClass::Noun,
            FallbackPolicy::ExceptionList => {
                let fragment = fragment.trim_end();
                if NOUN_SUFFIXES.iter().any(|suffix| fragment.ends_with(suffix)) {
                    ColonClass::Noun
                } else {
                    ColonClass::Predicate
                }
            }
        }
    }
}

/// English or code-like lead-ins (`Usage`, `npm install`) take a colon naturally
fn is_latin_fragment(fragment: &str) -> bool {
    let trimmed = fragment.trim();
    let code_like = |ch: char| {
        ch.is_ascii_alphanumeric() || ch.is_whitespace() || matches!(ch, '-' | '_' | '.')
    };
    !trimmed.is_empty()
        && trimmed.chars().all(code_like)
        && trimmed.chars().any(|ch| ch.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenizeError;
    use crate::types::Morpheme;
    use async_trait::async_trait;

    struct Failing;

    #[async_trait]
    impl Tokenizer for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn tokenize(&self, _text: &str) -> Result<Vec<Morpheme>, TokenizeError> {
            Err(TokenizeError::Unavailable("offline".to_string()))
        }
    }

    struct Empty;

    #[async_trait]
    impl Tokenizer for Empty {
        fn name(&self) -> &str {
            "empty"
        }

        async fn tokenize(&self, _text: &str) -> Result<Vec<Morpheme>, TokenizeError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn builds_the_configured_backend() {
        let config = ClassifierConfig {
            tokenizer: TokenizerConfig::Command {
                program: "mecab".to_string(),
                args: Vec::new(),
            },
            on_tokenizer_error: FallbackPolicy::ExceptionList,
        };
        let classifier = MorphologicalClassifier::from_config(&config);
        assert_eq!(classifier.tokenizer_name(), "mecab");
        assert_eq!(classifier.fallback(), FallbackPolicy::ExceptionList);
        assert_eq!(
            MorphologicalClassifier::from_config(&ClassifierConfig::default()).tokenizer_name(),
            "ipadic"
        );
        let offline = ClassifierConfig {
            tokenizer: TokenizerConfig::Lexicon,
            ..ClassifierConfig::default()
        };
        assert_eq!(
            MorphologicalClassifier::from_config(&offline).tokenizer_name(),
            "lexicon"
        );
    }

    #[tokio::test]
    async fn bare_noun_is_noun() {
        let classifier = MorphologicalClassifier::default();
        assert_eq!(classifier.classify_trailing_colon("手順").await, ColonClass::Noun);
        assert_eq!(classifier.classify_trailing_colon("使用方法").await, ColonClass::Noun);
    }

    #[tokio::test]
    async fn hiragana_lead_ins_are_nouns() {
        let classifier = MorphologicalClassifier::default();
        for fragment in ["以下のとおり", "手順は次のとおり"] {
            assert_eq!(
                classifier.classify_trailing_colon(fragment).await,
                ColonClass::Noun,
                "{fragment}"
            );
        }

        let offline = MorphologicalClassifier::new(
            Arc::new(LexiconTokenizer::new()),
            FallbackPolicy::FailOpen,
        );
        for fragment in ["まとめ", "おすすめ", "以下のとおり", "手順は次のとおり"] {
            assert_eq!(
                offline.classify_trailing_colon(fragment).await,
                ColonClass::Noun,
                "{fragment}"
            );
        }
    }

    #[tokio::test]
    async fn predicates_are_flagged() {
        let classifier = MorphologicalClassifier::default();
        assert_eq!(classifier.classify_trailing_colon("実行します").await, ColonClass::Predicate);
        assert_eq!(classifier.classify_trailing_colon("例えば").await, ColonClass::Predicate);
    }

    #[tokio::test]
    async fn latin_lead_ins_are_exempt() {
        let classifier =
            MorphologicalClassifier::new(Arc::new(Failing), FallbackPolicy::ExceptionList);
        assert_eq!(
            classifier.classify_trailing_colon("Install with npm").await,
            ColonClass::Noun
        );
        assert_eq!(classifier.classify_trailing_colon("v1.2").await, ColonClass::Noun);
    }

    #[tokio::test]
    async fn empty_analysis_fails_open() {
        let classifier =
            MorphologicalClassifier::new(Arc::new(Empty), FallbackPolicy::ExceptionList);
        assert_eq!(classifier.classify_trailing_colon("実行します").await, ColonClass::Noun);
    }

    #[tokio::test]
    async fn tokenizer_errors_use_the_fallback() {
        let open = MorphologicalClassifier::new(Arc::new(Failing), FallbackPolicy::FailOpen);
        assert_eq!(open.classify_trailing_colon("実行します").await, ColonClass::Noun);

        let strict = MorphologicalClassifier::new(Arc::new(Failing), FallbackPolicy::ExceptionList);
        assert_eq!(strict.classify_trailing_colon("データの取得方法").await, ColonClass::Noun);
        assert_eq!(strict.classify_trailing_colon("実行します").await, ColonClass::Predicate);
    }
}
