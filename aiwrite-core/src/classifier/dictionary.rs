//! Dictionary-backed analyzer: lindera with the embedded IPADIC dictionary.
//!
//! The dictionary is decoded on first use and shared for the rest of the run.
//! A dictionary that fails to load turns every call into
//! `TokenizeError::Unavailable`, which the classifier answers with its
//! fallback policy.

use crate::error::TokenizeError;
use crate::types::{Morpheme, PartOfSpeech};
use async_trait::async_trait;
use lindera::dictionary::{load_dictionary_from_kind, DictionaryKind};
use lindera::mode::Mode;
use lindera::segmenter::Segmenter;
use std::sync::OnceLock;
use tracing::debug;

use super::command::pos_from_ipadic;
use super::tokenizer::Tokenizer;

/// Label lindera puts in place of the feature list for out-of-dictionary words
const UNKNOWN: &str = "UNK";

#[derive(Default)]
pub struct DictionaryTokenizer {
    analyzer: OnceLock<Result<lindera::tokenizer::Tokenizer, String>>,
}

impl DictionaryTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn analyzer(&self) -> Result<&lindera::tokenizer::Tokenizer, TokenizeError> {
        self.analyzer
            .get_or_init(|| {
                let dictionary = load_dictionary_from_kind(DictionaryKind::IPADIC)
                    .map_err(|err| err.to_string())?;
                debug!("loaded IPADIC dictionary");
                let segmenter = Segmenter::new(Mode::Normal, dictionary, None);
                Ok(lindera::tokenizer::Tokenizer::new(segmenter))
            })
            .as_ref()
            .map_err(|reason| TokenizeError::Unavailable(reason.clone()))
    }
}

#[async_trait]
impl Tokenizer for DictionaryTokenizer {
    fn name(&self) -> &str {
        "ipadic"
    }

    async fn tokenize(&self, text: &str) -> Result<Vec<Morpheme>, TokenizeError> {
        let analyzer = self.analyzer()?;
        let mut tokens = analyzer
            .tokenize(text)
            .map_err(|err| TokenizeError::Unavailable(err.to_string()))?;

        let mut morphemes = Vec::with_capacity(tokens.len());
        for token in tokens.iter_mut() {
            let surface = token.text.to_string();
            let details = token.details();
            morphemes.push(Morpheme::new(surface, major_pos(details.first().copied())));
        }
        Ok(morphemes)
    }
}

/// Unknown words are mostly loanwords and proper names
fn major_pos(label: Option<&str>) -> PartOfSpeech {
    match label {
        None | Some(UNKNOWN) => PartOfSpeech::Noun,
        Some(label) => pos_from_ipadic(label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn last_pos(text: &str) -> PartOfSpeech {
        let morphemes = DictionaryTokenizer::new().tokenize(text).await.unwrap();
        morphemes.last().expect("at least one morpheme").pos
    }

    #[test]
    fn unknown_words_read_as_nouns() {
        assert_eq!(major_pos(Some(UNKNOWN)), PartOfSpeech::Noun);
        assert_eq!(major_pos(None), PartOfSpeech::Noun);
        assert_eq!(major_pos(Some("助動詞")), PartOfSpeech::AuxiliaryVerb);
    }

    #[tokio::test]
    async fn polite_predicate_ends_in_auxiliary() {
        assert_eq!(last_pos("実行します").await, PartOfSpeech::AuxiliaryVerb);
    }

    #[tokio::test]
    async fn hiragana_nouns_end_in_nouns() {
        assert_eq!(last_pos("以下のとおり").await, PartOfSpeech::Noun);
        assert_eq!(last_pos("手順は次のとおり").await, PartOfSpeech::Noun);
        assert_eq!(last_pos("使用方法").await, PartOfSpeech::Noun);
    }
}
