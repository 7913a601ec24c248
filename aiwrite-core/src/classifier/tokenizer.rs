use crate::error::TokenizeError;
use crate::types::Morpheme;
use async_trait::async_trait;

/// Morphological analysis backend.
///
/// Implementations may run in process or shell out to an analyzer; either
/// way the classifier awaits the result before finishing the current node.
#[async_trait]
pub trait Tokenizer: Send + Sync {
    /// Backend name for debugging/logging
    fn name(&self) -> &str;

    /// Split `text` into morphemes in reading order
    async fn tokenize(&self, text: &str) -> Result<Vec<Morpheme>, TokenizeError>;
}
