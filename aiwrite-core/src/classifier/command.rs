//! External analyzer backend.
//!
//! Runs a MeCab-compatible command once per fragment: the fragment is written
//! to stdin and every output line up to `EOS` is parsed as
//! `surface<TAB>pos[,detail...]`.

use crate::error::TokenizeError;
use crate::types::{Morpheme, PartOfSpeech};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::tokenizer::Tokenizer;

#[derive(Debug, Clone)]
pub struct CommandTokenizer {
    program: String,
    args: Vec<String>,
}

impl CommandTokenizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `mecab` with its default dictionary and output format
    pub fn mecab() -> Self {
        Self::new("mecab", Vec::new())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Tokenizer for CommandTokenizer {
    fn name(&self) -> &str {
        &self.program
    }

    async fn tokenize(&self, text: &str) -> Result<Vec<Morpheme>, TokenizeError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TokenizeError::Spawn {
                command: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let mut input = text.replace('\n', " ");
            input.push('\n');
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|err| TokenizeError::Command {
                    command: self.program.clone(),
                    reason: format!("failed to write input: {err}"),
                })?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|err| TokenizeError::Command {
                command: self.program.clone(),
                reason: err.to_string(),
            })?;

        if !output.status.success() {
            return Err(TokenizeError::Command {
                command: self.program.clone(),
                reason: format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let morphemes = parse_output(&stdout)?;
        debug!(command = %self.program, morphemes = morphemes.len(), "external tokenizer finished");
        Ok(morphemes)
    }
}

/// Parse MeCab-style output. Lines after `EOS` are ignored.
pub fn parse_output(output: &str) -> Result<Vec<Morpheme>, TokenizeError> {
    let mut morphemes = Vec::new();
    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line == "EOS" {
            break;
        }
        if line.is_empty() {
            continue;
        }
        let (surface, features) = line.split_once('\t').ok_or_else(|| TokenizeError::Malformed {
            line: line.to_string(),
        })?;
        let major = features.split(',').next().unwrap_or("");
        morphemes.push(Morpheme::new(surface, pos_from_ipadic(major)));
    }
    Ok(morphemes)
}

/// Map the IPADIC major part-of-speech label
pub(crate) fn pos_from_ipadic(label: &str) -> PartOfSpeech {
    match label {
        "名詞" => PartOfSpeech::Noun,
        "動詞" => PartOfSpeech::Verb,
        "形容詞" => PartOfSpeech::Adjective,
        "助動詞" => PartOfSpeech::AuxiliaryVerb,
        "接続詞" => PartOfSpeech::Conjunction,
        "助詞" => PartOfSpeech::Particle,
        _ => PartOfSpeech::Other,
    }
}
