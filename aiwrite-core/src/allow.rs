//! Allow-lists: node-level exemptions configured per rule family.
//!
//! Entries are either literal substrings or regex-like strings written as
//! `/pattern/flags`. A node whose text matches any entry is skipped entirely
//! for that rule family.

use crate::error::ConfigError;
use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone)]
enum AllowEntry {
    Literal(String),
    Pattern(Regex),
}

#[derive(Debug, Clone, Default)]
pub struct AllowList {
    entries: Vec<AllowEntry>,
}

impl AllowList {
    /// Compile a list of raw entries. Malformed patterns and unknown flags
    /// are rejected here so that nothing can fail during a traversal.
    pub fn new<S: AsRef<str>>(raw: &[S]) -> Result<Self, ConfigError> {
        let entries = raw
            .iter()
            .map(|entry| entry.as_ref())
            .filter(|entry| !entry.is_empty())
            .map(parse_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.entries.iter().any(|entry| match entry {
            AllowEntry::Literal(literal) => text.contains(literal.as_str()),
            AllowEntry::Pattern(regex) => regex.is_match(text),
        })
    }
}

fn parse_entry(raw: &str) -> Result<AllowEntry, ConfigError> {
    let Some(body) = raw.strip_prefix('/') else {
        return Ok(AllowEntry::Literal(raw.to_string()));
    };
    let Some(close) = body.rfind('/') else {
        return Ok(AllowEntry::Literal(raw.to_string()));
    };
    let (pattern, flags) = (&body[..close], &body[close + 1..]);

    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            // global, unicode, sticky and indices flags have no effect on a
            // yes/no containment test
            'g' | 'u' | 'y' | 'd' => {}
            other => {
                return Err(ConfigError::AllowFlag {
                    pattern: raw.to_string(),
                    flag: other,
                })
            }
        }
    }

    builder
        .build()
        .map(AllowEntry::Pattern)
        .map_err(|err| ConfigError::AllowPattern {
            pattern: raw.to_string(),
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_entries_match_substrings() {
        let allow = AllowList::new(&["許可された"]).unwrap();
        assert!(allow.matches("- **許可された**: 説明"));
        assert!(!allow.matches("- **重要**: 説明"));
    }

    #[test]
    fn pattern_entries_with_flags() {
        let allow = AllowList::new(&["/重要.*/", "/important/i"]).unwrap();
        assert!(allow.matches("- **重要事項**: これは重要な説明です"));
        assert!(allow.matches("- **IMPORTANT**: This is important"));
        assert!(!allow.matches("- 通常の項目"));
    }

    #[test]
    fn global_flag_is_accepted() {
        let allow = AllowList::new(&["/以下/gu"]).unwrap();
        assert!(allow.matches("以下のような"));
    }

    #[test]
    fn slash_without_closing_is_literal() {
        let allow = AllowList::new(&["/usr"]).unwrap();
        assert!(allow.matches("see /usr/bin"));
        assert!(!allow.matches("usr"));
    }

    #[test]
    fn malformed_pattern_is_a_config_error() {
        let err = AllowList::new(&["/(unclosed/"]).unwrap_err();
        assert!(matches!(err, ConfigError::AllowPattern { .. }));
    }

    #[test]
    fn unknown_flag_is_a_config_error() {
        let err = AllowList::new(&["/abc/x"]).unwrap_err();
        assert!(matches!(err, ConfigError::AllowFlag { flag: 'x', .. }));
    }

    #[test]
    fn empty_entries_are_ignored() {
        let allow = AllowList::new(&[""]).unwrap();
        assert!(allow.is_empty());
        assert!(!allow.matches("anything"));
    }
}
