use thiserror::Error;

/// Raised while building rule tables from configuration. Configuration
/// problems are fatal at construction time and never surface mid-traversal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid allow-list pattern {pattern:?}: {reason}")]
    AllowPattern { pattern: String, reason: String },

    #[error("unsupported regex flag '{flag}' in allow-list entry {pattern:?}")]
    AllowFlag { pattern: String, flag: char },

    #[error("unknown preset '{0}' (expected 'recommended' or 'all')")]
    UnknownPreset(String),

    #[error("unknown option '{option}' for rule '{rule}'")]
    UnknownOption { rule: &'static str, option: String },

    #[error("invalid built-in pattern for detector '{detector}': {source}")]
    Detector {
        detector: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failure of a tokenizer backend. The classifier converts these into its
/// configured fallback decision; they never abort a lint run.
#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("tokenizer command '{command}' could not be started: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("tokenizer command '{command}' failed: {reason}")]
    Command { command: String, reason: String },

    #[error("malformed tokenizer output line {line:?}")]
    Malformed { line: String },

    #[error("tokenizer unavailable: {0}")]
    Unavailable(String),
}
