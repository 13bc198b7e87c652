//! Error types for flag definition and parsing.
//!
//! [`FlagError`] is the closed set of failures a registry can report, either
//! while it is being built or while it parses a token sequence. Every variant
//! maps to a command-line usage problem, so callers are expected to match on
//! the kind rather than on the message. [`ConfigError`] covers loading a
//! registry from a definition document.

use thiserror::Error;

/// Errors raised by [`Registry`](crate::Registry) definition and parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// A flag was defined with an empty key, or with a kind that cannot be
    /// defined that way.
    #[error("invalid key '{0}'")]
    InvalidKey(String),

    /// A flag with the same key already exists in the registry.
    #[error("duplicate key '{0}'")]
    DuplicateKey(String),

    /// A flag with the same short key already exists in the registry.
    #[error("duplicate short key '{0}'")]
    DuplicateShortKey(char),

    /// A key, short key or token does not name any defined flag.
    #[error("key '{0}' not found")]
    NotFound(String),

    /// The same flag appeared twice in one parse of a scope.
    #[error("flag '{0}' specified more than once")]
    Duplicate(String),

    /// Two flags of the same exclusive set were parsed.
    #[error("'{key}' is exclusive to '{other}'")]
    Exclusive { key: String, other: String },

    /// A required flag was never parsed.
    #[error("required key '{0}' not specified")]
    RequiredMissing(String),

    /// A required flag was not given a value.
    #[error("flag '{0}' requires a value")]
    RequiresValue(String),

    /// A switch was given a value.
    #[error("switch '{0}' takes no value")]
    SwitchTakesNoValue(String),

    /// A sub flag fired with nothing left to hand to its group.
    #[error("sub '{0}' invoked with no arguments")]
    SubRequiresArguments(String),

    /// A short key cluster was led by a flag that is not a sub flag.
    #[error("flag '{0}' is not a sub and cannot lead a combined short key")]
    NotASub(String),

    /// The parse completed without matching a single flag.
    #[error("parse invoked with no arguments")]
    NoArguments,
}

/// Convenience alias for results with [`FlagError`].
pub type Result<T> = std::result::Result<T, FlagError>;

/// Errors that can occur while loading a registry definition document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A short key is not exactly one character.
    #[error("invalid short key '{0}': must be a single character")]
    InvalidShortKey(String),

    /// A `sub` entry has no nested group.
    #[error("sub flag '{0}' has no group")]
    MissingGroup(String),

    /// A non-`sub` entry carries a nested group.
    #[error("flag '{0}' is not a sub but declares a group")]
    UnexpectedGroup(String),

    /// The registry rejected a definition.
    #[error(transparent)]
    Flag(#[from] FlagError),
}
