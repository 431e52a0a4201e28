//! Error types for parsing, manipulation and configuration
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages. Heuristic parse problems are
//! not errors (they surface as missing nodes); the variants here are the hard,
//! caller-visible failures.

use crate::manipulation::ChangeError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors specific to parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error(
        "No parser available for file '{path}' (extension '{extension}'). Supported extensions: .ts, .tsx, .js, .jsx, .py, .java, .go"
    )]
    NoParser { path: String, extension: String },

    #[error("Failed to initialize {language} parser: {reason}")]
    ParserInit { language: String, reason: String },

    #[error("Unknown language '{0}'")]
    UnknownLanguage(String),
}

impl ParseError {
    /// Get a stable status code for this error type.
    pub fn status_code(&self) -> String {
        match self {
            Self::NoParser { .. } => "NO_PARSER",
            Self::ParserInit { .. } => "PARSER_INIT_ERROR",
            Self::UnknownLanguage(_) => "UNKNOWN_LANGUAGE",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::NoParser { .. } => vec![
                "Check that the file extension belongs to a supported language",
                "Enable the language or map the extension under [languages] in settings.toml",
            ],
            Self::ParserInit { .. } => vec![
                "The tree-sitter grammar does not match the tree-sitter runtime version",
            ],
            Self::UnknownLanguage(_) => vec![
                "Use one of: typescript, javascript, python, java, go",
            ],
        }
    }
}

/// Errors raised when a batch of changes cannot be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManipulationError {
    #[error("Change batch rejected: {}", join_errors(.0))]
    InvalidChanges(Vec<ChangeError>),
}

impl ManipulationError {
    /// Every problem found in the batch, not just the first
    pub fn errors(&self) -> &[ChangeError] {
        match self {
            Self::InvalidChanges(errors) => errors,
        }
    }
}

fn join_errors(errors: &[ChangeError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors specific to loading and saving settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Failed to write configuration file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type alias for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type alias for change application
pub type ManipulationResult<T> = Result<T, ManipulationError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
