//! Language detection and enumeration
//!
//! This module provides language detection from file extensions. The
//! extension table is the only detection mechanism; file contents are never
//! sniffed.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Java,
    Go,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::TypeScript,
        Language::JavaScript,
        Language::Python,
        Language::Java,
        Language::Go,
    ];

    /// Detect language from a file extension, with or without the leading dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext_lower = ext.trim_start_matches('.').to_lowercase();

        match ext_lower.as_str() {
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "py" | "pyi" => Some(Language::Python),
            "java" => Some(Language::Java),
            "go" => Some(Language::Go),
            _ => None,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Look a language up by its configuration key (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "typescript" => Some(Language::TypeScript),
            "javascript" => Some(Language::JavaScript),
            "python" => Some(Language::Python),
            "java" => Some(Language::Java),
            "go" => Some(Language::Go),
            _ => None,
        }
    }

    /// Static file extensions for this language, including the leading dot
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::TypeScript => &[".ts", ".tsx", ".mts", ".cts"],
            Language::JavaScript => &[".js", ".jsx", ".mjs", ".cjs"],
            Language::Python => &[".py", ".pyi"],
            Language::Java => &[".java"],
            Language::Go => &[".go"],
        }
    }

    /// Get the configuration key for this language
    pub fn config_key(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Go => "go",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "TypeScript",
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::Go => "Go",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ParseError::UnknownLanguage(s.to_string()))
    }
}

/// Lowercased extension of `path` including the leading dot (`"src/A.JAVA"` → `".java"`).
pub fn dotted_extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
}
