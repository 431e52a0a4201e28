use super::AstNode;
use crate::parsing::Language;
use crate::types::Location;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Structured problem reported while parsing.
///
/// Heuristic parsers never emit these; unmatched constructs are simply
/// absent from the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub message: String,
    pub location: Location,
    pub severity: DiagnosticSeverity,
}

impl ParseDiagnostic {
    pub fn error(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
            severity: DiagnosticSeverity::Error,
        }
    }

    pub fn warning(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
            severity: DiagnosticSeverity::Warning,
        }
    }
}

/// Output of one `parse` call. The caller owns it; nothing is cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFile {
    pub file_path: String,
    pub language: Language,
    pub root: AstNode,
    pub source: String,
    pub errors: Vec<ParseDiagnostic>,
    pub parsed_at: DateTime<Utc>,
}

impl ParsedFile {
    pub fn new(
        file_path: impl Into<String>,
        language: Language,
        root: AstNode,
        source: impl Into<String>,
        errors: Vec<ParseDiagnostic>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            language,
            root,
            source: source.into(),
            errors,
            parsed_at: Utc::now(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity == DiagnosticSeverity::Error)
    }

    /// Deserializes a previously serialized file and rebuilds parent links.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut parsed: ParsedFile = serde_json::from_str(json)?;
        parsed.root.relink_parents();
        Ok(parsed)
    }
}
