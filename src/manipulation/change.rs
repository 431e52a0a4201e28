//! Change records, batches and results

use crate::error::{ManipulationError, ManipulationResult};
use crate::types::{Location, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Insert,
    Replace,
    Delete,
    Move,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ChangeType::Insert => "insert",
            ChangeType::Replace => "replace",
            ChangeType::Delete => "delete",
            ChangeType::Move => "move",
        })
    }
}

/// A declarative edit over a span of the source it was computed from.
///
/// Only `location.start_index` / `end_index` drive application; line and
/// column are informational. Inserts are zero-width. A move cuts its span
/// and re-inserts it at `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_node: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Change {
    pub fn new(change_type: ChangeType, location: Location) -> Self {
        Self {
            change_type,
            location,
            target_node: None,
            new_content: None,
            destination: None,
            description: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.new_content = Some(content.into());
        self
    }

    pub fn with_target(mut self, node: NodeId) -> Self {
        self.target_node = Some(node);
        self
    }

    pub fn with_destination(mut self, destination: usize) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// How errors refer to this change: its description, or a summary of
    /// its type and span when it has none.
    pub fn label(&self) -> String {
        match &self.description {
            Some(description) => description.clone(),
            None => format!(
                "{} [{}, {})",
                self.change_type, self.location.start_index, self.location.end_index
            ),
        }
    }
}

/// Why a change was rejected. Every variant names the change(s) involved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChangeError {
    #[error("'{change}': range [{start}, {end}) is outside the source (length {len})")]
    OutOfBounds {
        change: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("'{change}': end {end} is before start {start}")]
    InvertedRange {
        change: String,
        start: usize,
        end: usize,
    },

    #[error("'{change}': offset {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { change: String, offset: usize },

    #[error("'{change}': insert and replace need non-empty content")]
    MissingContent { change: String },

    #[error(
        "'{change}': move destination {destination:?} must be inside the source and outside the moved span"
    )]
    InvalidDestination {
        change: String,
        destination: Option<usize>,
    },

    #[error("'{first}' overlaps '{second}'")]
    Overlap { first: String, second: String },
}

/// Outcome of `validate`: every problem found, not just the first
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ChangeError>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<ChangeError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// An atomic batch plus the source it was computed against
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub id: Uuid,
    pub file_path: String,
    pub changes: Vec<Change>,
    pub original_source: String,
    pub created_at: DateTime<Utc>,
}

impl ChangeSet {
    pub fn new(
        file_path: impl Into<String>,
        source: impl Into<String>,
        changes: Vec<Change>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_path: file_path.into(),
            changes,
            original_source: source.into(),
            created_at: Utc::now(),
        }
    }
}

/// Outcome of applying a batch. On failure `new_source` is `None` and the
/// input is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeResult {
    pub success: bool,
    pub new_source: Option<String>,
    pub errors: Vec<ChangeError>,
    pub change_set_id: Option<Uuid>,
    /// Number of changes applied (all of them, or zero)
    pub applied: usize,
}

impl ChangeResult {
    pub fn applied(new_source: String, applied: usize) -> Self {
        Self {
            success: true,
            new_source: Some(new_source),
            errors: Vec::new(),
            change_set_id: None,
            applied,
        }
    }

    pub fn rejected(errors: Vec<ChangeError>) -> Self {
        Self {
            success: false,
            new_source: None,
            errors,
            change_set_id: None,
            applied: 0,
        }
    }

    pub fn into_result(self) -> ManipulationResult<String> {
        match self.new_source {
            Some(source) if self.success => Ok(source),
            _ => Err(ManipulationError::InvalidChanges(self.errors)),
        }
    }
}
