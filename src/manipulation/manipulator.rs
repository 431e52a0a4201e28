//! Validation and application of change batches
//!
//! `apply` is the only place source text is rewritten. A batch is validated
//! as a whole first; an invalid batch is rejected without touching anything.
//! Valid batches are spliced in descending start order, so every change's
//! recorded offsets still describe the unshifted prefix when it is applied.

use super::change::{Change, ChangeError, ChangeResult, ChangeSet, ChangeType, ValidationResult};
use crate::ast::AstNode;
use crate::types::Location;
use crate::Settings;
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::{debug, warn};

/// One splice derived from a change. Moves produce two.
#[derive(Debug)]
struct Edit<'a> {
    start: usize,
    end: usize,
    content: &'a str,
    /// Position of the originating change in the input list
    index: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct AstManipulator {
    allow_touching: bool,
}

impl Default for AstManipulator {
    fn default() -> Self {
        Self::new()
    }
}

impl AstManipulator {
    /// Manipulator that accepts changes sharing a boundary
    pub fn new() -> Self {
        Self {
            allow_touching: true,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            allow_touching: settings.manipulation.allow_touching,
        }
    }

    /// When false, changes whose spans merely touch (`a.end == b.start`)
    /// are rejected as overlapping.
    pub fn with_allow_touching(mut self, allow: bool) -> Self {
        self.allow_touching = allow;
        self
    }

    pub fn allows_touching(&self) -> bool {
        self.allow_touching
    }

    pub fn insert_before(node: &AstNode, content: impl Into<String>) -> Change {
        let loc = node.location;
        let point = Location::new(
            loc.start_line,
            loc.start_column,
            loc.start_line,
            loc.start_column,
            loc.start_index,
            loc.start_index,
        );
        Change::new(ChangeType::Insert, point)
            .with_content(content)
            .with_target(node.id)
            .with_description(format!("insert before {}", describe(node)))
    }

    pub fn insert_after(node: &AstNode, content: impl Into<String>) -> Change {
        let loc = node.location;
        let point = Location::new(
            loc.end_line,
            loc.end_column,
            loc.end_line,
            loc.end_column,
            loc.end_index,
            loc.end_index,
        );
        Change::new(ChangeType::Insert, point)
            .with_content(content)
            .with_target(node.id)
            .with_description(format!("insert after {}", describe(node)))
    }

    /// Insert at a raw byte offset. Line and column are left at zero.
    pub fn insert_at(index: usize, content: impl Into<String>) -> Change {
        Change::new(ChangeType::Insert, Location::new(0, 0, 0, 0, index, index))
            .with_content(content)
            .with_description(format!("insert at {index}"))
    }

    pub fn replace(node: &AstNode, content: impl Into<String>) -> Change {
        Change::new(ChangeType::Replace, node.location)
            .with_content(content)
            .with_target(node.id)
            .with_description(format!("replace {}", describe(node)))
    }

    pub fn replace_range(location: Location, content: impl Into<String>) -> Change {
        Change::new(ChangeType::Replace, location).with_content(content)
    }

    pub fn delete(node: &AstNode) -> Change {
        Change::new(ChangeType::Delete, node.location)
            .with_target(node.id)
            .with_description(format!("delete {}", describe(node)))
    }

    pub fn delete_range(location: Location) -> Change {
        Change::new(ChangeType::Delete, location)
    }

    /// Cut `node`'s text and re-insert it at byte offset `destination`
    pub fn move_node(node: &AstNode, destination: usize) -> Change {
        Change::new(ChangeType::Move, node.location)
            .with_target(node.id)
            .with_destination(destination)
            .with_description(format!("move {} to {destination}", describe(node)))
    }

    /// Checks bounds, content and overlaps, collecting every problem.
    pub fn validate(&self, source: &str, changes: &[Change]) -> ValidationResult {
        let mut errors = Vec::new();
        let mut checked = Vec::with_capacity(changes.len());

        for (index, change) in changes.iter().enumerate() {
            let before = errors.len();
            check_change(source, change, &mut errors);
            if errors.len() == before {
                checked.push(index);
            }
        }

        // Spans of changes that failed their own checks are meaningless, so
        // only well-formed changes take part in the overlap scan
        let mut edits: Vec<Edit> = checked
            .into_iter()
            .flat_map(|index| expand(source, &changes[index], index))
            .collect();
        edits.sort_by_key(|edit| (edit.start, edit.end, edit.index));

        // Compare each edit against the furthest-reaching edit before it.
        // A move yields two edits, so one pair of changes is reported once.
        let mut reach: Option<&Edit> = None;
        let mut reported = HashSet::new();
        for edit in &edits {
            if let Some(previous) = reach {
                let overlaps = if self.allow_touching {
                    previous.end > edit.start
                } else {
                    previous.end >= edit.start
                };
                let pair = (
                    previous.index.min(edit.index),
                    previous.index.max(edit.index),
                );
                if overlaps && previous.index != edit.index && reported.insert(pair) {
                    errors.push(ChangeError::Overlap {
                        first: changes[previous.index].label(),
                        second: changes[edit.index].label(),
                    });
                }
            }
            if reach.is_none_or(|previous| edit.end > previous.end) {
                reach = Some(edit);
            }
        }

        ValidationResult::from_errors(errors)
    }

    /// Applies the batch to a copy of `source`, all or nothing.
    ///
    /// Edits run in descending start order; ties put the larger end first,
    /// then the later input position. Several inserts at one offset keep
    /// their input order in the output.
    pub fn apply(&self, source: &str, changes: &[Change]) -> ChangeResult {
        let validation = self.validate(source, changes);
        if !validation.valid {
            warn!(
                "Rejected batch of {} changes: {} problems",
                changes.len(),
                validation.errors.len()
            );
            return ChangeResult::rejected(validation.errors);
        }

        let mut edits: Vec<Edit> = changes
            .iter()
            .enumerate()
            .flat_map(|(index, change)| expand(source, change, index))
            .collect();
        edits.sort_by_key(|edit| Reverse((edit.start, edit.end, edit.index)));

        let mut output = source.to_string();
        for edit in &edits {
            output.replace_range(edit.start..edit.end, edit.content);
        }

        debug!(
            "Applied {} changes ({} -> {} bytes)",
            changes.len(),
            source.len(),
            output.len()
        );
        ChangeResult::applied(output, changes.len())
    }

    pub fn create_change_set(
        &self,
        file_path: impl Into<String>,
        source: impl Into<String>,
        changes: Vec<Change>,
    ) -> ChangeSet {
        ChangeSet::new(file_path, source, changes)
    }

    pub fn apply_change_set(&self, change_set: &ChangeSet) -> ChangeResult {
        let mut result = self.apply(&change_set.original_source, &change_set.changes);
        result.change_set_id = Some(change_set.id);
        result
    }

    /// The source as it was before the batch
    pub fn rollback(&self, change_set: &ChangeSet) -> String {
        change_set.original_source.clone()
    }
}

fn describe(node: &AstNode) -> String {
    match node.name() {
        Some(name) => format!("{} `{name}`", node.node_type),
        None => format!("{} {}", node.node_type, node.id),
    }
}

fn check_change(source: &str, change: &Change, errors: &mut Vec<ChangeError>) {
    let label = change.label();
    let start = change.location.start_index;
    let end = change.location.end_index;
    let len = source.len();

    if end < start {
        errors.push(ChangeError::InvertedRange {
            change: label,
            start,
            end,
        });
        return;
    }
    if end > len {
        errors.push(ChangeError::OutOfBounds {
            change: label,
            start,
            end,
            len,
        });
        return;
    }
    for offset in [start, end] {
        if !source.is_char_boundary(offset) {
            errors.push(ChangeError::NotCharBoundary {
                change: label.clone(),
                offset,
            });
            return;
        }
    }

    match change.change_type {
        ChangeType::Insert | ChangeType::Replace => {
            if change.new_content.as_deref().is_none_or(str::is_empty) {
                errors.push(ChangeError::MissingContent { change: label });
            }
        }
        ChangeType::Move => {
            let valid = change.destination.is_some_and(|dest| {
                dest <= len && source.is_char_boundary(dest) && (dest <= start || dest >= end)
            });
            if !valid {
                errors.push(ChangeError::InvalidDestination {
                    change: label,
                    destination: change.destination,
                });
            }
        }
        ChangeType::Delete => {}
    }
}

/// Splices for a change already known to be well-formed against `source`
fn expand<'a>(source: &'a str, change: &'a Change, index: usize) -> Vec<Edit<'a>> {
    let start = change.location.start_index;
    let end = change.location.end_index;

    match change.change_type {
        // Inserts are zero-width at the start offset
        ChangeType::Insert => vec![Edit {
            start,
            end: start,
            content: change.new_content.as_deref().unwrap_or_default(),
            index,
        }],
        ChangeType::Replace => vec![Edit {
            start,
            end,
            content: change.new_content.as_deref().unwrap_or_default(),
            index,
        }],
        ChangeType::Delete => vec![Edit {
            start,
            end,
            content: "",
            index,
        }],
        ChangeType::Move => {
            let destination = change.destination.unwrap_or(start);
            vec![
                Edit {
                    start,
                    end,
                    content: "",
                    index,
                },
                Edit {
                    start: destination,
                    end: destination,
                    content: &source[start..end],
                    index,
                },
            ]
        }
    }
}
