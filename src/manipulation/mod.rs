//! Located text edits over parsed sources
//!
//! Changes are plain records built from nodes or raw spans;
//! [`AstManipulator`] validates a batch and applies it atomically.

mod change;
mod manipulator;

pub use change::{Change, ChangeError, ChangeResult, ChangeSet, ChangeType, ValidationResult};
pub use manipulator::AstManipulator;
