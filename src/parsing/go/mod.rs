//! Go language parser implementation

pub mod parser;

pub use parser::{GoParser, is_exported_name};
