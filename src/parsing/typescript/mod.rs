//! TypeScript / JavaScript language parser implementation

pub mod mapping;
pub mod modules;
pub mod parser;

pub use parser::{Dialect, TypeScriptParser};
