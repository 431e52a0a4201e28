//! Java language parser implementation

pub mod parser;

pub use parser::JavaParser;
