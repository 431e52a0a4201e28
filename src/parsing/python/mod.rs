//! Python language parser implementation

pub mod parser;

pub use parser::{PythonParser, python_visibility};
