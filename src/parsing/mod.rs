pub mod factory;
pub mod go;
pub mod import;
pub mod java;
pub mod language;
pub mod parser;
pub mod python;
pub mod scan;
pub mod typescript;

pub use factory::{ParserFactory, SourceParser};
pub use go::GoParser;
pub use import::{ExportInfo, ExportKind, ImportInfo, ImportedName};
pub use java::JavaParser;
pub use language::Language;
pub use parser::{LanguageParser, NodeOptions, TreeBuilder};
pub use python::PythonParser;
pub use typescript::{Dialect, TypeScriptParser};
