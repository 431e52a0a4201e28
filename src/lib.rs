/// The main library module for codeshape
///
/// Parses TypeScript, JavaScript, Python, Java and Go sources into one
/// normalized tree, answers structural queries over it, and applies located
/// text edits atomically.
pub mod ast;
pub mod config;
pub mod error;
pub mod logging;
pub mod manipulation;
pub mod parsing;
pub mod traversal;
pub mod types;

// Explicit exports for better API clarity
pub use ast::{AstNode, ExtractedSymbol, ParameterInfo, ParseDiagnostic, ParsedFile};
pub use config::Settings;
pub use error::{
    ConfigError, ConfigResult, ManipulationError, ManipulationResult, ParseError, ParseResult,
};
pub use manipulation::{
    AstManipulator, Change, ChangeError, ChangeResult, ChangeSet, ChangeType, ValidationResult,
};
pub use parsing::{
    ExportInfo, ExportKind, ImportInfo, ImportedName, Language, LanguageParser, ParserFactory,
    SourceParser,
};
pub use traversal::VisitResult;
pub use types::{Location, NodeId, NodeType, Visibility};
