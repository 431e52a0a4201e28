//! Normalized, language-agnostic syntax tree.
//!
//! Every parser maps its input onto [`AstNode`] trees. The tree owns its
//! children; `parent` is only an id back-edge so the structure stays acyclic
//! for cloning and serialization.

mod node;
mod parsed;
mod symbol;

pub use node::{AstNode, Metadata};
pub use parsed::{DiagnosticSeverity, ParseDiagnostic, ParsedFile};
pub use symbol::{ExtractedSymbol, ParameterInfo};
