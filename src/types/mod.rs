mod node_counter;

pub use node_counter::NodeIdGenerator;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Opaque node identifier, unique within a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Span of a node in the source it was parsed from.
///
/// Lines are 1-based, columns are 0-based byte columns within the line and
/// indices are absolute byte offsets. A location is only meaningful for the
/// exact source string it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub start_index: usize,
    pub end_index: usize,
}

impl Location {
    pub fn new(
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
        start_index: usize,
        end_index: usize,
    ) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
            start_index,
            end_index,
        }
    }

    /// Whether the point lies inside this span, both ends inclusive.
    pub fn contains_point(&self, line: u32, column: u32) -> bool {
        if line < self.start_line || line > self.end_line {
            return false;
        }

        if line == self.start_line && column < self.start_column {
            return false;
        }

        if line == self.end_line && column > self.end_column {
            return false;
        }

        true
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start_index..self.end_index
    }
}

/// Closed set of node tags every parser maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Program,
    Module,
    Function,
    ArrowFunction,
    Method,
    Class,
    Interface,
    TypeAlias,
    Variable,
    Parameter,
    Property,
    Import,
    Export,
    CallExpression,
    Block,
    Statement,
    Expression,
    Comment,
    Decorator,
    Struct,
    Package,
    Unknown,
}

impl NodeType {
    /// Node types that open a new lexical scope.
    pub fn is_scope(&self) -> bool {
        matches!(
            self,
            NodeType::Function
                | NodeType::ArrowFunction
                | NodeType::Method
                | NodeType::Class
                | NodeType::Block
                | NodeType::Program
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Program => "program",
            NodeType::Module => "module",
            NodeType::Function => "function",
            NodeType::ArrowFunction => "arrow_function",
            NodeType::Method => "method",
            NodeType::Class => "class",
            NodeType::Interface => "interface",
            NodeType::TypeAlias => "type_alias",
            NodeType::Variable => "variable",
            NodeType::Parameter => "parameter",
            NodeType::Property => "property",
            NodeType::Import => "import",
            NodeType::Export => "export",
            NodeType::CallExpression => "call_expression",
            NodeType::Block => "block",
            NodeType::Statement => "statement",
            NodeType::Expression => "expression",
            NodeType::Comment => "comment",
            NodeType::Decorator => "decorator",
            NodeType::Struct => "struct",
            NodeType::Package => "package",
            NodeType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "program" => Ok(NodeType::Program),
            "module" => Ok(NodeType::Module),
            "function" => Ok(NodeType::Function),
            "arrow_function" => Ok(NodeType::ArrowFunction),
            "method" => Ok(NodeType::Method),
            "class" => Ok(NodeType::Class),
            "interface" => Ok(NodeType::Interface),
            "type_alias" => Ok(NodeType::TypeAlias),
            "variable" => Ok(NodeType::Variable),
            "parameter" => Ok(NodeType::Parameter),
            "property" => Ok(NodeType::Property),
            "import" => Ok(NodeType::Import),
            "export" => Ok(NodeType::Export),
            "call_expression" => Ok(NodeType::CallExpression),
            "block" => Ok(NodeType::Block),
            "statement" => Ok(NodeType::Statement),
            "expression" => Ok(NodeType::Expression),
            "comment" => Ok(NodeType::Comment),
            "decorator" => Ok(NodeType::Decorator),
            "struct" => Ok(NodeType::Struct),
            "package" => Ok(NodeType::Package),
            "unknown" => Ok(NodeType::Unknown),
            _ => Err("Unknown node type"),
        }
    }
}

/// Member and declaration visibility, normalized across languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    /// Java's default (no modifier) visibility.
    Package,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Package => "package",
        }
    }
}

impl FromStr for Visibility {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "protected" => Ok(Visibility::Protected),
            "package" => Ok(Visibility::Package),
            _ => Err("Unknown visibility"),
        }
    }
}
