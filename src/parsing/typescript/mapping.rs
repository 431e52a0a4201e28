//! Tree-sitter kind → `NodeType` lookup table
//!
//! Only kinds listed here become tree nodes. Everything else is transparent:
//! its mapped descendants attach to the nearest mapped ancestor. The table
//! covers both the TypeScript/TSX and the JavaScript grammars.

use crate::types::NodeType;

/// Statement kinds kept as `statement` nodes
const STATEMENT_KINDS: &[&str] = &[
    "expression_statement",
    "return_statement",
    "if_statement",
    "for_statement",
    "for_in_statement",
    "while_statement",
    "do_statement",
    "switch_statement",
    "try_statement",
    "throw_statement",
    "break_statement",
    "continue_statement",
    "labeled_statement",
];

/// Expression kinds kept as `expression` nodes
const EXPRESSION_KINDS: &[&str] = &[
    "assignment_expression",
    "augmented_assignment_expression",
    "binary_expression",
    "ternary_expression",
    "await_expression",
    "yield_expression",
    "unary_expression",
    "update_expression",
    "as_expression",
    "satisfies_expression",
];

/// Map a tree-sitter node kind onto the normalized tag set
pub fn map_kind(kind: &str) -> Option<NodeType> {
    let node_type = match kind {
        "program" => NodeType::Program,
        "function_declaration"
        | "generator_function_declaration"
        | "function_expression"
        | "generator_function"
        | "function"
        | "function_signature" => NodeType::Function,
        "arrow_function" => NodeType::ArrowFunction,
        "method_definition" | "method_signature" | "abstract_method_signature" => {
            NodeType::Method
        }
        "class_declaration" | "abstract_class_declaration" | "class" | "enum_declaration" => {
            NodeType::Class
        }
        "interface_declaration" => NodeType::Interface,
        "type_alias_declaration" => NodeType::TypeAlias,
        "variable_declarator" => NodeType::Variable,
        "required_parameter" | "optional_parameter" => NodeType::Parameter,
        "public_field_definition" | "field_definition" | "property_signature" => {
            NodeType::Property
        }
        "import_statement" => NodeType::Import,
        "export_statement" => NodeType::Export,
        "call_expression" | "new_expression" => NodeType::CallExpression,
        "statement_block" => NodeType::Block,
        "internal_module" | "module" => NodeType::Module,
        "comment" => NodeType::Comment,
        "decorator" => NodeType::Decorator,
        k if STATEMENT_KINDS.contains(&k) => NodeType::Statement,
        k if EXPRESSION_KINDS.contains(&k) => NodeType::Expression,
        _ => return None,
    };

    Some(node_type)
}

/// Kinds sitting between a declaration and its `export_statement`
pub const DECLARATION_WRAPPERS: &[&str] = &[
    "variable_declarator",
    "lexical_declaration",
    "variable_declaration",
    "ambient_declaration",
];

/// Declaration kinds that receive `exported` metadata
pub fn is_declaration(node_type: NodeType) -> bool {
    matches!(
        node_type,
        NodeType::Function
            | NodeType::ArrowFunction
            | NodeType::Class
            | NodeType::Interface
            | NodeType::TypeAlias
            | NodeType::Variable
            | NodeType::Module
    )
}

/// Callable kinds that receive `async`/`parameters`/`returnType` metadata
pub fn is_callable(node_type: NodeType) -> bool {
    matches!(
        node_type,
        NodeType::Function | NodeType::ArrowFunction | NodeType::Method
    )
}
