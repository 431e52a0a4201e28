//! TypeScript / JavaScript parser implementation
//!
//! **Tree-sitter ABI Version**: ABI-14 (tree-sitter-typescript 0.23.2,
//! tree-sitter-javascript 0.25.0)
//!
//! The grammar is picked per call from the file extension: `.tsx` gets the
//! TSX grammar, every other TypeScript extension the plain TypeScript grammar,
//! and JavaScript files the JavaScript grammar. The concrete syntax tree is
//! then folded onto the normalized node set through [`map_kind`].

use super::mapping::{DECLARATION_WRAPPERS, is_callable, is_declaration, map_kind};
use super::modules::{parse_export, parse_import, unquote};
use crate::ast::{AstNode, ExtractedSymbol, ParameterInfo, ParseDiagnostic, ParsedFile};
use crate::error::{ParseError, ParseResult};
use crate::parsing::language::dotted_extension;
use crate::parsing::parser::{NodeOptions, TreeBuilder, parameters_value};
use crate::parsing::scan::split_top_level;
use crate::parsing::{ExportInfo, ImportInfo, Language, LanguageParser};
use crate::types::NodeType;
use tracing::{debug, warn};
use tree_sitter::{Node, Parser};

/// Which grammar family a [`TypeScriptParser`] serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    JavaScript,
}

/// TypeScript and JavaScript language parser
///
/// Holds no tree-sitter state; a fresh `tree_sitter::Parser` is created for
/// every call so one instance can be shared between threads.
#[derive(Debug, Clone, Copy)]
pub struct TypeScriptParser {
    dialect: Dialect,
}

impl TypeScriptParser {
    pub fn typescript() -> Self {
        Self {
            dialect: Dialect::TypeScript,
        }
    }

    pub fn javascript() -> Self {
        Self {
            dialect: Dialect::JavaScript,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn grammar(&self, file_path: &str) -> tree_sitter::Language {
        match self.dialect {
            Dialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Dialect::TypeScript if dotted_extension(file_path).as_deref() == Some(".tsx") => {
                tree_sitter_typescript::LANGUAGE_TSX.into()
            }
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }

    fn new_parser(&self, file_path: &str) -> ParseResult<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.grammar(file_path))
            .map_err(|e| ParseError::ParserInit {
                language: self.language().name().to_string(),
                reason: e.to_string(),
            })?;
        Ok(parser)
    }
}

impl Default for TypeScriptParser {
    fn default() -> Self {
        Self::typescript()
    }
}

impl LanguageParser for TypeScriptParser {
    fn language(&self) -> Language {
        match self.dialect {
            Dialect::TypeScript => Language::TypeScript,
            Dialect::JavaScript => Language::JavaScript,
        }
    }

    fn parse(&self, source: &str, file_path: &str) -> ParseResult<ParsedFile> {
        let mut parser = self.new_parser(file_path)?;
        let mut converter = Converter::new(source);

        let Some(tree) = parser.parse(source, None) else {
            warn!("tree-sitter produced no tree for {file_path}");
            let root = converter.builder.program(NodeType::Program, Vec::new());
            let diagnostic = ParseDiagnostic::error("Unexpected syntax", root.location);
            return Ok(ParsedFile::new(
                file_path,
                self.language(),
                root,
                source,
                vec![diagnostic],
            ));
        };

        let ts_root = tree.root_node();
        let mut children = Vec::new();
        converter.convert_children(ts_root, &mut children);
        let mut errors = Vec::new();
        converter.collect_diagnostics(ts_root, &mut errors);
        let root = converter.builder.program(NodeType::Program, children);

        debug!(
            "Parsed {file_path} as {}: {} nodes, {} diagnostics",
            self.language(),
            converter.builder.node_count(),
            errors.len()
        );

        Ok(ParsedFile::new(
            file_path,
            self.language(),
            root,
            source,
            errors,
        ))
    }

    fn extract_imports(&self, root: &AstNode) -> Vec<ImportInfo> {
        self.find_nodes_by_type(root, NodeType::Import)
            .into_iter()
            .filter_map(parse_import)
            .collect()
    }

    fn extract_exports(&self, root: &AstNode) -> Vec<ExportInfo> {
        root.children
            .iter()
            .filter(|child| child.node_type == NodeType::Export)
            .flat_map(parse_export)
            .collect()
    }

    fn traverse_for_symbols(
        &self,
        node: &AstNode,
        parent_name: Option<&str>,
        symbols: &mut Vec<ExtractedSymbol>,
    ) {
        walk_symbols(node, parent_name, false, symbols);
    }
}

/// Pre-order symbol walk. Variables only count outside callables.
fn walk_symbols(
    node: &AstNode,
    parent_name: Option<&str>,
    in_callable: bool,
    symbols: &mut Vec<ExtractedSymbol>,
) {
    let is_symbol = match node.node_type {
        NodeType::Function
        | NodeType::ArrowFunction
        | NodeType::Method
        | NodeType::Class
        | NodeType::Interface
        | NodeType::TypeAlias
        | NodeType::Module
        | NodeType::Property => true,
        NodeType::Variable => !in_callable && !node.meta_bool("functionValue"),
        _ => false,
    };
    if is_symbol {
        if let Some(symbol) = ExtractedSymbol::from_node(node, parent_name) {
            symbols.push(symbol);
        }
    }

    let owner = match node.node_type {
        NodeType::Class | NodeType::Interface => node.name(),
        _ => parent_name,
    };
    let in_callable = in_callable || is_callable(node.node_type);
    for child in &node.children {
        walk_symbols(child, owner, in_callable, symbols);
    }
}

/// Folds one concrete syntax tree onto normalized nodes
struct Converter<'s> {
    source: &'s str,
    builder: TreeBuilder<'s>,
}

impl<'s> Converter<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            builder: TreeBuilder::new(source),
        }
    }

    fn text(&self, node: Node) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn field_text(&self, node: Node, field: &str) -> Option<&'s str> {
        node.child_by_field_name(field).map(|n| self.text(n))
    }

    fn convert_children(&mut self, node: Node, out: &mut Vec<AstNode>) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        let arrow_parameter = if node.kind() == "arrow_function" {
            node.child_by_field_name("parameter")
        } else {
            None
        };

        for child in children {
            let forced = (node.kind() == "formal_parameters" && child.kind() != "comment")
                || arrow_parameter == Some(child);
            self.convert(child, out, forced);
        }
    }

    fn convert(&mut self, node: Node, out: &mut Vec<AstNode>, force_parameter: bool) {
        if node.is_missing() {
            return;
        }

        let mapped = if force_parameter {
            Some(NodeType::Parameter)
        } else {
            map_kind(node.kind())
        };

        let Some(node_type) = mapped else {
            // Transparent: grandchildren attach to the nearest mapped ancestor
            self.convert_children(node, out);
            return;
        };

        let mut children = Vec::new();
        self.convert_children(node, &mut children);

        let mut options = NodeOptions::new().children(children);
        if let Some(name) = self.node_name(node, node_type) {
            options = options.name(name);
        }
        options = self.annotate(node, node_type, options);

        let ast = self
            .builder
            .span_node(node_type, node.start_byte(), node.end_byte(), options);
        out.push(ast);
    }

    fn node_name(&self, node: Node, node_type: NodeType) -> Option<String> {
        let name = match node_type {
            NodeType::Parameter => {
                let name = self.parameter_info(node).name;
                return Some(name).filter(|n| !n.is_empty());
            }
            NodeType::Import => self.field_text(node, "source").map(unquote),
            NodeType::CallExpression => self
                .field_text(node, "function")
                .or_else(|| self.field_text(node, "constructor")),
            NodeType::Decorator => {
                let text = self.text(node).trim_start_matches('@');
                text.split('(').next().map(str::trim)
            }
            NodeType::Module => self.field_text(node, "name").map(unquote),
            NodeType::Function | NodeType::ArrowFunction => self
                .field_text(node, "name")
                .or_else(|| self.declarator_name(node)),
            _ => self
                .field_text(node, "name")
                .or_else(|| self.field_text(node, "property")),
        };

        name.filter(|n| !n.is_empty()).map(str::to_string)
    }

    /// Name of the `variable_declarator` an anonymous function is assigned to
    fn declarator_name(&self, node: Node) -> Option<&'s str> {
        let parent = node.parent()?;
        if parent.kind() != "variable_declarator" {
            return None;
        }
        if parent.child_by_field_name("value") != Some(node) {
            return None;
        }
        self.field_text(parent, "name")
    }

    fn annotate(&self, node: Node, node_type: NodeType, mut options: NodeOptions) -> NodeOptions {
        if is_declaration(node_type) && !self.is_member(node) {
            let (exported, default) = self.export_flags(node);
            options = options.meta("exported", exported);
            if default {
                options = options.meta("default", true);
            }
        }

        if is_callable(node_type) {
            options = self.annotate_callable(node, options);
        }

        match node_type {
            NodeType::Class | NodeType::Interface => {
                options = self.annotate_type(node, node_type, options);
            }
            NodeType::TypeAlias => {
                if let Some(params) = self.field_text(node, "type_parameters") {
                    options = options.meta("typeParameters", params);
                }
            }
            NodeType::Property => {
                options = self.annotate_modifiers(node, options);
            }
            NodeType::Variable => {
                let value_kind = node.child_by_field_name("value").map(|v| v.kind());
                if matches!(
                    value_kind,
                    Some(
                        "arrow_function"
                            | "function_expression"
                            | "function"
                            | "generator_function"
                    )
                ) {
                    options = options.meta("functionValue", true);
                }
                if let Some(kind) = self.declaration_keyword(node) {
                    options = options.meta("declarationKind", kind);
                }
            }
            NodeType::Import => {
                if let Some(source) = self.field_text(node, "source") {
                    options = options.meta("source", unquote(source));
                }
                if has_token(node, "type") {
                    options = options.meta("typeOnly", true);
                }
            }
            NodeType::Export => {
                if has_token(node, "default") {
                    options = options.meta("default", true);
                }
                if let Some(source) = self.field_text(node, "source") {
                    options = options.meta("source", unquote(source));
                }
            }
            _ => {}
        }

        options
    }

    fn annotate_callable(&self, node: Node, mut options: NodeOptions) -> NodeOptions {
        let params_node = node
            .child_by_field_name("parameters")
            .or_else(|| node.child_by_field_name("parameter"));

        // `async` only counts when it precedes the parameter list
        let prefix_end = params_node.map_or(node.end_byte(), |p| p.start_byte());
        let is_async = {
            let mut cursor = node.walk();
            node.children(&mut cursor)
                .any(|c| !c.is_named() && c.kind() == "async" && c.end_byte() <= prefix_end)
        };
        options = options.meta("async", is_async);

        if node.kind().contains("generator") || has_token(node, "*") {
            options = options.meta("generator", true);
        }

        let parameters: Vec<ParameterInfo> = match params_node {
            Some(p) if p.kind() == "formal_parameters" => {
                let mut cursor = p.walk();
                p.named_children(&mut cursor)
                    .filter(|c| c.kind() != "comment")
                    .map(|c| self.parameter_info(c))
                    .collect()
            }
            Some(p) => vec![self.parameter_info(p)],
            None => Vec::new(),
        };
        options = options.meta("parameters", parameters_value(&parameters));

        if let Some(ret) = self.field_text(node, "return_type") {
            options = options.meta("returnType", strip_annotation(ret));
        }
        if let Some(params) = self.field_text(node, "type_parameters") {
            options = options.meta("typeParameters", params);
        }

        if node.kind().starts_with("method") || node.kind() == "abstract_method_signature" {
            options = self.annotate_modifiers(node, options);
            if self.field_text(node, "name") == Some("constructor") {
                options = options.meta("constructor", true);
            }
            for accessor in ["get", "set"] {
                if has_token(node, accessor) {
                    options = options.meta("accessor", accessor);
                }
            }
            let decorators = self.decorators(node);
            if !decorators.is_empty() {
                options = options.meta("decorators", decorators);
            }
        }

        options
    }

    /// Member modifiers: `static`, `abstract`, `readonly`, accessibility
    fn annotate_modifiers(&self, node: Node, mut options: NodeOptions) -> NodeOptions {
        if has_token(node, "static") {
            options = options.meta("static", true);
        }
        if has_token(node, "abstract") || node.kind() == "abstract_method_signature" {
            options = options.meta("abstract", true);
        }
        if has_token(node, "readonly") {
            options = options.meta("readonly", true);
        }

        let mut cursor = node.walk();
        let accessibility = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "accessibility_modifier")
            .map(|c| self.text(c).to_string());
        let visibility = match accessibility {
            Some(modifier) => modifier,
            None if self.field_text(node, "name").is_some_and(|n| n.starts_with('#')) => {
                "private".to_string()
            }
            None => "public".to_string(),
        };
        options.meta("visibility", visibility)
    }

    fn annotate_type(
        &self,
        node: Node,
        node_type: NodeType,
        mut options: NodeOptions,
    ) -> NodeOptions {
        if node.kind() == "enum_declaration" {
            options = options.meta("declarationKind", "enum");
        }
        if node.kind() == "abstract_class_declaration" {
            options = options.meta("abstract", true);
        }
        if let Some(params) = self.field_text(node, "type_parameters") {
            options = options.meta("typeParameters", params);
        }

        let mut bases = Vec::new();
        let mut implements = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "class_heritage" => {
                    let mut inner = child.walk();
                    let clauses: Vec<Node> = child.named_children(&mut inner).collect();
                    for clause in clauses {
                        match clause.kind() {
                            "extends_clause" => bases.extend(clause_types(self.text(clause))),
                            "implements_clause" => {
                                implements.extend(clause_types(self.text(clause)))
                            }
                            // JavaScript: the heritage holds the base expression directly
                            _ => bases.push(self.text(clause).trim().to_string()),
                        }
                    }
                }
                "extends_type_clause" if node_type == NodeType::Interface => {
                    bases.extend(clause_types(self.text(child)));
                }
                _ => {}
            }
        }
        if !bases.is_empty() {
            options = options.meta("bases", bases);
        }
        if !implements.is_empty() {
            options = options.meta("implements", implements);
        }

        let decorators = self.decorators(node);
        if !decorators.is_empty() {
            options = options.meta("decorators", decorators);
        }
        options
    }

    /// Decorators written on the node itself or as the preceding siblings
    fn decorators(&self, node: Node) -> Vec<String> {
        let mut decorators = Vec::new();

        let mut sibling = node.prev_named_sibling();
        while let Some(s) = sibling.filter(|s| s.kind() == "decorator") {
            decorators.push(self.text(s).to_string());
            sibling = s.prev_named_sibling();
        }
        decorators.reverse();

        let mut cursor = node.walk();
        decorators.extend(
            node.named_children(&mut cursor)
                .filter(|c| c.kind() == "decorator")
                .map(|c| self.text(c).to_string()),
        );
        decorators
    }

    fn parameter_info(&self, node: Node) -> ParameterInfo {
        match node.kind() {
            "required_parameter" | "optional_parameter" => {
                let mut info = node
                    .child_by_field_name("pattern")
                    .map(|p| self.parameter_info(p))
                    .unwrap_or_default();
                info.type_annotation = self.field_text(node, "type").map(strip_annotation);
                info.default_value = self.field_text(node, "value").map(str::to_string);
                info.optional = node.kind() == "optional_parameter" || info.default_value.is_some();
                info
            }
            "assignment_pattern" => {
                let mut info = node
                    .child_by_field_name("left")
                    .map(|p| self.parameter_info(p))
                    .unwrap_or_default();
                info.default_value = self.field_text(node, "right").map(str::to_string);
                info.optional = true;
                info
            }
            "rest_pattern" => {
                let mut info =
                    ParameterInfo::named(self.text(node).trim_start_matches("...").trim());
                info.variadic = true;
                info
            }
            _ => ParameterInfo::named(self.text(node).trim()),
        }
    }

    /// `const` / `let` / `var` for a declarator
    fn declaration_keyword(&self, node: Node) -> Option<&'static str> {
        let parent = node.parent()?;
        match parent.kind() {
            "variable_declaration" => Some("var"),
            "lexical_declaration" => {
                let text = self.text(parent).trim_start();
                if text.starts_with("const") {
                    Some("const")
                } else {
                    Some("let")
                }
            }
            _ => None,
        }
    }

    /// Class members get visibility instead of export flags
    fn is_member(&self, node: Node) -> bool {
        node.parent()
            .is_some_and(|p| matches!(p.kind(), "class_body" | "interface_body" | "object_type"))
    }

    /// `(exported, default)` from the node's own text or its `export_statement`
    fn export_flags(&self, node: Node) -> (bool, bool) {
        let own = self.text(node).trim_start();
        if own.starts_with("export") {
            return (true, own.starts_with("export default"));
        }

        let mut current = node.parent();
        while let Some(parent) = current {
            if DECLARATION_WRAPPERS.contains(&parent.kind()) {
                current = parent.parent();
                continue;
            }
            if parent.kind() == "export_statement" {
                let text = self.text(parent).trim_start();
                return (text.starts_with("export"), text.starts_with("export default"));
            }
            break;
        }
        (false, false)
    }

    fn collect_diagnostics(&self, node: Node, errors: &mut Vec<ParseDiagnostic>) {
        let location = self.builder.location(node.start_byte(), node.end_byte());
        if node.is_error() {
            errors.push(ParseDiagnostic::error("Unexpected syntax", location));
            return;
        }
        if node.is_missing() {
            errors.push(ParseDiagnostic::warning(
                format!("Missing `{}`", node.kind()),
                location,
            ));
            return;
        }
        if !node.has_error() {
            return;
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        for child in children {
            self.collect_diagnostics(child, errors);
        }
    }
}

/// True when `node` has an anonymous token child of the given kind
fn has_token(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == kind)
}

/// `: string` → `string`
fn strip_annotation(text: &str) -> String {
    text.trim().trim_start_matches(':').trim().to_string()
}

/// `extends A, B<C, D>` → `["A", "B<C, D>"]`
fn clause_types(text: &str) -> Vec<String> {
    let text = text.trim();
    let list = text
        .strip_prefix("extends")
        .or_else(|| text.strip_prefix("implements"))
        .unwrap_or(text);
    split_top_level(list, b',', true)
        .into_iter()
        .map(|(_, piece)| piece.trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}
