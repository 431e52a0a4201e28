//! Language parser trait
//!
//! This module defines the common interface that all language parsers
//! implement, plus the shared scaffolding they build trees with:
//! [`TreeBuilder`] for node allocation and location bookkeeping, and generic
//! tree lookups used by the trait's default methods.

use crate::ast::{AstNode, ExtractedSymbol, Metadata, ParseDiagnostic, ParsedFile};
use crate::error::ParseResult;
use crate::parsing::language::dotted_extension;
use crate::parsing::scan::LineIndex;
use crate::parsing::{ExportInfo, ImportInfo, Language};
use crate::types::{Location, NodeId, NodeIdGenerator, NodeType};
use serde_json::Value;

/// Common interface for all language parsers
///
/// Implementations hold no per-call state: every method takes `&self`, so a
/// single parser instance can serve concurrent callers.
pub trait LanguageParser: Send + Sync {
    /// Get the language this parser handles
    fn language(&self) -> Language;

    /// Static extension list (lowercase, leading dot)
    fn extensions(&self) -> &'static [&'static str] {
        self.language().extensions()
    }

    /// Parse source text into a normalized tree
    fn parse(&self, source: &str, file_path: &str) -> ParseResult<ParsedFile>;

    /// Source text for a node.
    ///
    /// Nodes from an unmodified parse carry their verbatim text; synthetic
    /// nodes fall back to their children's text joined by newlines.
    fn serialize(&self, node: &AstNode) -> String {
        serialize_node(node)
    }

    /// True iff the lowercased extension of `file_path` is in [`Self::extensions`]
    fn supports(&self, file_path: &str) -> bool {
        dotted_extension(file_path).is_some_and(|ext| self.extensions().contains(&ext.as_str()))
    }

    /// Find import statements in a parsed tree
    fn extract_imports(&self, root: &AstNode) -> Vec<ImportInfo>;

    /// Find exported names in a parsed tree
    fn extract_exports(&self, root: &AstNode) -> Vec<ExportInfo>;

    /// Language hook deciding which nodes are symbols.
    ///
    /// Called on the root by [`Self::extract_symbols`]; implementations
    /// recurse themselves and pass the enclosing type name down to members.
    fn traverse_for_symbols(
        &self,
        node: &AstNode,
        parent_name: Option<&str>,
        symbols: &mut Vec<ExtractedSymbol>,
    );

    /// Flat list of declarations in pre-order
    fn extract_symbols(&self, root: &AstNode) -> Vec<ExtractedSymbol> {
        let mut symbols = Vec::new();
        self.traverse_for_symbols(root, None, &mut symbols);
        symbols
    }

    fn find_node_by_id<'a>(&self, root: &'a AstNode, id: NodeId) -> Option<&'a AstNode> {
        find_node_by_id(root, id)
    }

    fn find_nodes_by_type<'a>(&self, root: &'a AstNode, node_type: NodeType) -> Vec<&'a AstNode> {
        find_nodes_by_type(root, node_type)
    }

    /// First pre-order node whose `name` matches. Shadowed names resolve to
    /// the outermost (earliest) declaration.
    fn find_symbol_by_name<'a>(&self, root: &'a AstNode, name: &str) -> Option<&'a AstNode> {
        find_symbol_by_name(root, name)
    }
}

/// Optional parts of a node handed to [`TreeBuilder::create_node`].
#[derive(Debug, Default)]
pub struct NodeOptions {
    pub name: Option<String>,
    pub text: Option<String>,
    pub metadata: Metadata,
    pub children: Vec<AstNode>,
}

impl NodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn children(mut self, children: Vec<AstNode>) -> Self {
        self.children = children;
        self
    }
}

/// Per-parse node factory: owns the id generator and the line index.
pub struct TreeBuilder<'s> {
    source: &'s str,
    lines: LineIndex,
    ids: NodeIdGenerator,
    diagnostics: Vec<ParseDiagnostic>,
}

impl<'s> TreeBuilder<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            ids: NodeIdGenerator::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    pub fn location(&self, start: usize, end: usize) -> Location {
        self.lines.location(start, end)
    }

    /// Allocates a node with a fresh id.
    pub fn create_node(
        &mut self,
        node_type: NodeType,
        location: Location,
        options: NodeOptions,
    ) -> AstNode {
        let mut node = AstNode::new(self.ids.next_id(), node_type, location);
        node.name = options.name;
        node.text = options.text;
        node.metadata = options.metadata;
        for child in options.children {
            node.push_child(child);
        }
        node
    }

    /// Node covering `source[start..end]`, with that slice as its text.
    pub fn span_node(
        &mut self,
        node_type: NodeType,
        start: usize,
        end: usize,
        options: NodeOptions,
    ) -> AstNode {
        let location = self.location(start, end);
        let options = options.text(&self.source[start..end]);
        self.create_node(node_type, location, options)
    }

    /// Root node spanning the whole source.
    pub fn program(&mut self, node_type: NodeType, children: Vec<AstNode>) -> AstNode {
        self.span_node(
            node_type,
            0,
            self.source.len(),
            NodeOptions::new().children(children),
        )
    }

    pub fn node_count(&self) -> u32 {
        self.ids.current_count()
    }

    /// Records a recoverable problem over `source[start..end]`.
    pub fn warn(&mut self, message: impl Into<String>, start: usize, end: usize) {
        let location = self.location(start, end);
        self.diagnostics.push(ParseDiagnostic::warning(message, location));
    }

    pub fn take_diagnostics(&mut self) -> Vec<ParseDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Text of `node`, rebuilt from children when it has none of its own.
pub fn serialize_node(node: &AstNode) -> String {
    match &node.text {
        Some(text) => text.clone(),
        None => node
            .children
            .iter()
            .map(serialize_node)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn find_node_by_id(root: &AstNode, id: NodeId) -> Option<&AstNode> {
    if root.id == id {
        return Some(root);
    }
    root.children
        .iter()
        .find_map(|child| find_node_by_id(child, id))
}

pub fn find_nodes_by_type(root: &AstNode, node_type: NodeType) -> Vec<&AstNode> {
    fn walk<'a>(node: &'a AstNode, node_type: NodeType, out: &mut Vec<&'a AstNode>) {
        if node.node_type == node_type {
            out.push(node);
        }
        for child in &node.children {
            walk(child, node_type, out);
        }
    }

    let mut out = Vec::new();
    walk(root, node_type, &mut out);
    out
}

pub fn find_symbol_by_name<'a>(root: &'a AstNode, name: &str) -> Option<&'a AstNode> {
    if root.name.as_deref() == Some(name) {
        return Some(root);
    }
    root.children
        .iter()
        .find_map(|child| find_symbol_by_name(child, name))
}

/// Shared pre-order symbol walk.
///
/// `is_symbol` picks the node types that count for a language. Members get
/// the name of the nearest enclosing class, struct or interface.
pub fn collect_symbols(
    node: &AstNode,
    parent_name: Option<&str>,
    symbols: &mut Vec<ExtractedSymbol>,
    is_symbol: &dyn Fn(&AstNode) -> bool,
) {
    if is_symbol(node) {
        if let Some(symbol) = ExtractedSymbol::from_node(node, parent_name) {
            symbols.push(symbol);
        }
    }

    let owner = match node.node_type {
        NodeType::Class | NodeType::Struct | NodeType::Interface => node.name(),
        _ => parent_name,
    };
    for child in &node.children {
        collect_symbols(child, owner, symbols, is_symbol);
    }
}

/// `ParameterInfo` list as node metadata.
pub fn parameters_value(parameters: &[crate::ast::ParameterInfo]) -> Value {
    serde_json::to_value(parameters).unwrap_or(Value::Array(Vec::new()))
}
