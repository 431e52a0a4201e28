//! Python parser implementation
//!
//! Heuristic: no grammar is involved. Source is split into logical lines
//! first (bracket and backslash continuations, triple-quoted strings), so a
//! multi-line signature is matched as one header and nothing inside a string
//! can close a block. Headers are recognized with regular expressions and
//! each block extends over the following lines indented deeper than its
//! header.

use crate::ast::{AstNode, ExtractedSymbol, ParameterInfo, ParsedFile};
use crate::error::ParseResult;
use crate::parsing::parser::{NodeOptions, TreeBuilder, collect_symbols, parameters_value};
use crate::parsing::scan::{
    LogicalLine, find_matching, indented_block_end, logical_lines, mask_python, split_top_level,
};
use crate::parsing::{ExportInfo, ExportKind, ImportInfo, ImportedName, Language, LanguageParser};
use crate::types::{NodeType, Visibility};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::{debug, trace};

static CLASS_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^class\s+([A-Za-z_]\w*)").expect("valid class regex"));

static DEF_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(async\s+)?def\s+([A-Za-z_]\w*)").expect("valid def regex")
});

static IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^import\s+(.+)$").expect("valid import regex"));

static FROM_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^from\s+([.\w]+)\s+import\s+(.+)$").expect("valid from-import regex")
});

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^([A-Za-z_]\w*)\s*(?::\s*([^=]+?))?\s*=\s*([^=].*)$")
        .expect("valid assignment regex")
});

static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^([A-Za-z_]\w*)\s*:\s*([^=]+)$").expect("valid annotation regex")
});

static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("valid string literal regex"));

/// Words that can start a line followed by `:` without declaring anything
const KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "try", "except", "finally", "with", "match", "case",
    "lambda", "return", "pass", "raise", "del", "global", "nonlocal", "assert", "yield", "print",
];

/// Python language parser
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Self {
        Self
    }
}

/// Where a block sits; decides what its statements turn into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Module,
    Class,
    Function,
}

/// Per-parse state
struct Context<'s> {
    source: &'s str,
    masked: String,
    lines: Vec<LogicalLine>,
    builder: TreeBuilder<'s>,
    /// Names listed in a module-level `__all__`, when there is one
    public_api: Option<Vec<String>>,
}

impl<'s> Context<'s> {
    fn new(source: &'s str) -> Self {
        let lines = logical_lines(source);
        let masked = mask_python(source);
        let public_api = find_public_api(source, &masked, &lines);
        Self {
            source,
            masked,
            lines,
            builder: TreeBuilder::new(source),
            public_api,
        }
    }

    /// Masked content of a logical line
    fn masked_content(&self, line: usize) -> &str {
        let line = &self.lines[line];
        &self.masked[line.content_start..line.end]
    }

    /// Content of a logical line without its trailing comment
    fn statement_span(&self, line: usize) -> (usize, usize) {
        let start = self.lines[line].content_start;
        (start, start + self.masked_content(line).trim_end().len())
    }

    fn is_exported(&self, name: &str) -> bool {
        match &self.public_api {
            Some(names) => names.iter().any(|n| n == name),
            None => python_visibility(name) == Visibility::Public,
        }
    }
}

impl LanguageParser for PythonParser {
    fn language(&self) -> Language {
        Language::Python
    }

    fn parse(&self, source: &str, file_path: &str) -> ParseResult<ParsedFile> {
        let mut cx = Context::new(source);
        let line_count = cx.lines.len();
        let children = parse_block(&mut cx, 0..line_count, Scope::Module);
        let root = cx.builder.program(NodeType::Program, children);

        debug!(
            "Parsed {file_path} as python: {} logical lines, {} nodes",
            cx.lines.len(),
            cx.builder.node_count()
        );

        Ok(ParsedFile::new(
            file_path,
            Language::Python,
            root,
            source,
            Vec::new(),
        ))
    }

    fn extract_imports(&self, root: &AstNode) -> Vec<ImportInfo> {
        self.find_nodes_by_type(root, NodeType::Import)
            .into_iter()
            .flat_map(parse_import)
            .collect()
    }

    fn extract_exports(&self, root: &AstNode) -> Vec<ExportInfo> {
        let public_api = root.children.iter().find(|child| {
            child.node_type == NodeType::Variable && child.name() == Some("__all__")
        });

        if let Some(node) = public_api {
            let text = node.text.as_deref().unwrap_or_default();
            let value = text.split_once('=').map_or("", |(_, value)| value);
            return STRING_LITERAL
                .captures_iter(value)
                .map(|caps| ExportInfo::new(&caps[1], ExportKind::Named, node.location))
                .collect();
        }

        root.children
            .iter()
            .filter(|child| {
                matches!(
                    child.node_type,
                    NodeType::Function | NodeType::Class | NodeType::Variable
                ) && child.meta_bool("exported")
            })
            .filter_map(|child| {
                let name = child.name()?;
                Some(ExportInfo::new(name, ExportKind::Declaration, child.location))
            })
            .collect()
    }

    fn traverse_for_symbols(
        &self,
        node: &AstNode,
        parent_name: Option<&str>,
        symbols: &mut Vec<ExtractedSymbol>,
    ) {
        collect_symbols(node, parent_name, symbols, &|n: &AstNode| {
            matches!(
                n.node_type,
                NodeType::Function
                    | NodeType::Method
                    | NodeType::Class
                    | NodeType::Variable
                    | NodeType::Property
            )
        });
    }
}

/// Leading underscore is private, dunder names are public
pub fn python_visibility(name: &str) -> Visibility {
    let dunder = name.len() > 4 && name.starts_with("__") && name.ends_with("__");
    if name.starts_with('_') && !dunder {
        Visibility::Private
    } else {
        Visibility::Public
    }
}

/// Parses the statements of `range`, all sharing the indentation of its first
/// code line. Deeper lines belong to statements this parser does not model.
fn parse_block(cx: &mut Context, range: Range<usize>, scope: Scope) -> Vec<AstNode> {
    let Some(base) = cx.lines[range.clone()]
        .iter()
        .find(|line| line.is_code())
        .map(|line| line.indent)
    else {
        return Vec::new();
    };

    let mut nodes = Vec::new();
    let mut decorators: Vec<usize> = Vec::new();
    let mut i = range.start;

    while i < range.end {
        let line = &cx.lines[i];
        if !line.is_code() {
            i += 1;
            continue;
        }

        if line.indent != base {
            decorators.clear();
            // Conditional imports (`try: import x`) still count at module level
            if scope == Scope::Module {
                if let Some(node) = import_node(cx, i) {
                    nodes.push(node);
                }
            }
            i += 1;
            continue;
        }

        if cx.masked_content(i).starts_with('@') {
            decorators.push(i);
            i += 1;
            continue;
        }

        if let Some((node, last)) = definition(cx, i, &decorators, scope) {
            nodes.push(node);
            decorators.clear();
            i = last + 1;
            continue;
        }
        decorators.clear();

        let node = match scope {
            Scope::Module => import_node(cx, i).or_else(|| assignment_node(cx, i, scope)),
            Scope::Class => assignment_node(cx, i, scope),
            Scope::Function => None,
        };
        nodes.extend(node);
        i += 1;
    }

    nodes
}

/// `class` or `def` headed by line `header`, plus the index of its last line
fn definition(
    cx: &mut Context,
    header: usize,
    decorators: &[usize],
    scope: Scope,
) -> Option<(AstNode, usize)> {
    let source = cx.source;
    let content = cx.masked_content(header).to_string();
    let is_class = CLASS_HEADER.is_match(&content);
    if !is_class && !DEF_HEADER.is_match(&content) {
        return None;
    }

    let last = indented_block_end(&cx.lines, header);
    let start = decorators
        .first()
        .map_or(cx.lines[header].content_start, |&d| cx.lines[d].content_start);
    let end = cx.lines[last].end;

    let mut children: Vec<AstNode> = decorators
        .iter()
        .map(|&d| {
            let (s, e) = cx.statement_span(d);
            let name = decorator_name(&source[s..e]).to_string();
            cx.builder
                .span_node(NodeType::Decorator, s, e, NodeOptions::new().name(name))
        })
        .collect();
    let decorator_texts: Vec<String> = children
        .iter()
        .filter_map(|d| d.text.clone())
        .collect();

    let body_scope = if is_class {
        Scope::Class
    } else {
        Scope::Function
    };
    children.extend(parse_block(cx, header + 1..last + 1, body_scope));

    let header_start = cx.lines[header].content_start;
    let header_text = &source[header_start..cx.lines[header].end];
    let mut options = if is_class {
        class_options(&content, header_text, &decorator_texts)?
    } else {
        def_options(&content, header_text, &decorator_texts, scope)?
    };

    let name = options.name.clone().unwrap_or_default();
    let visibility = python_visibility(&name);
    options = options.meta("visibility", visibility.as_str());
    if scope == Scope::Module {
        options = options.meta("exported", cx.is_exported(&name));
    }
    if !decorator_texts.is_empty() {
        options = options.meta("decorators", decorator_texts);
    }

    let node_type = match (is_class, scope) {
        (true, _) => NodeType::Class,
        (false, Scope::Class) => NodeType::Method,
        (false, _) => NodeType::Function,
    };
    trace!("python {node_type} `{name}` at line {}", header + 1);

    let node = cx
        .builder
        .span_node(node_type, start, end, options.children(children));
    Some((node, last))
}

fn class_options(masked: &str, header: &str, decorators: &[String]) -> Option<NodeOptions> {
    let caps = CLASS_HEADER.captures(masked)?;
    let name = caps.get(1)?.as_str();
    let mut options = NodeOptions::new().name(name);

    let mut pos = caps.get(0)?.end();
    pos = skip_spaces(masked, pos);
    if masked[pos..].starts_with('[') {
        let close = find_matching(masked, pos, b'[', b']')?;
        options = options.meta("typeParameters", &header[pos..=close]);
        pos = skip_spaces(masked, close + 1);
    }

    let mut bases = Vec::new();
    let mut abstract_class = false;
    if masked[pos..].starts_with('(') {
        let close = find_matching(masked, pos, b'(', b')')?;
        for (offset, piece) in split_top_level(&masked[pos + 1..close], b',', false) {
            let start = pos + 1 + offset;
            let arg = &header[start..start + piece.len()];
            match arg.split_once('=') {
                Some((key, value)) if key.trim() == "metaclass" => {
                    abstract_class |= value.trim().ends_with("ABCMeta");
                }
                Some(_) => {}
                None => {
                    abstract_class |= arg == "ABC" || arg.ends_with(".ABC");
                    bases.push(arg.to_string());
                }
            }
        }
    }

    if !bases.is_empty() {
        options = options.meta("bases", bases);
    }
    if abstract_class || decorators.iter().any(|d| decorator_name(d).ends_with("abstractmethod")) {
        options = options.meta("abstract", true);
    }
    Some(options)
}

fn def_options(
    masked: &str,
    header: &str,
    decorators: &[String],
    scope: Scope,
) -> Option<NodeOptions> {
    let caps = DEF_HEADER.captures(masked)?;
    let name = caps.get(2)?.as_str();
    let mut options = NodeOptions::new()
        .name(name)
        .meta("async", caps.get(1).is_some());

    let mut pos = skip_spaces(masked, caps.get(0)?.end());
    if masked[pos..].starts_with('[') {
        let close = find_matching(masked, pos, b'[', b']')?;
        options = options.meta("typeParameters", &header[pos..=close]);
        pos = skip_spaces(masked, close + 1);
    }
    if !masked[pos..].starts_with('(') {
        return None;
    }
    let close = find_matching(masked, pos, b'(', b')')?;
    let parameters = parse_parameters(&header[pos + 1..close], &masked[pos + 1..close]);
    options = options.meta("parameters", parameters_value(&parameters));

    // `-> T:` up to the colon that opens the body
    let rest = masked[close + 1..].trim_start();
    if let Some(annotation) = rest.strip_prefix("->") {
        let offset = masked.len() - annotation.len();
        let colon = annotation.find(':').unwrap_or(annotation.len());
        let return_type = header[offset..offset + colon].trim();
        if !return_type.is_empty() {
            options = options.meta("returnType", return_type);
        }
    }

    let names: Vec<&str> = decorators.iter().map(|d| decorator_name(d)).collect();
    if names
        .iter()
        .any(|n| *n == "staticmethod" || *n == "classmethod")
    {
        options = options.meta("static", true);
    }
    if names.iter().any(|n| n.ends_with("abstractmethod")) {
        options = options.meta("abstract", true);
    }
    if scope == Scope::Class && name == "__init__" {
        options = options.meta("constructor", true);
    }
    Some(options)
}

/// `@functools.lru_cache(maxsize=None)` → `functools.lru_cache`
fn decorator_name(text: &str) -> &str {
    let text = text.trim().trim_start_matches('@');
    text.split('(').next().unwrap_or(text).trim()
}

fn skip_spaces(text: &str, pos: usize) -> usize {
    pos + (text[pos..].len() - text[pos..].trim_start().len())
}

/// Splits a parameter list; `masked` is the same text with strings blanked.
///
/// `self`/`cls` and the bare `*` / `/` markers are dropped.
pub fn parse_parameters(text: &str, masked: &str) -> Vec<ParameterInfo> {
    split_top_level(masked, b',', false)
        .into_iter()
        .filter_map(|(offset, piece)| {
            let raw = &text[offset..offset + piece.len()];
            if raw == "*" || raw == "/" {
                return None;
            }

            let (stars, raw, piece) = if let Some(rest) = raw.strip_prefix("**") {
                (2, rest, &piece[2..])
            } else if let Some(rest) = raw.strip_prefix('*') {
                (1, rest, &piece[1..])
            } else {
                (0, raw, piece)
            };

            let (declaration, default_value) = match piece.find('=') {
                Some(eq) => (&raw[..eq], Some(raw[eq + 1..].trim().to_string())),
                None => (raw, None),
            };
            let (name, type_annotation) = match declaration.split_once(':') {
                Some((name, ty)) => (name.trim(), Some(ty.trim().to_string())),
                None => (declaration.trim(), None),
            };
            if name == "self" || name == "cls" || name.is_empty() {
                return None;
            }

            Some(ParameterInfo {
                name: name.to_string(),
                type_annotation,
                optional: default_value.is_some() || stars > 0,
                default_value,
                variadic: stars > 0,
            })
        })
        .collect()
}

fn import_node(cx: &mut Context, line: usize) -> Option<AstNode> {
    let masked = cx.masked_content(line);
    let source = if let Some(caps) = FROM_IMPORT.captures(masked) {
        caps.get(1)?.as_str().to_string()
    } else {
        let caps = IMPORT.captures(masked)?;
        let first = caps.get(1)?.as_str().split(',').next()?;
        first.split_whitespace().next()?.to_string()
    };

    let (start, end) = cx.statement_span(line);
    let options = NodeOptions::new().name(&source).meta("source", source);
    Some(cx.builder.span_node(NodeType::Import, start, end, options))
}

fn assignment_node(cx: &mut Context, line: usize, scope: Scope) -> Option<AstNode> {
    let (name, annotation) = {
        let masked = cx.masked_content(line);
        let caps = ASSIGNMENT
            .captures(masked)
            .or_else(|| ANNOTATION.captures(masked))?;
        (caps.get(1)?.as_str().to_string(), caps.get(2).map(|m| m.range()))
    };
    if KEYWORDS.contains(&name.as_str()) {
        return None;
    }

    let (start, end) = cx.statement_span(line);
    let annotation =
        annotation.map(|r| cx.source[start + r.start..start + r.end].trim().to_string());

    let mut options = NodeOptions::new()
        .name(&name)
        .meta("visibility", python_visibility(&name).as_str());
    if let Some(annotation) = annotation {
        options = options.meta("typeAnnotation", annotation);
    }

    let node_type = match scope {
        Scope::Class => NodeType::Property,
        _ => {
            options = options.meta("exported", cx.is_exported(&name));
            NodeType::Variable
        }
    };
    Some(cx.builder.span_node(node_type, start, end, options))
}

/// Names listed by a module-level `__all__ = [...]`
fn find_public_api(source: &str, masked: &str, lines: &[LogicalLine]) -> Option<Vec<String>> {
    let line = lines.iter().find(|line| {
        line.is_code()
            && line.indent == 0
            && masked[line.content_start..line.end].starts_with("__all__")
            && ASSIGNMENT.is_match(&masked[line.content_start..line.end])
    })?;

    let text = &source[line.content_start..line.end];
    let value = text.split_once('=').map_or("", |(_, value)| value);
    Some(
        STRING_LITERAL
            .captures_iter(value)
            .map(|caps| caps[1].to_string())
            .collect(),
    )
}

/// One import node can bind several modules (`import os, sys`)
fn parse_import(node: &AstNode) -> Vec<ImportInfo> {
    let Some(text) = node.text.as_deref() else {
        return Vec::new();
    };
    let masked = mask_python(text);
    let location = node.location;

    if let Some(caps) = FROM_IMPORT.captures(&masked) {
        let mut import = ImportInfo::new(&caps[1], location);
        let list = caps[2].trim().trim_start_matches('(').trim_end_matches(')');
        for item in list.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            if item == "*" {
                import.is_wildcard = true;
                continue;
            }
            let mut parts = item.split_whitespace();
            let Some(name) = parts.next() else { continue };
            let alias = match (parts.next(), parts.next()) {
                (Some("as"), Some(alias)) => Some(alias.to_string()),
                _ => None,
            };
            import.names.push(ImportedName::new(name, alias));
        }
        return vec![import];
    }

    let Some(caps) = IMPORT.captures(&masked) else {
        return Vec::new();
    };
    caps[1]
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| {
            let mut parts = item.split_whitespace();
            let module = parts.next()?;
            let binding = match (parts.next(), parts.next()) {
                (Some("as"), Some(alias)) => alias.to_string(),
                _ => module.split('.').next().unwrap_or(module).to_string(),
            };
            let mut import = ImportInfo::new(module, location);
            import.namespace_import = Some(binding);
            Some(import)
        })
        .collect()
}
