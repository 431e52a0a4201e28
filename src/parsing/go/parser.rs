//! Go parser implementation
//!
//! Heuristic: top-level declarations are found at line starts in masked
//! text (`package`, `import`, `func`, `type`, `var`, `const`), bodies by
//! brace matching, grouped `( ... )` declarations by paren matching.
//! Exported-ness follows Go's rule: an uppercase first rune.

use crate::ast::{AstNode, ExtractedSymbol, ParameterInfo, ParsedFile};
use crate::error::ParseResult;
use crate::parsing::parser::{NodeOptions, TreeBuilder, parameters_value};
use crate::parsing::scan::{
    MaskedSource, block_end, find_matching, find_matching_before, first_level_blocks, is_nested,
    mask_c_like, paren_end, split_top_level,
};
use crate::parsing::{ExportInfo, ExportKind, ImportInfo, Language, LanguageParser};
use crate::types::NodeType;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(package|import|func|type|var|const)\b")
        .expect("valid declaration regex")
});

static PACKAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^package\s+([A-Za-z_]\w*)").expect("valid package regex"));

static IMPORT_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:import\s+)?(?:([A-Za-z_]\w*|\.)\s+)?"([^"]*)""#)
        .expect("valid import spec regex")
});

static FUNC_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^func\s*(?:\(([^()]*)\)\s*)?([A-Za-z_]\w*)\s*(\[[^\]]*\])?\s*\(")
        .expect("valid func header regex")
});

static TYPE_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_]\w*)\s*(\[[^\]]*\])?\s*(=)?\s*").expect("valid type spec regex")
});

static NAME_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)").expect("valid name list regex")
});

static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^([A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)\s+([^\s`].*)$")
        .expect("valid field regex")
});

static INTERFACE_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_]\w*)\s*\(").expect("valid interface method regex"));

/// Go language parser
#[derive(Debug, Clone, Copy, Default)]
pub struct GoParser;

impl GoParser {
    pub fn new() -> Self {
        Self
    }
}

/// Go's export rule: the first rune is an uppercase letter
pub fn is_exported_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

impl LanguageParser for GoParser {
    fn language(&self) -> Language {
        Language::Go
    }

    fn parse(&self, source: &str, file_path: &str) -> ParseResult<ParsedFile> {
        let masked = mask_c_like(source);
        let text = MaskedSource::new(source, &masked);
        let mut builder = TreeBuilder::new(source);

        let children = top_level(text, &mut builder);
        let root = builder.program(NodeType::Program, children);
        let warnings = builder.take_diagnostics();

        debug!(
            "Parsed {file_path} as go: {} nodes, {} warnings",
            builder.node_count(),
            warnings.len()
        );

        Ok(ParsedFile::new(
            file_path,
            Language::Go,
            root,
            source,
            warnings,
        ))
    }

    fn extract_imports(&self, root: &AstNode) -> Vec<ImportInfo> {
        root.children
            .iter()
            .filter(|child| child.node_type == NodeType::Import)
            .filter_map(|node| {
                let text = node.text.as_deref()?.trim();
                let caps = IMPORT_SPEC.captures(text)?;
                let path = caps.get(2)?.as_str();

                let mut import = ImportInfo::new(path, node.location);
                match caps.get(1).map(|m| m.as_str()) {
                    Some(".") => import.is_wildcard = true,
                    Some("_") => {}
                    Some(alias) => import.namespace_import = Some(alias.to_string()),
                    None => {
                        let last = path.rsplit('/').next().unwrap_or(path);
                        import.namespace_import = Some(last.to_string());
                    }
                }
                Some(import)
            })
            .collect()
    }

    fn extract_exports(&self, root: &AstNode) -> Vec<ExportInfo> {
        root.children
            .iter()
            .filter(|child| {
                matches!(
                    child.node_type,
                    NodeType::Function
                        | NodeType::Struct
                        | NodeType::Interface
                        | NodeType::TypeAlias
                        | NodeType::Variable
                ) && child.meta_bool("exported")
            })
            .filter_map(|child| {
                Some(ExportInfo::new(
                    child.name()?,
                    ExportKind::Declaration,
                    child.location,
                ))
            })
            .collect()
    }

    fn traverse_for_symbols(
        &self,
        node: &AstNode,
        parent_name: Option<&str>,
        symbols: &mut Vec<ExtractedSymbol>,
    ) {
        let is_symbol = matches!(
            node.node_type,
            NodeType::Function
                | NodeType::Method
                | NodeType::Struct
                | NodeType::Interface
                | NodeType::TypeAlias
                | NodeType::Variable
                | NodeType::Property
        );
        if is_symbol {
            // Methods belong to their receiver's type
            let owner = node.meta_str("receiverType").or(parent_name);
            if let Some(symbol) = ExtractedSymbol::from_node(node, owner) {
                symbols.push(symbol);
            }
        }

        let owner = match node.node_type {
            NodeType::Struct | NodeType::Interface => node.name(),
            _ => parent_name,
        };
        for child in &node.children {
            self.traverse_for_symbols(child, owner, symbols);
        }
    }
}

fn top_level(text: MaskedSource, builder: &mut TreeBuilder) -> Vec<AstNode> {
    let blocks = first_level_blocks(text.masked, 0..text.len());
    let mut nodes = Vec::new();
    let mut covered = 0;

    for caps in DECLARATION.captures_iter(text.masked) {
        let Some(keyword) = caps.get(1) else { continue };
        let start = keyword.start();
        if start < covered || is_nested(&blocks, start) {
            continue;
        }

        let end = match keyword.as_str() {
            "package" => package(text, builder, start, &mut nodes),
            "import" => grouped(text, builder, start, "import", &mut nodes, import_spec),
            "func" => func(text, builder, start, &mut nodes),
            "type" => grouped(text, builder, start, "type", &mut nodes, type_spec),
            "var" | "const" => {
                grouped(text, builder, start, keyword.as_str(), &mut nodes, value_spec)
            }
            _ => None,
        };
        if let Some(end) = end {
            covered = end;
        }
    }

    nodes
}

/// Exclusive end of the Go statement starting at `from`: the first newline
/// outside brackets, or `limit`. Trailing whitespace is excluded.
fn line_end(text: MaskedSource, from: usize, limit: usize) -> usize {
    let bytes = text.masked.as_bytes();
    let mut i = from;
    while i < limit {
        match bytes[i] {
            b'(' => i = paren_end(text.masked, i),
            b'[' => i = find_matching(text.masked, i, b'[', b']').map_or(limit, |c| c + 1),
            b'{' => i = block_end(text.masked, i),
            b'\n' => break,
            _ => i += 1,
        }
    }
    let i = i.min(limit);
    from + text.masked[from..i].trim_end().len()
}

fn package(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    start: usize,
    nodes: &mut Vec<AstNode>,
) -> Option<usize> {
    let caps = PACKAGE.captures(&text.masked[start..])?;
    let end = start + caps.get(0)?.end();
    let name = caps.get(1)?.as_str();
    nodes.push(builder.span_node(NodeType::Package, start, end, NodeOptions::new().name(name)));
    Some(end)
}

/// A spec parser: given the spec's start and the limit of its enclosing
/// group, pushes nodes and returns the spec's end.
type SpecParser = fn(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    span_start: usize,
    spec_start: usize,
    limit: usize,
    keyword: &str,
    nodes: &mut Vec<AstNode>,
) -> Option<usize>;

/// `keyword spec` or `keyword ( spec... )`
fn grouped(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    start: usize,
    keyword: &str,
    nodes: &mut Vec<AstNode>,
    spec: SpecParser,
) -> Option<usize> {
    let after = text.skip_ws(start + keyword.len());
    if text.masked.as_bytes().get(after) != Some(&b'(') {
        let limit = text.len();
        return spec(text, builder, start, after, limit, keyword, nodes);
    }

    let close = match find_matching(text.masked, after, b'(', b')') {
        Some(close) => close,
        None => {
            builder.warn(format!("unclosed `{keyword}` group"), after, text.len());
            text.len()
        }
    };
    let mut pos = text.skip_ws(after + 1);
    while pos < close {
        let end = spec(text, builder, pos, pos, close, keyword, nodes)
            .unwrap_or_else(|| line_end(text, pos, close));
        pos = text.skip_ws(end.max(pos + 1));
    }
    Some((close + 1).min(text.len()))
}

fn import_spec(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    span_start: usize,
    spec_start: usize,
    limit: usize,
    _keyword: &str,
    nodes: &mut Vec<AstNode>,
) -> Option<usize> {
    let end = line_end(text, spec_start, limit);
    // Paths live in string literals, which the masked copy blanks out
    let caps = IMPORT_SPEC.captures(text.text(spec_start..end))?;
    let path = caps.get(2)?.as_str();
    let options = NodeOptions::new().name(path).meta("source", path);
    nodes.push(builder.span_node(NodeType::Import, span_start, end, options));
    Some(end)
}

fn func(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    start: usize,
    nodes: &mut Vec<AstNode>,
) -> Option<usize> {
    let caps = FUNC_HEADER.captures(&text.masked[start..])?;
    let name = caps.get(2)?.as_str().to_string();
    let open_paren = start + caps.get(0)?.end() - 1;
    let Some(close_paren) = find_matching(text.masked, open_paren, b'(', b')') else {
        builder.warn(format!("unclosed parameter list of `{name}`"), open_paren, text.len());
        return None;
    };

    let mut options = NodeOptions::new().name(&name);
    let node_type = match caps.get(1) {
        Some(receiver) => {
            let receiver = text.text(start + receiver.start()..start + receiver.end()).trim();
            let (receiver_name, receiver_type) = match receiver.rsplit_once(char::is_whitespace) {
                Some((name, ty)) => (Some(name.trim()), ty.trim()),
                None => (None, receiver),
            };
            let pointer = receiver_type.starts_with('*');
            let base = receiver_type.trim_start_matches('*');
            let base = base.split('[').next().unwrap_or(base).trim();
            if let Some(receiver_name) = receiver_name {
                options = options.meta("receiver", receiver_name);
            }
            options = options
                .meta("receiverType", base)
                .meta("pointerReceiver", pointer);
            NodeType::Method
        }
        None => NodeType::Function,
    };
    if let Some(params) = caps.get(3) {
        options = options.meta(
            "typeParameters",
            text.text(start + params.start()..start + params.end()),
        );
    }

    let parameters = parse_parameters(text.text(open_paren + 1..close_paren));
    options = options.meta("parameters", parameters_value(&parameters));

    let limit = text.len();
    let body = find_body_open(text, close_paren + 1, limit);
    let results_end = body.unwrap_or_else(|| line_end(text, close_paren + 1, limit));
    let results = text.text(close_paren + 1..results_end).trim();
    if !results.is_empty() {
        options = options.meta("returnType", results);
    }

    let end = match body {
        Some(open) => match find_matching(text.masked, open, b'{', b'}') {
            Some(close) => close + 1,
            None => {
                builder.warn(format!("unclosed body of `{name}`"), open, limit);
                limit
            }
        },
        None => results_end,
    };

    let exported = is_exported_name(&name);
    options = options
        .meta("exported", exported)
        .meta("visibility", if exported { "public" } else { "private" });

    trace!("go {node_type} `{name}`");
    nodes.push(builder.span_node(node_type, start, end, options));
    Some(end)
}

/// The `{` opening a function body, skipping `struct{}` / `interface{}`
/// result types. A newline outside brackets means there is no body.
fn find_body_open(text: MaskedSource, from: usize, limit: usize) -> Option<usize> {
    let bytes = text.masked.as_bytes();
    let mut i = from;
    while i < limit {
        match bytes[i] {
            b'(' => i = paren_end(text.masked, i),
            b'[' => i = find_matching(text.masked, i, b'[', b']').map_or(limit, |c| c + 1),
            b'{' => {
                let before = text.masked[from..i].trim_end();
                if before.ends_with("struct") || before.ends_with("interface") {
                    i = block_end(text.masked, i);
                } else {
                    return Some(i);
                }
            }
            b'\n' => return None,
            _ => i += 1,
        }
    }
    None
}

fn type_spec(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    span_start: usize,
    spec_start: usize,
    limit: usize,
    _keyword: &str,
    nodes: &mut Vec<AstNode>,
) -> Option<usize> {
    let caps = TYPE_SPEC.captures(&text.masked[spec_start..limit])?;
    let name = caps.get(1)?.as_str().to_string();
    let type_start = spec_start + caps.get(0)?.end();

    let mut options = NodeOptions::new().name(&name);
    // `[T any]` is a type parameter list, `[3]int` an array type
    let mut type_start = type_start;
    if let Some(params) = caps.get(2) {
        let raw = params.as_str();
        if raw.trim_matches(['[', ']']).trim().contains(char::is_whitespace) {
            options = options.meta(
                "typeParameters",
                text.text(spec_start + params.start()..spec_start + params.end()),
            );
        } else {
            type_start = spec_start + params.start();
        }
    }
    let is_alias = caps.get(3).is_some();

    let rest = &text.masked[type_start..limit];
    let keyword_of = |kw: &str| {
        rest.strip_prefix(kw)
            .is_some_and(|after| after.trim_start().starts_with('{'))
    };

    let exported = is_exported_name(&name);
    options = options
        .meta("exported", exported)
        .meta("visibility", if exported { "public" } else { "private" });

    let is_body_type = keyword_of("struct") || keyword_of("interface");
    let (node_type, end, children) = if !is_alias && is_body_type {
        let open = type_start + rest.find('{')?;
        let (body_end, end) = match find_matching_before(text.masked, open, limit, b'{', b'}') {
            Some(close) => (close, close + 1),
            None => {
                builder.warn(format!("unclosed body of `{name}`"), open, limit);
                (limit, limit)
            }
        };
        if keyword_of("struct") {
            (NodeType::Struct, end, struct_fields(text, builder, open + 1, body_end))
        } else {
            let (methods, embeds) = interface_members(text, builder, open + 1, body_end);
            if !embeds.is_empty() {
                options = options.meta("embeds", embeds);
            }
            (NodeType::Interface, end, methods)
        }
    } else {
        let end = line_end(text, type_start, limit);
        options = options.meta("aliasOf", text.text(type_start..end).trim());
        if is_alias {
            options = options.meta("declarationKind", "alias");
        }
        (NodeType::TypeAlias, end, Vec::new())
    };

    trace!("go {node_type} `{name}`");
    nodes.push(builder.span_node(node_type, span_start, end, options.children(children)));
    Some(end)
}

fn struct_fields(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    from: usize,
    limit: usize,
) -> Vec<AstNode> {
    let mut fields = Vec::new();
    let mut pos = text.skip_ws(from);

    while pos < limit {
        let end = line_end(text, pos, limit);
        let masked = &text.masked[pos..end];
        let raw = text.text(pos..end);
        let tag = raw.find('`').map(|i| raw[i..].trim().to_string());

        let named = FIELD.captures(masked).and_then(|caps| {
            let names = caps.get(1)?.as_str();
            let ty = caps.get(2)?;
            let ty_end = masked[ty.start()..].find('`').map_or(ty.end(), |i| ty.start() + i);
            let ty = raw[ty.start()..ty_end].trim();
            (!ty.is_empty()).then(|| (names.to_string(), ty.to_string()))
        });

        match named {
            Some((names, ty)) => {
                for name in names.split(',').map(str::trim) {
                    let exported = is_exported_name(name);
                    let mut options = NodeOptions::new()
                        .name(name)
                        .meta("typeAnnotation", ty.as_str())
                        .meta("exported", exported)
                        .meta("visibility", if exported { "public" } else { "private" });
                    if let Some(tag) = &tag {
                        options = options.meta("tag", tag.as_str());
                    }
                    fields.push(builder.span_node(NodeType::Property, pos, end, options));
                }
            }
            None => {
                // Embedded field: `Base`, `*Base`, `pkg.Base`
                let ty = masked.split('`').next().unwrap_or(masked).trim();
                let name = ty.trim_start_matches('*');
                let name = name.split('[').next().unwrap_or(name);
                let name = name.rsplit('.').next().unwrap_or(name);
                if !name.is_empty() {
                    let exported = is_exported_name(name);
                    let mut options = NodeOptions::new()
                        .name(name)
                        .meta("typeAnnotation", ty)
                        .meta("embedded", true)
                        .meta("exported", exported)
                        .meta("visibility", if exported { "public" } else { "private" });
                    if let Some(tag) = &tag {
                        options = options.meta("tag", tag.as_str());
                    }
                    fields.push(builder.span_node(NodeType::Property, pos, end, options));
                }
            }
        }

        pos = text.skip_ws(end.max(pos + 1));
    }

    fields
}

/// Method specs become nodes; embedded interfaces and type-set terms are
/// returned as text.
fn interface_members(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    from: usize,
    limit: usize,
) -> (Vec<AstNode>, Vec<String>) {
    let mut methods = Vec::new();
    let mut embeds = Vec::new();
    let mut pos = text.skip_ws(from);

    while pos < limit {
        let end = line_end(text, pos, limit);
        let masked = &text.masked[pos..end];

        let method = INTERFACE_METHOD.captures(masked).and_then(|caps| {
            let name = caps.get(1)?.as_str().to_string();
            let open = pos + caps.get(0)?.end() - 1;
            let close = find_matching_before(text.masked, open, end, b'(', b')')?;
            Some((name, open, close))
        });

        match method {
            Some((name, open, close)) => {
                let parameters = parse_parameters(text.text(open + 1..close));
                let results = text.text((close + 1).min(end)..end).trim();
                let exported = is_exported_name(&name);
                let mut options = NodeOptions::new()
                    .name(&name)
                    .meta("parameters", parameters_value(&parameters))
                    .meta("abstract", true)
                    .meta("exported", exported)
                    .meta("visibility", if exported { "public" } else { "private" });
                if !results.is_empty() {
                    options = options.meta("returnType", results);
                }
                methods.push(builder.span_node(NodeType::Method, pos, end, options));
            }
            None if !masked.trim().is_empty() => {
                embeds.push(text.text(pos..end).trim().to_string())
            }
            None => {}
        }

        pos = text.skip_ws(end.max(pos + 1));
    }

    (methods, embeds)
}

fn value_spec(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    span_start: usize,
    spec_start: usize,
    limit: usize,
    keyword: &str,
    nodes: &mut Vec<AstNode>,
) -> Option<usize> {
    let end = line_end(text, spec_start, limit);
    let masked = &text.masked[spec_start..end];
    let names = NAME_LIST.captures(masked)?.get(1)?;

    let rest = &masked[names.end()..];
    let type_text = rest.split('=').next().unwrap_or(rest).trim();
    let type_annotation = if type_text.is_empty() {
        None
    } else {
        let offset = spec_start + names.end() + (rest.len() - rest.trim_start().len());
        Some(text.text(offset..offset + type_text.len()).to_string())
    };

    for name in names.as_str().split(',').map(str::trim) {
        // Blank identifier declares nothing
        if name == "_" {
            continue;
        }
        let exported = is_exported_name(name);
        let mut options = NodeOptions::new()
            .name(name)
            .meta("declarationKind", keyword)
            .meta("exported", exported)
            .meta("visibility", if exported { "public" } else { "private" });
        if let Some(ty) = &type_annotation {
            options = options.meta("typeAnnotation", ty.as_str());
        }
        nodes.push(builder.span_node(NodeType::Variable, span_start, end, options));
    }
    Some(end)
}

/// Go parameter lists: `a, b int, opts ...Option` or unnamed `(int, error)`
pub fn parse_parameters(list: &str) -> Vec<ParameterInfo> {
    let pieces: Vec<&str> = split_top_level(list, b',', false)
        .into_iter()
        .map(|(_, piece)| piece)
        .collect();
    let named = pieces.iter().any(|p| p.contains(char::is_whitespace));

    let mut params = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    for piece in pieces {
        if !named {
            params.push(go_parameter("_", piece));
            continue;
        }
        match piece.split_once(char::is_whitespace) {
            Some((name, ty)) => {
                // Names without a type share the next explicit type
                for waiting in pending.drain(..) {
                    params.push(go_parameter(waiting, ty.trim()));
                }
                params.push(go_parameter(name, ty.trim()));
            }
            None => pending.push(piece),
        }
    }
    params.extend(pending.into_iter().map(ParameterInfo::named));
    params
}

fn go_parameter(name: &str, ty: &str) -> ParameterInfo {
    let variadic = ty.starts_with("...");
    ParameterInfo {
        name: name.to_string(),
        type_annotation: Some(ty.trim_start_matches("...").to_string()),
        default_value: None,
        optional: variadic,
        variadic,
    }
}
