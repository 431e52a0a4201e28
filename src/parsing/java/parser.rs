//! Java parser implementation
//!
//! Heuristic: regex headers over comment/literal-masked text, bodies found
//! by brace matching. Declarations are only looked for where one can begin
//! (region start, after a first-level `;` or `}`), so statements inside
//! method bodies never leak into the class outline.

use crate::ast::{AstNode, ExtractedSymbol, ParameterInfo, ParsedFile};
use crate::error::ParseResult;
use crate::parsing::parser::{NodeOptions, TreeBuilder, collect_symbols, parameters_value};
use crate::parsing::scan::{MaskedSource, find_matching_before, mask_c_like, split_top_level};
use crate::parsing::{ExportInfo, ExportKind, ImportInfo, ImportedName, Language, LanguageParser};
use crate::types::NodeType;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::{debug, trace};

const ANNOTATIONS: &str = r"(?:@[\w.]+(?:\s*\((?:[^()]|\([^()]*\))*\))?\s*)*";
const MODIFIERS: &str = concat!(
    r"(?:(?:public|protected|private|static|final|abstract|sealed|non-sealed|strictfp",
    r"|synchronized|native|default|transient|volatile)\s+)*",
);
const TYPE_REF: &str = r"[\w$.]+(?:\s*<[^;()]*>)?(?:\s*\[\s*\])*";

/// Words that can never be a return or field type
const NOT_A_TYPE: &[&str] = &[
    "public", "protected", "private", "static", "final", "abstract", "sealed", "non-sealed",
    "strictfp", "synchronized", "native", "default", "transient", "volatile", "new", "return",
    "throw", "else", "case", "package", "import", "class", "interface", "enum", "record",
];

static TYPE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^({ANNOTATIONS})({MODIFIERS})(class|interface|enum|record|@interface)\s+([A-Za-z_$][\w$]*)"
    ))
    .expect("valid type header regex")
});

static METHOD_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^({ANNOTATIONS})({MODIFIERS})(<[^;()]*>\s*)?({TYPE_REF})\s+([A-Za-z_$][\w$]*)\s*\("
    ))
    .expect("valid method header regex")
});

static CONSTRUCTOR_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^({ANNOTATIONS})({MODIFIERS})(<[^;()]*>\s*)?([A-Za-z_$][\w$]*)\s*\("
    ))
    .expect("valid constructor header regex")
});

static FIELD_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^({ANNOTATIONS})({MODIFIERS})({TYPE_REF})\s+([A-Za-z_$][\w$]*)\s*(?:\[\s*\]\s*)*(?:=|;|,)"
    ))
    .expect("valid field header regex")
});

static PACKAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^package\s+([\w.]+)\s*;").expect("valid package regex"));

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^import\s+(static\s+)?([\w.]+?)(\.\*)?\s*;").expect("valid import regex")
});

static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@[\w.]+(?:\s*\((?:[^()]|\([^()]*\))*\))?").expect("valid annotation regex")
});

static HERITAGE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(extends|implements|permits)\b").expect("valid heritage regex")
});

/// Java language parser
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }
}

/// The type whose body is being scanned
struct Owner {
    name: String,
    is_interface: bool,
}

/// Absolute ranges of a matched declaration prefix
struct Prefix {
    annotations: Range<usize>,
    modifiers: Range<usize>,
}

impl Prefix {
    fn from_captures(caps: &regex::Captures, offset: usize) -> Option<Self> {
        let shift = |m: regex::Match| m.start() + offset..m.end() + offset;
        Some(Self {
            annotations: shift(caps.get(1)?),
            modifiers: shift(caps.get(2)?),
        })
    }

    fn words<'a>(&self, text: &MaskedSource<'a>) -> Vec<&'a str> {
        text.text(self.modifiers.clone()).split_whitespace().collect()
    }

    fn annotations(&self, text: &MaskedSource) -> Vec<String> {
        ANNOTATION
            .find_iter(&text.masked[self.annotations.clone()])
            .map(|m| {
                let start = self.annotations.start + m.start();
                text.text(start..start + m.len()).to_string()
            })
            .collect()
    }
}

impl LanguageParser for JavaParser {
    fn language(&self) -> Language {
        Language::Java
    }

    fn parse(&self, source: &str, file_path: &str) -> ParseResult<ParsedFile> {
        let masked = mask_c_like(source);
        let text = MaskedSource::new(source, &masked);
        let mut builder = TreeBuilder::new(source);

        let children = parse_members(text, &mut builder, 0..text.len(), None);
        let root = builder.program(NodeType::Program, children);
        let warnings = builder.take_diagnostics();

        debug!(
            "Parsed {file_path} as java: {} nodes, {} warnings",
            builder.node_count(),
            warnings.len()
        );

        Ok(ParsedFile::new(
            file_path,
            Language::Java,
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
                let text = node.text.as_deref()?;
                let caps = IMPORT.captures(text.trim())?;
                let path = caps.get(2)?.as_str();

                let mut import = ImportInfo::new(path, node.location);
                import.is_static = caps.get(1).is_some();
                import.is_wildcard = caps.get(3).is_some();
                if !import.is_wildcard {
                    let last = path.rsplit('.').next().unwrap_or(path);
                    import.names.push(ImportedName::new(last, None));
                }
                Some(import)
            })
            .collect()
    }

    fn extract_exports(&self, root: &AstNode) -> Vec<ExportInfo> {
        root.children
            .iter()
            .filter(|child| {
                matches!(child.node_type, NodeType::Class | NodeType::Interface)
                    && child.meta_bool("exported")
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
        collect_symbols(node, parent_name, symbols, &|n: &AstNode| {
            matches!(
                n.node_type,
                NodeType::Class | NodeType::Interface | NodeType::Method | NodeType::Property
            )
        });
    }
}

/// Declarations inside `region`: the compilation unit when `owner` is
/// `None`, otherwise the body of that type.
fn parse_members(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    region: Range<usize>,
    owner: Option<&Owner>,
) -> Vec<AstNode> {
    let mut nodes = Vec::new();
    let mut covered = region.start;

    for start in text.member_starts(region.clone()) {
        if start < covered {
            continue;
        }
        if let Some(node) = member(text, builder, start, region.end, owner) {
            covered = node.location.end_index;
            nodes.push(node);
        }
    }

    nodes
}

fn member(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    start: usize,
    limit: usize,
    owner: Option<&Owner>,
) -> Option<AstNode> {
    if owner.is_none() {
        if let Some(node) = package_or_import(text, builder, start, limit) {
            return Some(node);
        }
    }
    if let Some(node) = type_declaration(text, builder, start, limit, owner) {
        return Some(node);
    }

    let owner = owner?;
    if let Some(node) = callable(text, builder, start, limit, owner, true) {
        return Some(node);
    }
    if let Some(node) = callable(text, builder, start, limit, owner, false) {
        return Some(node);
    }
    field(text, builder, start, limit, owner)
}

fn package_or_import(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    start: usize,
    limit: usize,
) -> Option<AstNode> {
    let slice = &text.masked[start..limit];

    if let Some(caps) = PACKAGE.captures(slice) {
        let end = start + caps.get(0)?.end();
        let name = caps.get(1)?.as_str();
        return Some(builder.span_node(
            NodeType::Package,
            start,
            end,
            NodeOptions::new().name(name),
        ));
    }

    let caps = IMPORT.captures(slice)?;
    let end = start + caps.get(0)?.end();
    let path = caps.get(2)?.as_str();
    let mut options = NodeOptions::new().name(path).meta("source", path);
    if caps.get(1).is_some() {
        options = options.meta("static", true);
    }
    Some(builder.span_node(NodeType::Import, start, end, options))
}

fn type_declaration(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    start: usize,
    limit: usize,
    owner: Option<&Owner>,
) -> Option<AstNode> {
    let caps = TYPE_HEADER.captures(&text.masked[start..limit])?;
    let prefix = Prefix::from_captures(&caps, start)?;
    let keyword = caps.get(3)?.as_str();
    let name = caps.get(4)?.as_str().to_string();
    let mut pos = text.skip_ws(start + caps.get(0)?.end());

    let mut options = NodeOptions::new().name(&name);
    let bytes = text.masked.as_bytes();

    if bytes.get(pos) == Some(&b'<') {
        let close = find_matching_before(text.masked, pos, limit, b'<', b'>')?;
        options = options.meta("typeParameters", text.text(pos..close + 1));
        pos = text.skip_ws(close + 1);
    }
    if keyword == "record" && bytes.get(pos) == Some(&b'(') {
        let Some(close) = find_matching_before(text.masked, pos, limit, b'(', b')') else {
            builder.warn(format!("unclosed component list of record `{name}`"), pos, limit);
            return None;
        };
        let components = parse_parameters(text, pos + 1..close);
        options = options.meta("parameters", parameters_value(&components));
        pos = close + 1;
    }

    let header = text.masked.get(pos..limit)?;
    let open = pos + header.find('{')?;
    if text.masked[pos..open].contains(';') {
        return None;
    }
    let (body_end, end) = match find_matching_before(text.masked, open, limit, b'{', b'}') {
        Some(close) => (close, close + 1),
        None => {
            builder.warn(format!("unclosed body of `{name}`"), open, limit);
            (limit, limit)
        }
    };

    let (bases, implements) = heritage(text, pos..open);
    if !bases.is_empty() {
        options = options.meta("bases", bases);
    }
    if !implements.is_empty() {
        options = options.meta("implements", implements);
    }

    let is_interface = matches!(keyword, "interface" | "@interface");
    let declaration_kind = match keyword {
        "@interface" => "annotation",
        other => other,
    };
    options = options.meta("declarationKind", declaration_kind);
    options = apply_modifiers(options, &prefix, text, owner, false);

    let node_type = if is_interface {
        NodeType::Interface
    } else {
        NodeType::Class
    };
    trace!("java {declaration_kind} `{name}`");

    let body_owner = Owner {
        name,
        is_interface,
    };
    let children = parse_members(text, builder, open + 1..body_end, Some(&body_owner));
    Some(builder.span_node(node_type, start, end, options.children(children)))
}

/// Methods (`is_constructor == false`) and constructors share one shape:
/// header, parameter list, optional `throws`, then a body or `;`.
fn callable(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    start: usize,
    limit: usize,
    owner: &Owner,
    is_constructor: bool,
) -> Option<AstNode> {
    let slice = &text.masked[start..limit];
    let (caps, name, return_type) = if is_constructor {
        let caps = CONSTRUCTOR_HEADER.captures(slice)?;
        let name = caps.get(4)?.as_str();
        if name != owner.name {
            return None;
        }
        (caps, name, None)
    } else {
        let caps = METHOD_HEADER.captures(slice)?;
        let ty = caps.get(4)?;
        let name = caps.get(5)?.as_str();
        let ty_text = ty.as_str().trim();
        // A constructor seen through the method pattern
        if ty_text == name || NOT_A_TYPE.contains(&ty_text) {
            return None;
        }
        let ty_range = start + ty.start()..start + ty.end();
        (caps, name, Some(text.text(ty_range).trim().to_string()))
    };

    let prefix = Prefix::from_captures(&caps, start)?;
    let type_params = caps.get(3).map(|m| text.text(start + m.start()..start + m.end()).trim());
    let open_paren = start + caps.get(0)?.end() - 1;
    let name = name.to_string();

    let Some(close_paren) = find_matching_before(text.masked, open_paren, limit, b'(', b')')
    else {
        builder.warn(format!("unclosed parameter list of `{name}`"), open_paren, limit);
        return None;
    };
    let parameters = parse_parameters(text, open_paren + 1..close_paren);

    // Body `{` or terminating `;`, after an optional `throws` clause
    let after = close_paren + 1;
    let terminator = text.masked.get(after..limit)?.find(['{', ';'])? + after;
    let (end, has_body) = if text.masked.as_bytes()[terminator] == b'{' {
        let end = match find_matching_before(text.masked, terminator, limit, b'{', b'}') {
            Some(close) => close + 1,
            None => {
                builder.warn(format!("unclosed body of `{name}`"), terminator, limit);
                limit
            }
        };
        (end, true)
    } else {
        (terminator + 1, false)
    };

    let mut options = NodeOptions::new()
        .name(&name)
        .meta("parameters", parameters_value(&parameters));
    if let Some(return_type) = return_type {
        options = options.meta("returnType", return_type);
    }
    if let Some(type_params) = type_params {
        options = options.meta("typeParameters", type_params);
    }
    if is_constructor {
        options = options.meta("constructor", true);
    }

    let words = prefix.words(&text);
    let implicit_abstract = !words.contains(&"default") && !words.contains(&"static");
    if owner.is_interface && !has_body && implicit_abstract {
        options = options.meta("abstract", true);
    }
    if words.contains(&"default") {
        options = options.meta("defaultMethod", true);
    }
    options = apply_modifiers(options, &prefix, text, Some(owner), true);

    trace!("java method `{}.{name}`", owner.name);
    Some(builder.span_node(NodeType::Method, start, end, options))
}

fn field(
    text: MaskedSource,
    builder: &mut TreeBuilder,
    start: usize,
    limit: usize,
    owner: &Owner,
) -> Option<AstNode> {
    let caps = FIELD_HEADER.captures(&text.masked[start..limit])?;
    let prefix = Prefix::from_captures(&caps, start)?;
    let ty = caps.get(3)?;
    if NOT_A_TYPE.contains(&ty.as_str().trim()) {
        return None;
    }
    let type_annotation = text.text(start + ty.start()..start + ty.end()).trim().to_string();
    let name = caps.get(4)?.as_str().to_string();
    let end = text.statement_end(start + caps.get(0)?.end() - 1, limit);

    let mut options = NodeOptions::new()
        .name(&name)
        .meta("typeAnnotation", type_annotation);
    if owner.is_interface {
        options = options.meta("static", true);
    }
    options = apply_modifiers(options, &prefix, text, Some(owner), true);
    Some(builder.span_node(NodeType::Property, start, end, options))
}

/// Visibility, export flag and keyword modifiers from a declaration prefix.
///
/// Interface members are implicitly public; everything else without an
/// access modifier is package-private.
fn apply_modifiers(
    mut options: NodeOptions,
    prefix: &Prefix,
    text: MaskedSource,
    owner: Option<&Owner>,
    member: bool,
) -> NodeOptions {
    let words = prefix.words(&text);
    let visibility = ["public", "protected", "private"]
        .into_iter()
        .find(|v| words.contains(v))
        .unwrap_or(if member && owner.is_some_and(|o| o.is_interface) {
            "public"
        } else {
            "package"
        });

    options = options
        .meta("visibility", visibility)
        .meta("exported", visibility == "public");
    if words.contains(&"static") {
        options = options.meta("static", true);
    }
    if words.contains(&"abstract") {
        options = options.meta("abstract", true);
    }
    if words.contains(&"final") {
        options = options.meta("final", true);
    }

    let annotations = prefix.annotations(&text);
    if !annotations.is_empty() {
        options = options.meta("decorators", annotations);
    }
    options
}

/// `extends A<B>, C implements D` → (bases, implements)
fn heritage(text: MaskedSource, range: Range<usize>) -> (Vec<String>, Vec<String>) {
    let masked = &text.masked[range.clone()];
    let keywords: Vec<(usize, usize, &str)> = HERITAGE_KEYWORD
        .captures_iter(masked)
        .filter_map(|caps| {
            let m = caps.get(1)?;
            Some((m.start(), m.end(), m.as_str()))
        })
        .collect();

    let mut bases = Vec::new();
    let mut implements = Vec::new();
    for (i, &(_, keyword_end, keyword)) in keywords.iter().enumerate() {
        let list_end = keywords.get(i + 1).map_or(masked.len(), |next| next.0);
        let names = split_top_level(&masked[keyword_end..list_end], b',', true)
            .into_iter()
            .map(|(offset, piece)| {
                let from = range.start + keyword_end + offset;
                text.text(from..from + piece.len()).to_string()
            });
        match keyword {
            "extends" => bases.extend(names),
            "implements" => implements.extend(names),
            _ => {}
        }
    }
    (bases, implements)
}

/// Formal parameters or record components inside `range` (exclusive of the parens)
fn parse_parameters(text: MaskedSource, range: Range<usize>) -> Vec<ParameterInfo> {
    split_top_level(&text.masked[range.clone()], b',', true)
        .into_iter()
        .filter_map(|(offset, piece)| {
            let from = range.start + offset;
            let masked = ANNOTATION.replace_all(piece, "");
            let raw = text.text(from..from + piece.len());
            let cleaned = ANNOTATION.replace_all(raw, "");
            let cleaned = cleaned
                .trim()
                .trim_start_matches("final ")
                .trim();
            if masked.trim().is_empty() {
                return None;
            }

            let (ty, name) = cleaned.rsplit_once(char::is_whitespace)?;
            let mut name = name.trim().to_string();
            let mut ty = ty.trim().to_string();
            // C-style array declarator: `int values[]`
            while let Some(stripped) = name.strip_suffix("[]") {
                name = stripped.to_string();
                ty.push_str("[]");
            }

            let variadic = ty.ends_with("...");
            if variadic {
                ty = ty.trim_end_matches("...").trim().to_string();
            }
            Some(ParameterInfo {
                name,
                type_annotation: Some(ty),
                default_value: None,
                optional: false,
                variadic,
            })
        })
        .collect()
}
