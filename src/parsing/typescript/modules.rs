//! Import/export recognition for TypeScript and JavaScript
//!
//! Runs fixed regular expressions over the text of nodes the tree-sitter
//! frontend already classified as `import_statement` / `export_statement`,
//! never over the whole file.

use crate::ast::AstNode;
use crate::parsing::{ExportInfo, ExportKind, ImportInfo, ImportedName};
use crate::types::NodeType;
use regex::Regex;
use std::sync::LazyLock;

static IMPORT_SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"from\s*['"]([^'"]+)['"]"#).expect("valid import source regex")
});

static SIDE_EFFECT_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^import\s*['"]([^'"]+)['"]"#).expect("valid side-effect regex")
});

static IMPORT_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^import\s+(type\s+)?(.*?)\s*from\s*['"]"#).expect("valid import clause regex")
});

static NAMED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{([^}]*)\}").expect("valid named block regex"));

static NAMESPACE_BINDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\s*as\s+([\w$]+)").expect("valid namespace regex"));

static SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(type\s+)?([\w$]+)(?:\s+as\s+([\w$]+))?$").expect("valid specifier regex")
});

static EXPORT_STAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^export\s+(type\s+)?\*\s*(?:as\s+([\w$]+)\s*)?from\s*['"]([^'"]+)['"]"#)
        .expect("valid export star regex")
});

static EXPORT_NAMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^export\s+(type\s+)?\{([^}]*)\}\s*(?:from\s*['"]([^'"]+)['"])?"#)
        .expect("valid export named regex")
});

static EXPORT_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^export\s+default\s+").expect("valid export default regex"));

static DEFAULT_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:(?:async\s+)?function\s*\*?\s*([\w$]+)",
        r"|(?:abstract\s+)?class\s+([\w$]+)",
        r"|([\w$]+)\s*;?\s*$)",
    ))
    .expect("valid default target regex")
});

static EXPORT_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^export\s+(?:declare\s+)?(?:async\s+)?(function\s*\*?|abstract\s+class|class|interface|type|const\s+enum|enum|namespace|module|const|let|var)\s+([\w$]+)",
    )
    .expect("valid export declaration regex")
});

/// Strips matching quotes from a module specifier
pub fn unquote(text: &str) -> &str {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

/// Parse the text of one `import_statement` node
pub fn parse_import(node: &AstNode) -> Option<ImportInfo> {
    let text = node.text.as_deref()?.trim();

    if let Some(caps) = SIDE_EFFECT_IMPORT.captures(text) {
        return Some(ImportInfo::new(&caps[1], node.location));
    }

    let source = IMPORT_SOURCE.captures(text)?.get(1)?.as_str();
    let mut import = ImportInfo::new(source, node.location);

    let Some(clause) = IMPORT_CLAUSE.captures(text) else {
        return Some(import);
    };
    import.is_type_only = clause.get(1).is_some();
    let clause = clause.get(2).map_or("", |m| m.as_str());

    if let Some(caps) = NAMESPACE_BINDING.captures(clause) {
        import.namespace_import = Some(caps[1].to_string());
        import.is_wildcard = true;
    }

    if let Some(caps) = NAMED_BLOCK.captures(clause) {
        import.names = parse_specifiers(&caps[1]);
    }

    // Whatever remains before the first comma is the default binding
    let remainder = NAMED_BLOCK.replace(clause, "");
    let remainder = NAMESPACE_BINDING.replace(&remainder, "");
    import.default_import = remainder
        .split(',')
        .map(str::trim)
        .find(|part| !part.is_empty())
        .map(str::to_string);

    Some(import)
}

fn parse_specifiers(block: &str) -> Vec<ImportedName> {
    block
        .split(',')
        .map(str::trim)
        .filter_map(|spec| {
            let caps = SPECIFIER.captures(spec)?;
            let mut name = ImportedName::new(&caps[2], caps.get(3).map(|m| m.as_str().to_string()));
            name.is_type = caps.get(1).is_some();
            Some(name)
        })
        .collect()
}

/// Parse the text of one `export_statement` node
pub fn parse_export(node: &AstNode) -> Vec<ExportInfo> {
    let Some(text) = node.text.as_deref().map(str::trim) else {
        return Vec::new();
    };
    let location = node.location;

    if let Some(caps) = EXPORT_STAR.captures(text) {
        let source = caps[3].to_string();
        let mut export = match caps.get(2) {
            Some(ns) => ExportInfo::new(ns.as_str(), ExportKind::NamespaceReExport, location),
            None => ExportInfo::new("*", ExportKind::ReExport, location),
        };
        export.source = Some(source);
        export.is_type_only = caps.get(1).is_some();
        return vec![export];
    }

    if let Some(caps) = EXPORT_NAMED.captures(text) {
        let is_type_only = caps.get(1).is_some();
        let source = caps.get(3).map(|m| m.as_str().to_string());
        let kind = if source.is_some() {
            ExportKind::ReExport
        } else {
            ExportKind::Named
        };
        return parse_specifiers(&caps[2])
            .into_iter()
            .map(|spec| {
                let exported_as = spec.alias.clone().unwrap_or_else(|| spec.name.clone());
                let mut export = ExportInfo::new(exported_as, kind, location);
                if spec.alias.is_some() {
                    export.local_name = Some(spec.name);
                }
                export.source = source.clone();
                export.is_type_only = is_type_only || spec.is_type;
                export
            })
            .collect();
    }

    if let Some(found) = EXPORT_DEFAULT.find(text) {
        let target = &text[found.end()..];
        let mut export = ExportInfo::new("default", ExportKind::Default, location);
        export.local_name = DEFAULT_TARGET.captures(target).and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
        });
        return vec![export];
    }

    if let Some(caps) = EXPORT_DECLARATION.captures(text) {
        let keyword = &caps[1];
        let is_type_only = keyword == "interface" || keyword == "type";

        // `export const a = 1, b = 2` declares several names; the tree has them all
        let names: Vec<String> = if matches!(keyword, "const" | "let" | "var") {
            node.children
                .iter()
                .filter(|child| child.node_type == NodeType::Variable)
                .filter_map(|child| child.name.clone())
                .collect()
        } else {
            Vec::new()
        };
        let names = if names.is_empty() {
            vec![caps[2].to_string()]
        } else {
            names
        };

        return names
            .into_iter()
            .map(|name| {
                let mut export = ExportInfo::new(name, ExportKind::Declaration, location);
                export.is_type_only = is_type_only;
                export
            })
            .collect();
    }

    Vec::new()
}
