#[cfg(test)]
mod tests {
    use codeshape::parsing::{LanguageParser, PythonParser};
    use codeshape::traversal::{VisitResult, find_by_name, traverse};
    use codeshape::{ExportKind, NodeType, ParsedFile, Visibility};

    const INVENTORY: &str = r#""""Inventory helpers."""
import os, sys as system
from typing import (
    List,
    Optional as Opt,
)
from .models import *

try:
    import ujson as json
except ImportError:
    import json

LIMIT: int = 10
_cache = {}


def helper(items: List[str], *, limit=LIMIT) -> int:
    """Count items. def fake(): pass"""
    return len(items)


def _private():
    pass


@dataclass(frozen=True)
class Item(Base, metaclass=ABCMeta):
    name: str
    count = 0

    def __init__(self, name):
        self.name = name

    @staticmethod
    async def fetch(url: str = "http://x:1") -> "Item":
        text = """
def not_a_function():
    pass
"""

        return Item(text)

    # trailing comment
"#;

    #[test]
    fn test_module_outline() {
        let file = PythonParser::new().parse(INVENTORY, "inventory.py").unwrap();

        let outline: Vec<(NodeType, &str)> = file
            .root
            .children
            .iter()
            .map(|n| (n.node_type, n.name().unwrap_or("")))
            .collect();
        println!("outline: {outline:?}");
        assert_eq!(
            outline,
            vec![
                (NodeType::Import, "os"),
                (NodeType::Import, "typing"),
                (NodeType::Import, ".models"),
                (NodeType::Import, "ujson"),
                (NodeType::Import, "json"),
                (NodeType::Variable, "LIMIT"),
                (NodeType::Variable, "_cache"),
                (NodeType::Function, "helper"),
                (NodeType::Function, "_private"),
                (NodeType::Class, "Item"),
            ]
        );
        assert!(find_by_name(&file.root, "not_a_function").is_empty());
        assert!(find_by_name(&file.root, "fake").is_empty());
    }

    #[test]
    fn test_underscore_names_are_not_exported() {
        let parser = PythonParser::new();
        let file = parser.parse(INVENTORY, "inventory.py").unwrap();
        let symbols = parser.extract_symbols(&file.root);

        let helper = symbols.iter().find(|s| s.name == "helper").unwrap();
        assert!(helper.exported);
        assert_eq!(helper.visibility, Visibility::Public);

        let private = symbols.iter().find(|s| s.name == "_private").unwrap();
        assert!(!private.exported);
        assert_eq!(private.visibility, Visibility::Private);

        let exports: Vec<String> = parser
            .extract_exports(&file.root)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(exports, vec!["LIMIT", "helper", "Item"]);
    }

    #[test]
    fn test_block_ends_at_first_dedented_line() {
        let file = PythonParser::new().parse(INVENTORY, "inventory.py").unwrap();

        // Blank lines up to the next top-level def stay in the block
        let helper = find_by_name(&file.root, "helper")[0];
        assert_eq!(helper.location.start_line, 18);
        assert_eq!(helper.location.end_line, 22);

        let item = find_by_name(&file.root, "Item")[0];
        assert_eq!(item.location.start_line, 27, "decorator opens the span");
        assert_eq!(item.location.end_line, 44);

        // The comment at method indentation closes `fetch`, string lines don't
        let fetch = find_by_name(&file.root, "fetch")[0];
        assert_eq!(fetch.location.start_line, 35);
        assert_eq!(fetch.location.end_line, 43);
    }

    #[test]
    fn test_dedented_comment_ends_block() {
        let source = "def first():\n    return 1\n\n\n# section\ndef second():\n    pass\n";
        let file = PythonParser::new().parse(source, "sections.py").unwrap();

        let first = find_by_name(&file.root, "first")[0];
        assert_eq!(first.text.as_deref(), Some("def first():\n    return 1\n\n"));
        assert_eq!(first.location.end_line, 4);
        assert_eq!(first.location.end_column, 0);

        let second = find_by_name(&file.root, "second")[0];
        assert_eq!(second.location.start_line, 6);
        assert_eq!(second.location.end_line, 7);
        assert_eq!(file.root.children.len(), 2);
    }

    #[test]
    fn test_function_metadata() {
        let parser = PythonParser::new();
        let file = parser.parse(INVENTORY, "inventory.py").unwrap();
        let symbols = parser.extract_symbols(&file.root);

        let helper = symbols.iter().find(|s| s.name == "helper").unwrap();
        assert_eq!(helper.return_type.as_deref(), Some("int"));
        let params: Vec<&str> = helper.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(params, vec!["items", "limit"]);
        assert_eq!(helper.parameters[0].type_annotation.as_deref(), Some("List[str]"));
        assert_eq!(helper.parameters[1].default_value.as_deref(), Some("LIMIT"));

        let fetch = symbols.iter().find(|s| s.name == "fetch").unwrap();
        assert_eq!(fetch.kind, NodeType::Method);
        assert!(fetch.is_async);
        assert!(fetch.is_static);
        assert_eq!(fetch.parent_name.as_deref(), Some("Item"));
        assert_eq!(fetch.return_type.as_deref(), Some("\"Item\""));
        assert_eq!(fetch.parameters[0].default_value.as_deref(), Some("\"http://x:1\""));

        let init = find_by_name(&file.root, "__init__")[0];
        assert!(init.meta_bool("constructor"));
        assert_eq!(init.meta_str("visibility"), Some("public"));
    }

    #[test]
    fn test_class_metadata_and_members() {
        let file = PythonParser::new().parse(INVENTORY, "inventory.py").unwrap();
        let item = find_by_name(&file.root, "Item")[0];

        assert!(item.meta_bool("abstract"));
        assert_eq!(item.metadata["bases"][0], "Base");
        assert_eq!(item.metadata["decorators"][0], "@dataclass(frozen=True)");

        let members: Vec<(NodeType, &str)> = item
            .children
            .iter()
            .map(|n| (n.node_type, n.name().unwrap_or("")))
            .collect();
        assert_eq!(
            members,
            vec![
                (NodeType::Decorator, "dataclass"),
                (NodeType::Property, "name"),
                (NodeType::Property, "count"),
                (NodeType::Method, "__init__"),
                (NodeType::Method, "fetch"),
            ]
        );
        assert_eq!(item.children[1].meta_str("typeAnnotation"), Some("str"));
    }

    #[test]
    fn test_imports() {
        let parser = PythonParser::new();
        let file = parser.parse(INVENTORY, "inventory.py").unwrap();
        let imports = parser.extract_imports(&file.root);

        let sources: Vec<&str> = imports.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["os", "sys", "typing", ".models", "ujson", "json"]);

        assert_eq!(imports[1].namespace_import.as_deref(), Some("system"));
        assert_eq!(imports[2].names.len(), 2);
        assert_eq!(imports[2].names[1].local_name(), "Opt");
        assert!(imports[3].is_wildcard);
        assert_eq!(imports[4].namespace_import.as_deref(), Some("json"));
    }

    #[test]
    fn test_dunder_all_decides_exports() {
        let code = "__all__ = [\"public_one\"]\n\ndef public_one(): pass\ndef other(): pass\n";
        let parser = PythonParser::new();
        let file = parser.parse(code, "api.py").unwrap();

        let exports = parser.extract_exports(&file.root);
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].name, "public_one");
        assert_eq!(exports[0].kind, ExportKind::Named);

        let other = find_by_name(&file.root, "other")[0];
        assert!(!other.meta_bool("exported"));
        let public_one = find_by_name(&file.root, "public_one")[0];
        assert!(public_one.meta_bool("exported"));
    }

    fn assert_spans_match_source(file: &ParsedFile) {
        traverse(&file.root, |node, _, _| {
            let loc = node.location;
            assert!(loc.end_index <= file.source.len());
            assert_eq!(
                node.text.as_deref(),
                Some(&file.source[loc.start_index..loc.end_index])
            );
            VisitResult::Continue
        });
    }

    #[test]
    fn test_header_on_last_line() {
        let source = "class Empty:\n    pass\n\ndef tail():";
        let file = PythonParser::new().parse(source, "tail.py").unwrap();

        let tail = find_by_name(&file.root, "tail")[0];
        assert_eq!(tail.text.as_deref(), Some("def tail():"));
        assert_eq!(tail.location.end_index, source.len());
        assert_eq!(find_by_name(&file.root, "Empty")[0].location.end_line, 3);
        assert_spans_match_source(&file);
    }

    #[test]
    fn test_unbalanced_input_does_not_escape_the_source() {
        let unclosed_params = "def broken(a, b:\n    return a\n\ndef ok():\n    return 1\n";
        let file = PythonParser::new().parse(unclosed_params, "broken.py").unwrap();
        assert_eq!(file.root.location.end_index, unclosed_params.len());
        assert_spans_match_source(&file);

        let unclosed_string = "def doc():\n    \"\"\"never closed\n    return 1\n";
        let file = PythonParser::new().parse(unclosed_string, "doc.py").unwrap();
        let doc = find_by_name(&file.root, "doc")[0];
        assert_eq!(doc.location.end_index, unclosed_string.len());
        assert_spans_match_source(&file);
    }
}
