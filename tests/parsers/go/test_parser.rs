#[cfg(test)]
mod tests {
    use codeshape::parsing::{GoParser, LanguageParser};
    use codeshape::traversal::{VisitResult, find_by_name, find_by_type, traverse};
    use codeshape::{ExportKind, NodeType, ParsedFile, Visibility};

    const STORE: &str = r#"package store

import (
    "context"
    db "database/sql"
    _ "github.com/lib/pq"
    . "strings"
)

import "fmt"

const (
    MaxItems = 100
    minItems = 1
)

var ErrMissing, errHidden = fmt.Errorf("missing {"), fmt.Errorf("hidden")

type ID int64

type Alias = string

type Item struct {
    ID    ID     `json:"id"`
    Name, Label string
    *Base
    sync.Mutex
    notes []string
}

type Store interface {
    io.Closer
    Get(ctx context.Context, id ID) (*Item, error)
    put(item *Item) error
}

func New(conn *db.DB) *Item {
    if conn == nil {
        return nil
    }
    return &Item{}
}

func (it *Item) Rename(name string) error {
    it.Name = name
    return nil
}

func helper[T any](items []T) int { return len(items) }
"#;

    #[test]
    fn test_top_level_outline() {
        let file = GoParser::new().parse(STORE, "store.go").unwrap();

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
                (NodeType::Package, "store"),
                (NodeType::Import, "context"),
                (NodeType::Import, "database/sql"),
                (NodeType::Import, "github.com/lib/pq"),
                (NodeType::Import, "strings"),
                (NodeType::Import, "fmt"),
                (NodeType::Variable, "MaxItems"),
                (NodeType::Variable, "minItems"),
                (NodeType::Variable, "ErrMissing"),
                (NodeType::Variable, "errHidden"),
                (NodeType::TypeAlias, "ID"),
                (NodeType::TypeAlias, "Alias"),
                (NodeType::Struct, "Item"),
                (NodeType::Interface, "Store"),
                (NodeType::Function, "New"),
                (NodeType::Method, "Rename"),
                (NodeType::Function, "helper"),
            ]
        );
        assert!(file.errors.is_empty());
    }

    #[test]
    fn test_capitalization_decides_exports() {
        let parser = GoParser::new();
        let file = parser.parse(STORE, "store.go").unwrap();

        let exports: Vec<String> = parser
            .extract_exports(&file.root)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(
            exports,
            vec!["MaxItems", "ErrMissing", "ID", "Alias", "Item", "Store", "New"]
        );

        let symbols = parser.extract_symbols(&file.root);
        let helper = symbols.iter().find(|s| s.name == "helper").unwrap();
        assert!(!helper.exported);
        assert_eq!(helper.visibility, Visibility::Private);

        let new = symbols.iter().find(|s| s.name == "New").unwrap();
        assert!(new.exported);
        assert_eq!(new.visibility, Visibility::Public);
        assert_eq!(
            parser.extract_exports(&file.root)[6].kind,
            ExportKind::Declaration
        );
    }

    #[test]
    fn test_imports_with_aliases() {
        let parser = GoParser::new();
        let file = parser.parse(STORE, "store.go").unwrap();
        let imports = parser.extract_imports(&file.root);

        assert_eq!(imports.len(), 5);
        assert_eq!(imports[0].namespace_import.as_deref(), Some("context"));
        assert_eq!(imports[1].source, "database/sql");
        assert_eq!(imports[1].namespace_import.as_deref(), Some("db"));
        assert!(imports[2].namespace_import.is_none());
        assert!(!imports[2].is_wildcard);
        assert!(imports[3].is_wildcard);
        assert_eq!(imports[4].source, "fmt");
    }

    #[test]
    fn test_functions_and_methods() {
        let parser = GoParser::new();
        let file = parser.parse(STORE, "store.go").unwrap();

        let new = find_by_name(&file.root, "New")[0];
        assert_eq!(new.location.start_line, 37);
        assert_eq!(new.location.end_line, 42);
        assert_eq!(new.meta_str("returnType"), Some("*Item"));

        let rename = find_by_name(&file.root, "Rename")[0];
        assert_eq!(rename.meta_str("receiver"), Some("it"));
        assert_eq!(rename.meta_str("receiverType"), Some("Item"));
        assert!(rename.meta_bool("pointerReceiver"));

        let helper = find_by_name(&file.root, "helper")[0];
        assert_eq!(helper.meta_str("typeParameters"), Some("[T any]"));
        assert_eq!(helper.location.start_line, helper.location.end_line);

        let symbols = parser.extract_symbols(&file.root);
        let rename = symbols.iter().find(|s| s.name == "Rename").unwrap();
        assert_eq!(rename.kind, NodeType::Method);
        assert_eq!(rename.parent_name.as_deref(), Some("Item"));
        assert_eq!(rename.parameters[0].type_annotation.as_deref(), Some("string"));
    }

    #[test]
    fn test_struct_fields() {
        let file = GoParser::new().parse(STORE, "store.go").unwrap();
        let item = find_by_type(&file.root, NodeType::Struct)[0];

        let fields: Vec<&str> = item.children.iter().filter_map(|f| f.name()).collect();
        assert_eq!(fields, vec!["ID", "Name", "Label", "Base", "Mutex", "notes"]);

        let id = &item.children[0];
        assert_eq!(id.meta_str("typeAnnotation"), Some("ID"));
        assert_eq!(id.meta_str("tag"), Some("`json:\"id\"`"));

        assert_eq!(item.children[2].meta_str("typeAnnotation"), Some("string"));
        assert!(item.children[3].meta_bool("embedded"));
        assert_eq!(item.children[3].meta_str("typeAnnotation"), Some("*Base"));
        assert!(item.children[4].meta_bool("embedded"));
        assert!(!item.children[5].meta_bool("exported"));
    }

    #[test]
    fn test_interface_members() {
        let parser = GoParser::new();
        let file = parser.parse(STORE, "store.go").unwrap();
        let store = find_by_type(&file.root, NodeType::Interface)[0];

        assert_eq!(store.metadata["embeds"][0], "io.Closer");
        assert_eq!(store.children.len(), 2);

        let get = &store.children[0];
        assert_eq!(get.name(), Some("Get"));
        assert_eq!(get.meta_str("returnType"), Some("(*Item, error)"));
        assert!(get.meta_bool("abstract"));

        let symbols = parser.extract_symbols(&file.root);
        let put = symbols.iter().find(|s| s.name == "put").unwrap();
        assert_eq!(put.parent_name.as_deref(), Some("Store"));
        assert!(!put.exported);
        assert_eq!(put.parameters[0].type_annotation.as_deref(), Some("*Item"));
    }

    #[test]
    fn test_value_and_type_declarations() {
        let file = GoParser::new().parse(STORE, "store.go").unwrap();

        let max = find_by_name(&file.root, "MaxItems")[0];
        assert_eq!(max.meta_str("declarationKind"), Some("const"));

        let hidden = find_by_name(&file.root, "errHidden")[0];
        assert_eq!(hidden.meta_str("declarationKind"), Some("var"));
        assert_eq!(hidden.location.start_line, 17);

        let id = find_by_name(&file.root, "ID")[0];
        assert_eq!(id.node_type, NodeType::TypeAlias);
        assert_eq!(id.meta_str("aliasOf"), Some("int64"));
        assert!(id.meta_str("declarationKind").is_none());

        let alias = find_by_name(&file.root, "Alias")[0];
        assert_eq!(alias.meta_str("declarationKind"), Some("alias"));
        assert_eq!(alias.meta_str("aliasOf"), Some("string"));
    }

    #[test]
    fn test_blank_identifier_declares_nothing() {
        let code = "package main\n\nvar _ = register()\nvar _, Count = pair()\n";
        let file = GoParser::new().parse(code, "main.go").unwrap();

        let names: Vec<&str> = find_by_type(&file.root, NodeType::Variable)
            .into_iter()
            .filter_map(|n| n.name())
            .collect();
        assert_eq!(names, vec!["Count"]);
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
    fn test_unclosed_bodies_run_to_end_of_input() {
        let code = "package main\n\nfunc Run() {\n\tif true {\n\t\tgo()\n";
        let file = GoParser::new().parse(code, "main.go").unwrap();

        let run = find_by_name(&file.root, "Run")[0];
        assert_eq!(run.location.end_index, code.len());
        assert!(file.errors.iter().any(|w| w.message.contains("`Run`")));
        assert_spans_match_source(&file);

        let code = "package shapes\n\ntype Point struct {\n\tX int\n\tY int\n";
        let file = GoParser::new().parse(code, "point.go").unwrap();

        let point = find_by_name(&file.root, "Point")[0];
        assert_eq!(point.node_type, NodeType::Struct);
        assert_eq!(point.location.end_index, code.len());
        let fields: Vec<&str> = point.children.iter().filter_map(|f| f.name()).collect();
        assert_eq!(fields, vec!["X", "Y"]);
        assert_spans_match_source(&file);
    }

    #[test]
    fn test_unclosed_parameter_list_skips_only_that_func() {
        let code = "package main\n\nfunc Broken(a int {\n}\n\nfunc Fine() {}\n";
        let file = GoParser::new().parse(code, "main.go").unwrap();

        assert!(find_by_name(&file.root, "Broken").is_empty());
        assert_eq!(find_by_name(&file.root, "Fine").len(), 1);
        assert!(file.errors.iter().any(|w| w.message.contains("`Broken`")));
        assert!(!file.has_errors());
        assert_spans_match_source(&file);
    }

    #[test]
    fn test_unclosed_import_group() {
        let code = "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n";
        let file = GoParser::new().parse(code, "main.go").unwrap();

        let imports: Vec<&str> = find_by_type(&file.root, NodeType::Import)
            .into_iter()
            .filter_map(|i| i.name())
            .collect();
        assert_eq!(imports, vec!["fmt", "os"]);
        assert_eq!(file.errors.len(), 1);
        assert_spans_match_source(&file);
    }
}
