#[cfg(test)]
mod tests {
    use codeshape::parsing::{JavaParser, LanguageParser};
    use codeshape::traversal::{VisitResult, find_by_name, find_by_type, traverse};
    use codeshape::{ExportKind, NodeType, ParsedFile, Visibility};

    const ORDER_SERVICE: &str = r#"package com.example.shop;

import java.util.List;
import static java.util.Objects.requireNonNull;
import java.util.concurrent.*;

/**
 * Order service. { not a brace }
 */
@Service
public class OrderService extends BaseService<Order> implements Runnable, AutoCloseable {
    private static final int LIMIT = 10;
    protected List<Order> orders;

    public OrderService(List<Order> orders) {
        this.orders = orders;
    }

    @Override
    public void run() {
        for (Order order : orders) {
            if (order.isOpen()) {
                process(order);
            }
        }
    }

    private static <T> List<T> copy(List<T> items, String... tags) throws Exception {
        String text = "}";
        return items;
    }

    public void close() {}
}

interface Repository<T> {
    T find(long id);
    default int size() { return 0; }
}
"#;

    #[test]
    fn test_class_outline() {
        let file = JavaParser::new()
            .parse(ORDER_SERVICE, "OrderService.java")
            .unwrap();

        let kinds: Vec<NodeType> = file.root.children.iter().map(|n| n.node_type).collect();
        println!("top level: {kinds:?}");
        assert_eq!(
            kinds,
            vec![
                NodeType::Package,
                NodeType::Import,
                NodeType::Import,
                NodeType::Import,
                NodeType::Class,
                NodeType::Interface,
            ]
        );

        let class = &file.root.children[4];
        assert_eq!(class.name(), Some("OrderService"));
        assert_eq!(class.location.start_line, 10, "class span starts at its annotation");
        assert_eq!(class.location.end_line, 34);
        assert_eq!(class.meta_str("visibility"), Some("public"));
        assert!(class.meta_bool("exported"));
        assert_eq!(class.metadata["bases"][0], "BaseService<Order>");
        assert_eq!(class.metadata["implements"][1], "AutoCloseable");
        assert_eq!(class.metadata["decorators"][0], "@Service");

        let members: Vec<(NodeType, &str)> = class
            .children
            .iter()
            .map(|n| (n.node_type, n.name().unwrap_or("")))
            .collect();
        assert_eq!(
            members,
            vec![
                (NodeType::Property, "LIMIT"),
                (NodeType::Property, "orders"),
                (NodeType::Method, "OrderService"),
                (NodeType::Method, "run"),
                (NodeType::Method, "copy"),
                (NodeType::Method, "close"),
            ]
        );
    }

    #[test]
    fn test_nested_braces_end_at_outer_brace() {
        let file = JavaParser::new()
            .parse(ORDER_SERVICE, "OrderService.java")
            .unwrap();
        let run = find_by_name(&file.root, "run")[0];

        assert_eq!(run.location.start_line, 19);
        assert_eq!(run.location.end_line, 26);
        assert!(run.text.as_deref().unwrap().trim_end().ends_with('}'));
        assert_eq!(run.metadata["decorators"][0], "@Override");
    }

    #[test]
    fn test_string_braces_do_not_close_bodies() {
        let file = JavaParser::new()
            .parse(ORDER_SERVICE, "OrderService.java")
            .unwrap();
        let copy = find_by_name(&file.root, "copy")[0];

        assert_eq!(copy.location.end_line, 31);
        assert_eq!(copy.meta_str("typeParameters"), Some("<T>"));
        assert_eq!(copy.meta_str("returnType"), Some("List<T>"));
        assert!(copy.meta_bool("static"));
        assert_eq!(copy.meta_str("visibility"), Some("private"));
    }

    #[test]
    fn test_members_and_symbols() {
        let parser = JavaParser::new();
        let file = parser.parse(ORDER_SERVICE, "OrderService.java").unwrap();
        let symbols = parser.extract_symbols(&file.root);

        let constructor = symbols
            .iter()
            .find(|s| s.name == "OrderService" && s.kind == NodeType::Method)
            .unwrap();
        assert_eq!(constructor.parent_name.as_deref(), Some("OrderService"));
        assert_eq!(constructor.parameters[0].type_annotation.as_deref(), Some("List<Order>"));

        let copy = symbols.iter().find(|s| s.name == "copy").unwrap();
        assert_eq!(copy.parameters.len(), 2);
        assert!(copy.parameters[1].variadic);
        assert_eq!(copy.parameters[1].type_annotation.as_deref(), Some("String"));

        let orders = symbols.iter().find(|s| s.name == "orders").unwrap();
        assert_eq!(orders.visibility, Visibility::Protected);
        assert!(!orders.exported);

        let limit = symbols.iter().find(|s| s.name == "LIMIT").unwrap();
        assert!(limit.is_static);
        assert_eq!(limit.visibility, Visibility::Private);
    }

    #[test]
    fn test_interface_members() {
        let file = JavaParser::new()
            .parse(ORDER_SERVICE, "OrderService.java")
            .unwrap();
        let repository = &file.root.children[5];

        assert_eq!(repository.name(), Some("Repository"));
        assert_eq!(repository.meta_str("visibility"), Some("package"));
        assert!(!repository.meta_bool("exported"));

        let find = &repository.children[0];
        assert_eq!(find.name(), Some("find"));
        assert!(find.meta_bool("abstract"));
        assert_eq!(find.meta_str("visibility"), Some("public"));

        let size = &repository.children[1];
        assert_eq!(size.name(), Some("size"));
        assert!(!size.meta_bool("abstract"));
        assert!(size.meta_bool("defaultMethod"));
    }

    #[test]
    fn test_imports_and_exports() {
        let parser = JavaParser::new();
        let file = parser.parse(ORDER_SERVICE, "OrderService.java").unwrap();

        let imports = parser.extract_imports(&file.root);
        assert_eq!(imports.len(), 3);
        assert_eq!(imports[0].source, "java.util.List");
        assert_eq!(imports[0].names[0].name, "List");
        assert!(imports[1].is_static);
        assert_eq!(imports[1].source, "java.util.Objects.requireNonNull");
        assert!(imports[2].is_wildcard);
        assert_eq!(imports[2].source, "java.util.concurrent");

        let exports = parser.extract_exports(&file.root);
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].name, "OrderService");
        assert_eq!(exports[0].kind, ExportKind::Declaration);
    }

    #[test]
    fn test_enum_and_record() {
        let code = "public enum Color { RED, GREEN; public boolean warm() { return this == RED; } }\n\
                    public record Point(int x, int y) {}\n";
        let file = JavaParser::new().parse(code, "Shapes.java").unwrap();

        let color = &file.root.children[0];
        assert_eq!(color.node_type, NodeType::Class);
        assert_eq!(color.meta_str("declarationKind"), Some("enum"));
        assert_eq!(color.children.len(), 1);
        assert_eq!(color.children[0].name(), Some("warm"));

        let point = &file.root.children[1];
        assert_eq!(point.meta_str("declarationKind"), Some("record"));
        assert_eq!(point.metadata["parameters"].as_array().unwrap().len(), 2);
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
    fn test_unclosed_parameter_list_stays_inside_its_class() {
        let code = "class A {\n  void f(int x {\n  }\n}\nclass B { void g() { h(1)); } }\n";
        let file = JavaParser::new().parse(code, "Broken.java").unwrap();

        let classes: Vec<&str> = find_by_type(&file.root, NodeType::Class)
            .into_iter()
            .filter_map(|c| c.name())
            .collect();
        assert_eq!(classes, vec!["A", "B"]);
        assert_eq!(file.root.children[0].location.end_line, 4);
        assert!(file.root.children[0].children.is_empty());
        assert_eq!(find_by_name(&file.root, "g").len(), 1);

        println!("warnings: {:?}", file.errors);
        assert!(!file.has_errors());
        assert!(file.errors.iter().any(|w| w.message.contains("`f`")));
        assert_spans_match_source(&file);
    }

    #[test]
    fn test_unclosed_record_and_constructor_headers() {
        let record = "class A {\n  record R(int a {\n  }\n}\nint z = (1));\n";
        let file = JavaParser::new().parse(record, "Record.java").unwrap();
        assert!(find_by_name(&file.root, "R").is_empty());
        assert_eq!(find_by_name(&file.root, "A").len(), 1);
        assert!(file.errors.iter().any(|w| w.message.contains("`R`")));
        assert_spans_match_source(&file);

        let constructor = "class A {\n  A(int x {\n  }\n}\nclass B { B() { f(1)); } }\n";
        let file = JavaParser::new().parse(constructor, "Ctor.java").unwrap();
        assert_eq!(find_by_type(&file.root, NodeType::Class).len(), 2);
        assert!(!file.errors.is_empty());
        assert_spans_match_source(&file);
    }

    #[test]
    fn test_unclosed_class_body_runs_to_end_of_input() {
        let code = "public class Open {\n    int count = 0;\n    void run() {\n        count++;\n";
        let file = JavaParser::new().parse(code, "Open.java").unwrap();

        let open = find_by_name(&file.root, "Open")[0];
        assert_eq!(open.location.end_index, code.len());
        let run = find_by_name(&file.root, "run")[0];
        assert_eq!(run.location.end_index, code.len());
        assert_eq!(find_by_name(&file.root, "count")[0].node_type, NodeType::Property);

        assert_eq!(file.errors.len(), 2);
        assert_spans_match_source(&file);
    }
}
