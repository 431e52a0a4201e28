//! Test: every parser produces trees whose spans slice the source exactly
//!
//! Parses one sample per language through the factory and checks the
//! structural guarantees all trees share: node text equals the source
//! slice of its span, ids are unique, parent links match the structure,
//! and a JSON round trip restores the same tree.

use codeshape::traversal::{
    NodeIndex, VisitResult, find_node_at_location, get_scope_chain, traverse,
};
use codeshape::{NodeType, ParsedFile, ParserFactory};
use std::collections::HashSet;

const SAMPLES: &[(&str, &str)] = &[
    (
        "export class Greeter {\n  greet(name: string): string {\n    return `hi ${name}`;\n  }\n}\n",
        "greeter.ts",
    ),
    (
        "const App = () => <main>{/* é */}</main>;\nexport default App;\n",
        "app.tsx",
    ),
    (
        "function sum(...xs) {\n  return xs.reduce((a, b) => a + b, 0);\n}\nmodule.exports = { sum };\n",
        "sum.js",
    ),
    (
        "import os\n\nclass Café:\n    \"\"\"Ünïcode docs\"\"\"\n    def run(self):\n        return os.getcwd()\n",
        "cafe.py",
    ),
    (
        "package demo;\n\npublic class Main {\n    // naïve\n    public static void main(String[] args) {\n        System.out.println(\"{\");\n    }\n}\n",
        "Main.java",
    ),
    (
        "package main\n\nimport \"fmt\"\n\ntype Point struct {\n    X, Y int\n}\n\nfunc (p Point) String() string {\n    return fmt.Sprintf(\"(%d, %d)\", p.X, p.Y)\n}\n",
        "point.go",
    ),
];

fn parse_all() -> Vec<ParsedFile> {
    let factory = ParserFactory::with_defaults();
    factory
        .parse_files(SAMPLES)
        .into_iter()
        .map(|result| result.expect("sample parses"))
        .collect()
}

#[test]
fn test_node_text_is_the_source_slice() {
    for file in parse_all() {
        let source = file.source.as_str();
        let mut checked = 0;

        traverse(&file.root, |node, _, _| {
            let loc = node.location;
            assert!(loc.start_index <= loc.end_index, "{}: inverted span", file.file_path);
            assert!(loc.end_index <= source.len());
            assert_eq!(
                node.text.as_deref(),
                Some(&source[loc.start_index..loc.end_index]),
                "{}: {} {:?}",
                file.file_path,
                node.node_type,
                node.name
            );
            assert!(loc.start_line >= 1);
            checked += 1;
            VisitResult::Continue
        });

        println!("{}: {checked} nodes checked", file.file_path);
        assert_eq!(file.root.location.start_index, 0);
        assert_eq!(file.root.location.end_index, source.len());
    }
}

#[test]
fn test_ids_are_unique_and_parents_match_structure() {
    for file in parse_all() {
        let mut ids = HashSet::new();
        traverse(&file.root, |node, parent, _| {
            assert!(ids.insert(node.id), "{}: duplicate id {}", file.file_path, node.id);
            assert_eq!(node.parent, parent.map(|p| p.id));
            VisitResult::Continue
        });

        let index = NodeIndex::build(&file.root);
        assert_eq!(ids.len(), file.root.node_count());
        assert!(ids.iter().all(|id| index.contains(*id)));
    }
}

#[test]
fn test_json_round_trip_relinks_parents() {
    for file in parse_all() {
        let json = serde_json::to_string(&file).unwrap();
        assert!(!json.contains("\"parent\""));

        let back = ParsedFile::from_json(&json).unwrap();
        assert_eq!(back.root, file.root, "{}", file.file_path);
        assert_eq!(back.language, file.language);
        assert_eq!(back.source, file.source);
    }
}

#[test]
fn test_location_queries_on_parsed_tree() {
    let factory = ParserFactory::with_defaults();
    let source = "class A {\n  run() {\n    return 1;\n  }\n}\n";
    let file = factory.parse_file(source, "a.ts").unwrap();

    let statement = find_node_at_location(&file.root, 3, 6).unwrap();
    assert_eq!(statement.node_type, NodeType::Statement);

    let chain: Vec<NodeType> = get_scope_chain(&file.root, statement)
        .into_iter()
        .map(|n| n.node_type)
        .collect();
    assert_eq!(
        chain,
        vec![
            NodeType::Block,
            NodeType::Method,
            NodeType::Class,
            NodeType::Program
        ]
    );
}
