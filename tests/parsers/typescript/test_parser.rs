#[cfg(test)]
mod tests {
    use codeshape::parsing::{LanguageParser, TypeScriptParser};
    use codeshape::traversal::{find_by_name, find_by_type};
    use codeshape::{ExportKind, NodeType, Visibility};

    const WIDGET: &str = r#"import React, { useState, type FC } from 'react';
import * as path from "path";
import './styles.css';

export interface Props extends Base<string> {
  title: string;
  onClose?(): void;
}

export type Id = string | number;

export default class Widget extends Component<Props> implements Disposable {
  private readonly count: number = 0;
  static #secret = 1;

  constructor(props: Props) {
    super(props);
  }

  async load(path: string, ...rest: string[]): Promise<void> {
    await fetch(path);
  }

  @memo
  get size(): number {
    return this.count;
  }
}

export const helper = (x: number) => x * 2, LIMIT = 10;
const local = 1;
export { local as renamed };
export * from './types';

@sealed
class Registry {}

function inner() {
  const nested = 2;
  return nested;
}
"#;

    fn parse() -> codeshape::ParsedFile {
        TypeScriptParser::typescript()
            .parse(WIDGET, "widget.ts")
            .unwrap()
    }

    #[test]
    fn test_module_outline() {
        let file = parse();

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
                (NodeType::Import, "react"),
                (NodeType::Import, "path"),
                (NodeType::Import, "./styles.css"),
                (NodeType::Export, ""),
                (NodeType::Export, ""),
                (NodeType::Export, ""),
                (NodeType::Export, ""),
                (NodeType::Variable, "local"),
                (NodeType::Export, ""),
                (NodeType::Export, ""),
                (NodeType::Class, "Registry"),
                (NodeType::Function, "inner"),
            ]
        );
        assert!(file.errors.is_empty(), "{:?}", file.errors);

        let interface = &file.root.children[3].children[0];
        assert_eq!(interface.node_type, NodeType::Interface);
        assert_eq!(interface.name(), Some("Props"));
        assert!(interface.meta_bool("exported"));
        assert_eq!(interface.metadata["bases"][0], "Base<string>");
    }

    #[test]
    fn test_class_heritage_and_members() {
        let file = parse();
        let widget = find_by_name(&file.root, "Widget")[0];

        assert_eq!(widget.node_type, NodeType::Class);
        assert!(widget.meta_bool("exported"));
        assert!(widget.meta_bool("default"));
        assert_eq!(widget.metadata["bases"][0], "Component<Props>");
        assert_eq!(widget.metadata["implements"][0], "Disposable");

        let members: Vec<(NodeType, &str)> = widget
            .children
            .iter()
            .filter(|n| matches!(n.node_type, NodeType::Property | NodeType::Method))
            .map(|n| (n.node_type, n.name().unwrap_or("")))
            .collect();
        assert_eq!(
            members,
            vec![
                (NodeType::Property, "count"),
                (NodeType::Property, "#secret"),
                (NodeType::Method, "constructor"),
                (NodeType::Method, "load"),
                (NodeType::Method, "size"),
            ]
        );

        let count = find_by_name(&file.root, "count")[0];
        assert_eq!(count.meta_str("visibility"), Some("private"));
        assert!(count.meta_bool("readonly"));

        let secret = find_by_name(&file.root, "#secret")[0];
        assert_eq!(secret.meta_str("visibility"), Some("private"));
        assert!(secret.meta_bool("static"));

        let constructor = find_by_name(&file.root, "constructor")[0];
        assert!(constructor.meta_bool("constructor"));

        let size = find_by_name(&file.root, "size")[0];
        assert_eq!(size.meta_str("accessor"), Some("get"));
        assert_eq!(size.metadata["decorators"][0], "@memo");
    }

    #[test]
    fn test_method_metadata() {
        let parser = TypeScriptParser::typescript();
        let file = parse();
        let symbols = parser.extract_symbols(&file.root);

        let load = symbols.iter().find(|s| s.name == "load").unwrap();
        assert_eq!(load.kind, NodeType::Method);
        assert!(load.is_async);
        assert_eq!(load.parent_name.as_deref(), Some("Widget"));
        assert_eq!(load.visibility, Visibility::Public);
        assert_eq!(load.return_type.as_deref(), Some("Promise<void>"));
        assert_eq!(load.parameters.len(), 2);
        assert_eq!(load.parameters[0].type_annotation.as_deref(), Some("string"));
        assert_eq!(load.parameters[1].name, "rest");
        assert!(load.parameters[1].variadic);
        assert_eq!(load.parameters[1].type_annotation.as_deref(), Some("string[]"));

        let on_close = symbols.iter().find(|s| s.name == "onClose").unwrap();
        assert_eq!(on_close.parent_name.as_deref(), Some("Props"));
    }

    #[test]
    fn test_symbols_skip_locals_and_function_variables() {
        let parser = TypeScriptParser::typescript();
        let file = parse();
        let symbols = parser.extract_symbols(&file.root);

        assert!(symbols.iter().all(|s| s.name != "nested"));

        let helpers: Vec<NodeType> = symbols
            .iter()
            .filter(|s| s.name == "helper")
            .map(|s| s.kind)
            .collect();
        assert_eq!(helpers, vec![NodeType::ArrowFunction]);

        let helper = symbols.iter().find(|s| s.name == "helper").unwrap();
        assert!(helper.exported);
        assert_eq!(helper.parameters[0].name, "x");

        let limit = symbols.iter().find(|s| s.name == "LIMIT").unwrap();
        assert_eq!(limit.kind, NodeType::Variable);
        assert!(limit.exported);

        let local = symbols.iter().find(|s| s.name == "local").unwrap();
        assert!(!local.exported);

        let inner = symbols.iter().find(|s| s.name == "inner").unwrap();
        assert!(!inner.exported);
        assert_eq!(inner.visibility, Visibility::Private);
    }

    #[test]
    fn test_imports() {
        let parser = TypeScriptParser::typescript();
        let file = parse();
        let imports = parser.extract_imports(&file.root);

        assert_eq!(imports.len(), 3);
        let react = &imports[0];
        assert_eq!(react.default_import.as_deref(), Some("React"));
        let names: Vec<&str> = react.names.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["useState", "FC"]);
        assert!(react.names[1].is_type);

        assert_eq!(imports[1].namespace_import.as_deref(), Some("path"));
        assert!(imports[2].is_side_effect_only());
    }

    #[test]
    fn test_exports() {
        let parser = TypeScriptParser::typescript();
        let file = parse();
        let exports = parser.extract_exports(&file.root);

        let summary: Vec<(&str, ExportKind)> =
            exports.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        println!("exports: {summary:?}");
        assert_eq!(
            summary,
            vec![
                ("Props", ExportKind::Declaration),
                ("Id", ExportKind::Declaration),
                ("default", ExportKind::Default),
                ("helper", ExportKind::Declaration),
                ("LIMIT", ExportKind::Declaration),
                ("renamed", ExportKind::Named),
                ("*", ExportKind::ReExport),
            ]
        );
        assert!(exports[0].is_type_only);
        assert_eq!(exports[2].local_name.as_deref(), Some("Widget"));
        assert_eq!(exports[5].local_name.as_deref(), Some("local"));
        assert_eq!(exports[6].source.as_deref(), Some("./types"));
    }

    #[test]
    fn test_decorators_and_calls() {
        let file = parse();

        let decorators: Vec<&str> = find_by_type(&file.root, NodeType::Decorator)
            .into_iter()
            .filter_map(|d| d.name())
            .collect();
        assert!(decorators.contains(&"memo"));
        assert!(decorators.contains(&"sealed"));

        let registry = find_by_name(&file.root, "Registry")[0];
        assert_eq!(registry.metadata["decorators"][0], "@sealed");

        let calls: Vec<&str> = find_by_type(&file.root, NodeType::CallExpression)
            .into_iter()
            .filter_map(|c| c.name())
            .collect();
        assert!(calls.contains(&"super"));
        assert!(calls.contains(&"fetch"));
    }

    #[test]
    fn test_tsx_grammar_for_tsx_files() {
        let code = "export const App = ({ title }: { title: string }) => <div className=\"x\">{title}</div>;\n";
        let file = TypeScriptParser::typescript().parse(code, "App.tsx").unwrap();

        assert!(file.errors.is_empty(), "{:?}", file.errors);
        let app = find_by_type(&file.root, NodeType::ArrowFunction)[0];
        assert_eq!(app.name(), Some("App"));
        assert!(app.meta_bool("exported"));
    }

    #[test]
    fn test_javascript_dialect() {
        let code = "const add = function (a, b = 1) { return a + b; };\n\
                    class Point extends Base {}\n\
                    module.exports = { add };\n";
        let parser = TypeScriptParser::javascript();
        let file = parser.parse(code, "math.js").unwrap();

        assert_eq!(file.language, codeshape::Language::JavaScript);
        assert!(file.errors.is_empty(), "{:?}", file.errors);

        let add = find_by_type(&file.root, NodeType::Function)[0];
        assert_eq!(add.name(), Some("add"));
        let symbols = parser.extract_symbols(&file.root);
        let add = symbols.iter().find(|s| s.kind == NodeType::Function).unwrap();
        assert_eq!(add.parameters.len(), 2);
        assert_eq!(add.parameters[1].name, "b");
        assert_eq!(add.parameters[1].default_value.as_deref(), Some("1"));

        let point = find_by_name(&file.root, "Point")[0];
        assert_eq!(point.metadata["bases"][0], "Base");
    }

    #[test]
    fn test_syntax_errors_are_reported_not_fatal() {
        let code = "export function ok() {}\nconst = ;\n";
        let file = TypeScriptParser::typescript().parse(code, "broken.ts").unwrap();

        assert!(!file.errors.is_empty());
        assert!(!find_by_name(&file.root, "ok").is_empty());
    }
}
