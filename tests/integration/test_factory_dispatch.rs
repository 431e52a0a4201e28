//! Test: extension dispatch through the parser factory

use anyhow::Result;
use codeshape::{Language, LanguageParser, ParseError, ParserFactory, Settings};

#[test]
fn test_every_extension_dispatches_to_its_language() {
    let factory = ParserFactory::with_defaults();

    for language in Language::ALL {
        for ext in language.extensions() {
            let path = format!("src/sample{ext}");
            let parser = factory
                .get_parser_for_file(&path)
                .unwrap_or_else(|| panic!("no parser for {path}"));
            assert_eq!(parser.language(), language, "{path}");
        }
    }

    // Extension lookup ignores case
    let parser = factory.get_parser_for_file("Legacy.JAVA").unwrap();
    assert_eq!(parser.language(), Language::Java);
}

#[test]
fn test_unknown_extension_is_an_error() {
    let factory = ParserFactory::with_defaults();

    let err = factory.parse_file("fn main() {}", "main.rs").unwrap_err();
    match &err {
        ParseError::NoParser { path, extension } => {
            assert_eq!(path, "main.rs");
            assert_eq!(extension, ".rs");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("main.rs"));

    assert!(factory.get_parser_for_file("Makefile").is_none());
}

#[test]
fn test_disabled_language_is_not_dispatched() {
    let mut settings = Settings::default();
    settings
        .languages
        .get_mut("python")
        .expect("python is configured by default")
        .enabled = false;
    let factory = ParserFactory::from_settings(&settings);

    assert!(factory.get_parser(Language::Python).is_none());
    assert!(factory.parse_file("x = 1\n", "x.py").is_err());
    assert!(factory.get_parser(Language::Go).is_some());
}

#[test]
fn test_registered_extension_alias() -> Result<()> {
    let mut factory = ParserFactory::with_defaults();
    assert!(factory.get_parser_for_file("answer.es6").is_none());
    factory.register_extension(".ES6", Language::JavaScript);

    let file = factory.parse_file("export const answer = 42;\n", "answer.es6")?;
    assert_eq!(file.language, Language::JavaScript);
    assert_eq!(file.root.children.len(), 1);
    Ok(())
}

#[test]
fn test_parse_files_keeps_input_order() -> Result<()> {
    let factory = ParserFactory::with_defaults();
    let files = vec![
        ("def a(): pass\n".to_string(), "a.py".to_string()),
        ("package b\n".to_string(), "b.go".to_string()),
        ("class C {}\n".to_string(), "C.java".to_string()),
        ("let d = 1;\n".to_string(), "d.mjs".to_string()),
    ];

    let parsed = factory
        .parse_files(&files)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let languages: Vec<Language> = parsed.iter().map(|f| f.language).collect();
    assert_eq!(
        languages,
        vec![Language::Python, Language::Go, Language::Java, Language::JavaScript]
    );
    assert_eq!(parsed[3].file_path, "d.mjs");
    Ok(())
}
