//! Language parser factory with configuration-based registration.
//!
//! Parsers are registered once at startup, keyed by lowercased language
//! name, and looked up by language or by file extension afterwards. The
//! factory is read-only after construction and can be shared across threads.

use super::language::dotted_extension;
use super::{
    ExportInfo, GoParser, ImportInfo, JavaParser, Language, LanguageParser, PythonParser,
    TypeScriptParser,
};
use crate::ast::{AstNode, ExtractedSymbol, ParsedFile};
use crate::error::{ParseError, ParseResult};
use crate::Settings;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

/// The closed set of concrete parsers.
///
/// TypeScript and JavaScript share one implementation that differs only in
/// the grammar it loads.
#[derive(Debug, Clone, Copy)]
pub enum SourceParser {
    TypeScript(TypeScriptParser),
    Python(PythonParser),
    Java(JavaParser),
    Go(GoParser),
}

impl SourceParser {
    /// Default parser for `language`
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::TypeScript => Self::TypeScript(TypeScriptParser::typescript()),
            Language::JavaScript => Self::TypeScript(TypeScriptParser::javascript()),
            Language::Python => Self::Python(PythonParser::new()),
            Language::Java => Self::Java(JavaParser::new()),
            Language::Go => Self::Go(GoParser::new()),
        }
    }
}

impl From<TypeScriptParser> for SourceParser {
    fn from(parser: TypeScriptParser) -> Self {
        Self::TypeScript(parser)
    }
}

impl From<PythonParser> for SourceParser {
    fn from(parser: PythonParser) -> Self {
        Self::Python(parser)
    }
}

impl From<JavaParser> for SourceParser {
    fn from(parser: JavaParser) -> Self {
        Self::Java(parser)
    }
}

impl From<GoParser> for SourceParser {
    fn from(parser: GoParser) -> Self {
        Self::Go(parser)
    }
}

/// Forwards a call to the concrete parser held by the variant.
macro_rules! delegate {
    ($self:ident, $parser:ident => $call:expr) => {
        match $self {
            SourceParser::TypeScript($parser) => $call,
            SourceParser::Python($parser) => $call,
            SourceParser::Java($parser) => $call,
            SourceParser::Go($parser) => $call,
        }
    };
}

impl LanguageParser for SourceParser {
    fn language(&self) -> Language {
        delegate!(self, parser => parser.language())
    }

    fn extensions(&self) -> &'static [&'static str] {
        delegate!(self, parser => parser.extensions())
    }

    fn parse(&self, source: &str, file_path: &str) -> ParseResult<ParsedFile> {
        delegate!(self, parser => parser.parse(source, file_path))
    }

    fn serialize(&self, node: &AstNode) -> String {
        delegate!(self, parser => parser.serialize(node))
    }

    fn extract_imports(&self, root: &AstNode) -> Vec<ImportInfo> {
        delegate!(self, parser => parser.extract_imports(root))
    }

    fn extract_exports(&self, root: &AstNode) -> Vec<ExportInfo> {
        delegate!(self, parser => parser.extract_exports(root))
    }

    fn traverse_for_symbols(
        &self,
        node: &AstNode,
        parent_name: Option<&str>,
        symbols: &mut Vec<ExtractedSymbol>,
    ) {
        delegate!(self, parser => parser.traverse_for_symbols(node, parent_name, symbols))
    }
}

/// Registry of parsers with extension-based dispatch.
#[derive(Debug, Default)]
pub struct ParserFactory {
    parsers: HashMap<String, SourceParser>,
    extra_extensions: HashMap<String, Language>,
}

impl ParserFactory {
    /// Empty factory; nothing is registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with a parser registered for every supported language
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        for language in Language::ALL {
            factory.register_parser(SourceParser::for_language(language));
        }
        factory
    }

    /// Registers parsers for the languages enabled in `settings` and adds
    /// the configured extension aliases.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut factory = Self::new();
        for language in Language::ALL {
            if settings.is_language_enabled(language) {
                factory.register_parser(SourceParser::for_language(language));
            }
        }
        for (ext, language) in settings.extension_overrides() {
            factory.extra_extensions.insert(ext, language);
        }

        info!(
            "Parser factory ready: {} languages, {} extra extensions",
            factory.parsers.len(),
            factory.extra_extensions.len()
        );
        factory
    }

    /// Stores `parser` under its language's lowercased name, replacing any
    /// parser already registered for that language.
    pub fn register_parser(&mut self, parser: impl Into<SourceParser>) {
        let parser = parser.into();
        let key = parser.language().name().to_lowercase();
        debug!("Registering {key} parser");
        self.parsers.insert(key, parser);
    }

    /// Maps an additional extension (with or without the dot) to `language`
    pub fn register_extension(&mut self, ext: &str, language: Language) {
        let ext = format!(".{}", ext.trim_start_matches('.').to_lowercase());
        self.extra_extensions.insert(ext, language);
    }

    pub fn get_parser(&self, language: Language) -> Option<&SourceParser> {
        self.parsers.get(&language.name().to_lowercase())
    }

    /// Parser for `file_path`, by static extension table first, then by
    /// configured aliases. `None` when the extension maps to nothing
    /// registered.
    pub fn get_parser_for_file(&self, file_path: &str) -> Option<&SourceParser> {
        let ext = dotted_extension(file_path)?;
        let language = Language::from_extension(&ext)
            .or_else(|| self.extra_extensions.get(&ext).copied())?;
        self.get_parser(language)
    }

    /// Registered languages, sorted
    pub fn get_supported_languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> =
            self.parsers.values().map(LanguageParser::language).collect();
        languages.sort();
        languages
    }

    /// Parse `source` with the parser registered for `file_path`'s extension
    pub fn parse_file(&self, source: &str, file_path: &str) -> ParseResult<ParsedFile> {
        let parser = self
            .get_parser_for_file(file_path)
            .ok_or_else(|| ParseError::NoParser {
                path: file_path.to_string(),
                extension: dotted_extension(file_path).unwrap_or_default(),
            })?;
        parser.parse(source, file_path)
    }

    /// Parse a batch of `(source, path)` pairs in parallel. Results come
    /// back in input order.
    pub fn parse_files<S, P>(&self, files: &[(S, P)]) -> Vec<ParseResult<ParsedFile>>
    where
        S: AsRef<str> + Sync,
        P: AsRef<str> + Sync,
    {
        files
            .par_iter()
            .map(|(source, path)| self.parse_file(source.as_ref(), path.as_ref()))
            .collect()
    }
}
