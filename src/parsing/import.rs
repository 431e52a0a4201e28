//! Import and export projections
//!
//! Flat, language-normalized views of a file's import and export
//! declarations, produced by each parser's `extract_imports` /
//! `extract_exports`.

use crate::types::Location;
use serde::{Deserialize, Serialize};

/// A single name pulled in by an import (`a` or `b as c`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedName {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// TypeScript inline `type` specifier (`import { type A } from 'x'`)
    #[serde(default)]
    pub is_type: bool,
}

impl ImportedName {
    pub fn new(name: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            name: name.into(),
            alias,
            is_type: false,
        }
    }

    /// The identifier this import binds locally.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Represents an import statement in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportInfo {
    /// Module being imported (e.g. "react", "os.path", "java.util.List", "fmt")
    pub source: String,
    /// Default import binding (`import React from 'react'`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_import: Option<String>,
    /// Namespace binding (`* as ns`, `import numpy as np`, Go package alias)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_import: Option<String>,
    #[serde(default)]
    pub names: Vec<ImportedName>,
    /// Whether this is a type-only import (TypeScript: `import type { Foo }`)
    #[serde(default)]
    pub is_type_only: bool,
    /// Java `import static`
    #[serde(default)]
    pub is_static: bool,
    /// Glob imports (`from x import *`, `import a.b.*`, Go dot import)
    #[serde(default)]
    pub is_wildcard: bool,
    pub location: Location,
}

impl ImportInfo {
    pub fn new(source: impl Into<String>, location: Location) -> Self {
        Self {
            source: source.into(),
            default_import: None,
            namespace_import: None,
            names: Vec::new(),
            is_type_only: false,
            is_static: false,
            is_wildcard: false,
            location,
        }
    }

    /// Import executed only for its side effects (`import './styles.css'`).
    pub fn is_side_effect_only(&self) -> bool {
        self.default_import.is_none()
            && self.namespace_import.is_none()
            && self.names.is_empty()
            && !self.is_wildcard
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// `export { a, b as c }`, `__all__` entries
    Named,
    /// `export default ...`
    Default,
    /// Exported declaration (`export function f`, public Java type, Go `Foo`)
    Declaration,
    /// `export { a } from 'x'`, `export * from 'x'`
    ReExport,
    /// `export * as ns from 'x'`
    NamespaceReExport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportInfo {
    /// Name visible to importers (`*` for a bare `export * from`)
    pub name: String,
    /// Local binding when renamed (`export { local as name }`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_name: Option<String>,
    pub kind: ExportKind,
    /// Module re-exported from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub is_type_only: bool,
    pub location: Location,
}

impl ExportInfo {
    pub fn new(name: impl Into<String>, kind: ExportKind, location: Location) -> Self {
        Self {
            name: name.into(),
            local_name: None,
            kind,
            source: None,
            is_type_only: false,
            location,
        }
    }
}
