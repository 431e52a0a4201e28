use super::AstNode;
use crate::types::{Location, NodeType, Visibility};
use serde::{Deserialize, Serialize};

/// One entry of a callable's parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_annotation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub variadic: bool,
}

impl ParameterInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Flat projection of a declaration, for callers that don't walk trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedSymbol {
    pub name: String,
    pub kind: NodeType,
    pub location: Location,
    pub visibility: Visibility,
    pub exported: bool,
    pub is_async: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub parameters: Vec<ParameterInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Name of the enclosing class/struct/interface for members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
}

impl ExtractedSymbol {
    /// Builds a symbol from the metadata conventions shared by all parsers.
    ///
    /// Returns `None` for anonymous nodes. `visibility` metadata wins when
    /// present; otherwise the `exported` flag decides public vs private.
    pub fn from_node(node: &AstNode, parent_name: Option<&str>) -> Option<Self> {
        let name = node.name.clone()?;
        let exported = node.meta_bool("exported");
        let visibility = node
            .meta_str("visibility")
            .and_then(|v| v.parse().ok())
            .unwrap_or(if exported {
                Visibility::Public
            } else {
                Visibility::Private
            });
        let parameters = node
            .metadata
            .get("parameters")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        Some(Self {
            name,
            kind: node.node_type,
            location: node.location,
            visibility,
            exported,
            is_async: node.meta_bool("async"),
            is_static: node.meta_bool("static"),
            is_abstract: node.meta_bool("abstract"),
            parameters,
            return_type: node.meta_str("returnType").map(str::to_string),
            parent_name: parent_name.map(str::to_string),
        })
    }
}
