use crate::types::{Location, NodeId, NodeType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Open bag of language-specific facts (`exported`, `async`, `parameters`, ...).
pub type Metadata = BTreeMap<String, Value>;

/// A node of the normalized syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: Location,
    #[serde(default)]
    pub children: Vec<AstNode>,
    /// Non-owning back-edge. Never serialized; rebuild with [`AstNode::relink_parents`].
    #[serde(skip)]
    pub parent: Option<NodeId>,
    /// Verbatim source slice for this node's span.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

impl AstNode {
    pub fn new(id: NodeId, node_type: NodeType, location: Location) -> Self {
        Self {
            id,
            node_type,
            name: None,
            location,
            children: Vec::new(),
            parent: None,
            text: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Appends a child and points its back-edge at this node.
    pub fn push_child(&mut self, mut child: AstNode) {
        child.parent = Some(self.id);
        self.children.push(child);
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Boolean metadata flag, `false` when absent or not a bool.
    pub fn meta_bool(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including the node itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(AstNode::node_count).sum::<usize>()
    }

    /// Recomputes every `parent` back-edge below this node.
    ///
    /// Needed after deserialization; the root's own parent is left untouched.
    pub fn relink_parents(&mut self) {
        let id = self.id;
        for child in &mut self.children {
            child.parent = Some(id);
            child.relink_parents();
        }
    }

    /// Clone of this subtree whose root no longer points at its old parent.
    pub fn detached(&self) -> AstNode {
        let mut copy = self.clone();
        copy.parent = None;
        copy.relink_parents();
        copy
    }
}
