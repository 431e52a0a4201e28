//! Tree traversal and query utilities
//!
//! Pure functions over an already-built tree. Nothing here mutates nodes or
//! caches state between calls; ancestor queries build a [`NodeIndex`] from
//! the root on demand.

use crate::ast::AstNode;
use crate::types::{NodeId, NodeType};
use std::collections::{HashMap, VecDeque};

/// What a visitor wants done after seeing a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitResult {
    Continue,
    /// Skip this node's subtree; siblings are still visited
    SkipChildren,
}

/// Pre-order depth-first walk. The visitor receives `(node, parent, depth)`
/// with the root at depth 0.
pub fn traverse<'a, F>(root: &'a AstNode, mut visitor: F)
where
    F: FnMut(&'a AstNode, Option<&'a AstNode>, usize) -> VisitResult,
{
    fn walk<'a, F>(node: &'a AstNode, parent: Option<&'a AstNode>, depth: usize, visitor: &mut F)
    where
        F: FnMut(&'a AstNode, Option<&'a AstNode>, usize) -> VisitResult,
    {
        if visitor(node, parent, depth) == VisitResult::SkipChildren {
            return;
        }
        for child in &node.children {
            walk(child, Some(node), depth + 1, visitor);
        }
    }

    walk(root, None, 0, &mut visitor);
}

/// Breadth-first walk with the same visitor contract as [`traverse`]
pub fn traverse_bfs<'a, F>(root: &'a AstNode, mut visitor: F)
where
    F: FnMut(&'a AstNode, Option<&'a AstNode>, usize) -> VisitResult,
{
    let mut queue = VecDeque::from([(root, None, 0)]);

    while let Some((node, parent, depth)) = queue.pop_front() {
        if visitor(node, parent, depth) == VisitResult::SkipChildren {
            continue;
        }
        queue.extend(
            node.children
                .iter()
                .map(|child| (child, Some(node), depth + 1)),
        );
    }
}

/// Every node matching `predicate`, in pre-order
pub fn find_nodes<'a>(root: &'a AstNode, predicate: impl Fn(&AstNode) -> bool) -> Vec<&'a AstNode> {
    let mut found = Vec::new();
    traverse(root, |node, _, _| {
        if predicate(node) {
            found.push(node);
        }
        VisitResult::Continue
    });
    found
}

/// First pre-order node matching `predicate`; the walk stops there
pub fn find_node<'a>(
    root: &'a AstNode,
    predicate: impl Fn(&AstNode) -> bool,
) -> Option<&'a AstNode> {
    fn search<'a>(node: &'a AstNode, predicate: &dyn Fn(&AstNode) -> bool) -> Option<&'a AstNode> {
        if predicate(node) {
            return Some(node);
        }
        node.children.iter().find_map(|child| search(child, predicate))
    }

    search(root, &predicate)
}

pub fn find_by_type(root: &AstNode, node_type: NodeType) -> Vec<&AstNode> {
    find_nodes(root, |node| node.node_type == node_type)
}

pub fn find_by_name<'a>(root: &'a AstNode, name: &str) -> Vec<&'a AstNode> {
    find_nodes(root, |node| node.name() == Some(name))
}

/// Id lookup table for a tree: node by id, and each node's parent id.
///
/// Parent ids come from the tree's structure, so the index is correct even
/// for trees whose `parent` fields were never relinked.
#[derive(Debug)]
pub struct NodeIndex<'a> {
    nodes: HashMap<NodeId, &'a AstNode>,
    parents: HashMap<NodeId, NodeId>,
}

impl<'a> NodeIndex<'a> {
    pub fn build(root: &'a AstNode) -> Self {
        let mut nodes = HashMap::new();
        let mut parents = HashMap::new();
        traverse(root, |node, parent, _| {
            nodes.insert(node.id, node);
            if let Some(parent) = parent {
                parents.insert(node.id, parent.id);
            }
            VisitResult::Continue
        });
        Self { nodes, parents }
    }

    pub fn get(&self, id: NodeId) -> Option<&'a AstNode> {
        self.nodes.get(&id).copied()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<&'a AstNode> {
        self.parents.get(&id).and_then(|parent| self.get(*parent))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<&'a AstNode> {
        let mut ancestors = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            ancestors.push(parent);
            current = parent.id;
        }
        ancestors
    }
}

/// Ancestors of `node` inside `root`, parent first and root last
pub fn get_ancestors<'a>(root: &'a AstNode, node: &AstNode) -> Vec<&'a AstNode> {
    NodeIndex::build(root).ancestors(node.id)
}

/// Every node below `node`, pre-order, excluding `node` itself
pub fn get_descendants(node: &AstNode) -> Vec<&AstNode> {
    let mut descendants = Vec::new();
    traverse(node, |current, _, depth| {
        if depth > 0 {
            descendants.push(current);
        }
        VisitResult::Continue
    });
    descendants
}

fn parent_in<'a>(root: &'a AstNode, node: &AstNode) -> Option<&'a AstNode> {
    find_node(root, |candidate| {
        candidate.children.iter().any(|child| child.id == node.id)
    })
}

/// The other children of `node`'s parent. Empty for the root.
pub fn get_siblings<'a>(root: &'a AstNode, node: &AstNode) -> Vec<&'a AstNode> {
    parent_in(root, node)
        .map(|parent| {
            parent
                .children
                .iter()
                .filter(|child| child.id != node.id)
                .collect()
        })
        .unwrap_or_default()
}

pub fn get_next_sibling<'a>(root: &'a AstNode, node: &AstNode) -> Option<&'a AstNode> {
    let parent = parent_in(root, node)?;
    let position = parent.children.iter().position(|child| child.id == node.id)?;
    parent.children.get(position + 1)
}

pub fn get_previous_sibling<'a>(root: &'a AstNode, node: &AstNode) -> Option<&'a AstNode> {
    let parent = parent_in(root, node)?;
    let position = parent.children.iter().position(|child| child.id == node.id)?;
    position.checked_sub(1).and_then(|i| parent.children.get(i))
}

/// Distance from `root` (depth 0). `None` when `node` is not in the tree.
pub fn get_node_depth(root: &AstNode, node: &AstNode) -> Option<usize> {
    let index = NodeIndex::build(root);
    index
        .contains(node.id)
        .then(|| index.ancestors(node.id).len())
}

/// Deepest node whose span contains the point (1-based line, 0-based
/// column). Later pre-order visits overwrite earlier ones.
pub fn find_node_at_location(root: &AstNode, line: u32, column: u32) -> Option<&AstNode> {
    let mut found = None;
    traverse(root, |node, _, _| {
        if node.location.contains_point(line, column) {
            found = Some(node);
        }
        VisitResult::Continue
    });
    found
}

/// Scope-introducing nodes enclosing `node`, innermost first. `node` itself
/// leads the chain when it opens a scope.
pub fn get_scope_chain<'a>(root: &'a AstNode, node: &AstNode) -> Vec<&'a AstNode> {
    let index = NodeIndex::build(root);
    let Some(start) = index.get(node.id) else {
        return Vec::new();
    };

    std::iter::once(start)
        .chain(index.ancestors(node.id))
        .filter(|candidate| candidate.node_type.is_scope())
        .collect()
}
