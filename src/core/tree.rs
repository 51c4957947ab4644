//! Directory tree model and traversal.
//!
//! The tree mixes groups and documents. Group ids and document ids come
//! from separate sequences, so lookups can be filtered by [`NodeType`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Kind of a tree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "GROUP", alias = "group")]
    Group,
    #[serde(rename = "DOCUMENT", alias = "document")]
    Document,
}

/// A node of the directory tree as returned by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryNode {
    pub id: i64,
    pub node_type: NodeType,
    pub name: String,
    #[serde(default)]
    pub children: Vec<DirectoryNode>,
    #[serde(default)]
    pub sort_index: Option<i64>,
    #[serde(default)]
    pub doc_type: Option<String>,
}

impl DirectoryNode {
    pub fn is_group(&self) -> bool {
        self.node_type == NodeType::Group
    }
}

/// Response of `GET /api/directory-tree`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TreeSnapshot {
    #[serde(default)]
    pub tree: Vec<DirectoryNode>,
    #[serde(default)]
    pub cached: bool,
}

/// Result of a tree lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a DirectoryNode),
    NotFound,
}

impl<'a> Lookup<'a> {
    pub fn node(self) -> Option<&'a DirectoryNode> {
        match self {
            Self::Found(node) => Some(node),
            Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Depth-first search for the first node matching `pred`.
pub fn find_node<'a>(
    nodes: &'a [DirectoryNode],
    pred: &impl Fn(&DirectoryNode) -> bool,
) -> Lookup<'a> {
    for node in nodes {
        if pred(node) {
            return Lookup::Found(node);
        }
        if let Lookup::Found(found) = find_node(&node.children, pred) {
            return Lookup::Found(found);
        }
    }
    Lookup::NotFound
}

/// Find a node by id, optionally restricted to one node type.
pub fn find_by_id(nodes: &[DirectoryNode], id: i64, node_type: Option<NodeType>) -> Lookup<'_> {
    find_node(nodes, &|node| {
        node.id == id && node_type.is_none_or(|t| t == node.node_type)
    })
}

/// All nodes in depth-first pre-order.
pub fn flatten(nodes: &[DirectoryNode]) -> Vec<&DirectoryNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&DirectoryNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.children.iter().rev());
    }
    out
}

/// Chain of nodes from a root down to the node matching `id`/`node_type`.
///
/// Empty when the node is not in the tree.
pub fn node_path(nodes: &[DirectoryNode], id: i64, node_type: NodeType) -> Vec<&DirectoryNode> {
    fn walk<'a>(
        nodes: &'a [DirectoryNode],
        id: i64,
        node_type: NodeType,
        path: &mut Vec<&'a DirectoryNode>,
    ) -> bool {
        for node in nodes {
            path.push(node);
            if (node.id == id && node.node_type == node_type)
                || walk(&node.children, id, node_type, path)
            {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    walk(nodes, id, node_type, &mut path);
    path
}

/// Filtered copy of the tree plus the groups that should be expanded to
/// reveal the matches.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredTree {
    pub nodes: Vec<DirectoryNode>,
    pub expand: BTreeSet<i64>,
}

/// Keep nodes whose name contains `keyword` (case-insensitive) along with
/// their ancestors. A matching group keeps its whole subtree.
///
/// A blank keyword returns the tree unchanged.
pub fn filter_by_keyword(nodes: &[DirectoryNode], keyword: &str) -> FilteredTree {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return FilteredTree {
            nodes: nodes.to_vec(),
            expand: BTreeSet::new(),
        };
    }

    fn filter(
        nodes: &[DirectoryNode],
        needle: &str,
        expand: &mut BTreeSet<i64>,
    ) -> Vec<DirectoryNode> {
        let mut kept = Vec::new();
        for node in nodes {
            if node.name.to_lowercase().contains(needle) {
                kept.push(node.clone());
                continue;
            }
            let children = filter(&node.children, needle, expand);
            if !children.is_empty() {
                if node.is_group() {
                    expand.insert(node.id);
                }
                kept.push(DirectoryNode {
                    children,
                    ..node.clone()
                });
            }
        }
        kept
    }

    let mut expand = BTreeSet::new();
    let nodes = filter(nodes, &needle, &mut expand);
    FilteredTree { nodes, expand }
}

/// Sibling order after moving a node among the siblings of its own type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reorder {
    /// Group holding the siblings; `None` at the top level.
    pub parent_id: Option<i64>,
    pub ids: Vec<i64>,
}

/// Move the node `offset` places up (negative) or down among siblings of
/// the same type. `None` when it is missing or would leave the list.
pub fn shifted_order(
    nodes: &[DirectoryNode],
    id: i64,
    node_type: NodeType,
    offset: isize,
) -> Option<Reorder> {
    let path = node_path(nodes, id, node_type);
    let (siblings, parent_id) = match path.len() {
        0 => return None,
        1 => (nodes, None),
        len => (path[len - 2].children.as_slice(), Some(path[len - 2].id)),
    };

    let mut ids: Vec<i64> = siblings
        .iter()
        .filter(|node| node.node_type == node_type)
        .map(|node| node.id)
        .collect();
    let from = ids.iter().position(|&sibling| sibling == id)?;
    let to = from.checked_add_signed(offset).filter(|&to| to < ids.len())?;
    if from == to {
        return None;
    }
    let moved = ids.remove(from);
    ids.insert(to, moved);
    Some(Reorder { parent_id, ids })
}
