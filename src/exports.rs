//! JSON export of trees and role maps
//!
//! The nested tree layout is what the storage and display layers persist:
//! one object per node with its children inlined.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::dependencies::FileRole;
use crate::error::Result;
use crate::tree::{NodeId, SchemaTree};

/// Nested view of one node
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExport<'a> {
    /// Node id
    pub id: NodeId,
    /// Declared name
    pub name: &'a str,
    /// Unprefixed tag name
    pub kind: &'a str,
    /// Structural path
    pub path: &'a str,
    /// Attributes in document order
    pub attributes: &'a IndexMap<String, String>,
    /// Documentation text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<&'a str>,
    /// Whether the node is a `ref` node
    pub is_reference: bool,
    /// Raw `ref` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_name: Option<&'a str>,
    /// Path of the resolved definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_target_path: Option<&'a str>,
    /// Child nodes
    pub children: Vec<NodeExport<'a>>,
}

impl<'a> NodeExport<'a> {
    /// Build the nested view of `id` and everything below it
    ///
    /// Built with an explicit stack of open nodes, so construction depth does
    /// not follow document depth.
    pub fn new(tree: &'a SchemaTree, id: NodeId) -> Self {
        let mut open = Vec::new();
        let mut current = Self::open(tree, id);

        loop {
            if let Some(&child) = current.1.next() {
                let parent = std::mem::replace(&mut current, Self::open(tree, child));
                open.push(parent);
                continue;
            }
            match open.pop() {
                Some(mut parent) => {
                    parent.0.children.push(current.0);
                    current = parent;
                }
                None => return current.0,
            }
        }
    }

    /// One node without children, paired with the children still to visit
    fn open(tree: &'a SchemaTree, id: NodeId) -> (Self, std::slice::Iter<'a, NodeId>) {
        let node = &tree[id];
        let export = Self {
            id: node.id,
            name: &node.name,
            kind: &node.kind,
            path: &node.path,
            attributes: &node.attributes,
            documentation: node.documentation.as_deref(),
            is_reference: node.is_reference(),
            reference_name: node.reference_name(),
            resolved_target_path: node.resolved_target_path(),
            children: Vec::with_capacity(node.children.len()),
        };
        (export, node.children.iter())
    }
}

/// Nested JSON value for a whole tree
pub fn tree_to_json(tree: &SchemaTree) -> Result<Value> {
    Ok(serde_json::to_value(NodeExport::new(tree, tree.root_id()))?)
}

/// Serialize a whole tree to a JSON string
pub fn tree_to_json_string(tree: &SchemaTree, pretty: bool) -> Result<String> {
    let export = NodeExport::new(tree, tree.root_id());
    let json = if pretty {
        serde_json::to_string_pretty(&export)?
    } else {
        serde_json::to_string(&export)?
    };
    Ok(json)
}

/// JSON object mapping file name to role
pub fn roles_to_json(roles: &IndexMap<String, FileRole>) -> Result<Value> {
    Ok(serde_json::to_value(roles)?)
}
