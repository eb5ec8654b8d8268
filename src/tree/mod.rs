//! Schema node tree
//!
//! A parsed schema is held in a [`SchemaTree`] arena. Nodes are stored in
//! document (pre-)order and addressed by [`NodeId`]; parent links are ids, so
//! the arena is the single owner of every node.
//!
//! Each node carries a path built from its ancestors' kinds and identifying
//! attributes (see [`builder::node_path`]). Paths are stable across re-parses
//! of the same text and serve as anchors for comments and search results.
//! Two anonymous siblings of the same kind share a path; lookups then return
//! the first in document order.

pub mod builder;
pub mod resolver;
pub mod tag;

pub use builder::{build_tree, node_path, parse_schema, SchemaParser};
pub use resolver::{resolve_references, NameIndex, ResolutionSummary};
pub use tag::{read_tag, TagInfo};

use indexmap::IndexMap;
use serde::Serialize;
use std::ops::Index;

/// Index of a node within one [`SchemaTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in document order
    pub fn index(self) -> usize {
        self.0
    }
}

/// `ref` annotation of a reference node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Raw `ref` attribute value, prefix included
    pub name: String,
    /// Path of the definition the reference points to, once resolved
    pub resolved_target_path: Option<String>,
}

/// One element of a parsed schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Identifier, unique within one parse
    pub id: NodeId,
    /// `name` attribute, else `ref` attribute, else empty
    pub name: String,
    /// Tag name with any `xs:`/`xsd:` prefix removed
    pub kind: String,
    /// Structural path, empty for the root
    pub path: String,
    /// Attributes in document order
    pub attributes: IndexMap<String, String>,
    /// Text of the first annotation/documentation child
    pub documentation: Option<String>,
    /// Child nodes in document order
    pub children: Vec<NodeId>,
    /// Parent node, `None` for the root
    pub parent: Option<NodeId>,
    /// Set when the node carries a `ref` attribute
    pub reference: Option<Reference>,
}

impl SchemaNode {
    /// Get an attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Whether the node carries a `ref` attribute
    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// The raw `ref` value
    pub fn reference_name(&self) -> Option<&str> {
        self.reference.as_ref().map(|r| r.name.as_str())
    }

    /// Path of the resolved definition
    pub fn resolved_target_path(&self) -> Option<&str> {
        self.reference
            .as_ref()
            .and_then(|r| r.resolved_target_path.as_deref())
    }

    /// A named, non-reference node: something a `ref` can point to
    pub fn is_definition(&self) -> bool {
        !self.is_reference() && self.attributes.contains_key("name")
    }

    /// Annotation and documentation nodes, which most consumers skip
    pub fn is_annotation(&self) -> bool {
        self.kind == tag::ANNOTATION || self.kind == tag::DOCUMENTATION
    }
}

/// Summary counts over a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    /// Total number of nodes
    pub node_count: usize,
    /// Node count per kind, in order of first appearance
    pub kinds: IndexMap<String, usize>,
    /// Number of reference nodes
    pub references: usize,
    /// Reference nodes without a resolved target
    pub unresolved: usize,
}

/// Arena holding every node of one parsed schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaTree {
    nodes: Vec<SchemaNode>,
}

impl SchemaTree {
    pub(crate) fn from_nodes(nodes: Vec<SchemaNode>) -> Self {
        debug_assert!(!nodes.is_empty());
        Self { nodes }
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [SchemaNode] {
        &mut self.nodes
    }

    /// Id of the root (`schema`) node
    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// The root (`schema`) node
    pub fn root(&self) -> &SchemaNode {
        &self.nodes[0]
    }

    /// Get a node by id
    pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in document order
    pub fn iter(&self) -> std::slice::Iter<'_, SchemaNode> {
        self.nodes.iter()
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<&SchemaNode> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    /// Children of a node in document order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &SchemaNode> {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.get(*c))
    }

    /// Children without annotation/documentation nodes
    pub fn structural_children(&self, id: NodeId) -> impl Iterator<Item = &SchemaNode> {
        self.children(id).filter(|n| !n.is_annotation())
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &SchemaNode> {
        std::iter::successors(self.parent(id), move |n| self.parent(n.id))
    }

    /// Descendants of a node in document order, excluding the node itself
    pub fn descendants(&self, id: NodeId) -> Vec<&SchemaNode> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(id) {
            Some(n) => n.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            if let Some(node) = self.get(next) {
                out.push(node);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Find the first node (in document order) with the given path
    pub fn find_by_path(&self, path: &str) -> Option<&SchemaNode> {
        self.nodes.iter().find(|n| n.path == path)
    }

    /// Case-insensitive substring search over names and documentation
    pub fn search(&self, query: &str) -> Vec<&SchemaNode> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.nodes
            .iter()
            .filter(|n| {
                n.name.to_lowercase().contains(&needle)
                    || n
                        .documentation
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Nodes a reference could resolve to
    pub fn definitions(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.iter().filter(|n| n.is_definition())
    }

    /// All reference nodes
    pub fn references(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.iter().filter(|n| n.is_reference())
    }

    /// Reference nodes whose target was not found in this tree
    pub fn unresolved_references(&self) -> impl Iterator<Item = &SchemaNode> {
        self.references()
            .filter(|n| n.resolved_target_path().is_none())
    }

    /// Summary counts
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            node_count: self.nodes.len(),
            ..TreeStats::default()
        };
        for node in &self.nodes {
            *stats.kinds.entry(node.kind.clone()).or_insert(0) += 1;
            if node.is_reference() {
                stats.references += 1;
                if node.resolved_target_path().is_none() {
                    stats.unresolved += 1;
                }
            }
        }
        stats
    }
}

impl Index<NodeId> for SchemaTree {
    type Output = SchemaNode;

    fn index(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }
}

impl<'a> IntoIterator for &'a SchemaTree {
    type Item = &'a SchemaNode;
    type IntoIter = std::slice::Iter<'a, SchemaNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Bar">
    <xs:annotation><xs:documentation>A bar record</xs:documentation></xs:annotation>
    <xs:sequence>
      <xs:element name="Foo" minOccurs="0"/>
      <xs:element ref="Baz"/>
      <xs:element ref="Missing"/>
    </xs:sequence>
  </xs:complexType>
  <xs:element name="Baz" type="xs:string"/>
</xs:schema>"#;

    fn tree() -> SchemaTree {
        parse_schema(SCHEMA).unwrap()
    }

    #[test]
    fn test_root_and_ids() {
        let tree = tree();
        assert_eq!(tree.root().kind, "schema");
        assert_eq!(tree.root().path, "");
        assert!(tree.root().parent.is_none());
        for (i, node) in tree.iter().enumerate() {
            assert_eq!(node.id.index(), i);
        }
    }

    #[test]
    fn test_parent_and_children() {
        let tree = tree();
        let foo = tree
            .find_by_path("/complexType[@name='Bar']/sequence/element[@name='Foo']")
            .unwrap();
        let seq = tree.parent(foo.id).unwrap();
        assert_eq!(seq.kind, "sequence");
        assert_eq!(tree.children(seq.id).count(), 3);

        let kinds: Vec<&str> = tree.ancestors(foo.id).map(|n| n.kind.as_str()).collect();
        assert_eq!(kinds, vec!["sequence", "complexType", "schema"]);
    }

    #[test]
    fn test_structural_children_skip_annotations() {
        let tree = tree();
        let bar = tree.find_by_path("/complexType[@name='Bar']").unwrap();
        assert_eq!(tree.children(bar.id).count(), 2);
        let kinds: Vec<&str> = tree
            .structural_children(bar.id)
            .map(|n| n.kind.as_str())
            .collect();
        assert_eq!(kinds, vec!["sequence"]);
        assert_eq!(bar.documentation.as_deref(), Some("A bar record"));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let tree = tree();
        let bar = tree.find_by_path("/complexType[@name='Bar']").unwrap();
        let kinds: Vec<&str> = tree
            .descendants(bar.id)
            .iter()
            .map(|n| n.kind.as_str())
            .collect();
        assert_eq!(
            kinds,
            vec!["annotation", "documentation", "sequence", "element", "element", "element"]
        );
    }

    #[test]
    fn test_search() {
        let tree = tree();
        let hits: Vec<&str> = tree.search("BA").iter().map(|n| n.path.as_str()).collect();
        assert_eq!(
            hits,
            vec![
                "/complexType[@name='Bar']",
                "/complexType[@name='Bar']/sequence/element[@name='Baz']",
                "/element[@name='Baz']",
            ]
        );
        assert!(tree.search("record").iter().any(|n| n.kind == "complexType"));
        assert!(tree.search("   ").is_empty());
    }

    #[test]
    fn test_stats() {
        let stats = tree().stats();
        assert_eq!(stats.node_count, 9);
        assert_eq!(stats.kinds.get("element"), Some(&4));
        assert_eq!(stats.references, 2);
        assert_eq!(stats.unresolved, 1);
    }

    #[test]
    fn test_unresolved_references() {
        let tree = tree();
        let names: Vec<&str> = tree
            .unresolved_references()
            .filter_map(|n| n.reference_name())
            .collect();
        assert_eq!(names, vec!["Missing"]);
        assert_eq!(tree.definitions().count(), 3);
    }

    #[test]
    fn test_index_by_id() {
        let tree = tree();
        let id = tree.root().children[0];
        assert_eq!(tree[id].name, "Bar");
        assert!(tree.get(NodeId(999)).is_none());
    }
}
