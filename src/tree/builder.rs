//! Building a [`SchemaTree`] from schema text
//!
//! Every build owns its arena, so ids restart at zero on each call and
//! independent inputs can be parsed on separate threads.

use tracing::{debug, warn};

use super::resolver::resolve_references;
use super::tag::{read_element, tag_kind, TagInfo};
use super::{NodeId, Reference, SchemaNode, SchemaTree};
use crate::documents::{Document, Element, XmlNode};
use crate::error::{ParseError, Result};
use crate::limits::Limits;

/// Kind of the root element
pub const SCHEMA: &str = "schema";

/// Leading characters of the input quoted in a missing-root error
const SOURCE_SNIPPET_CHARS: usize = 200;

/// Parse schema text into a resolved tree, or `None` if it cannot be read
///
/// Malformed XML and documents without a `schema` root are expected inputs;
/// the cause is logged and `None` returned.
pub fn parse_schema(text: &str) -> Option<SchemaTree> {
    SchemaParser::new().parse(text)
}

/// Configurable schema parser
#[derive(Debug, Clone)]
pub struct SchemaParser {
    limits: Limits,
    resolve_references: bool,
}

impl SchemaParser {
    /// Create a parser with default limits that resolves references
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            resolve_references: true,
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set whether `ref` nodes are resolved after building
    pub fn with_resolve_references(mut self, resolve: bool) -> Self {
        self.resolve_references = resolve;
        self
    }

    /// Parse, folding every failure into `None`
    pub fn parse(&self, text: &str) -> Option<SchemaTree> {
        match self.try_parse(text) {
            Ok(tree) => Some(tree),
            Err(e) => {
                debug!("Could not parse schema: {}", e);
                None
            }
        }
    }

    /// Parse, reporting why a tree could not be built
    pub fn try_parse(&self, text: &str) -> Result<SchemaTree> {
        let mut tree = build_tree(text, &self.limits)?;
        if self.resolve_references {
            resolve_references(&mut tree);
        }
        Ok(tree)
    }
}

impl Default for SchemaParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an unresolved tree from schema text
pub fn build_tree(text: &str, limits: &Limits) -> Result<SchemaTree> {
    let doc = Document::parse_with_limits(text, limits).map_err(|e| {
        warn!("Malformed schema text: {}", e);
        e
    })?;

    let schema = doc.elements().find(|e| tag_kind(e) == SCHEMA).ok_or_else(|| {
        let found: Vec<&str> = doc.elements().map(|e| e.name.as_str()).collect();
        let snippet: String = text.trim_start().chars().take(SOURCE_SNIPPET_CHARS).collect();
        ParseError::new("No schema root element found")
            .with_location(format!("top-level elements: [{}]", found.join(", ")))
            .with_source(snippet)
    })?;

    let nodes = TreeBuilder::default().build(schema);
    debug!("Built schema tree with {} nodes", nodes.len());

    Ok(SchemaTree::from_nodes(nodes))
}

/// Path of a node given its parent's path
///
/// `parent/kind`, or `parent/kind[@name='value']` when the node has a `name`
/// (or failing that a `ref`) attribute.
pub fn node_path(parent_path: &str, tag: &TagInfo) -> String {
    match identifying_attribute(tag) {
        Some(id) => format!("{}/{}[@name='{}']", parent_path, tag.kind, id),
        None => format!("{}/{}", parent_path, tag.kind),
    }
}

fn identifying_attribute(tag: &TagInfo) -> Option<&str> {
    tag.attributes
        .get("name")
        .or_else(|| tag.attributes.get("ref"))
        .map(|s| s.as_str())
}

#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<SchemaNode>,
}

impl TreeBuilder {
    /// Walk the schema element in document order with an explicit work stack
    ///
    /// Nesting depth only grows the heap-allocated stack, never the call stack.
    fn build(mut self, schema: &Element) -> Vec<SchemaNode> {
        let mut pending: Vec<(&Element, Option<NodeId>)> = vec![(schema, None)];

        while let Some((element, parent)) = pending.pop() {
            let id = self.insert(element, parent);
            // Reversed so the first child is popped next.
            pending.extend(
                element
                    .children
                    .iter()
                    .rev()
                    .filter_map(XmlNode::as_element)
                    .map(|child| (child, Some(id))),
            );
        }

        self.nodes
    }

    /// Allocate a node and link it under its parent
    ///
    /// The root keeps the empty path regardless of its attributes.
    fn insert(&mut self, element: &Element, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let tag = read_element(element);
        let path = match parent {
            Some(p) => node_path(&self.nodes[p.0].path, &tag),
            None => String::new(),
        };
        let name = identifying_attribute(&tag).unwrap_or_default().to_string();
        let reference = tag.attributes.get("ref").map(|r| Reference {
            name: r.clone(),
            resolved_target_path: None,
        });

        self.nodes.push(SchemaNode {
            id,
            name,
            kind: tag.kind,
            path,
            attributes: tag.attributes,
            documentation: tag.documentation,
            children: Vec::new(),
            parent,
            reference,
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }

        id
    }
}
