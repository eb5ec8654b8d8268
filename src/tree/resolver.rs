//! Linking `ref` nodes to the definitions they name
//!
//! Resolution runs in two passes: the whole tree is indexed first, so a
//! reference that appears before its definition still resolves.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::{NodeId, SchemaTree};
use crate::names::local_name;

/// Name index over the definitions of one tree
///
/// Each definition is registered as `kind:name`, where a later definition
/// replaces an earlier one, and as bare `name`, where the first one stays.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    entries: HashMap<String, NodeId>,
}

impl NameIndex {
    /// Index every named, non-reference node of a tree
    pub fn build(tree: &SchemaTree) -> Self {
        let mut entries = HashMap::new();
        for node in tree.definitions() {
            let Some(name) = node.attribute("name") else {
                continue;
            };
            entries.insert(qualified_key(&node.kind, name), node.id);
            entries.entry(name.to_string()).or_insert(node.id);
        }
        Self { entries }
    }

    /// Look up a reference by kind, falling back to the bare name
    ///
    /// Any prefix on `reference` is dropped first.
    pub fn lookup(&self, kind: &str, reference: &str) -> Option<NodeId> {
        let name = local_name(reference);
        self.entries
            .get(&qualified_key(kind, name))
            .or_else(|| self.entries.get(name))
            .copied()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was indexed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn qualified_key(kind: &str, name: &str) -> String {
    format!("{}:{}", kind, name)
}

/// Outcome of a resolution run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    /// References that found a target
    pub resolved: usize,
    /// References left dangling
    pub unresolved: usize,
}

/// Resolve every reference node of a tree in place
///
/// Targets are recorded as paths; misses leave the target unset. Running it
/// again recomputes every target from scratch.
pub fn resolve_references(tree: &mut SchemaTree) -> ResolutionSummary {
    let index = NameIndex::build(tree);

    let targets: Vec<(NodeId, Option<String>)> = tree
        .references()
        .filter_map(|node| {
            let name = node.reference_name()?;
            let target = index
                .lookup(&node.kind, name)
                .map(|target| tree[target].path.clone());
            if target.is_none() {
                trace!("Unresolved reference '{}' at {}", name, node.path);
            }
            Some((node.id, target))
        })
        .collect();

    let mut summary = ResolutionSummary::default();
    let nodes = tree.nodes_mut();
    for (id, target) in targets {
        if target.is_some() {
            summary.resolved += 1;
        } else {
            summary.unresolved += 1;
        }
        if let Some(reference) = nodes[id.0].reference.as_mut() {
            reference.resolved_target_path = target;
        }
    }

    debug!(
        "Resolved {} references, {} unresolved",
        summary.resolved, summary.unresolved
    );
    summary
}
