//! Text-level extraction of `xs:import` / `xs:include` declarations
//!
//! This works on raw text, not on the parsed tree, so it also covers files
//! that are not well-formed and can run before any file of an upload set is
//! parsed.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::trace;

static IMPORT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*xsd?:import\b[^>]*>").unwrap());

static INCLUDE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*xsd?:include\b[^>]*>").unwrap());

static SCHEMA_LOCATION_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\sschemaLocation\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

static NAMESPACE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\snamespace\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// Import or include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// `xs:import`, a schema for another namespace
    Import,
    /// `xs:include`, a schema for the same namespace
    Include,
}

impl DependencyKind {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::Import => "import",
            DependencyKind::Include => "include",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared dependency of a schema file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// Import or include
    #[serde(rename = "type")]
    pub kind: DependencyKind,
    /// `schemaLocation` value as written
    pub schema_location: String,
    /// `namespace` value, imports only
    pub namespace: Option<String>,
}

impl Dependency {
    /// Final `/`-separated segment of the schema location
    pub fn file_name(&self) -> &str {
        file_name_of(&self.schema_location)
    }
}

/// Final `/`-separated segment of a location, taken verbatim
pub fn file_name_of(location: &str) -> &str {
    match location.rfind('/') {
        Some(i) => &location[i + 1..],
        None => location,
    }
}

/// Extract every import, then every include, each in source order
///
/// Declarations without a non-blank `schemaLocation` are dropped.
pub fn extract_dependencies(text: &str) -> Vec<Dependency> {
    let mut dependencies = scan(text, &IMPORT_TAG, DependencyKind::Import);
    dependencies.extend(scan(text, &INCLUDE_TAG, DependencyKind::Include));
    dependencies
}

fn scan(text: &str, tag: &Regex, kind: DependencyKind) -> Vec<Dependency> {
    tag.find_iter(text)
        .filter_map(|m| {
            let tag_text = m.as_str();
            let Some(schema_location) = attribute_value(&SCHEMA_LOCATION_ATTR, tag_text)
                .filter(|v| !v.trim().is_empty())
            else {
                trace!("Dropping {} without schemaLocation: {}", kind, tag_text);
                return None;
            };
            let namespace = match kind {
                DependencyKind::Import => attribute_value(&NAMESPACE_ATTR, tag_text),
                DependencyKind::Include => None,
            };
            Some(Dependency {
                kind,
                schema_location,
                namespace,
            })
        })
        .collect()
}

fn attribute_value(pattern: &Regex, tag_text: &str) -> Option<String> {
    pattern
        .captures(tag_text)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
}
