//! # xsdmap
//!
//! A structural reader for XML Schema (XSD) documents.
//!
//! Two independent pipelines:
//!
//! - **Trees**: schema text is parsed into a [`SchemaTree`] whose nodes carry
//!   stable, path-style identifiers, and `ref` nodes are linked to the
//!   definitions they name.
//! - **Groups**: `xs:import`/`xs:include` declarations are pulled straight
//!   from the text of each file in a set, and each file is classified as
//!   master, imported, included or standalone.
//!
//! This is a best-effort structural reader, not a validating XSD processor.
//! Malformed input never fails: it yields no tree, no dependencies, or a
//! standalone role.
//!
//! ## Example
//!
//! ```rust
//! use xsdmap::{classify_roles, parse_schema, FileRole, SchemaFile};
//!
//! let tree = parse_schema(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
//!     <xs:complexType name="Bar">
//!         <xs:sequence><xs:element name="Foo" minOccurs="0"/></xs:sequence>
//!     </xs:complexType>
//! </xs:schema>"#).unwrap();
//! let foo = tree
//!     .find_by_path("/complexType[@name='Bar']/sequence/element[@name='Foo']")
//!     .unwrap();
//! assert_eq!(foo.name, "Foo");
//!
//! let roles = classify_roles(&[
//!     SchemaFile::new("A.xsd", r#"<xs:import schemaLocation="B.xsd"/>"#),
//!     SchemaFile::new("B.xsd", "<xs:schema/>"),
//! ]);
//! assert_eq!(roles["A.xsd"], FileRole::Master);
//! assert_eq!(roles["B.xsd"], FileRole::Imported);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;
pub mod names;

// Input
pub mod documents;
pub mod loaders;

// Schema trees
pub mod tree;

// Multi-file groups
pub mod dependencies;

// Output
pub mod exports;

// Re-exports for convenience
pub use dependencies::{
    classify_roles, extract_dependencies, Dependency, DependencyKind, FileGroup, FileRole,
    SchemaFile,
};
pub use error::{Error, Result};
pub use limits::Limits;
pub use tree::{parse_schema, NodeId, SchemaNode, SchemaParser, SchemaTree};

/// Version of the xsdmap library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
