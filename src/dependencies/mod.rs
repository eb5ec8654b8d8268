//! Multi-file dependency analysis
//!
//! Dependencies are read from raw text ([`extract`]) and used to classify
//! each file of a group as master, imported, included or standalone
//! ([`roles`]). Nothing here looks at the parsed tree.

pub mod extract;
pub mod roles;

pub use extract::{extract_dependencies, file_name_of, Dependency, DependencyKind};
pub use roles::{
    classify_file, classify_roles, FileGroup, FileRole, MissingDependency, Relationship,
    SchemaFile,
};
