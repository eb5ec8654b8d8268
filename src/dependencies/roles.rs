//! Role of each file within a group of related schema files
//!
//! A file that references others but is referenced by none is the master.
//! A referenced file is imported or included according to the first file in
//! the group (in the order given) that declares it. Everything else is
//! standalone. The result therefore depends on the order of the input set;
//! callers wanting reproducible roles must supply a stable order.
//!
//! Cycles need no special handling: every file in a cycle is referenced, so
//! none of them is the master.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, trace};

use super::extract::{extract_dependencies, Dependency, DependencyKind};

/// One file of a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFile {
    /// File name as uploaded, matched against dependency file names
    pub filename: String,
    /// Raw schema text
    pub content: String,
    /// Set when the uploader marked this file as the master
    pub explicit_master: bool,
}

impl SchemaFile {
    /// Create a file without a master flag
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            explicit_master: false,
        }
    }

    /// Set the explicit master flag
    pub fn with_explicit_master(mut self, master: bool) -> Self {
        self.explicit_master = master;
        self
    }
}

/// Role of a file within its group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    /// References other files and is referenced by none
    Master,
    /// First referenced through an import
    Imported,
    /// First referenced through an include
    Included,
    /// Neither references nor is referenced
    Standalone,
}

impl FileRole {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRole::Master => "master",
            FileRole::Imported => "imported",
            FileRole::Included => "included",
            FileRole::Standalone => "standalone",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DependencyKind> for FileRole {
    fn from(kind: DependencyKind) -> Self {
        match kind {
            DependencyKind::Import => FileRole::Imported,
            DependencyKind::Include => FileRole::Included,
        }
    }
}

/// A file that declares a dependency on another
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    /// Name of the declaring file
    pub referrer: String,
    /// How it declares the dependency
    pub kind: DependencyKind,
}

/// A dependency whose file is not part of the group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDependency {
    /// Name of the declaring file
    pub filename: String,
    /// The dangling dependency
    pub dependency: Dependency,
}

#[derive(Debug, Clone)]
struct GroupEntry {
    file: SchemaFile,
    dependencies: Vec<Dependency>,
}

/// A fixed set of schema files with their extracted dependencies
#[derive(Debug, Clone)]
pub struct FileGroup {
    entries: Vec<GroupEntry>,
}

impl FileGroup {
    /// Build a group, extracting each file's dependencies once
    pub fn new(files: impl IntoIterator<Item = SchemaFile>) -> Self {
        let entries = files
            .into_iter()
            .map(|file| {
                let dependencies = extract_dependencies(&file.content);
                GroupEntry { file, dependencies }
            })
            .collect();
        Self { entries }
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the group has no files
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Files in input order
    pub fn files(&self) -> impl Iterator<Item = &SchemaFile> {
        self.entries.iter().map(|e| &e.file)
    }

    /// Dependencies extracted from a file
    pub fn dependencies_of(&self, filename: &str) -> Option<&[Dependency]> {
        self.position(filename)
            .map(|i| self.entries[i].dependencies.as_slice())
    }

    /// Role of a file, `None` if it is not in the group
    pub fn role_of(&self, filename: &str) -> Option<FileRole> {
        self.position(filename).map(|i| self.classify(i))
    }

    /// Role of every file, keyed by file name in input order
    pub fn roles(&self) -> IndexMap<String, FileRole> {
        (0..self.entries.len())
            .map(|i| (self.entries[i].file.filename.clone(), self.classify(i)))
            .collect()
    }

    /// Every declaration of `filename` by another file, in group order
    ///
    /// Unlike [`FileGroup::role_of`] this keeps all relationships, so a file
    /// imported by one file and included by another shows both.
    pub fn relationships(&self, filename: &str) -> Vec<Relationship> {
        self.referrers(self.position(filename), filename)
            .flat_map(|entry| {
                entry
                    .dependencies
                    .iter()
                    .filter(move |d| d.file_name() == filename)
                    .map(move |d| Relationship {
                        referrer: entry.file.filename.clone(),
                        kind: d.kind,
                    })
            })
            .collect()
    }

    /// Dependencies that point at no file of the group
    pub fn missing_dependencies(&self) -> Vec<MissingDependency> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .dependencies
                    .iter()
                    .filter(move |d| self.position(d.file_name()).is_none())
                    .map(move |d| MissingDependency {
                        filename: entry.file.filename.clone(),
                        dependency: d.clone(),
                    })
            })
            .collect()
    }

    /// Partition the group into sets of files linked by dependencies
    ///
    /// Groups are ordered by their first file; files keep input order.
    pub fn connected_groups(&self) -> Vec<Vec<String>> {
        let mut components = DisjointSet::new(self.entries.len());
        for (i, entry) in self.entries.iter().enumerate() {
            for dep in &entry.dependencies {
                if let Some(j) = self.position(dep.file_name()) {
                    components.union(i, j);
                }
            }
        }

        let mut groups: IndexMap<usize, Vec<String>> = IndexMap::new();
        for (i, entry) in self.entries.iter().enumerate() {
            groups
                .entry(components.find(i))
                .or_default()
                .push(entry.file.filename.clone());
        }
        groups.into_values().collect()
    }

    fn position(&self, filename: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.file.filename == filename)
    }

    /// Entries other than `target` that declare `filename`
    fn referrers<'a>(
        &'a self,
        target: Option<usize>,
        filename: &'a str,
    ) -> impl Iterator<Item = &'a GroupEntry> + 'a {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(j, _)| Some(*j) != target)
            .map(|(_, entry)| entry)
            .filter(move |entry| entry.dependencies.iter().any(|d| d.file_name() == filename))
    }

    fn classify(&self, index: usize) -> FileRole {
        let entry = &self.entries[index];
        let filename = entry.file.filename.as_str();

        if entry.file.explicit_master {
            trace!("{} flagged as master", filename);
            return FileRole::Master;
        }

        let references_others = !entry.dependencies.is_empty();
        let first_reference = self.referrers(Some(index), filename).find_map(|other| {
            other
                .dependencies
                .iter()
                .find(|d| d.file_name() == filename)
        });

        let role = match (references_others, first_reference) {
            (_, Some(dep)) => FileRole::from(dep.kind),
            (true, None) => FileRole::Master,
            (false, None) => FileRole::Standalone,
        };
        debug!("{} classified as {}", filename, role);
        role
    }
}

/// Classify every file of a set
pub fn classify_roles(files: &[SchemaFile]) -> IndexMap<String, FileRole> {
    FileGroup::new(files.iter().cloned()).roles()
}

/// Classify one file against a set; `None` if it is not in the set
pub fn classify_file(filename: &str, files: &[SchemaFile]) -> Option<FileRole> {
    FileGroup::new(files.iter().cloned()).role_of(filename)
}

/// Union-find over file indices
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        // Lower index stays the representative.
        if ra < rb {
            self.parent[rb] = ra;
        } else if rb < ra {
            self.parent[ra] = rb;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn import(location: &str) -> String {
        format!(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:import namespace="urn:{0}" schemaLocation="{0}"/></xs:schema>"#,
            location
        )
    }

    fn include(location: &str) -> String {
        format!(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:include schemaLocation="{}"/></xs:schema>"#,
            location
        )
    }

    const EMPTY: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#;

    #[test]
    fn test_master_and_imported() {
        let files = vec![
            SchemaFile::new("A.xsd", import("B.xsd")),
            SchemaFile::new("B.xsd", EMPTY),
        ];
        let roles = classify_roles(&files);
        assert_eq!(roles["A.xsd"], FileRole::Master);
        assert_eq!(roles["B.xsd"], FileRole::Imported);
    }

    #[test]
    fn test_included() {
        let files = vec![
            SchemaFile::new("A.xsd", include("types/B.xsd")),
            SchemaFile::new("B.xsd", EMPTY),
        ];
        assert_eq!(classify_file("B.xsd", &files), Some(FileRole::Included));
        assert_eq!(classify_file("A.xsd", &files), Some(FileRole::Master));
        assert_eq!(classify_file("C.xsd", &files), None);
    }

    #[test]
    fn test_standalone() {
        let files = vec![
            SchemaFile::new("A.xsd", EMPTY),
            SchemaFile::new("B.xsd", "not even xml"),
        ];
        let roles = classify_roles(&files);
        assert!(roles.values().all(|r| *r == FileRole::Standalone));
    }

    #[test]
    fn test_dangling_dependency_still_master() {
        let files = vec![SchemaFile::new("A.xsd", import("elsewhere.xsd"))];
        assert_eq!(classify_roles(&files)["A.xsd"], FileRole::Master);
    }

    #[test]
    fn test_self_reference_is_not_referenced() {
        let files = vec![SchemaFile::new("A.xsd", include("A.xsd"))];
        assert_eq!(classify_roles(&files)["A.xsd"], FileRole::Master);
    }

    #[test]
    fn test_cycle_has_no_master() {
        let files = vec![
            SchemaFile::new("A.xsd", import("B.xsd")),
            SchemaFile::new("B.xsd", import("C.xsd")),
            SchemaFile::new("C.xsd", import("A.xsd")),
        ];
        let roles = classify_roles(&files);
        assert!(roles.values().all(|r| *r == FileRole::Imported));
    }

    #[test]
    fn test_first_referrer_wins() {
        let files = vec![
            SchemaFile::new("A.xsd", include("C.xsd")),
            SchemaFile::new("B.xsd", import("C.xsd")),
            SchemaFile::new("C.xsd", EMPTY),
        ];
        assert_eq!(classify_roles(&files)["C.xsd"], FileRole::Included);

        let reversed: Vec<SchemaFile> = files.iter().rev().cloned().collect();
        assert_eq!(classify_roles(&reversed)["C.xsd"], FileRole::Imported);
    }

    #[test]
    fn test_relationships_report_every_referrer() {
        let group = FileGroup::new(vec![
            SchemaFile::new("A.xsd", include("C.xsd")),
            SchemaFile::new("B.xsd", import("C.xsd")),
            SchemaFile::new("C.xsd", EMPTY),
        ]);
        assert_eq!(
            group.relationships("C.xsd"),
            vec![
                Relationship {
                    referrer: "A.xsd".to_string(),
                    kind: DependencyKind::Include
                },
                Relationship {
                    referrer: "B.xsd".to_string(),
                    kind: DependencyKind::Import
                },
            ]
        );
        assert!(group.relationships("A.xsd").is_empty());
    }

    #[test]
    fn test_explicit_master_override() {
        let files = vec![
            SchemaFile::new("A.xsd", import("B.xsd")),
            SchemaFile::new("B.xsd", EMPTY).with_explicit_master(true),
        ];
        let roles = classify_roles(&files);
        assert_eq!(roles["B.xsd"], FileRole::Master);
        assert_eq!(roles["A.xsd"], FileRole::Master);
    }

    #[test]
    fn test_missing_dependencies() {
        let group = FileGroup::new(vec![
            SchemaFile::new("A.xsd", import("B.xsd")),
            SchemaFile::new("B.xsd", include("gone.xsd")),
        ]);
        let missing = group.missing_dependencies();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].filename, "B.xsd");
        assert_eq!(missing[0].dependency.schema_location, "gone.xsd");
    }

    #[test]
    fn test_connected_groups() {
        let group = FileGroup::new(vec![
            SchemaFile::new("a.xsd", EMPTY),
            SchemaFile::new("main.xsd", import("types.xsd")),
            SchemaFile::new("other.xsd", include("b.xsd")),
            SchemaFile::new("types.xsd", EMPTY),
            SchemaFile::new("b.xsd", EMPTY),
        ]);
        assert_eq!(
            group.connected_groups(),
            vec![
                vec!["a.xsd".to_string()],
                vec!["main.xsd".to_string(), "types.xsd".to_string()],
                vec!["other.xsd".to_string(), "b.xsd".to_string()],
            ]
        );
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FileRole::Included).unwrap(), "\"included\"");
        assert_eq!(FileRole::Standalone.to_string(), "standalone");
    }
}
