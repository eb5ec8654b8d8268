//! Loading schema files from disk
//!
//! The library itself works on text; this module turns paths into
//! [`SchemaFile`]s for the command line and for tests.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dependencies::SchemaFile;
use crate::error::{Error, Result};
use crate::limits::Limits;

/// Resource loader for schema files
#[derive(Debug, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Read a file as text
    pub fn load_text(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
        })?;

        self.limits.check_xml_size(content.len())?;

        Ok(content)
    }

    /// Load one file, named after the last component of its path
    pub fn load(&self, path: &Path) -> Result<SchemaFile> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Resource(format!("'{}' does not name a file", path.display()))
            })?;
        let content = self.load_text(path)?;
        debug!("Loaded {} ({} bytes)", filename, content.len());
        Ok(SchemaFile::new(filename, content))
    }

    /// Load a set of files in the order given
    pub fn load_set<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<SchemaFile>> {
        self.limits.check_files(paths.len())?;
        paths.iter().map(|p| self.load(p.as_ref())).collect()
    }

    /// Load every `.xsd` file of a directory, sorted by file name
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<SchemaFile>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("xsd"))
            })
            .collect();
        paths.sort();
        self.load_set(&paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "<xs:schema/>").unwrap();

        let loaded = Loader::new().load(file.path()).unwrap();

        assert!(loaded.content.contains("<xs:schema/>"));
        assert_eq!(
            Some(loaded.filename.as_str()),
            file.path().file_name().and_then(|n| n.to_str())
        );
        assert!(!loaded.explicit_master);
    }

    #[test]
    fn test_missing_file() {
        let err = Loader::new()
            .load(Path::new("/definitely/not/here.xsd"))
            .unwrap_err();
        assert!(matches!(err, Error::Resource(_)));
    }

    #[test]
    fn test_size_limit() {
        let mut file = NamedTempFile::new().unwrap();
        let large_content = "x".repeat(11 * 1024 * 1024); // 11 MB
        write!(file, "{}", large_content).unwrap();

        let loader = Loader::new().with_limits(Limits::strict());
        let result = loader.load(file.path());

        // Strict limits (10 MB max) should reject 11MB file
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_file_count_limit() {
        let limits = Limits {
            max_files: 1,
            ..Limits::default()
        };
        let paths = ["a.xsd", "b.xsd"];
        let result = Loader::new().with_limits(limits).load_set(&paths);
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_load_dir_sorted_xsd_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.xsd"), "<b/>").unwrap();
        fs::write(dir.path().join("a.XSD"), "<a/>").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip").unwrap();

        let files = Loader::new().load_dir(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["a.XSD", "b.xsd"]);
    }
}
