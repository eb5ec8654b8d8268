//! Limits and constraints for schema processing
//!
//! This module defines limits that keep hostile or accidental inputs
//! (deeply nested documents, huge files, oversized upload sets) from
//! exhausting the stack or memory.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum element nesting depth
    pub max_xml_depth: usize,

    /// Maximum schema file size in bytes
    pub max_xml_size: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,

    /// Maximum number of files in one group
    pub max_files: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 1000,
            max_xml_size: 100 * 1024 * 1024, // 100 MB
            max_attributes: 1000,
            max_files: 1000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 100,
            max_xml_size: 10 * 1024 * 1024, // 10 MB
            max_attributes: 100,
            max_files: 100,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 10000,
            max_xml_size: 1024 * 1024 * 1024, // 1 GB
            max_attributes: 10000,
            max_files: 100000,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if XML size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of attributes is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            Err(Error::LimitExceeded(format!(
                "Attribute count {} exceeds maximum {}",
                count, self.max_attributes
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the size of a file set is within limits
    pub fn check_files(&self, count: usize) -> Result<()> {
        if count > self.max_files {
            Err(Error::LimitExceeded(format!(
                "File count {} exceeds maximum {}",
                count, self.max_files
            )))
        } else {
            Ok(())
        }
    }
}
