//! @ai:module:intent Resolve property-file references into canonical properties
//! @ai:module:layer infrastructure
//! @ai:module:public_api Property, PropertyRegistry, FilePropertyRegistry, PropertyCache

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Property formulas of the SV-COMP property library, whitespace removed
const SVCOMP_FORMULAS: &[&str] = &[
    "CHECK(init(main()),LTL(G!call(reach_error())))",
    "CHECK(init(main()),LTL(Gvalid-free))",
    "CHECK(init(main()),LTL(Gvalid-deref))",
    "CHECK(init(main()),LTL(Gvalid-memtrack))",
    "CHECK(init(main()),LTL(Gvalid-memcleanup))",
    "CHECK(init(main()),LTL(G!overflow))",
    "CHECK(init(main()),LTL(G!data-race))",
    "CHECK(init(main()),LTL(Fend))",
    "COVER(init(main()),FQL(COVEREDGES(@CALL(reach_error))))",
    "COVER(init(main()),FQL(COVEREDGES(@DECISIONEDGE)))",
];

/// @ai:intent A resolved property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub file: PathBuf,
    /// File name without extension
    pub name: String,
    /// Every formula of the file belongs to the SV-COMP property library
    pub is_svcomp: bool,
}

impl Property {
    /// @ai:intent Build a property from its file path and content
    /// @ai:effects pure
    pub fn from_content(file: &Path, content: &str) -> Self {
        let formulas: Vec<String> = content
            .lines()
            .map(|l| l.split("//").next().unwrap_or_default())
            .map(|l| l.chars().filter(|c| !c.is_whitespace()).collect::<String>())
            .filter(|l| !l.is_empty())
            .collect();

        let is_svcomp =
            !formulas.is_empty() && formulas.iter().all(|f| SVCOMP_FORMULAS.contains(&f.as_str()));

        Self {
            file: file.to_path_buf(),
            name: property_name(file),
            is_svcomp,
        }
    }
}

/// @ai:intent Derive the property name from its file name
/// @ai:effects pure
pub fn property_name(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string())
}

/// @ai:intent Capability for resolving property files
pub trait PropertyRegistry: Send + Sync {
    /// @ai:intent Resolve a property file into a property; missing files are errors
    fn resolve(&self, property_file: &Path) -> Result<Property>;
}

/// @ai:intent Resolves property files from disk
pub struct FilePropertyRegistry;

impl FilePropertyRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FilePropertyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyRegistry for FilePropertyRegistry {
    /// @ai:effects fs:read
    fn resolve(&self, property_file: &Path) -> Result<Property> {
        if !property_file.is_file() {
            return Err(Error::MissingPropertyFile(property_file.to_path_buf()));
        }

        let content = std::fs::read_to_string(property_file).map_err(|source| Error::FileRead {
            path: property_file.to_path_buf(),
            source,
        })?;

        Ok(Property::from_content(property_file, &content))
    }
}

/// @ai:intent Per-resolution cache so identical references share one property
pub struct PropertyCache<'a> {
    registry: &'a dyn PropertyRegistry,
    resolved: HashMap<PathBuf, Property>,
}

impl<'a> PropertyCache<'a> {
    pub fn new(registry: &'a dyn PropertyRegistry) -> Self {
        Self {
            registry,
            resolved: HashMap::new(),
        }
    }

    /// @ai:intent Resolve through the registry once per distinct normalised path
    /// @ai:effects fs:read
    pub fn get(&mut self, property_file: &Path) -> Result<Property> {
        let key = crate::definition::task::normalize(property_file);

        if let Some(property) = self.resolved.get(&key) {
            return Ok(property.clone());
        }

        let property = self.registry.resolve(property_file)?;
        self.resolved.insert(key, property.clone());
        Ok(property)
    }
}
