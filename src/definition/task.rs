//! @ai:module:intent Task definitions and their YAML loader
//! @ai:module:layer domain
//! @ai:module:public_api TaskReference, PropertyAssociation, TaskDefinitionLoader, YamlTaskLoader
//! @ai:module:stateless true

use crate::definition::verdict::ExpectedVerdict;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// @ai:intent A property a task is checked against, with the verdict the task expects
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAssociation {
    /// Resolved against the directory of the task-definition file
    pub property_file: PathBuf,
    pub expected_verdict: ExpectedVerdict,
}

/// @ai:intent A loaded benchmark task
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReference {
    /// Path of the task definition as produced by pattern expansion
    pub id: String,
    /// Input file patterns, resolved against the task directory
    pub input_files: Vec<String>,
    pub properties: Vec<PropertyAssociation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_yaml::Value>,
}

impl TaskReference {
    /// @ai:intent Create a task for a plain input file that has no task definition
    /// @ai:effects pure
    pub fn plain_input(path: &Path) -> Self {
        let id = path.display().to_string();
        Self {
            input_files: vec![id.clone()],
            id,
            properties: Vec::new(),
            required_files: Vec::new(),
            options: None,
        }
    }

    /// @ai:intent Find the association for a property file
    /// @ai:effects pure
    pub fn property(&self, property_file: &Path) -> Option<&PropertyAssociation> {
        self.properties
            .iter()
            .find(|p| same_path(&p.property_file, property_file))
    }
}

/// @ai:intent Check whether a path names a task definition rather than a plain input file
/// @ai:effects pure
pub fn is_task_definition(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "yml" || ext == "yaml")
        .unwrap_or(false)
}

/// @ai:intent Compare two paths after lexical normalisation, falling back to the filesystem
/// @ai:effects fs:read
pub fn same_path(a: &Path, b: &Path) -> bool {
    if normalize(a) == normalize(b) {
        return true;
    }

    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// @ai:intent Remove `.` and resolve `..` components without touching the filesystem
/// @ai:effects pure
pub fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if popped {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// @ai:intent Capability for loading a single task-definition file
pub trait TaskDefinitionLoader: Send + Sync {
    /// @ai:intent Load the task definition at path
    fn load(&self, path: &Path) -> Result<TaskReference>;
}

/// @ai:intent Raw task-definition document; `format_version` and unknown keys are ignored
#[derive(Debug, Deserialize)]
struct TaskFile {
    #[serde(default)]
    input_files: Option<OneOrMany>,
    #[serde(default)]
    properties: Vec<PropertyEntry>,
    #[serde(default)]
    required_files: Option<OneOrMany>,
    #[serde(default)]
    options: Option<serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PropertyEntry {
    property_file: String,
    #[serde(default)]
    expected_verdict: Option<bool>,
    #[serde(default)]
    subproperty: Option<String>,
}

/// @ai:intent Loads task definitions from YAML files
/// @ai:effects pure (stateless)
pub struct YamlTaskLoader;

impl YamlTaskLoader {
    /// @ai:intent Create a new task loader
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Parse task-definition text that was read from path
    /// @ai:pre path is the location of the document, used for ids and relative paths
    /// @ai:effects pure
    pub fn parse_str(content: &str, path: &Path) -> Result<TaskReference> {
        let file: TaskFile =
            serde_yaml::from_str(content).map_err(|source| Error::TaskDefinition {
                path: path.to_path_buf(),
                source,
            })?;

        let task_dir = path.parent().unwrap_or_else(|| Path::new(""));

        let input_files: Vec<String> = file
            .input_files
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .map(|f| task_dir.join(f).display().to_string())
            .collect();

        if input_files.is_empty() {
            return Err(Error::InvalidTask {
                path: path.to_path_buf(),
                message: "missing key 'input_files'".to_string(),
            });
        }

        let mut properties = Vec::with_capacity(file.properties.len());

        for entry in file.properties {
            let expected_verdict =
                ExpectedVerdict::from_task_fields(entry.expected_verdict, entry.subproperty)
                    .ok_or_else(|| Error::InvalidTask {
                        path: path.to_path_buf(),
                        message: format!(
                            "property {} has a subproperty but its expected verdict is not false",
                            entry.property_file
                        ),
                    })?;

            properties.push(PropertyAssociation {
                property_file: task_dir.join(&entry.property_file),
                expected_verdict,
            });
        }

        let required_files = file
            .required_files
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .map(|f| task_dir.join(f).display().to_string())
            .collect();

        Ok(TaskReference {
            id: path.display().to_string(),
            input_files,
            properties,
            required_files,
            options: file.options,
        })
    }
}

impl Default for YamlTaskLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskDefinitionLoader for YamlTaskLoader {
    /// @ai:effects fs:read
    fn load(&self, path: &Path) -> Result<TaskReference> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_str(&content, path)
    }
}
