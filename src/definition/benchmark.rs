//! @ai:module:intent Typed model of a benchmark-definition XML document
//! @ai:module:layer infrastructure
//! @ai:module:public_api BenchmarkDefinition, TasksBlock, RunDefinition, Limits
//! @ai:module:stateless true

use crate::definition::verdict::PropertyFilter;
use crate::error::{Error, Result};
use crate::xml::{elements, texts};
use roxmltree::{Document, Node};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// @ai:intent Resource limits declared on the `<benchmark>` element, kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Limits {
    pub timelimit: Option<String>,
    pub memlimit: Option<String>,
    pub cpu_cores: Option<String>,
}

/// @ai:intent A `<tasks>` block: patterns selecting task files plus local options and filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TasksBlock {
    pub name: String,
    pub includes: Vec<String>,
    pub includes_files: Vec<String>,
    pub excludes: Vec<String>,
    pub excludes_files: Vec<String>,
    pub options: Vec<String>,
    pub property_filters: Vec<PropertyFilter>,
}

/// @ai:intent A `<rundefinition>`: one configuration of the tool, becomes one run set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunDefinition {
    pub name: String,
    pub options: Vec<String>,
    pub property_filters: Vec<PropertyFilter>,
    pub tasks: Vec<TasksBlock>,
}

/// @ai:intent Parsed benchmark definition; relative paths resolve against `base_dir`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkDefinition {
    pub path: PathBuf,
    pub base_dir: PathBuf,
    pub tool: String,
    pub limits: Limits,
    pub options: Vec<String>,
    pub property_filters: Vec<PropertyFilter>,
    pub tasks: Vec<TasksBlock>,
    pub run_definitions: Vec<RunDefinition>,
}

impl BenchmarkDefinition {
    /// @ai:intent Load and parse a benchmark definition file
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_str(&content, path)
    }

    /// @ai:intent Parse benchmark-definition text that was read from path
    /// @ai:effects pure
    pub fn parse_str(content: &str, path: &Path) -> Result<Self> {
        let doc = Document::parse(content).map_err(|source| Error::Xml {
            path: path.to_path_buf(),
            source,
        })?;

        let parser = Parser {
            path,
            base_dir: path.parent().unwrap_or_else(|| Path::new("")),
        };
        parser.benchmark(doc.root_element())
    }
}

struct Parser<'p> {
    path: &'p Path,
    base_dir: &'p Path,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> Error {
        Error::Definition {
            path: self.path.to_path_buf(),
            message: message.into(),
        }
    }

    fn benchmark(&self, root: Node) -> Result<BenchmarkDefinition> {
        if !root.has_tag_name("benchmark") {
            return Err(self.error(format!(
                "root element must be <benchmark>, found <{}>",
                root.tag_name().name()
            )));
        }

        let tool = root
            .attribute("tool")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| self.error("<benchmark> requires a 'tool' attribute"))?
            .to_string();

        let limits = Limits {
            timelimit: root.attribute("timelimit").map(str::to_string),
            memlimit: root.attribute("memlimit").map(str::to_string),
            cpu_cores: root.attribute("cpuCores").map(str::to_string),
        };

        let mut run_definitions = elements(root, "rundefinition")
            .map(|node| self.run_definition(node))
            .collect::<Result<Vec<_>>>()?;

        if run_definitions.is_empty() {
            run_definitions.push(RunDefinition::default());
        }

        Ok(BenchmarkDefinition {
            path: self.path.to_path_buf(),
            base_dir: self.base_dir.to_path_buf(),
            tool,
            limits,
            options: self.options(root),
            property_filters: self.property_filters(root)?,
            tasks: self.tasks_blocks(root)?,
            run_definitions,
        })
    }

    fn run_definition(&self, node: Node) -> Result<RunDefinition> {
        Ok(RunDefinition {
            name: node.attribute("name").unwrap_or_default().to_string(),
            options: self.options(node),
            property_filters: self.property_filters(node)?,
            tasks: self.tasks_blocks(node)?,
        })
    }

    fn tasks_blocks(&self, parent: Node) -> Result<Vec<TasksBlock>> {
        elements(parent, "tasks")
            .map(|node| {
                Ok(TasksBlock {
                    name: node.attribute("name").unwrap_or_default().to_string(),
                    includes: texts(node, "include"),
                    includes_files: texts(node, "includesfile"),
                    excludes: texts(node, "exclude"),
                    excludes_files: texts(node, "excludesfile"),
                    options: self.options(node),
                    property_filters: self.property_filters(node)?,
                })
            })
            .collect()
    }

    /// `<option name="-x">value</option>` becomes `["-x", "value"]`
    fn options(&self, parent: Node) -> Vec<String> {
        let mut options = Vec::new();

        for node in elements(parent, "option") {
            if let Some(name) = node.attribute("name") {
                options.push(name.to_string());
            }

            if let Some(value) = node.text().map(str::trim).filter(|v| !v.is_empty()) {
                options.push(value.to_string());
            }
        }

        options
    }

    fn property_filters(&self, parent: Node) -> Result<Vec<PropertyFilter>> {
        elements(parent, "propertyfile")
            .map(|node| {
                let file = node
                    .text()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| self.error("<propertyfile> must name a file"))?;

                PropertyFilter::new(self.base_dir.join(file), node.attribute("expectedverdict"))
            })
            .collect()
    }
}
