//! @ai:module:intent Resolve tasks blocks and property filters into ordered run sets
//! @ai:module:layer application
//! @ai:module:public_api Run, RunSet, RunSetBuilder
//! @ai:module:depends_on pattern, task, property, filter, benchmark

use crate::config::ResolveConfig;
use crate::definition::benchmark::{BenchmarkDefinition, RunDefinition, TasksBlock};
use crate::definition::filter::TaskFilterEngine;
use crate::definition::pattern::{GlobExpander, PatternExpander};
use crate::definition::property::{FilePropertyRegistry, Property, PropertyCache, PropertyRegistry};
use crate::definition::task::{
    is_task_definition, normalize, TaskDefinitionLoader, TaskReference, YamlTaskLoader,
};
use crate::definition::verdict::{ExpectedVerdict, PropertyFilter};
use crate::error::{Error, Result};
use globset::{Glob, GlobMatcher};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// @ai:intent One task paired with the property it is run against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub identifier: String,
    pub task: TaskReference,
    pub property: Option<Property>,
    pub expected_verdict: Option<ExpectedVerdict>,
    /// Benchmark, run definition and tasks-block options, in that order
    pub options: Vec<String>,
    pub tasks_block: String,
}

/// @ai:intent Ordered, identifier-unique runs of one run definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSet {
    pub name: String,
    pub runs: Vec<Run>,
}

impl RunSet {
    /// @ai:intent Run identifiers in discovery order
    /// @ai:effects pure
    pub fn identifiers(&self) -> Vec<&str> {
        self.runs.iter().map(|r| r.identifier.as_str()).collect()
    }

    /// @ai:intent Run identifiers sorted, for set comparisons
    /// @ai:effects pure
    pub fn sorted_identifiers(&self) -> Vec<&str> {
        let mut ids = self.identifiers();
        ids.sort_unstable();
        ids
    }
}

/// @ai:intent Builds run sets from tasks blocks using injected file-system capabilities
pub struct RunSetBuilder {
    expander: Arc<dyn PatternExpander>,
    loader: Arc<dyn TaskDefinitionLoader>,
    registry: Arc<dyn PropertyRegistry>,
    engine: TaskFilterEngine,
}

impl RunSetBuilder {
    /// @ai:intent Create a builder from explicit capabilities
    /// @ai:effects pure
    pub fn new(
        expander: Arc<dyn PatternExpander>,
        loader: Arc<dyn TaskDefinitionLoader>,
        registry: Arc<dyn PropertyRegistry>,
    ) -> Self {
        Self {
            expander,
            loader,
            registry,
            engine: TaskFilterEngine::new(),
        }
    }

    /// @ai:intent Create a builder backed by the real file system
    /// @ai:effects pure
    pub fn from_filesystem() -> Self {
        Self::new(
            Arc::new(GlobExpander::new()),
            Arc::new(YamlTaskLoader::new()),
            Arc::new(FilePropertyRegistry::new()),
        )
    }

    /// @ai:intent Resolve every selected run definition of a benchmark into a run set
    /// @ai:effects fs:read
    pub fn build_benchmark(
        &self,
        definition: &BenchmarkDefinition,
        selection: &ResolveConfig,
    ) -> Result<Vec<RunSet>> {
        let run_definition_selector = NameSelector::new(&selection.run_definitions)?;
        let tasks_selector = NameSelector::new(&selection.tasks)?;

        let mut run_sets = Vec::new();

        for run_definition in &definition.run_definitions {
            if !run_definition_selector.matches(&run_definition.name) {
                tracing::debug!("Skipping unselected run definition '{}'", run_definition.name);
                continue;
            }

            let blocks: Vec<TasksBlock> = definition
                .tasks
                .iter()
                .chain(&run_definition.tasks)
                .filter(|block| tasks_selector.matches(&block.name))
                .cloned()
                .collect();

            let global_filters = run_definition_filters(definition, run_definition)?;
            let options: Vec<String> = definition
                .options
                .iter()
                .chain(&run_definition.options)
                .cloned()
                .collect();

            let run_set = self.build(
                &run_definition.name,
                &definition.base_dir,
                &blocks,
                &global_filters,
                &options,
            )?;
            run_sets.push(run_set);
        }

        Ok(run_sets)
    }

    /// @ai:intent Resolve tasks blocks into one run set.
    ///            Block-local filters replace global ones; declaring both is an error.
    /// @ai:pre relative patterns in blocks are relative to base_dir
    /// @ai:effects fs:read
    pub fn build(
        &self,
        name: &str,
        base_dir: &Path,
        blocks: &[TasksBlock],
        global_filters: &[PropertyFilter],
        options: &[String],
    ) -> Result<RunSet> {
        let mut properties = PropertyCache::new(self.registry.as_ref());
        let mut seen = HashSet::new();
        let mut runs = Vec::new();

        for block in blocks {
            if !block.property_filters.is_empty() && !global_filters.is_empty() {
                return Err(Error::ConflictingPropertyFiles {
                    block: block.name.clone(),
                    run_definition: name.to_string(),
                });
            }

            let filters: &[PropertyFilter] = if block.property_filters.is_empty() {
                global_filters
            } else {
                &block.property_filters
            };

            for filter in filters {
                properties.get(&filter.property_file)?;
            }

            for path in self.expand_block(block, base_dir)? {
                let task = if is_task_definition(&path) {
                    self.loader.load(&path)?
                } else {
                    TaskReference::plain_input(&path)
                };

                let key = normalize(&path);
                if seen.contains(&key) {
                    continue;
                }

                let Some(filter) = self.engine.first_match(&task, filters) else {
                    tracing::debug!("Task {} not selected by any property filter", task.id);
                    continue;
                };

                let (property, expected_verdict) = match filter {
                    Some(filter) => (
                        Some(properties.get(&filter.property_file)?),
                        task.property(&filter.property_file)
                            .map(|a| a.expected_verdict.clone()),
                    ),
                    None => (None, None),
                };

                seen.insert(key);
                runs.push(Run {
                    identifier: task.id.clone(),
                    options: options.iter().chain(&block.options).cloned().collect(),
                    tasks_block: block.name.clone(),
                    task,
                    property,
                    expected_verdict,
                });
            }
        }

        tracing::info!("Resolved run set '{}' with {} runs", name, runs.len());

        Ok(RunSet {
            name: name.to_string(),
            runs,
        })
    }

    /// @ai:intent Expand includes and includes-files, then drop excluded paths.
    ///            Output keeps first-seen order and has no duplicates.
    /// @ai:effects fs:read
    fn expand_block(&self, block: &TasksBlock, base_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut includes: Vec<(String, PathBuf)> = block
            .includes
            .iter()
            .map(|p| (p.clone(), base_dir.to_path_buf()))
            .collect();
        includes.extend(read_pattern_files(&block.includes_files, base_dir)?);

        let mut excludes: Vec<(String, PathBuf)> = block
            .excludes
            .iter()
            .map(|p| (p.clone(), base_dir.to_path_buf()))
            .collect();
        excludes.extend(read_pattern_files(&block.excludes_files, base_dir)?);

        let mut excluded = HashSet::new();
        for (pattern, dir) in &excludes {
            for path in self.expander.expand(pattern, dir)? {
                excluded.insert(normalize(&path));
            }
        }

        let mut seen = HashSet::new();
        let mut paths = Vec::new();

        for (pattern, dir) in &includes {
            for path in self.expander.expand(pattern, dir)? {
                let key = normalize(&path);

                if excluded.contains(&key) || !seen.insert(key) {
                    continue;
                }
                paths.push(path);
            }
        }

        Ok(paths)
    }
}

/// @ai:intent Run-definition level filters: benchmark-level or rundefinition-level, never both
/// @ai:effects pure
fn run_definition_filters(
    definition: &BenchmarkDefinition,
    run_definition: &RunDefinition,
) -> Result<Vec<PropertyFilter>> {
    match (
        definition.property_filters.is_empty(),
        run_definition.property_filters.is_empty(),
    ) {
        (false, false) => Err(Error::Definition {
            path: definition.path.clone(),
            message: format!(
                "property files declared both on <benchmark> and on run definition '{}'",
                run_definition.name
            ),
        }),
        (true, _) => Ok(run_definition.property_filters.clone()),
        (false, true) => Ok(definition.property_filters.clone()),
    }
}

/// @ai:intent Read pattern list files: one pattern per line, `#` starts a comment.
///            Patterns are relative to the list file.
/// @ai:effects fs:read
fn read_pattern_files(files: &[String], base_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut patterns = Vec::new();

    for file in files {
        let path = base_dir.join(file);
        let content = std::fs::read_to_string(&path).map_err(|source| Error::FileRead {
            path: path.clone(),
            source,
        })?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();

            if !line.is_empty() {
                patterns.push((line.to_string(), dir.clone()));
            }
        }
    }

    Ok(patterns)
}

/// @ai:intent Name selection by glob patterns; no patterns selects everything
struct NameSelector {
    matchers: Vec<GlobMatcher>,
}

impl NameSelector {
    fn new(patterns: &[String]) -> Result<Self> {
        let matchers = patterns
            .iter()
            .map(|p| {
                Glob::new(p)
                    .map(|g| g.compile_matcher())
                    .map_err(|source| Error::Pattern {
                        pattern: p.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { matchers })
    }

    fn matches(&self, name: &str) -> bool {
        self.matchers.is_empty() || self.matchers.iter().any(|m| m.is_match(name))
    }
}
