//! @ai:module:intent Benchmark definitions, task loading and verdict-based task selection
//! @ai:module:layer domain
//! @ai:module:public_api BenchmarkDefinition, RunSetBuilder, RunSet, Run, TaskReference, PropertyFilter

pub mod benchmark;
pub mod filter;
pub mod pattern;
pub mod property;
pub mod run_set;
pub mod task;
pub mod verdict;

pub use benchmark::{BenchmarkDefinition, Limits, RunDefinition, TasksBlock};
pub use filter::TaskFilterEngine;
pub use pattern::{GlobExpander, PatternExpander};
pub use property::{FilePropertyRegistry, Property, PropertyCache, PropertyRegistry};
pub use run_set::{Run, RunSet, RunSetBuilder};
pub use task::{PropertyAssociation, TaskDefinitionLoader, TaskReference, YamlTaskLoader};
pub use verdict::{ExpectedVerdict, PropertyFilter, VerdictFilter};
