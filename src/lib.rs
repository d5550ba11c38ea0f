//! @ai:module:intent benchtab library: resolve benchmark definitions into runs and tabulate results
//! @ai:module:layer application
//! @ai:module:public_api config, definition, error, report, table

pub mod config;
pub mod definition;
pub mod error;
pub mod report;
pub mod table;

mod xml;

pub use config::{Config, ResolveConfig, TableConfig};
pub use definition::{BenchmarkDefinition, ExpectedVerdict, Run, RunSet, RunSetBuilder};
pub use error::{Error, Result};
pub use report::{ReportGenerator, TableJob, TableSource, TableSummary};
pub use table::{DiffExtractor, ResultSet, ResultTableAssembler, Table, TableOptions};
