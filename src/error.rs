//! @ai:module:intent Define error types for benchmark resolution and table generation
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all benchtab operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML in {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Malformed task definition {path}: {source}")]
    TaskDefinition {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid benchmark definition {path}: {message}")]
    Definition { path: PathBuf, message: String },

    #[error("Invalid task definition {path}: {message}")]
    InvalidTask { path: PathBuf, message: String },

    #[error("Invalid expected verdict '{0}', expected one of true, false, unknown, false(<subproperty>)")]
    InvalidVerdict(String),

    #[error("Property file {0} does not exist")]
    MissingPropertyFile(PathBuf),

    #[error("Property files are declared both for <tasks> block '{block}' and at run definition level '{run_definition}'")]
    ConflictingPropertyFiles {
        block: String,
        run_definition: String,
    },

    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid result file {path}: {message}")]
    ResultFile { path: PathBuf, message: String },

    #[error("No result files given")]
    NoResultFiles,

    #[error("Invalid table definition {path}: {message}")]
    TableDefinition { path: PathBuf, message: String },

    #[error("Cannot diff result sets {left} and {right} of a table with {available} result sets")]
    DiffIndex {
        left: usize,
        right: usize,
        available: usize,
    },

    #[error("Generated files differ from expected files (missing: {missing:?}, unexpected: {unexpected:?})")]
    ArtifactMismatch {
        missing: Vec<PathBuf>,
        unexpected: Vec<PathBuf>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// @ai:intent True for errors that stem from malformed or contradictory input documents
    /// @ai:effects pure
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::Xml { .. }
                | Error::TaskDefinition { .. }
                | Error::Definition { .. }
                | Error::InvalidTask { .. }
                | Error::InvalidVerdict(_)
                | Error::MissingPropertyFile(_)
                | Error::ConflictingPropertyFiles { .. }
                | Error::Pattern { .. }
                | Error::TableDefinition { .. }
                | Error::NoResultFiles
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
