//! @ai:module:intent Configuration structs for run resolution and table generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api Config, ResolveConfig, TableConfig
//! @ai:module:stateless true

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// @ai:intent Main configuration, loaded from `benchtab.toml`
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resolve: ResolveConfig,
    #[serde(default)]
    pub table: TableConfig,
}

/// @ai:intent Selection of run definitions and tasks blocks when resolving a benchmark
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Glob patterns over run definition names; empty selects all
    #[serde(default)]
    pub run_definitions: Vec<String>,
    /// Glob patterns over `<tasks>` block names; empty selects all
    #[serde(default)]
    pub tasks: Vec<String>,
}

/// @ai:intent Defaults for table generation, overridable from the command line
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub all_columns: bool,
    #[serde(default)]
    pub correct_only: bool,
    #[serde(default)]
    pub common: bool,
    #[serde(default)]
    pub no_diff: bool,
    #[serde(default = "default_comparison_column")]
    pub comparison_column: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            all_columns: false,
            correct_only: false,
            common: false,
            no_diff: false,
            comparison_column: default_comparison_column(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_comparison_column() -> String {
    "status".to_string()
}

impl Config {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            crate::Error::FileRead {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| crate::Error::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}
