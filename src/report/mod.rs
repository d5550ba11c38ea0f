//! @ai:module:intent Generate table and diff artifacts from result files and verify what was written
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, TableJob, TableSource, TableSummary, OutputNames, CsvReporter, HtmlReporter
//! @ai:module:depends_on table, definition::pattern

pub mod csv_report;
pub mod html_report;
pub mod naming;

pub use csv_report::{CsvReporter, CsvReporterTrait};
pub use html_report::{HtmlReporter, HtmlReporterTrait};
pub use naming::OutputNames;

use crate::config::TableConfig;
use crate::definition::pattern::GlobExpander;
use crate::error::{Error, Result};
use crate::table::{
    DiffExtractor, ResultSet, ResultTableAssembler, Table, TableDefinition, TableEntry,
    TableOptions,
};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// @ai:intent Where the result files of a table come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    /// Result files given directly, in display order
    Files(Vec<PathBuf>),
    /// A `<table>` document listing result files and their columns
    Definition(PathBuf),
}

/// @ai:intent One table-generation request with every option resolved
#[derive(Debug, Clone)]
pub struct TableJob {
    pub source: TableSource,
    pub name: Option<String>,
    /// Explicit output directory; derived from the inputs when None
    pub output_dir: Option<PathBuf>,
    pub settings: TableConfig,
    pub now: DateTime<Local>,
}

impl TableJob {
    /// @ai:intent Create a job with settings from configuration and the current local time
    /// @ai:effects pure
    pub fn new(source: TableSource, settings: TableConfig) -> Self {
        Self {
            source,
            name: None,
            output_dir: None,
            settings,
            now: Local::now(),
        }
    }

    /// @ai:intent Output directory: explicit, else next to the table definition or single
    ///            input file, else the configured default
    /// @ai:effects pure
    pub fn resolved_output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }

        let anchor = match &self.source {
            TableSource::Definition(path) => Some(path.as_path()),
            TableSource::Files(files) if files.len() == 1 => Some(files[0].as_path()),
            TableSource::Files(_) => None,
        };

        anchor
            .and_then(Path::parent)
            .map(|parent| {
                if parent.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    parent.to_path_buf()
                }
            })
            .unwrap_or_else(|| self.settings.output_dir.clone())
    }
}

/// @ai:intent What a table job produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub result_sets: usize,
    pub rows: usize,
    /// Rows of the diff table, None when no diff was written
    pub diff_rows: Option<usize>,
    pub artifacts: Vec<PathBuf>,
}

/// @ai:intent Combined CSV and HTML artifact generator
pub struct ReportGenerator {
    csv: CsvReporter,
    html: HtmlReporter,
    assembler: ResultTableAssembler,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            csv: CsvReporter::new(),
            html: HtmlReporter::new(),
            assembler: ResultTableAssembler::new(),
        }
    }

    /// @ai:intent Write `<prefix>.csv` and `<prefix>.html` for a table
    /// @ai:effects fs:write
    pub fn generate_all(&self, table: &Table, output_dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir).map_err(|source| Error::FileWrite {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let [csv_path, html_path] = OutputNames::files(output_dir, prefix);
        self.csv.generate(table, &csv_path)?;
        self.html.generate(table, prefix, &html_path)?;

        tracing::info!("Wrote {} and {}", csv_path.display(), html_path.display());
        Ok(vec![csv_path, html_path])
    }

    /// @ai:intent Load inputs, assemble the table, diff two result sets, write and verify artifacts
    /// @ai:effects fs:read, fs:write
    pub fn run(&self, job: &TableJob) -> Result<TableSummary> {
        let entries = load_entries(&job.source)?;

        let result_sets = entries
            .iter()
            .map(|entry| ResultSet::load(&entry.file))
            .collect::<Result<Vec<_>>>()?;

        let options = TableOptions {
            all_columns: job.settings.all_columns,
            correct_only: job.settings.correct_only,
            common: job.settings.common,
            declared_columns: entries.iter().map(|e| e.columns.clone()).collect(),
        };
        let table = self.assembler.assemble(&result_sets, &options);

        let result_files: Vec<PathBuf> = entries.iter().map(|e| e.file.clone()).collect();
        let definition = match &job.source {
            TableSource::Definition(path) => Some(path.as_path()),
            TableSource::Files(_) => None,
        };
        let names = OutputNames::resolve(job.name.as_deref(), definition, &result_files, job.now);
        let output_dir = job.resolved_output_dir();
        remove_artifacts(&output_dir, &names)?;

        let mut written = self.generate_all(&table, &output_dir, &names.table)?;
        let mut diff_rows = None;

        if job.settings.no_diff {
            tracing::debug!("Diff disabled");
        } else if result_sets.len() > 2 {
            tracing::warn!(
                "Diff is only generated for exactly two result files, got {}",
                result_sets.len()
            );
        } else if result_sets.len() == 2 {
            let diff = DiffExtractor::new(job.settings.comparison_column.clone()).diff(&table, 0, 1)?;

            if diff.is_empty() {
                tracing::info!("No differences found, skipping diff table");
            } else {
                diff_rows = Some(diff.table.rows.len());
                written.extend(self.generate_all(&diff.table, &output_dir, &names.diff)?);
            }
        }

        let expected = expected_artifacts(&output_dir, &names, diff_rows.is_some());
        verify_artifacts(&output_dir, &names, &expected)?;

        Ok(TableSummary {
            result_sets: result_sets.len(),
            rows: table.rows.len(),
            diff_rows,
            artifacts: written,
        })
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn load_entries(source: &TableSource) -> Result<Vec<TableEntry>> {
    let entries = match source {
        TableSource::Definition(path) => TableDefinition::load(path, &GlobExpander::new())?.entries,
        TableSource::Files(files) => files
            .iter()
            .map(|file| TableEntry {
                file: file.clone(),
                columns: None,
            })
            .collect(),
    };

    if entries.is_empty() {
        return Err(Error::NoResultFiles);
    }
    Ok(entries)
}

/// @ai:intent The exact set of files a table job must leave behind
/// @ai:effects pure
pub fn expected_artifacts(output_dir: &Path, names: &OutputNames, with_diff: bool) -> BTreeSet<PathBuf> {
    let mut expected: BTreeSet<PathBuf> = OutputNames::files(output_dir, &names.table).into();

    if with_diff {
        expected.extend(OutputNames::files(output_dir, &names.diff));
    }
    expected
}

/// Every file the table and diff prefixes of a job can name
fn candidate_artifacts(output_dir: &Path, names: &OutputNames) -> Vec<PathBuf> {
    OutputNames::files(output_dir, &names.table)
        .into_iter()
        .chain(OutputNames::files(output_dir, &names.diff))
        .collect()
}

/// @ai:intent Delete artifacts a previous job with the same prefixes left in output_dir
/// @ai:effects fs:write
fn remove_artifacts(output_dir: &Path, names: &OutputNames) -> Result<()> {
    for path in candidate_artifacts(output_dir, names) {
        if path.is_file() {
            tracing::debug!("Removing previous artifact {}", path.display());
            std::fs::remove_file(&path).map_err(|source| Error::FileWrite {
                path: path.clone(),
                source,
            })?;
        }
    }
    Ok(())
}

/// @ai:intent Check that the files on disk under the job's prefixes are exactly the expected ones.
///            Files in output_dir with other names are not considered.
/// @ai:effects fs:read
pub fn verify_artifacts(
    output_dir: &Path,
    names: &OutputNames,
    expected: &BTreeSet<PathBuf>,
) -> Result<()> {
    let present: BTreeSet<PathBuf> = candidate_artifacts(output_dir, names)
        .into_iter()
        .filter(|path| path.is_file())
        .collect();

    let missing: Vec<PathBuf> = expected
        .iter()
        .filter(|path| !path.is_file())
        .cloned()
        .collect();
    let unexpected: Vec<PathBuf> = present.difference(expected).cloned().collect();

    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }

    Err(Error::ArtifactMismatch {
        missing,
        unexpected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_expected_artifacts() {
        let dir = Path::new("out");

        assert_eq!(expected_artifacts(dir, &names(), false).len(), 2);
        let with_diff: Vec<PathBuf> = expected_artifacts(dir, &names(), true).into_iter().collect();
        assert_eq!(
            with_diff,
            vec![
                PathBuf::from("out/t.diff.csv"),
                PathBuf::from("out/t.diff.html"),
                PathBuf::from("out/t.table.csv"),
                PathBuf::from("out/t.table.html"),
            ]
        );
    }

    fn names() -> OutputNames {
        OutputNames {
            table: "t.table".to_string(),
            diff: "t.diff".to_string(),
        }
    }

    #[test]
    fn test_verify_artifacts_reports_mismatch() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        std::fs::write(dir.join("t.table.csv"), "").unwrap();
        std::fs::write(dir.join("t.diff.csv"), "").unwrap();

        let expected = expected_artifacts(dir, &names(), false);
        let err = verify_artifacts(dir, &names(), &expected).unwrap_err();

        match err {
            Error::ArtifactMismatch {
                missing,
                unexpected,
            } => {
                assert_eq!(missing, vec![dir.join("t.table.html")]);
                assert_eq!(unexpected, vec![dir.join("t.diff.csv")]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_verify_artifacts_ignores_other_files() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        for file in ["t.table.csv", "t.table.html", "u.diff.csv", "t.results.xml"] {
            std::fs::write(dir.join(file), "").unwrap();
        }

        let expected = expected_artifacts(dir, &names(), false);
        assert!(verify_artifacts(dir, &names(), &expected).is_ok());
    }

    #[test]
    fn test_verify_artifacts_requires_files_on_disk() {
        let temp = TempDir::new().unwrap();
        let expected = expected_artifacts(temp.path(), &names(), true);
        assert!(verify_artifacts(temp.path(), &names(), &expected).is_err());
    }

    #[test]
    fn test_remove_artifacts_keeps_other_files() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        for file in ["t.diff.csv", "t.diff.html", "t.table.csv", "notes.csv"] {
            std::fs::write(dir.join(file), "").unwrap();
        }

        remove_artifacts(dir, &names()).unwrap();

        let left: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(left, vec!["notes.csv"]);
    }

    #[test]
    fn test_output_dir_resolution() {
        let settings = TableConfig::default();

        let single = TableJob::new(
            TableSource::Files(vec![PathBuf::from("runs/a.xml")]),
            settings.clone(),
        );
        assert_eq!(single.resolved_output_dir(), PathBuf::from("runs"));

        let bare = TableJob::new(TableSource::Files(vec![PathBuf::from("a.xml")]), settings.clone());
        assert_eq!(bare.resolved_output_dir(), PathBuf::from("."));

        let several = TableJob::new(
            TableSource::Files(vec![PathBuf::from("x/a.xml"), PathBuf::from("y/b.xml")]),
            settings.clone(),
        );
        assert_eq!(several.resolved_output_dir(), PathBuf::from("results"));

        let mut explicit = TableJob::new(TableSource::Definition(PathBuf::from("t/x.xml")), settings);
        assert_eq!(explicit.resolved_output_dir(), PathBuf::from("t"));
        explicit.output_dir = Some(PathBuf::from("out"));
        assert_eq!(explicit.resolved_output_dir(), PathBuf::from("out"));
    }

    #[test]
    fn test_no_result_files() {
        let err = load_entries(&TableSource::Files(vec![])).unwrap_err();
        assert!(matches!(err, Error::NoResultFiles));
    }
}
