//! @ai:module:intent Derive output file prefixes for table and diff artifacts
//! @ai:module:layer domain
//! @ai:module:public_api OutputNames
//! @ai:module:stateless true

use crate::table::result_file::file_label;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// @ai:intent File name prefixes of the table and diff artifacts, without extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    pub table: String,
    pub diff: String,
}

impl OutputNames {
    /// @ai:intent Pick prefixes: explicit name, then table definition, then the single input file,
    ///            else a timestamped `results.*` name
    /// @ai:effects pure
    pub fn resolve(
        name: Option<&str>,
        table_definition: Option<&Path>,
        result_files: &[PathBuf],
        now: DateTime<Local>,
    ) -> Self {
        if let Some(name) = name {
            return Self::with_suffixes(name);
        }

        if let Some(definition) = table_definition {
            return Self::with_suffixes(&file_label(definition));
        }

        if let [single] = result_files {
            let label = file_label(single);
            return Self {
                diff: format!("{}.diff", label),
                table: label,
            };
        }

        Self::with_suffixes(&format!("results.{}", now.format("%Y-%m-%d_%H%M")))
    }

    fn with_suffixes(base: &str) -> Self {
        Self {
            table: format!("{}.table", base),
            diff: format!("{}.diff", base),
        }
    }

    /// @ai:intent The CSV and HTML file of a prefix inside output_dir
    /// @ai:effects pure
    pub fn files(output_dir: &Path, prefix: &str) -> [PathBuf; 2] {
        [
            output_dir.join(format!("{}.csv", prefix)),
            output_dir.join(format!("{}.html", prefix)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2015, 3, 3, 16, 13, 0).unwrap()
    }

    fn files(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_explicit_name_wins() {
        let names = OutputNames::resolve(
            Some("predicateAnalysis"),
            Some(Path::new("t.xml")),
            &files(&["a.xml", "b.xml"]),
            now(),
        );
        assert_eq!(names.table, "predicateAnalysis.table");
        assert_eq!(names.diff, "predicateAnalysis.diff");
    }

    #[test]
    fn test_table_definition_name() {
        let names = OutputNames::resolve(None, Some(Path::new("dir/simple-table.xml")), &[], now());
        assert_eq!(names.table, "simple-table.table");
    }

    #[test]
    fn test_single_file_has_no_suffix() {
        let names = OutputNames::resolve(
            None,
            None,
            &files(&["r/test.2015-03-03_1613.results.predicateAnalysis.xml"]),
            now(),
        );
        assert_eq!(names.table, "test.2015-03-03_1613.results.predicateAnalysis");
    }

    #[test]
    fn test_several_files_get_timestamp() {
        let names = OutputNames::resolve(None, None, &files(&["a.xml", "b.xml"]), now());
        assert_eq!(names.table, "results.2015-03-03_1613.table");
        assert_eq!(names.diff, "results.2015-03-03_1613.diff");
    }

    #[test]
    fn test_files() {
        assert_eq!(
            OutputNames::files(Path::new("out"), "x.table"),
            [PathBuf::from("out/x.table.csv"), PathBuf::from("out/x.table.html")]
        );
    }
}
