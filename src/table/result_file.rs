//! @ai:module:intent Parse benchmark result files into result sets
//! @ai:module:layer infrastructure
//! @ai:module:public_api ResultSet, ResultRecord, ColumnValue
//! @ai:module:stateless true

use crate::definition::verdict::ExpectedVerdict;
use crate::error::{Error, Result};
use crate::xml::elements;
use roxmltree::{Document, Node};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// @ai:intent One `<column>` of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnValue {
    pub title: String,
    pub value: String,
    pub hidden: bool,
}

/// @ai:intent Result of one run as recorded in one result file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub identifier: String,
    pub values: Vec<ColumnValue>,
    pub expected_verdict: Option<ExpectedVerdict>,
}

impl ResultRecord {
    /// @ai:intent Look up a column value by title, hidden columns included
    /// @ai:effects pure
    pub fn value(&self, title: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|c| c.title == title)
            .map(|c| c.value.as_str())
    }

    /// @ai:intent Whether the run produced the expected verdict.
    ///            A `category` column wins; otherwise status is compared to the expected verdict.
    /// @ai:effects pure
    pub fn is_correct(&self) -> bool {
        if let Some(category) = self.value("category") {
            return category == "correct";
        }

        let (Some(status), Some(expected)) = (self.value("status"), &self.expected_verdict) else {
            return false;
        };

        match (ExpectedVerdict::parse(status), expected) {
            (Ok(ExpectedVerdict::True), ExpectedVerdict::True) => true,
            (
                Ok(ExpectedVerdict::False { subproperty: actual }),
                ExpectedVerdict::False {
                    subproperty: wanted,
                },
            ) => match (actual, wanted) {
                (Some(actual), Some(wanted)) => &actual == wanted,
                (_, None) => true,
                (None, Some(_)) => false,
            },
            _ => false,
        }
    }
}

/// @ai:intent Parsed content of one result file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    pub path: PathBuf,
    /// Tool name and version
    pub tool: String,
    pub name: String,
    pub date: Option<String>,
    /// Visible columns: the `<columns>` header, or visible titles of the runs
    pub declared_columns: Vec<String>,
    pub records: Vec<ResultRecord>,
}

impl ResultSet {
    /// @ai:intent Load and parse a result file
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_str(&content, path)
    }

    /// @ai:intent Parse result-file text that was read from path
    /// @ai:effects pure
    pub fn parse_str(content: &str, path: &Path) -> Result<Self> {
        let doc = Document::parse(content).map_err(|source| Error::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        let root = doc.root_element();

        if !root.has_tag_name("result") {
            return Err(Error::ResultFile {
                path: path.to_path_buf(),
                message: format!(
                    "root element must be <result>, found <{}>",
                    root.tag_name().name()
                ),
            });
        }

        let tool = [root.attribute("tool"), root.attribute("version")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        let name = root
            .attribute("name")
            .or_else(|| root.attribute("benchmarkname"))
            .map(str::to_string)
            .unwrap_or_else(|| file_label(path));

        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for run in elements(root, "run") {
            let Some(record) = parse_run(run, path) else {
                continue;
            };

            if !seen.insert(record.identifier.clone()) {
                tracing::warn!(
                    "Ignoring duplicate run {} in {}",
                    record.identifier,
                    path.display()
                );
                continue;
            }
            records.push(record);
        }

        let header: Vec<String> = elements(root, "columns")
            .flat_map(|columns| elements(columns, "column"))
            .filter_map(|c| c.attribute("title"))
            .map(str::to_string)
            .collect();

        let declared_columns = if header.is_empty() {
            visible_titles(&records)
        } else {
            header
        };

        Ok(ResultSet {
            path: path.to_path_buf(),
            tool,
            name,
            date: root.attribute("date").map(str::to_string),
            declared_columns,
            records,
        })
    }

    /// @ai:intent Every column title of any run, in first-seen order
    /// @ai:effects pure
    pub fn all_columns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut titles: Vec<String> = self
            .declared_columns
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect();

        for record in &self.records {
            for column in &record.values {
                if seen.insert(column.title.as_str()) {
                    titles.push(column.title.clone());
                }
            }
        }

        titles
    }

    /// @ai:intent Find the record of a run
    /// @ai:effects pure
    pub fn record(&self, identifier: &str) -> Option<&ResultRecord> {
        self.records.iter().find(|r| r.identifier == identifier)
    }
}

fn parse_run(run: Node, path: &Path) -> Option<ResultRecord> {
    let Some(identifier) = run.attribute("name") else {
        tracing::warn!("Ignoring <run> without name in {}", path.display());
        return None;
    };

    let expected_verdict = match run.attribute("expectedVerdict") {
        None => None,
        Some(value) => match ExpectedVerdict::parse(value) {
            Ok(verdict) => Some(verdict),
            Err(e) => {
                tracing::warn!("Run {} in {}: {}", identifier, path.display(), e);
                None
            }
        },
    };

    let values = elements(run, "column")
        .filter_map(|c| {
            Some(ColumnValue {
                title: c.attribute("title")?.to_string(),
                value: c.attribute("value").unwrap_or_default().to_string(),
                hidden: c.attribute("hidden") == Some("true"),
            })
        })
        .collect();

    Some(ResultRecord {
        identifier: identifier.to_string(),
        values,
        expected_verdict,
    })
}

fn visible_titles(records: &[ResultRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(|r| &r.values)
        .filter(|c| !c.hidden && seen.insert(c.title.as_str()))
        .map(|c| c.title.clone())
        .collect()
}

/// @ai:intent File name without a trailing `.xml`
/// @ai:effects pure
pub fn file_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    name.strip_suffix(".xml")
        .map(str::to_string)
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RESULT: &str = r#"<?xml version="1.0"?>
<result benchmarkname="test" name="predicateAnalysis" tool="CPAchecker" version="1.4" date="2015-03-03 16:13:38 CET">
  <columns>
    <column title="status"/>
    <column title="cputime"/>
  </columns>
  <run name="../programs/a.c" expectedVerdict="true">
    <column title="status" value="true"/>
    <column title="cputime" value="1.5s"/>
    <column hidden="true" title="category" value="correct"/>
  </run>
  <run name="../programs/b.c" expectedVerdict="false(unreach-call)">
    <column title="status" value="TIMEOUT"/>
    <column title="cputime" value="900s"/>
    <column hidden="true" title="exitcode" value="9"/>
  </run>
  <run name="../programs/a.c">
    <column title="status" value="false"/>
  </run>
</result>"#;

    #[test]
    fn test_parse_result_file() {
        let set = ResultSet::parse_str(RESULT, Path::new("r/test.results.predicateAnalysis.xml"))
            .unwrap();

        assert_eq!(set.tool, "CPAchecker 1.4");
        assert_eq!(set.name, "predicateAnalysis");
        assert_eq!(set.declared_columns, vec!["status", "cputime"]);
        assert_eq!(set.records.len(), 2);
        assert_eq!(set.all_columns(), vec!["status", "cputime", "category", "exitcode"]);
        assert_eq!(
            set.record("../programs/b.c").unwrap().expected_verdict,
            Some(ExpectedVerdict::False {
                subproperty: Some("unreach-call".to_string())
            })
        );
    }

    #[test]
    fn test_correctness() {
        let set = ResultSet::parse_str(RESULT, Path::new("r.xml")).unwrap();
        assert!(set.record("../programs/a.c").unwrap().is_correct());
        assert!(!set.record("../programs/b.c").unwrap().is_correct());
    }

    fn record(status: &str, expected: Option<&str>) -> ResultRecord {
        ResultRecord {
            identifier: "x".to_string(),
            values: vec![ColumnValue {
                title: "status".to_string(),
                value: status.to_string(),
                hidden: false,
            }],
            expected_verdict: expected.map(|e| ExpectedVerdict::parse(e).unwrap()),
        }
    }

    #[test]
    fn test_correctness_without_category() {
        assert!(record("true", Some("true")).is_correct());
        assert!(record("false(unreach-call)", Some("false(unreach-call)")).is_correct());
        assert!(record("false(unreach-call)", Some("false")).is_correct());
        assert!(!record("false(valid-free)", Some("false(valid-deref)")).is_correct());
        assert!(!record("false", Some("false(unreach-call)")).is_correct());
        assert!(!record("true", Some("false")).is_correct());
        assert!(!record("unknown", Some("unknown")).is_correct());
        assert!(!record("true", None).is_correct());
        assert!(!record("TIMEOUT", Some("true")).is_correct());
    }

    #[test]
    fn test_columns_without_header() {
        let xml = r#"<result tool="x"><run name="a"><column title="status" value="true"/><column title="h" value="1" hidden="true"/></run></result>"#;
        let set = ResultSet::parse_str(xml, Path::new("dir/some.results.xml")).unwrap();
        assert_eq!(set.declared_columns, vec!["status"]);
        assert_eq!(set.name, "some.results");
    }

    #[test]
    fn test_wrong_root() {
        let err = ResultSet::parse_str("<benchmark/>", Path::new("r.xml")).unwrap_err();
        assert!(matches!(err, Error::ResultFile { .. }));
    }
}
