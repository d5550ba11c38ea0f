//! @ai:module:intent Parse table-definition documents naming result files and their columns
//! @ai:module:layer infrastructure
//! @ai:module:public_api TableDefinition, TableEntry

use crate::definition::pattern::PatternExpander;
use crate::error::{Error, Result};
use crate::xml::elements;
use roxmltree::{Document, Node};
use std::path::{Path, PathBuf};

/// @ai:intent One result file of a table definition with its declared columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub file: PathBuf,
    /// None keeps the default column policy
    pub columns: Option<Vec<String>>,
}

/// @ai:intent Parsed `<table>` document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub path: PathBuf,
    pub entries: Vec<TableEntry>,
}

impl TableDefinition {
    /// @ai:intent Load a table definition, expanding result patterns relative to it
    /// @ai:effects fs:read
    pub fn load(path: &Path, expander: &dyn PatternExpander) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_str(&content, path, expander)
    }

    /// @ai:intent Parse table-definition text that was read from path
    /// @ai:effects fs:read
    pub fn parse_str(content: &str, path: &Path, expander: &dyn PatternExpander) -> Result<Self> {
        let error = |message: String| Error::TableDefinition {
            path: path.to_path_buf(),
            message,
        };

        let doc = Document::parse(content).map_err(|source| Error::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        let root = doc.root_element();

        if !root.has_tag_name("table") {
            return Err(error(format!(
                "root element must be <table>, found <{}>",
                root.tag_name().name()
            )));
        }

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let global_columns = column_titles(root);
        let mut entries = Vec::new();

        for result in elements(root, "result") {
            let pattern = result
                .attribute("filename")
                .ok_or_else(|| error("<result> requires a 'filename' attribute".to_string()))?;

            let own = column_titles(result);
            let columns = if !own.is_empty() {
                Some(own)
            } else if !global_columns.is_empty() {
                Some(global_columns.clone())
            } else {
                None
            };

            for file in expander.expand(pattern, base_dir)? {
                entries.push(TableEntry {
                    file,
                    columns: columns.clone(),
                });
            }
        }

        if entries.is_empty() {
            return Err(error("no result files found".to_string()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }
}

fn column_titles(parent: Node) -> Vec<String> {
    elements(parent, "column")
        .filter_map(|c| c.attribute("title"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::pattern::GlobExpander;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_columns_per_result_and_global() {
        let xml = r#"
<table>
  <column title="status"/>
  <result filename="results/a.xml"/>
  <result filename="results/b.xml"><column title="cputime"/></result>
</table>"#;
        let def =
            TableDefinition::parse_str(xml, Path::new("tables/t.xml"), &GlobExpander::new())
                .unwrap();

        assert_eq!(
            def.entries,
            vec![
                TableEntry {
                    file: PathBuf::from("tables/results/a.xml"),
                    columns: Some(vec!["status".to_string()]),
                },
                TableEntry {
                    file: PathBuf::from("tables/results/b.xml"),
                    columns: Some(vec!["cputime".to_string()]),
                },
            ]
        );
    }

    #[test]
    fn test_no_columns_keeps_default_policy() {
        let xml = r#"<table><result filename="a.xml"/></table>"#;
        let def = TableDefinition::parse_str(xml, Path::new("t.xml"), &GlobExpander::new())
            .unwrap();
        assert_eq!(def.entries[0].columns, None);
    }

    #[test]
    fn test_glob_filename() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("r1.xml"), "").unwrap();
        std::fs::write(temp.path().join("r2.xml"), "").unwrap();
        let path = temp.path().join("table.xml");

        let def = TableDefinition::parse_str(
            r#"<table><result filename="r*.xml"/></table>"#,
            &path,
            &GlobExpander::new(),
        )
        .unwrap();

        let files: Vec<PathBuf> = def.entries.into_iter().map(|e| e.file).collect();
        assert_eq!(files, vec![temp.path().join("r1.xml"), temp.path().join("r2.xml")]);
    }

    #[test]
    fn test_missing_filename_is_error() {
        let err = TableDefinition::parse_str(
            "<table><result/></table>",
            Path::new("t.xml"),
            &GlobExpander::new(),
        )
        .unwrap_err();
        assert!(err.is_configuration_error());
    }
}
