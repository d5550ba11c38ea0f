//! @ai:module:intent Tab-separated rendering of result tables
//! @ai:module:layer infrastructure
//! @ai:module:public_api CsvReporter
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::table::Table;
use std::path::Path;

/// @ai:intent Trait for CSV table rendering
pub trait CsvReporterTrait: Send + Sync {
    /// @ai:intent Render a table to CSV text
    fn render(&self, table: &Table) -> Result<String>;

    /// @ai:intent Render a table and write it to output_path
    fn generate(&self, table: &Table, output_path: &Path) -> Result<()>;
}

/// @ai:intent Writes tables as tab-delimited CSV with three header lines
pub struct CsvReporter;

impl CsvReporter {
    /// @ai:intent Create a new CSV reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReporterTrait for CsvReporter {
    /// @ai:intent Header lines `tool`, `run set` and column titles, then one line per row.
    ///            Identifiers are printed relative to their common directory prefix.
    /// @ai:effects pure
    fn render(&self, table: &Table) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(Vec::new());

        let prefix = table.common_prefix();

        let mut tools = vec!["tool".to_string()];
        let mut run_sets = vec!["run set".to_string()];
        let mut titles = vec![prefix.clone()];

        for group in &table.groups {
            for column in &group.columns {
                tools.push(group.tool.clone());
                run_sets.push(group.run_set.clone());
                titles.push(column.header());
            }
        }

        writer.write_record(&tools)?;
        writer.write_record(&run_sets)?;
        writer.write_record(&titles)?;

        for row in &table.rows {
            let mut record = Vec::with_capacity(table.column_count() + 1);
            record.push(
                row.identifier
                    .strip_prefix(prefix.as_str())
                    .unwrap_or(&row.identifier)
                    .to_string(),
            );

            for (group, result) in table.groups.iter().zip(&row.results) {
                match result {
                    Some(result) => record.extend(result.values.iter().cloned()),
                    None => record.resize(record.len() + group.columns.len(), String::new()),
                }
            }

            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// @ai:effects fs:write
    fn generate(&self, table: &Table, output_path: &Path) -> Result<()> {
        let content = self.render(table)?;
        std::fs::write(output_path, content).map_err(|source| Error::FileWrite {
            path: output_path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ResultSet, ResultTableAssembler, TableOptions};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn table(files: &[(&str, &str)]) -> Table {
        let sets: Vec<ResultSet> = files
            .iter()
            .map(|(name, xml)| ResultSet::parse_str(xml, Path::new(name)).unwrap())
            .collect();
        ResultTableAssembler::new().assemble(&sets, &TableOptions::default())
    }

    const A: &str = r#"<result tool="CPAchecker" version="1.4" name="predicate">
  <columns><column title="status"/><column title="cputime"/></columns>
  <run name="../programs/x.c"><column title="status" value="true"/><column title="cputime" value="1.5s"/></run>
  <run name="../programs/sub/y.c"><column title="status" value="false(unreach-call)"/><column title="cputime" value="2s"/></run>
</result>"#;

    const B: &str = r#"<result tool="CPAchecker" version="1.4" name="value">
  <columns><column title="status"/></columns>
  <run name="../programs/x.c"><column title="status" value="TIMEOUT"/></run>
</result>"#;

    #[test]
    fn test_render_single_table() {
        let csv = CsvReporter::new().render(&table(&[("a.xml", A)])).unwrap();

        let expected = "tool\tCPAchecker 1.4\tCPAchecker 1.4\n\
                        run set\tpredicate\tpredicate\n\
                        ../programs/\tstatus\tcputime (s)\n\
                        x.c\ttrue\t1.5\n\
                        sub/y.c\tfalse(unreach-call)\t2\n";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_missing_result_renders_empty_cells() {
        let csv = CsvReporter::new()
            .render(&table(&[("b.xml", B), ("a.xml", A)]))
            .unwrap();
        let last = csv.lines().last().unwrap();
        assert_eq!(last, "sub/y.c\t\tfalse(unreach-call)\t2");
    }

    #[test]
    fn test_cells_are_written_verbatim() {
        let xml = r#"<result tool="CPAchecker" version="1.4" name="predicate">
  <run name="x.c"><column title="status" value='ERROR (say "hi")'/></run>
</result>"#;
        let csv = CsvReporter::new().render(&table(&[("q.xml", xml)])).unwrap();
        assert_eq!(csv.lines().last().unwrap(), "x.c\tERROR (say \"hi\")");
    }

    #[test]
    fn test_render_is_deterministic() {
        let reporter = CsvReporter::new();
        let first = reporter.render(&table(&[("a.xml", A), ("b.xml", B)])).unwrap();
        let second = reporter.render(&table(&[("a.xml", A), ("b.xml", B)])).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_writes_file() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("t.csv");
        CsvReporter::new()
            .generate(&table(&[("a.xml", A)]), &output)
            .unwrap();
        assert!(std::fs::read_to_string(&output).unwrap().starts_with("tool\t"));
    }
}
