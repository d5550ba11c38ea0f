//! @ai:module:intent Merge result sets into one table keyed by run identifier
//! @ai:module:layer application
//! @ai:module:public_api Table, TableRow, RowResult, ColumnGroup, Column, TableOptions, ResultTableAssembler
//! @ai:module:stateless true

use crate::table::result_file::{ResultRecord, ResultSet};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Units that are moved from cell values into the column header
const UNITS: &[&str] = &["s", "B"];

/// @ai:intent Column selection and row filtering for table assembly
#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    /// Show every column of every run, hidden ones included
    pub all_columns: bool,
    /// Keep only rows where at least one result is correct
    pub correct_only: bool,
    /// Keep only rows present in every result set
    pub common: bool,
    /// Explicit columns per result set (by position), overriding the policy above
    pub declared_columns: Vec<Option<Vec<String>>>,
}

/// @ai:intent One displayed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub title: String,
    pub unit: Option<String>,
}

impl Column {
    /// @ai:intent Header text, e.g. `cputime (s)`
    /// @ai:effects pure
    pub fn header(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{} ({})", self.title, unit),
            None => self.title.clone(),
        }
    }
}

/// @ai:intent Columns contributed by one result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnGroup {
    pub source: PathBuf,
    pub tool: String,
    pub run_set: String,
    pub columns: Vec<Column>,
}

/// @ai:intent Projected cells of one result plus the full record behind them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowResult {
    pub values: Vec<String>,
    pub correct: bool,
    #[serde(skip)]
    pub record: ResultRecord,
}

/// @ai:intent One table row; `results[i]` is None when result set i has no such run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub identifier: String,
    pub results: Vec<Option<RowResult>>,
}

impl TableRow {
    /// @ai:intent Whether any contributing result is correct
    /// @ai:effects pure
    pub fn any_correct(&self) -> bool {
        self.results.iter().flatten().any(|r| r.correct)
    }
}

/// @ai:intent Column-aligned view over one or more result sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub groups: Vec<ColumnGroup>,
    pub rows: Vec<TableRow>,
}

impl Table {
    /// @ai:intent Longest directory prefix shared by all row identifiers, ending in `/`
    /// @ai:effects pure
    pub fn common_prefix(&self) -> String {
        let mut rows = self.rows.iter();
        let Some(first) = rows.next() else {
            return String::new();
        };

        let mut prefix = match first.identifier.rfind('/') {
            Some(i) => first.identifier[..=i].to_string(),
            None => return String::new(),
        };

        for row in rows {
            while !prefix.is_empty() && !row.identifier.starts_with(&prefix) {
                prefix.pop();
                prefix = match prefix.rfind('/') {
                    Some(i) => prefix[..=i].to_string(),
                    None => String::new(),
                };
            }
        }

        prefix
    }

    pub fn column_count(&self) -> usize {
        self.groups.iter().map(|g| g.columns.len()).sum()
    }
}

/// @ai:intent Builds tables from result sets
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultTableAssembler;

impl ResultTableAssembler {
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Merge result sets into one table.
    ///            Output order depends only on input order and first-seen identifiers.
    /// @ai:effects pure
    pub fn assemble(&self, result_sets: &[ResultSet], options: &TableOptions) -> Table {
        let titles: Vec<Vec<String>> = result_sets
            .iter()
            .enumerate()
            .map(|(i, set)| {
                let declared = options.declared_columns.get(i).cloned().flatten();
                select_columns(set, declared, options.all_columns)
            })
            .collect();

        let groups: Vec<ColumnGroup> = result_sets
            .iter()
            .zip(&titles)
            .map(|(set, titles)| ColumnGroup {
                source: set.path.clone(),
                tool: set.tool.clone(),
                run_set: set.name.clone(),
                columns: titles
                    .iter()
                    .map(|title| Column {
                        title: title.clone(),
                        unit: common_unit(set, title),
                    })
                    .collect(),
            })
            .collect();

        let identifiers = ordered_identifiers(result_sets);
        let lookups: Vec<HashMap<&str, &ResultRecord>> = result_sets
            .iter()
            .map(|set| {
                set.records
                    .iter()
                    .map(|r| (r.identifier.as_str(), r))
                    .collect()
            })
            .collect();

        let mut rows = Vec::with_capacity(identifiers.len());

        for identifier in identifiers {
            let results: Vec<Option<RowResult>> = lookups
                .iter()
                .zip(&groups)
                .map(|(lookup, group)| {
                    lookup
                        .get(identifier)
                        .map(|record| project(record, &group.columns))
                })
                .collect();

            let missing = results.iter().filter(|r| r.is_none()).count();
            if missing > 0 {
                tracing::debug!(
                    "Run {} is missing from {} of {} result sets",
                    identifier,
                    missing,
                    results.len()
                );

                if options.common {
                    continue;
                }
            }

            let row = TableRow {
                identifier: identifier.to_string(),
                results,
            };

            if options.correct_only && !row.any_correct() {
                continue;
            }
            rows.push(row);
        }

        tracing::info!(
            "Assembled table with {} rows and {} columns from {} result sets",
            rows.len(),
            groups.iter().map(|g| g.columns.len()).sum::<usize>(),
            groups.len()
        );

        Table { groups, rows }
    }
}

fn select_columns(set: &ResultSet, declared: Option<Vec<String>>, all_columns: bool) -> Vec<String> {
    match declared {
        Some(columns) => columns,
        None if all_columns => set.all_columns(),
        None => set.declared_columns.clone(),
    }
}

/// @ai:intent Union of run identifiers, first-seen order over files in input order
/// @ai:effects pure
fn ordered_identifiers(result_sets: &[ResultSet]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    result_sets
        .iter()
        .flat_map(|set| &set.records)
        .map(|r| r.identifier.as_str())
        .filter(|id| seen.insert(*id))
        .collect()
}

/// @ai:intent Unit shared by every non-empty value of a column, if the values are numeric
/// @ai:effects pure
fn common_unit(set: &ResultSet, title: &str) -> Option<String> {
    let values: Vec<&str> = set
        .records
        .iter()
        .filter_map(|r| r.value(title))
        .filter(|v| !v.is_empty())
        .collect();

    if values.is_empty() {
        return None;
    }

    UNITS
        .iter()
        .find(|unit| values.iter().all(|v| strip_unit(v, unit).is_some()))
        .map(|unit| unit.to_string())
}

fn strip_unit<'v>(value: &'v str, unit: &str) -> Option<&'v str> {
    value
        .strip_suffix(unit)
        .filter(|number| number.parse::<f64>().is_ok())
}

fn project(record: &ResultRecord, columns: &[Column]) -> RowResult {
    let values = columns
        .iter()
        .map(|column| {
            let value = record.value(&column.title).unwrap_or_default();

            column
                .unit
                .as_deref()
                .and_then(|unit| strip_unit(value, unit))
                .unwrap_or(value)
                .to_string()
        })
        .collect();

    RowResult {
        values,
        correct: record.is_correct(),
        record: record.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn result_set(name: &str, runs: &[(&str, &str, &str)]) -> ResultSet {
        let mut xml = format!(
            r#"<result tool="Tool" name="{name}"><columns><column title="status"/><column title="cputime"/></columns>"#
        );
        for (id, status, category) in runs {
            xml.push_str(&format!(
                r#"<run name="{id}"><column title="status" value="{status}"/><column title="cputime" value="1.0s"/><column hidden="true" title="category" value="{category}"/></run>"#
            ));
        }
        xml.push_str("</result>");
        ResultSet::parse_str(&xml, Path::new(&format!("{name}.xml"))).unwrap()
    }

    fn ids(table: &Table) -> Vec<&str> {
        table.rows.iter().map(|r| r.identifier.as_str()).collect()
    }

    #[test]
    fn test_single_set_default_columns() {
        let set = result_set("a", &[("dir/x.c", "true", "correct")]);
        let table = ResultTableAssembler::new().assemble(&[set], &TableOptions::default());

        assert_eq!(table.groups.len(), 1);
        let headers: Vec<String> = table.groups[0].columns.iter().map(Column::header).collect();
        assert_eq!(headers, vec!["status", "cputime (s)"]);
        assert_eq!(table.rows[0].results[0].as_ref().unwrap().values, vec!["true", "1.0"]);
    }

    #[test]
    fn test_all_columns_include_hidden() {
        let set = result_set("a", &[("x.c", "true", "correct")]);
        let options = TableOptions {
            all_columns: true,
            ..Default::default()
        };
        let table = ResultTableAssembler::new().assemble(&[set], &options);
        let titles: Vec<&str> = table.groups[0]
            .columns
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["status", "cputime", "category"]);
    }

    #[test]
    fn test_declared_columns_override() {
        let set = result_set("a", &[("x.c", "true", "correct")]);
        let options = TableOptions {
            all_columns: true,
            declared_columns: vec![Some(vec!["category".to_string()])],
            ..Default::default()
        };
        let table = ResultTableAssembler::new().assemble(&[set], &options);
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.groups[0].columns[0].title, "category");
    }

    #[test]
    fn test_wide_merge_keeps_missing_rows() {
        let a = result_set("a", &[("x.c", "true", "correct"), ("y.c", "false", "wrong")]);
        let b = result_set("b", &[("z.c", "true", "correct"), ("x.c", "TIMEOUT", "error")]);
        let table = ResultTableAssembler::new().assemble(&[a, b], &TableOptions::default());

        assert_eq!(ids(&table), vec!["x.c", "y.c", "z.c"]);
        assert!(table.rows[1].results[1].is_none());
        assert!(table.rows[2].results[0].is_none());
        assert_eq!(
            table.rows[0].results[1].as_ref().unwrap().values[0],
            "TIMEOUT"
        );
    }

    #[test]
    fn test_common_rows_only() {
        let a = result_set("a", &[("x.c", "true", "correct"), ("y.c", "false", "wrong")]);
        let b = result_set("b", &[("x.c", "true", "correct")]);
        let options = TableOptions {
            common: true,
            ..Default::default()
        };
        let table = ResultTableAssembler::new().assemble(&[a, b], &options);
        assert_eq!(ids(&table), vec!["x.c"]);
    }

    #[test]
    fn test_correct_only_never_adds_rows() {
        let a = result_set("a", &[("x.c", "true", "correct"), ("y.c", "false", "wrong")]);
        let b = result_set("b", &[("y.c", "false", "correct"), ("z.c", "TIMEOUT", "error")]);
        let sets = [a, b];

        let all = ResultTableAssembler::new().assemble(&sets, &TableOptions::default());
        let correct = ResultTableAssembler::new().assemble(
            &sets,
            &TableOptions {
                correct_only: true,
                ..Default::default()
            },
        );

        assert!(correct.rows.len() <= all.rows.len());
        assert_eq!(ids(&correct), vec!["x.c", "y.c"]);
    }

    #[test]
    fn test_mixed_units_are_kept() {
        let xml = r#"<result tool="t"><run name="a"><column title="mem" value="10B"/></run><run name="b"><column title="mem" value="3s"/></run></result>"#;
        let set = ResultSet::parse_str(xml, Path::new("r.xml")).unwrap();
        let table = ResultTableAssembler::new().assemble(&[set], &TableOptions::default());
        assert_eq!(table.groups[0].columns[0].unit, None);
        assert_eq!(table.rows[0].results[0].as_ref().unwrap().values, vec!["10B"]);
    }

    #[test]
    fn test_common_prefix() {
        let set = result_set(
            "a",
            &[
                ("../programs/a/x.c", "true", "correct"),
                ("../programs/b/y.c", "true", "correct"),
            ],
        );
        let table = ResultTableAssembler::new().assemble(&[set], &TableOptions::default());
        assert_eq!(table.common_prefix(), "../programs/");
    }
}
