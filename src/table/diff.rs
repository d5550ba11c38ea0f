//! @ai:module:intent Extract rows whose status differs between two result sets
//! @ai:module:layer application
//! @ai:module:public_api DiffExtractor, DiffTable
//! @ai:module:depends_on assembler
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::table::assembler::{Table, TableRow};
use serde::Serialize;

/// @ai:intent Rows of a two-result-set table that disagree on the comparison column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffTable {
    pub left: usize,
    pub right: usize,
    pub column: String,
    /// Same column groups as the source table, rows restricted to differences
    pub table: Table,
}

impl DiffTable {
    pub fn is_empty(&self) -> bool {
        self.table.rows.is_empty()
    }
}

/// @ai:intent Compares one column of two result sets row by row
#[derive(Debug, Clone)]
pub struct DiffExtractor {
    column: String,
}

impl DiffExtractor {
    /// @ai:intent Create an extractor comparing the given column
    /// @ai:effects pure
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    /// @ai:intent Keep rows where left and right disagree; absence counts as disagreement
    /// @ai:pre table has exactly two result sets and left != right
    /// @ai:effects pure
    pub fn diff(&self, table: &Table, left: usize, right: usize) -> Result<DiffTable> {
        let available = table.groups.len();

        if available != 2 || left >= available || right >= available || left == right {
            return Err(Error::DiffIndex {
                left,
                right,
                available,
            });
        }

        let rows: Vec<TableRow> = table
            .rows
            .iter()
            .filter(|row| self.differs(row, left, right))
            .cloned()
            .collect();

        tracing::info!(
            "{} of {} rows differ in column '{}'",
            rows.len(),
            table.rows.len(),
            self.column
        );

        Ok(DiffTable {
            left,
            right,
            column: self.column.clone(),
            table: Table {
                groups: table.groups.clone(),
                rows,
            },
        })
    }

    fn differs(&self, row: &TableRow, left: usize, right: usize) -> bool {
        let value = |index: usize| {
            row.results
                .get(index)
                .and_then(Option::as_ref)
                .and_then(|r| r.record.value(&self.column))
        };

        match (value(left), value(right)) {
            (Some(a), Some(b)) => a != b,
            _ => true,
        }
    }
}

impl Default for DiffExtractor {
    fn default() -> Self {
        Self::new("status")
    }
}
