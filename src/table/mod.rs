//! @ai:module:intent Result-table subsystem: parse result files, merge them, extract differences
//! @ai:module:layer application
//! @ai:module:public_api ResultSet, ResultTableAssembler, Table, DiffExtractor, TableDefinition

pub mod assembler;
pub mod diff;
pub mod result_file;
pub mod table_definition;

pub use assembler::{
    Column, ColumnGroup, ResultTableAssembler, RowResult, Table, TableOptions, TableRow,
};
pub use diff::{DiffExtractor, DiffTable};
pub use result_file::{ColumnValue, ResultRecord, ResultSet};
pub use table_definition::{TableDefinition, TableEntry};
