//! Low-level table protocol and its in-memory, parquet-persisted implementation.
//!
//! The engine above this module only talks to [`TableIo`]. Column indices are zero-based;
//! keywords that FITS numbers from one (`TTYPEn`, `TFORMn`, `TDIMn`) keep their one-based
//! numbering. Dimensions are listed fastest axis first, as in `TDIMn`.

mod error;
mod mem;
mod ondisk;
pub(crate) mod tform;

pub use error::IoError;
pub use mem::MemTable;

use crate::{descriptor::ColumnType, element::Element};

/// Kind of table unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    BinTable,
    /// Legacy text table; read-only for the engine.
    AsciiTable,
}

impl Extension {
    /// Value of the `XTENSION` keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Extension::BinTable => "BINTABLE",
            Extension::AsciiTable => "TABLE",
        }
    }

    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim() {
            "BINTABLE" => Some(Extension::BinTable),
            "TABLE" => Some(Extension::AsciiTable),
            _ => None,
        }
    }
}

/// Column-level access to one table unit.
///
/// Element reads and writes address `first_row` then `first_elem` within that row and run
/// on through the following rows, so one call may cover several rows. String elements are
/// fixed-width slots of the column's decode width.
pub trait TableIo {
    /// Name used in diagnostics.
    fn file_name(&self) -> &str;

    /// Kind of the table unit, `None` while the file holds no table.
    fn extension(&self) -> Option<Extension>;

    fn create_table(&mut self, extension: Extension) -> Result<(), IoError>;

    fn num_columns(&self) -> Result<usize, IoError>;

    fn num_rows(&self) -> Result<usize, IoError>;

    fn keyword(&self, key: &str) -> Result<Option<String>, IoError>;

    fn set_keyword(&mut self, key: &str, value: &str) -> Result<(), IoError>;

    /// Position of the column called `name`, compared case-insensitively.
    fn column_index(&self, name: &str) -> Result<Option<usize>, IoError>;

    fn column_name(&self, index: usize) -> Result<String, IoError>;

    fn column_type(&self, index: usize) -> Result<ColumnType, IoError>;

    /// Per-row dimensions from `TDIMn`, or the repeat count when it is absent.
    fn column_dims(&self, index: usize) -> Result<Vec<usize>, IoError>;

    /// Inserts a column before `index`. New cells of existing rows are zero.
    fn insert_column(&mut self, index: usize, name: &str, tform: &str) -> Result<(), IoError>;

    fn write_dims(&mut self, index: usize, dims: &[usize]) -> Result<(), IoError>;

    fn delete_column(&mut self, index: usize) -> Result<(), IoError>;

    /// Width of the string slots used by later string reads and writes of this column.
    fn set_decode_width(&mut self, index: usize, width: usize) -> Result<(), IoError>;

    /// Grows the table to at least `rows` rows.
    fn reserve_rows(&mut self, rows: usize) -> Result<(), IoError>;

    /// Makes every change durable.
    fn flush(&mut self) -> Result<(), IoError>;

    fn read_elements<T: Element>(
        &mut self,
        index: usize,
        first_row: usize,
        first_elem: usize,
        out: &mut [T],
    ) -> Result<(), IoError>;

    /// Writes `values`, growing the table when they run past the last row.
    fn write_elements<T: Element>(
        &mut self,
        index: usize,
        first_row: usize,
        first_elem: usize,
        values: &[T],
    ) -> Result<(), IoError>;

    fn read_strings(
        &mut self,
        index: usize,
        first_row: usize,
        first_elem: usize,
        slots: &mut [Box<[u8]>],
    ) -> Result<(), IoError>;

    fn write_strings(
        &mut self,
        index: usize,
        first_row: usize,
        first_elem: usize,
        slots: &[Box<[u8]>],
    ) -> Result<(), IoError>;
}
