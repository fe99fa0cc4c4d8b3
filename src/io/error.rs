use thiserror::Error;

use crate::descriptor::TypeCode;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("no table unit in file")]
    NoTable,
    #[error("column index {0} out of range")]
    NoSuchColumn(usize),
    #[error("bad column format: {0}")]
    BadFormat(String),
    #[error("cannot convert {from} column data to {to}")]
    Conversion { from: TypeCode, to: TypeCode },
    #[error("element range {start}..{end} exceeds column length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("data checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    Checksum { stored: u32, computed: u32 },
    #[error("invalid table metadata: {0}")]
    Metadata(String),
    #[error("table io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("table arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("table parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}
