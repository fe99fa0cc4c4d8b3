//! Typed, dimension-checked marshalling between binary tables and in-memory values.
//!
//! Columns are read into scalars, `Vec`s, rank-generic [`Array`]s, strings and records, with
//! explicit policies ([`ReadOptions`]) deciding which type conversions and shape changes are
//! acceptable. Writes lay values out either one column per array
//! ([`TableFormat::ColumnOriented`]) or one table row per leading index
//! ([`TableFormat::RowOriented`]).
//!
//! ```no_run
//! use bintable::{InputTable, OutputTable, ReadOptions, Record};
//!
//! #[derive(Record, Default)]
//! struct Source {
//!     id: Vec<i64>,
//!     flux: Vec<f64>,
//! }
//!
//! # fn main() -> Result<(), bintable::TableError> {
//! let mut out = OutputTable::create("sources.parquet");
//! out.write_column("exposure", &30.0f64)?;
//! out.write_record(&Source { id: vec![1, 2], flux: vec![0.5, 0.7] })?;
//! out.close()?;
//!
//! let mut input = InputTable::open("sources.parquet")?;
//! let mut source = Source::default();
//! let outcome = input.read_record(&ReadOptions::STRICT, &mut source)?;
//! assert!(outcome.is_loaded());
//! # Ok(())
//! # }
//! ```

mod observability;

mod array;
mod compat;
mod descriptor;
mod dims;
mod element;
mod error;
mod format;
mod info;
pub mod io;
mod option;
mod reader;
pub mod record;
mod result;
mod scratch;
mod table;
mod value;
mod window;
mod writer;

pub use bintable_macros::Record;

pub use crate::{
    array::{Array, Array1, Array2, Array3},
    descriptor::{ColumnDescriptor, ColumnType, ScalarKind, TypeCode},
    dims::TargetShape,
    element::{Element, Scalar},
    error::TableError,
    format::TableFormat,
    option::{ReadOptions, TableOption},
    reader::ColumnReader,
    record::{
        ReadColumn, ReadColumns, ReadContext, Record, WriteColumn, WriteColumns, WriteContext,
    },
    result::{Outcome, ReadResult},
    table::{InputTable, OutputTable, Table},
    value::ColumnValue,
    writer::ColumnWriter,
};
