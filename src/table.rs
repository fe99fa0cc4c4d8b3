//! Table handles: read-only, write-only and read-write.
//!
//! Every handle owns its backend exclusively, so the format checks made before a column is
//! created cannot be invalidated by another writer in between. The handles differ only in
//! which operations they expose; the bodies live in the helpers below.

use crate::{
    descriptor::ColumnDescriptor,
    element::Element,
    error::TableError,
    format::{TableFormat, TableFormatController},
    info,
    io::{MemTable, TableIo},
    observability::log_debug,
    option::{ReadOptions, TableOption},
    record::{
        self, ReadColumn, ReadColumns, ReadContext, Record, WriteColumn, WriteColumns,
        WriteContext,
    },
    result::ReadResult,
    writer,
};

fn open_io(option: &TableOption) -> Result<MemTable, TableError> {
    MemTable::open(option).map_err(|err| {
        TableError::io("could not open table", &option.path.display().to_string(), err)
    })
}

fn read_with<F, C>(io: &mut F, opts: &ReadOptions, name: &str, value: &mut C) -> ReadResult
where
    F: TableIo,
    C: ReadColumn + ?Sized,
{
    value.read_column(&mut ReadContext::new(io), opts, name)
}

fn read_many<F, T>(io: &mut F, opts: &ReadOptions, columns: T) -> ReadResult
where
    F: TableIo,
    T: ReadColumns,
{
    columns.read_columns(&mut ReadContext::new(io), opts)
}

fn read_whole_record<F, R>(io: &mut F, opts: &ReadOptions, record: &mut R) -> ReadResult
where
    F: TableIo,
    R: Record + ?Sized,
{
    record::read_record(record, &mut ReadContext::new(io), opts, "")
}

/// Creates the table unit on first use and hands out a context in the controller's layout.
fn write_context<'a, F: TableIo>(
    io: &'a mut F,
    format: &TableFormatController,
) -> Result<WriteContext<'a, F>, TableError> {
    format.ensure_table(io)?;
    Ok(WriteContext::new(io, format.format()))
}

fn allocate<F, T, const D: usize>(
    io: &mut F,
    format: &TableFormatController,
    name: &str,
    dims: [usize; D],
) -> Result<(), TableError>
where
    F: TableIo,
    T: Element,
{
    writer::allocate::<T, F>(&mut write_context(io, format)?, name, &dims)
}

fn flush_io<F: TableIo>(io: &mut F) -> Result<(), TableError> {
    io.flush()
        .map_err(|err| TableError::io("could not flush table", io.file_name(), err))
}

/// A table opened for reading.
#[derive(Debug)]
pub struct InputTable<F: TableIo = MemTable> {
    io: F,
}

impl InputTable<MemTable> {
    /// Opens the file at the option's path.
    pub fn open(option: impl Into<TableOption>) -> Result<Self, TableError> {
        Ok(InputTable {
            io: open_io(&option.into())?,
        })
    }
}

impl<F: TableIo> InputTable<F> {
    pub fn from_io(io: F) -> Self {
        InputTable { io }
    }

    pub fn file_name(&self) -> &str {
        self.io.file_name()
    }

    /// Reads column `name` into `value`, requiring an exact type and rank match.
    pub fn read_column<C>(&mut self, name: &str, value: &mut C) -> ReadResult
    where
        C: ReadColumn + ?Sized,
    {
        read_with(&mut self.io, &ReadOptions::STRICT, name, value)
    }

    pub fn read_column_with<C>(
        &mut self,
        opts: &ReadOptions,
        name: &str,
        value: &mut C,
    ) -> ReadResult
    where
        C: ReadColumn + ?Sized,
    {
        read_with(&mut self.io, opts, name, value)
    }

    /// Reads each `(name, &mut value)` pair of `columns` in order, stopping at the first error.
    pub fn read_columns<T: ReadColumns>(&mut self, opts: &ReadOptions, columns: T) -> ReadResult {
        read_many(&mut self.io, opts, columns)
    }

    /// Reads every field of `record` from the columns named after them.
    pub fn read_record<R>(&mut self, opts: &ReadOptions, record: &mut R) -> ReadResult
    where
        R: Record + ?Sized,
    {
        read_whole_record(&mut self.io, opts, record)
    }

    pub fn column_info(&mut self, name: &str) -> Result<Option<ColumnDescriptor>, TableError> {
        info::column_info(&mut self.io, name)
    }

    pub fn columns_info(&mut self) -> Result<Vec<ColumnDescriptor>, TableError> {
        info::columns_info(&mut self.io)
    }

    pub fn into_inner(self) -> F {
        self.io
    }
}

/// A table opened for writing new columns.
#[derive(Debug)]
pub struct OutputTable<F: TableIo = MemTable> {
    io: F,
    format: TableFormatController,
}

impl OutputTable<MemTable> {
    /// Starts a new table at the option's path, replacing any file there on the first flush.
    /// Closing it before any column is written leaves the path untouched.
    pub fn create(option: impl Into<TableOption>) -> Self {
        let option = option.into();
        log_debug!(
            component = "table",
            event = "table_created",
            path = %option.path.display(),
            format = ?option.format,
        );
        OutputTable {
            io: MemTable::create(&option),
            format: TableFormatController::new(option.format),
        }
    }
}

impl<F: TableIo> OutputTable<F> {
    /// Wraps an existing backend. Its layout is inferred from the data already present,
    /// falling back to `format` for a table without columns.
    pub fn from_io(io: F, format: TableFormat) -> Result<Self, TableError> {
        let format = TableFormatController::inferred(&io, format)?;
        Ok(OutputTable { io, format })
    }

    pub fn file_name(&self) -> &str {
        self.io.file_name()
    }

    pub fn format(&self) -> TableFormat {
        self.format.format()
    }

    /// Changes the layout. Fails once the table has columns, unless `format` is the current one.
    pub fn set_format(&mut self, format: TableFormat) -> Result<(), TableError> {
        self.format.set_format(&self.io, format)
    }

    /// Writes `value` as a new column `name`.
    pub fn write_column<C>(&mut self, name: &str, value: &C) -> Result<(), TableError>
    where
        C: WriteColumn + ?Sized,
    {
        value.write_column(&mut write_context(&mut self.io, &self.format)?, name)
    }

    pub fn write_columns<T: WriteColumns>(&mut self, columns: T) -> Result<(), TableError> {
        columns.write_columns(&mut write_context(&mut self.io, &self.format)?)
    }

    pub fn write_record<R>(&mut self, record: &R) -> Result<(), TableError>
    where
        R: Record + ?Sized,
    {
        record::write_record(record, &mut write_context(&mut self.io, &self.format)?, "")
    }

    /// Creates column `name` sized for an array of `dims` elements of `T`, with zeroed cells.
    pub fn allocate_column<T, const D: usize>(
        &mut self,
        name: &str,
        dims: [usize; D],
    ) -> Result<(), TableError>
    where
        T: Element,
    {
        allocate::<F, T, D>(&mut self.io, &self.format, name, dims)
    }

    pub fn flush(&mut self) -> Result<(), TableError> {
        flush_io(&mut self.io)
    }

    /// Flushes pending changes and releases the table.
    pub fn close(mut self) -> Result<(), TableError> {
        self.flush()
    }

    pub fn into_inner(self) -> F {
        self.io
    }
}

/// A table that can be read, extended and modified in place.
#[derive(Debug)]
pub struct Table<F: TableIo = MemTable> {
    io: F,
    format: TableFormatController,
}

impl Table<MemTable> {
    /// Opens the file at the option's path, or starts a new one when nothing is there.
    pub fn open(option: impl Into<TableOption>) -> Result<Self, TableError> {
        let option = option.into();
        let io = if option.path.exists() {
            open_io(&option)?
        } else {
            MemTable::create(&option)
        };
        Table::from_io(io, option.format)
    }
}

impl<F: TableIo> Table<F> {
    pub fn from_io(io: F, format: TableFormat) -> Result<Self, TableError> {
        let format = TableFormatController::inferred(&io, format)?;
        Ok(Table { io, format })
    }

    pub fn file_name(&self) -> &str {
        self.io.file_name()
    }

    pub fn format(&self) -> TableFormat {
        self.format.format()
    }

    pub fn set_format(&mut self, format: TableFormat) -> Result<(), TableError> {
        self.format.set_format(&self.io, format)
    }

    pub fn read_column<C>(&mut self, name: &str, value: &mut C) -> ReadResult
    where
        C: ReadColumn + ?Sized,
    {
        read_with(&mut self.io, &ReadOptions::STRICT, name, value)
    }

    pub fn read_column_with<C>(
        &mut self,
        opts: &ReadOptions,
        name: &str,
        value: &mut C,
    ) -> ReadResult
    where
        C: ReadColumn + ?Sized,
    {
        read_with(&mut self.io, opts, name, value)
    }

    pub fn read_columns<T: ReadColumns>(&mut self, opts: &ReadOptions, columns: T) -> ReadResult {
        read_many(&mut self.io, opts, columns)
    }

    pub fn read_record<R>(&mut self, opts: &ReadOptions, record: &mut R) -> ReadResult
    where
        R: Record + ?Sized,
    {
        read_whole_record(&mut self.io, opts, record)
    }

    pub fn column_info(&mut self, name: &str) -> Result<Option<ColumnDescriptor>, TableError> {
        info::column_info(&mut self.io, name)
    }

    pub fn columns_info(&mut self) -> Result<Vec<ColumnDescriptor>, TableError> {
        info::columns_info(&mut self.io)
    }

    pub fn write_column<C>(&mut self, name: &str, value: &C) -> Result<(), TableError>
    where
        C: WriteColumn + ?Sized,
    {
        value.write_column(&mut write_context(&mut self.io, &self.format)?, name)
    }

    pub fn write_columns<T: WriteColumns>(&mut self, columns: T) -> Result<(), TableError> {
        columns.write_columns(&mut write_context(&mut self.io, &self.format)?)
    }

    pub fn write_record<R>(&mut self, record: &R) -> Result<(), TableError>
    where
        R: Record + ?Sized,
    {
        record::write_record(record, &mut write_context(&mut self.io, &self.format)?, "")
    }

    /// Replaces column `name` with `value`. The new column goes to the end of the table.
    pub fn update_column<C>(&mut self, name: &str, value: &C) -> Result<(), TableError>
    where
        C: WriteColumn + ?Sized,
    {
        value.update_column(&mut write_context(&mut self.io, &self.format)?, name)
    }

    pub fn update_columns<T: WriteColumns>(&mut self, columns: T) -> Result<(), TableError> {
        columns.update_columns(&mut write_context(&mut self.io, &self.format)?)
    }

    pub fn update_record<R>(&mut self, record: &R) -> Result<(), TableError>
    where
        R: Record + ?Sized,
    {
        record::update_record(record, &mut write_context(&mut self.io, &self.format)?, "")
    }

    /// Deletes column `name`. Absent columns are ignored.
    pub fn remove_column(&mut self, name: &str) -> Result<(), TableError> {
        self.remove_columns(&[name])
    }

    pub fn remove_columns(&mut self, names: &[&str]) -> Result<(), TableError> {
        let mut ctx = WriteContext::new(&mut self.io, self.format.format());
        for name in names {
            ctx.remove_column(name)?;
        }
        Ok(())
    }

    pub fn allocate_column<T, const D: usize>(
        &mut self,
        name: &str,
        dims: [usize; D],
    ) -> Result<(), TableError>
    where
        T: Element,
    {
        allocate::<F, T, D>(&mut self.io, &self.format, name, dims)
    }

    pub fn flush(&mut self) -> Result<(), TableError> {
        flush_io(&mut self.io)
    }

    pub fn close(mut self) -> Result<(), TableError> {
        self.flush()
    }

    pub fn into_inner(self) -> F {
        self.io
    }
}
