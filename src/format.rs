use crate::{
    error::TableError,
    io::{Extension, TableIo},
    observability::log_debug,
};

/// Physical layout of the columns of an output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFormat {
    /// Every column holds its whole array in a single row.
    #[default]
    ColumnOriented,
    /// The leading extent of every column is the row count, shared by all columns.
    RowOriented,
}

/// Tracks the layout of one table handle.
///
/// The layout may change freely while the table has no columns and is fixed afterwards.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TableFormatController {
    format: TableFormat,
}

fn has_columns<F: TableIo>(io: &F) -> Result<bool, TableError> {
    if io.extension().is_none() {
        return Ok(false);
    }
    let ncols = io
        .num_columns()
        .map_err(|err| TableError::io("could not get number of columns", io.file_name(), err))?;
    Ok(ncols > 0)
}

impl TableFormatController {
    pub(crate) fn new(format: TableFormat) -> Self {
        TableFormatController { format }
    }

    /// Layout of an existing table: row-oriented when it has columns and more than one
    /// row, `fallback` when it has no columns yet.
    pub(crate) fn inferred<F: TableIo>(io: &F, fallback: TableFormat) -> Result<Self, TableError> {
        if !has_columns(io)? {
            return Ok(Self::new(fallback));
        }
        let naxis2 = io
            .keyword("NAXIS2")
            .map_err(|err| TableError::io("could not read NAXIS2", io.file_name(), err))?
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let format = if naxis2 > 1 {
            TableFormat::RowOriented
        } else {
            TableFormat::ColumnOriented
        };
        log_debug!(
            component = "format",
            event = "format_inferred",
            file = io.file_name(),
            format = ?format,
        );
        Ok(Self::new(format))
    }

    pub(crate) fn format(&self) -> TableFormat {
        self.format
    }

    pub(crate) fn set_format<F: TableIo>(
        &mut self,
        io: &F,
        format: TableFormat,
    ) -> Result<(), TableError> {
        if format == self.format {
            return Ok(());
        }
        if has_columns(io)? {
            return Err(TableError::format_conflict(
                "cannot change table format when data exists in the table",
                io.file_name(),
            ));
        }
        self.format = format;
        Ok(())
    }

    /// Creates the binary table unit if the file has none yet.
    pub(crate) fn ensure_table<F: TableIo>(&self, io: &mut F) -> Result<(), TableError> {
        match io.extension() {
            Some(Extension::BinTable) => Ok(()),
            Some(Extension::AsciiTable) => Err(TableError::format_conflict(
                "cannot write columns into an ASCII table",
                io.file_name(),
            )),
            None => io
                .create_table(Extension::BinTable)
                .map_err(|err| TableError::io("could not create table", io.file_name(), err)),
        }
    }
}
