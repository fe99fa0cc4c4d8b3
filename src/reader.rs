use crate::{
    compat,
    dims,
    element::Element,
    error::TableError,
    io::{IoError, TableIo},
    observability::log_debug,
    option::ReadOptions,
    result::{Outcome, ReadResult},
    scratch::StringSlots,
    value::ColumnValue,
    window::{self, Geometry},
};

/// Bulk reads of one column, positioned at the start of the negotiated row window.
pub struct ColumnReader<'a, F> {
    io: &'a mut F,
    index: usize,
    name: &'a str,
    first_row: usize,
    first_elem: usize,
    width: usize,
}

impl<F: TableIo> ColumnReader<'_, F> {
    fn fail(&self, err: IoError) -> TableError {
        TableError::io(
            format!("could not read column '{}'", self.name),
            self.io.file_name(),
            err,
        )
    }

    /// Reads the first element of the column. Scalars ignore the row window.
    pub fn scalar<T: Element>(&mut self) -> Result<T, TableError> {
        let mut out = [T::default()];
        self.io
            .read_elements(self.index, 0, 0, &mut out)
            .map_err(|err| self.fail(err))?;
        Ok(out[0])
    }

    /// Fills `out` from the start of the window.
    pub fn elements<T: Element>(&mut self, out: &mut [T]) -> Result<(), TableError> {
        if out.is_empty() {
            return Ok(());
        }
        self.io
            .read_elements(self.index, self.first_row, self.first_elem, out)
            .map_err(|err| self.fail(err))
    }

    /// Reads the first string of the column at its full declared width.
    pub fn string(&mut self) -> Result<String, TableError> {
        if self.width == 0 {
            return Ok(String::new());
        }
        self.io
            .set_decode_width(self.index, self.width)
            .map_err(|err| self.fail(err))?;
        let mut slots = StringSlots::zeroed(1, self.width);
        self.io
            .read_strings(self.index, 0, 0, slots.as_mut_slots())
            .map_err(|err| self.fail(err))?;
        Ok(slots.decode(0))
    }

    /// Fills `out` with strings from the start of the window, without trailing padding.
    pub fn strings(&mut self, out: &mut [String]) -> Result<(), TableError> {
        if out.is_empty() || self.width == 0 {
            return Ok(());
        }
        let mut slots = StringSlots::zeroed(out.len(), self.width);
        self.io
            .read_strings(
                self.index,
                self.first_row,
                self.first_elem,
                slots.as_mut_slots(),
            )
            .map_err(|err| self.fail(err))?;
        for (i, value) in out.iter_mut().enumerate() {
            *value = slots.decode(i);
        }
        Ok(())
    }
}

fn describe_rows(opts: &ReadOptions, total: usize) -> String {
    match (opts.first_row, opts.last_row) {
        (Some(first), Some(last)) if first.checked_add(1) == Some(last) => format!("row {first}"),
        (first, last) => format!(
            "rows {} to {}",
            first.unwrap_or(0),
            last.unwrap_or(total)
        ),
    }
}

/// Loads column `name` into `value` under `opts`.
pub(crate) fn read_value<C, F>(
    io: &mut F,
    opts: &ReadOptions,
    name: &str,
    value: &mut C,
) -> ReadResult
where
    C: ColumnValue,
    F: TableIo,
{
    let column = name.to_uppercase();
    let file = io.file_name().to_string();
    let context = |what: &str| format!("could not read {what} of column '{column}'");

    let index = match io.extension() {
        Some(_) => io
            .column_index(&column)
            .map_err(|err| TableError::io(context("position"), &file, err))?,
        None => None,
    };
    let Some(index) = index else {
        if opts.allow_missing {
            log_debug!(
                component = "reader",
                event = "missing_column_skipped",
                column = %column,
                file = %file,
            );
            return Ok(Outcome::Skipped);
        }
        return Err(TableError::MissingColumn { column, file });
    };

    let ty = io
        .column_type(index)
        .map_err(|err| TableError::io(context("type"), &file, err))?;
    if !compat::accepts(ty.code, C::CODE, opts.allow_narrow) {
        return Err(TableError::TypeMismatch {
            column,
            expected: C::ELEMENT,
            found: ty.code,
            file,
        });
    }

    let geometry = Geometry::of_column(io, index, ty)
        .map_err(|err| TableError::io(context("dimensions"), &file, err))?;
    if !dims::admits(C::SHAPE, &geometry.naxes, opts) {
        return Err(TableError::DimensionMismatch {
            column,
            expected: C::SHAPE.rank(),
            found: geometry.naxes.len(),
            file,
        });
    }

    let total = geometry.row_extent();
    let Some(window) = window::resolve(opts.first_row, opts.last_row, total) else {
        return Err(TableError::RowRangeInvalid {
            column,
            requested: describe_rows(opts, total),
            dims: geometry.naxes,
            file,
        });
    };

    let shape = dims::reconciled_shape(C::SHAPE, &geometry.windowed(window));
    value.reshape(&shape);

    if geometry.nrows != 0 {
        let width = geometry.text_width();
        let unit = if C::SHAPE.is_text() { width } else { 1 };
        let (first_row, first_elem) = geometry.offset(window, unit);
        let mut reader = ColumnReader {
            io,
            index,
            name: &column,
            first_row,
            first_elem,
            width,
        };
        value.load(&mut reader)?;
    }

    log_debug!(
        component = "reader",
        event = "column_read",
        column = %column,
        first_row = window.first,
        last_row = window.last,
        layout = ?geometry.layout,
    );
    Ok(Outcome::Loaded)
}
