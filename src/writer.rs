use crate::{
    descriptor::TypeCode,
    dims::TargetShape,
    element::Element,
    error::TableError,
    format::TableFormat,
    io::{tform, IoError, TableIo},
    observability::log_debug,
    record::WriteContext,
    scratch::StringSlots,
    value::ColumnValue,
};

/// Bulk writes into a freshly created column.
pub struct ColumnWriter<'a, F> {
    io: &'a mut F,
    index: usize,
    name: &'a str,
    width: usize,
}

impl<F: TableIo> ColumnWriter<'_, F> {
    fn fail(&self, err: IoError) -> TableError {
        TableError::io(
            format!("could not write column '{}'", self.name),
            self.io.file_name(),
            err,
        )
    }

    pub fn scalar<T: Element>(&mut self, value: T) -> Result<(), TableError> {
        self.elements(&[value])
    }

    pub fn elements<T: Element>(&mut self, values: &[T]) -> Result<(), TableError> {
        if values.is_empty() {
            return Ok(());
        }
        self.io
            .write_elements(self.index, 0, 0, values)
            .map_err(|err| self.fail(err))
    }

    pub fn string(&mut self, value: &str) -> Result<(), TableError> {
        if value.is_empty() {
            return Ok(());
        }
        let slots = StringSlots::encode([value], self.width);
        self.io
            .write_strings(self.index, 0, 0, slots.as_slots())
            .map_err(|err| self.fail(err))
    }

    /// Writes `values` as NUL-padded strings of the column width.
    pub fn strings(&mut self, values: &[String]) -> Result<(), TableError> {
        if values.is_empty() || self.width == 0 {
            return Ok(());
        }
        let slots = StringSlots::encode(values.iter().map(String::as_str), self.width);
        self.io
            .write_strings(self.index, 0, 0, slots.as_slots())
            .map_err(|err| self.fail(err))
    }
}

/// Per-row dimensions (fastest first) and row count a value occupies under `format`.
///
/// Column-oriented tables store the whole value in one row. Row-oriented tables spread the
/// leading extent over rows and keep the remaining extents in each row. String widths lead
/// the dimensions of text columns.
pub(crate) fn disk_layout(
    shape: TargetShape,
    extents: &[usize],
    width: usize,
    format: TableFormat,
) -> (Vec<usize>, usize) {
    let (element_axes, nrow) = match (shape, format) {
        (TargetShape::Scalar | TargetShape::Text, _) => (&[][..], 1),
        (_, TableFormat::ColumnOriented) => (extents, 1),
        (_, TableFormat::RowOriented) => match extents.split_first() {
            Some((rows, rest)) => (rest, *rows),
            None => (&[][..], 0),
        },
    };
    let mut dims = Vec::with_capacity(element_axes.len() + 1);
    if shape.is_text() {
        dims.push(width);
    }
    dims.extend(element_axes.iter().rev());
    (dims, nrow)
}

/// Creates column `column` at the end of the table and returns its index.
///
/// In a row-oriented table that already has columns, the new column must span exactly the
/// existing rows; otherwise nothing is created.
pub(crate) fn create_column<F: TableIo>(
    io: &mut F,
    column: &str,
    code: TypeCode,
    dims: &[usize],
    nrow: usize,
    format: TableFormat,
) -> Result<usize, TableError> {
    let file = io.file_name().to_string();
    let index = io
        .num_columns()
        .map_err(|err| TableError::io("could not get number of columns", &file, err))?;

    if index > 0 && format == TableFormat::RowOriented {
        let rows = io
            .num_rows()
            .map_err(|err| TableError::io("could not get number of rows", &file, err))?;
        if rows != nrow {
            return Err(TableError::format_conflict(
                format!("incompatible number of rows in '{column}' (expected {rows}, got {nrow})"),
                &file,
            ));
        }
    }

    let size: usize = dims.iter().product();
    let width = match code {
        TypeCode::Text => dims.first().copied().unwrap_or(0),
        _ => 1,
    };
    let tform = tform::format_tform(code, size, width);
    io.insert_column(index, column, &tform).map_err(|err| {
        TableError::io(format!("could not create column '{column}'"), &file, err)
    })?;

    if !dims.is_empty() {
        io.write_dims(index, dims).map_err(|err| {
            TableError::io(
                format!(
                    "could not write TDIM for column '{column}' (dims {})",
                    tform::format_tdim(dims)
                ),
                &file,
                err,
            )
        })?;
    }

    log_debug!(
        component = "writer",
        event = "column_created",
        column = %column,
        tform = %tform,
        rows = nrow,
    );
    Ok(index)
}

/// Writes `value` into a new column called `name`.
pub(crate) fn write_value<C, F>(
    ctx: &mut WriteContext<'_, F>,
    name: &str,
    value: &C,
) -> Result<(), TableError>
where
    C: ColumnValue,
    F: TableIo,
{
    let column = name.to_uppercase();
    let (dims, nrow) = disk_layout(C::SHAPE, &value.extents(), value.text_width(), ctx.format);
    let index = create_column(ctx.io, &column, C::CODE, &dims, nrow, ctx.format)?;

    let width = if C::SHAPE.is_text() { dims[0] } else { 0 };
    let mut writer = ColumnWriter {
        io: &mut *ctx.io,
        index,
        name: &column,
        width,
    };
    value.store(&mut writer)
}

/// Creates a column able to hold an array of `extents` elements of `T` and reserves its
/// rows, without materializing the data.
pub(crate) fn allocate<T, F>(
    ctx: &mut WriteContext<'_, F>,
    name: &str,
    extents: &[usize],
) -> Result<(), TableError>
where
    T: Element,
    F: TableIo,
{
    let column = name.to_uppercase();
    let (dims, nrow) = disk_layout(TargetShape::Array(extents.len()), extents, 0, ctx.format);
    create_column(ctx.io, &column, T::CODE, &dims, nrow, ctx.format)?;
    let file = ctx.io.file_name().to_string();
    ctx.io.reserve_rows(nrow).map_err(|err| {
        TableError::io(format!("could not allocate column '{column}'"), &file, err)
    })
}
