use crate::{
    descriptor::{ColumnDescriptor, ScalarKind, TypeCode},
    error::TableError,
    io::{IoError, TableIo},
};

/// Byte columns whose first row only holds 0 and 1 are flags.
fn looks_boolean<F: TableIo>(io: &mut F, index: usize, repeat: usize) -> Result<bool, IoError> {
    if repeat == 0 || io.num_rows()? == 0 {
        return Ok(false);
    }
    let mut first_row = vec![0u8; repeat];
    io.read_elements(index, 0, 0, &mut first_row)?;
    let min = first_row.iter().copied().min().unwrap_or(0);
    let max = first_row.iter().copied().max().unwrap_or(0);
    Ok(min == 0 && max <= 1)
}

fn describe<F: TableIo>(io: &mut F, index: usize) -> Result<ColumnDescriptor, IoError> {
    let name = io.column_name(index)?;
    let ty = io.column_type(index)?;
    let axes = io.column_dims(index)?;

    let kind = match ty.code {
        TypeCode::Byte if looks_boolean(io, index, ty.repeat)? => ScalarKind::Boolean,
        code => ScalarKind::of(code),
    };

    let (dims, length) = if ty.code == TypeCode::Text {
        let dims = if axes.len() > 1 {
            axes[1..].iter().rev().copied().collect()
        } else {
            vec![ty.repeat.checked_div(ty.width).unwrap_or(1).max(1)]
        };
        (dims, ty.width)
    } else {
        (axes.into_iter().rev().collect(), 1)
    };

    Ok(ColumnDescriptor {
        id: index,
        name,
        kind,
        dims,
        length,
    })
}

/// Metadata of column `name`, or `None` when the table has no such column.
pub(crate) fn column_info<F: TableIo>(
    io: &mut F,
    name: &str,
) -> Result<Option<ColumnDescriptor>, TableError> {
    if io.extension().is_none() {
        return Ok(None);
    }
    let column = name.to_uppercase();
    let file = io.file_name().to_string();
    let context = || format!("could not describe column '{column}'");
    let Some(index) = io
        .column_index(&column)
        .map_err(|err| TableError::io(context(), &file, err))?
    else {
        return Ok(None);
    };
    describe(io, index)
        .map(Some)
        .map_err(|err| TableError::io(context(), &file, err))
}

/// Metadata of every column, in table order.
pub(crate) fn columns_info<F: TableIo>(io: &mut F) -> Result<Vec<ColumnDescriptor>, TableError> {
    if io.extension().is_none() {
        return Ok(Vec::new());
    }
    let file = io.file_name().to_string();
    let ncols = io
        .num_columns()
        .map_err(|err| TableError::io("could not get number of columns", &file, err))?;
    (0..ncols)
        .map(|index| {
            describe(io, index).map_err(|err| {
                TableError::io(format!("could not describe column {index}"), &file, err)
            })
        })
        .collect()
}
