//! Parquet encoding of a [`MemTable`].
//!
//! The file holds one record batch schema: a `_row` sentinel column carrying the row count,
//! then one column per table column. Numeric and logical cells of a row form one list
//! value, text cells one binary value. `TFORM`/`TDIM` live in field metadata; `XTENSION`,
//! `NAXIS2`, `DATASUM` and user keywords live in schema metadata.

use std::{collections::HashMap, fs::File, path::Path, sync::Arc};

use arrow::{
    array::{
        Array, ArrayRef, ArrowPrimitiveType, AsArray, BinaryArray, BooleanBuilder, ListBuilder,
        PrimitiveBuilder, RecordBatch, UInt64Array,
    },
    datatypes::{
        DataType, Field, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
        Schema, UInt32Type, UInt8Type,
    },
};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    file::properties::WriterProperties,
};

use super::{
    error::IoError,
    mem::{ColumnData, MemColumn, MemTable},
    tform, Extension,
};
use crate::observability::{log_debug, log_info};

const ROW_COLUMN: &str = "_row";
const TFORM_KEY: &str = "TFORM";
const TDIM_KEY: &str = "TDIM";
const XTENSION_KEY: &str = "XTENSION";
const NAXIS2_KEY: &str = "NAXIS2";
const DATASUM_KEY: &str = "DATASUM";
const KEYWORD_PREFIX: &str = "KEY:";

pub(super) fn checksum(columns: &[MemColumn]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for column in columns {
        column.data.hash_into(&mut hasher);
    }
    hasher.finalize()
}

fn rows_of<T>(cells: &[T], nrows: usize, row_cells: usize) -> impl Iterator<Item = &[T]> {
    (0..nrows).map(move |row| &cells[row * row_cells..(row + 1) * row_cells])
}

fn primitive_list<P: ArrowPrimitiveType>(
    cells: &[P::Native],
    nrows: usize,
    row_cells: usize,
) -> ArrayRef {
    let mut builder = ListBuilder::new(PrimitiveBuilder::<P>::new());
    for row in rows_of(cells, nrows, row_cells) {
        builder.values().append_slice(row);
        builder.append(true);
    }
    Arc::new(builder.finish())
}

fn encode_column(column: &MemColumn, nrows: usize) -> ArrayRef {
    let row_cells = column.format.row_cells;
    match &column.data {
        ColumnData::Logical(cells) => {
            let mut builder = ListBuilder::new(BooleanBuilder::new());
            for row in rows_of(cells, nrows, row_cells) {
                builder.values().append_slice(row);
                builder.append(true);
            }
            Arc::new(builder.finish())
        }
        ColumnData::Byte(cells) => primitive_list::<UInt8Type>(cells, nrows, row_cells),
        ColumnData::SignedByte(cells) => primitive_list::<Int8Type>(cells, nrows, row_cells),
        ColumnData::Short(cells) => primitive_list::<Int16Type>(cells, nrows, row_cells),
        ColumnData::Int(cells) => primitive_list::<Int32Type>(cells, nrows, row_cells),
        ColumnData::UInt(cells) => primitive_list::<UInt32Type>(cells, nrows, row_cells),
        ColumnData::Long(cells) => primitive_list::<Int64Type>(cells, nrows, row_cells),
        ColumnData::Float(cells) => primitive_list::<Float32Type>(cells, nrows, row_cells),
        ColumnData::Double(cells) => primitive_list::<Float64Type>(cells, nrows, row_cells),
        ColumnData::Text(cells) => Arc::new(BinaryArray::from_iter_values(rows_of(
            cells, nrows, row_cells,
        ))),
    }
}

fn encode(table: &MemTable) -> Result<RecordBatch, IoError> {
    let extension = table.extension.ok_or(IoError::NoTable)?;

    let mut fields = vec![Field::new(ROW_COLUMN, DataType::UInt64, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(UInt64Array::from_iter_values(
        0..table.nrows as u64,
    ))];
    for column in &table.columns {
        let array = encode_column(column, table.nrows);
        let mut metadata = HashMap::from([(TFORM_KEY.to_string(), column.tform.clone())]);
        if let Some(dims) = &column.tdim {
            metadata.insert(TDIM_KEY.to_string(), tform::format_tdim(dims));
        }
        fields.push(
            Field::new(column.name.as_str(), array.data_type().clone(), false)
                .with_metadata(metadata),
        );
        arrays.push(array);
    }

    let mut metadata = HashMap::from([
        (XTENSION_KEY.to_string(), extension.keyword().to_string()),
        (NAXIS2_KEY.to_string(), table.nrows.to_string()),
        (DATASUM_KEY.to_string(), checksum(&table.columns).to_string()),
    ]);
    for (key, value) in &table.keywords {
        metadata.insert(format!("{KEYWORD_PREFIX}{key}"), value.clone());
    }
    let schema = Arc::new(Schema::new_with_metadata(fields, metadata));
    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn write_batch(
    batch: &RecordBatch,
    path: &Path,
    props: Option<WriterProperties>,
) -> Result<(), IoError> {
    let mut writer = ArrowWriter::try_new(File::create(path)?, batch.schema(), props)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

pub(super) fn save(table: &MemTable, path: &Path) -> Result<(), IoError> {
    let batch = encode(table)?;
    write_batch(&batch, path, table.write_option.clone())?;

    log_info!(
        component = "ondisk",
        event = "table_saved",
        path = %path.display(),
        rows = table.nrows,
        columns = table.columns.len(),
    );
    Ok(())
}

fn decode_primitive<P: ArrowPrimitiveType>(
    batches: &[RecordBatch],
    index: usize,
    row_cells: usize,
) -> Result<Vec<P::Native>, IoError> {
    let mut cells = Vec::new();
    for batch in batches {
        let list = batch
            .column(index)
            .as_list_opt::<i32>()
            .ok_or_else(|| IoError::Metadata(format!("column {index} is not a list")))?;
        for row in 0..list.len() {
            let value = list.value(row);
            let values = value.as_primitive_opt::<P>().ok_or_else(|| {
                IoError::Metadata(format!("column {index} holds {}", value.data_type()))
            })?;
            if values.len() != row_cells {
                return Err(IoError::Metadata(format!(
                    "column {index} row {row} holds {} cells, expected {row_cells}",
                    values.len()
                )));
            }
            cells.extend_from_slice(values.values());
        }
    }
    Ok(cells)
}

fn decode_logical(
    batches: &[RecordBatch],
    index: usize,
    row_cells: usize,
) -> Result<Vec<bool>, IoError> {
    let mut cells = Vec::new();
    for batch in batches {
        let list = batch
            .column(index)
            .as_list_opt::<i32>()
            .ok_or_else(|| IoError::Metadata(format!("column {index} is not a list")))?;
        for row in 0..list.len() {
            let value = list.value(row);
            let values = value
                .as_boolean_opt()
                .ok_or_else(|| IoError::Metadata(format!("column {index} is not logical")))?;
            if values.len() != row_cells {
                return Err(IoError::Metadata(format!(
                    "column {index} row {row} holds {} cells, expected {row_cells}",
                    values.len()
                )));
            }
            cells.extend(values.values().iter());
        }
    }
    Ok(cells)
}

fn decode_text(
    batches: &[RecordBatch],
    index: usize,
    row_cells: usize,
) -> Result<Vec<u8>, IoError> {
    let mut cells = Vec::new();
    for batch in batches {
        let binary = batch
            .column(index)
            .as_binary_opt::<i32>()
            .ok_or_else(|| IoError::Metadata(format!("column {index} is not binary")))?;
        for value in binary.iter() {
            let value = value.unwrap_or_default();
            if value.len() != row_cells {
                return Err(IoError::Metadata(format!(
                    "column {index} holds a {}-byte string, expected {row_cells}",
                    value.len()
                )));
            }
            cells.extend_from_slice(value);
        }
    }
    Ok(cells)
}

fn decode_column(
    column: &mut MemColumn,
    batches: &[RecordBatch],
    index: usize,
) -> Result<(), IoError> {
    let row_cells = column.format.row_cells;
    column.data = match column.data {
        ColumnData::Logical(_) => ColumnData::Logical(decode_logical(batches, index, row_cells)?),
        ColumnData::Byte(_) => {
            ColumnData::Byte(decode_primitive::<UInt8Type>(batches, index, row_cells)?)
        }
        ColumnData::SignedByte(_) => {
            ColumnData::SignedByte(decode_primitive::<Int8Type>(batches, index, row_cells)?)
        }
        ColumnData::Short(_) => {
            ColumnData::Short(decode_primitive::<Int16Type>(batches, index, row_cells)?)
        }
        ColumnData::Int(_) => {
            ColumnData::Int(decode_primitive::<Int32Type>(batches, index, row_cells)?)
        }
        ColumnData::UInt(_) => {
            ColumnData::UInt(decode_primitive::<UInt32Type>(batches, index, row_cells)?)
        }
        ColumnData::Long(_) => {
            ColumnData::Long(decode_primitive::<Int64Type>(batches, index, row_cells)?)
        }
        ColumnData::Float(_) => {
            ColumnData::Float(decode_primitive::<Float32Type>(batches, index, row_cells)?)
        }
        ColumnData::Double(_) => {
            ColumnData::Double(decode_primitive::<Float64Type>(batches, index, row_cells)?)
        }
        ColumnData::Text(_) => ColumnData::Text(decode_text(batches, index, row_cells)?),
    };
    Ok(())
}

fn schema_value<'a>(
    metadata: &'a HashMap<String, String>,
    key: &str,
) -> Result<&'a str, IoError> {
    metadata
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| IoError::Metadata(format!("missing {key}")))
}

pub(super) fn load(path: &Path, verify_checksum: bool) -> Result<MemTable, IoError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    let schema = Arc::clone(builder.schema());
    let batches = builder.build()?.collect::<Result<Vec<_>, _>>()?;

    let metadata = schema.metadata();
    let xtension = schema_value(metadata, XTENSION_KEY)?;
    let extension = Extension::from_keyword(xtension)
        .ok_or_else(|| IoError::Metadata(format!("unknown XTENSION {xtension}")))?;
    let nrows: usize = schema_value(metadata, NAXIS2_KEY)?
        .parse()
        .map_err(|_| IoError::Metadata("NAXIS2 is not a row count".into()))?;
    let stored_rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
    if stored_rows != nrows {
        return Err(IoError::Metadata(format!(
            "NAXIS2 is {nrows} but the file holds {stored_rows} rows"
        )));
    }

    let mut table = MemTable::in_memory(path.display().to_string());
    table.path = Some(path.to_path_buf());
    table.extension = Some(extension);
    table.nrows = nrows;

    for (index, field) in schema.fields().iter().enumerate().skip(1) {
        let field_metadata = field.metadata();
        let tform = schema_value(field_metadata, TFORM_KEY)?;
        let mut column = MemColumn::new(field.name(), tform, extension, 0)?;
        if let Some(tdim) = field_metadata.get(TDIM_KEY) {
            column.tdim = Some(tform::parse_tdim(tdim)?);
        }
        decode_column(&mut column, &batches, index)?;
        table.columns.push(column);
    }

    for (key, value) in metadata {
        if let Some(keyword) = key.strip_prefix(KEYWORD_PREFIX) {
            table.keywords.insert(keyword.to_string(), value.clone());
        }
    }

    if verify_checksum {
        let stored: u32 = schema_value(metadata, DATASUM_KEY)?
            .parse()
            .map_err(|_| IoError::Metadata("DATASUM is not a checksum".into()))?;
        let computed = checksum(&table.columns);
        if stored != computed {
            return Err(IoError::Checksum { stored, computed });
        }
    }

    log_debug!(
        component = "ondisk",
        event = "table_loaded",
        path = %path.display(),
        rows = nrows,
        columns = table.columns.len(),
    );
    Ok(table)
}
