use std::{collections::BTreeMap, path::PathBuf};

use parquet::file::properties::WriterProperties;

use super::{
    error::IoError,
    ondisk,
    tform::{self, ColumnFormat},
    Extension, TableIo,
};
use crate::{
    descriptor::{ColumnType, TypeCode},
    element::{Element, Scalar},
    observability::{log_debug, log_warn},
    option::TableOption,
};

/// Cells of one column, stored row after row.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum ColumnData {
    Logical(Vec<bool>),
    Byte(Vec<u8>),
    SignedByte(Vec<i8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    UInt(Vec<u32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    /// NUL-padded characters.
    Text(Vec<u8>),
}

macro_rules! with_cells {
    ($data:expr, $cells:ident => $numeric:expr, $text:ident => $textual:expr) => {
        match $data {
            ColumnData::Logical($cells) => $numeric,
            ColumnData::Byte($cells) => $numeric,
            ColumnData::SignedByte($cells) => $numeric,
            ColumnData::Short($cells) => $numeric,
            ColumnData::Int($cells) => $numeric,
            ColumnData::UInt($cells) => $numeric,
            ColumnData::Long($cells) => $numeric,
            ColumnData::Float($cells) => $numeric,
            ColumnData::Double($cells) => $numeric,
            ColumnData::Text($text) => $textual,
        }
    };
}

impl ColumnData {
    pub(super) fn zeroed(code: TypeCode, len: usize) -> Self {
        match code {
            TypeCode::Logical => ColumnData::Logical(vec![false; len]),
            TypeCode::Byte => ColumnData::Byte(vec![0; len]),
            TypeCode::SignedByte => ColumnData::SignedByte(vec![0; len]),
            TypeCode::Short => ColumnData::Short(vec![0; len]),
            TypeCode::Int => ColumnData::Int(vec![0; len]),
            TypeCode::UInt => ColumnData::UInt(vec![0; len]),
            TypeCode::Long => ColumnData::Long(vec![0; len]),
            TypeCode::Float => ColumnData::Float(vec![0.0; len]),
            TypeCode::Double => ColumnData::Double(vec![0.0; len]),
            TypeCode::Text => ColumnData::Text(vec![0; len]),
        }
    }

    pub(super) fn len(&self) -> usize {
        with_cells!(self, cells => cells.len(), text => text.len())
    }

    fn resize(&mut self, len: usize) {
        with_cells!(
            self,
            cells => cells.resize(len, Default::default()),
            text => text.resize(len, 0)
        )
    }

    fn code(&self) -> TypeCode {
        match self {
            ColumnData::Logical(_) => TypeCode::Logical,
            ColumnData::Byte(_) => TypeCode::Byte,
            ColumnData::SignedByte(_) => TypeCode::SignedByte,
            ColumnData::Short(_) => TypeCode::Short,
            ColumnData::Int(_) => TypeCode::Int,
            ColumnData::UInt(_) => TypeCode::UInt,
            ColumnData::Long(_) => TypeCode::Long,
            ColumnData::Float(_) => TypeCode::Float,
            ColumnData::Double(_) => TypeCode::Double,
            ColumnData::Text(_) => TypeCode::Text,
        }
    }

    fn read_into<T: Element>(&self, start: usize, out: &mut [T]) -> Result<(), IoError> {
        let end = start + out.len();
        let len = self.len();
        let out_of_bounds = IoError::OutOfBounds { start, end, len };
        with_cells!(
            self,
            cells => {
                let cells = cells.get(start..end).ok_or(out_of_bounds)?;
                for (slot, cell) in out.iter_mut().zip(cells) {
                    *slot = T::from_scalar(cell.to_scalar());
                }
                Ok(())
            },
            _text => Err(IoError::Conversion {
                from: TypeCode::Text,
                to: T::CODE,
            })
        )
    }

    fn write_from<T: Element>(&mut self, start: usize, values: &[T]) -> Result<(), IoError> {
        let end = start + values.len();
        let len = self.len();
        let out_of_bounds = IoError::OutOfBounds { start, end, len };
        with_cells!(
            self,
            cells => {
                let cells = cells.get_mut(start..end).ok_or(out_of_bounds)?;
                for (cell, value) in cells.iter_mut().zip(values) {
                    *cell = Element::from_scalar(value.to_scalar());
                }
                Ok(())
            },
            _text => Err(IoError::Conversion {
                from: T::CODE,
                to: TypeCode::Text,
            })
        )
    }

    /// Feeds every cell to `hasher` in a layout independent of the element type.
    pub(super) fn hash_into(&self, hasher: &mut crc32fast::Hasher) {
        with_cells!(
            self,
            cells => {
                for cell in cells.iter() {
                    match cell.to_scalar() {
                        Scalar::Bool(v) => hasher.update(&[u8::from(v)]),
                        Scalar::Int(v) => hasher.update(&v.to_le_bytes()),
                        Scalar::Float(v) => hasher.update(&v.to_bits().to_le_bytes()),
                    }
                }
            },
            text => hasher.update(text)
        )
    }
}

#[derive(Debug, Clone)]
pub(super) struct MemColumn {
    pub(super) name: String,
    pub(super) tform: String,
    pub(super) format: ColumnFormat,
    pub(super) tdim: Option<Vec<usize>>,
    pub(super) decode_width: usize,
    pub(super) data: ColumnData,
}

impl MemColumn {
    pub(super) fn new(
        name: &str,
        tform: &str,
        extension: Extension,
        nrows: usize,
    ) -> Result<Self, IoError> {
        let format = ColumnFormat::parse(tform, extension)?;
        Ok(MemColumn {
            name: name.to_string(),
            tform: tform.trim().to_string(),
            format,
            tdim: None,
            decode_width: format.width,
            data: ColumnData::zeroed(format.code, nrows * format.row_cells),
        })
    }

    /// First storage cell of `first_elem` slots of `unit` cells into `first_row`.
    fn cell_offset(&self, first_row: usize, first_elem: usize, unit: usize) -> usize {
        first_row * self.format.row_cells + first_elem * unit
    }
}

/// A single table unit held in memory, optionally backed by a parquet file.
///
/// File-backed tables are written back by [`TableIo::flush`], and on drop when changes are
/// still pending.
#[derive(Debug)]
pub struct MemTable {
    pub(super) path: Option<PathBuf>,
    pub(super) file_name: String,
    pub(super) extension: Option<Extension>,
    pub(super) nrows: usize,
    pub(super) columns: Vec<MemColumn>,
    pub(super) keywords: BTreeMap<String, String>,
    pub(super) dirty: bool,
    pub(super) write_option: Option<WriterProperties>,
}

impl MemTable {
    /// Creates an empty, unnamed-on-disk table. `name` only appears in diagnostics.
    pub fn in_memory(name: impl Into<String>) -> Self {
        MemTable {
            path: None,
            file_name: name.into(),
            extension: None,
            nrows: 0,
            columns: Vec::new(),
            keywords: BTreeMap::new(),
            dirty: false,
            write_option: None,
        }
    }

    /// Starts a new file at the option's path. Nothing is written before the first flush.
    pub fn create(option: &TableOption) -> Self {
        let mut table = MemTable::in_memory(option.path.display().to_string());
        table.path = Some(option.path.clone());
        table.write_option = option.write_parquet_option.clone();
        table.dirty = true;
        table
    }

    /// Loads an existing file.
    pub fn open(option: &TableOption) -> Result<Self, IoError> {
        let mut table = ondisk::load(&option.path, option.verify_checksum)?;
        table.write_option = option.write_parquet_option.clone();
        log_debug!(
            component = "mem",
            event = "table_opened",
            path = %option.path.display(),
            rows = table.nrows,
            columns = table.columns.len(),
        );
        Ok(table)
    }

    fn require_table(&self) -> Result<Extension, IoError> {
        self.extension.ok_or(IoError::NoTable)
    }

    fn column(&self, index: usize) -> Result<&MemColumn, IoError> {
        self.require_table()?;
        self.columns.get(index).ok_or(IoError::NoSuchColumn(index))
    }

    fn column_mut(&mut self, index: usize) -> Result<&mut MemColumn, IoError> {
        self.require_table()?;
        self.columns
            .get_mut(index)
            .ok_or(IoError::NoSuchColumn(index))
    }

    fn grow(&mut self, nrows: usize) {
        if nrows <= self.nrows {
            return;
        }
        self.nrows = nrows;
        for column in &mut self.columns {
            column.data.resize(nrows * column.format.row_cells);
        }
        self.dirty = true;
    }

    /// Grows the table so that the cell range ending at `end` exists in column `index`.
    fn grow_to_cell(&mut self, index: usize, end: usize) -> Result<(), IoError> {
        let column = self.column(index)?;
        if end <= column.data.len() {
            return Ok(());
        }
        let row_cells = column.format.row_cells;
        if row_cells == 0 {
            return Err(IoError::OutOfBounds {
                start: 0,
                end,
                len: 0,
            });
        }
        self.grow(end.div_ceil(row_cells));
        Ok(())
    }
}

/// Splits keywords such as `TFORM3` into their stem and zero-based column index.
fn indexed_keyword(key: &str) -> Option<(&str, usize)> {
    ["TTYPE", "TFORM", "TDIM"].into_iter().find_map(|stem| {
        let n: usize = key.strip_prefix(stem)?.parse().ok()?;
        n.checked_sub(1).map(|index| (stem, index))
    })
}

impl TableIo for MemTable {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn extension(&self) -> Option<Extension> {
        self.extension
    }

    fn create_table(&mut self, extension: Extension) -> Result<(), IoError> {
        if self.extension.is_some() {
            return Err(IoError::Metadata("file already holds a table".into()));
        }
        self.extension = Some(extension);
        self.dirty = true;
        Ok(())
    }

    fn num_columns(&self) -> Result<usize, IoError> {
        self.require_table()?;
        Ok(self.columns.len())
    }

    fn num_rows(&self) -> Result<usize, IoError> {
        self.require_table()?;
        Ok(self.nrows)
    }

    fn keyword(&self, key: &str) -> Result<Option<String>, IoError> {
        let key = key.trim().to_ascii_uppercase();
        let value = match key.as_str() {
            "XTENSION" => self.extension.map(|ext| ext.keyword().to_string()),
            "NAXIS2" => self.extension.map(|_| self.nrows.to_string()),
            "TFIELDS" => self.extension.map(|_| self.columns.len().to_string()),
            _ => match indexed_keyword(&key) {
                Some((stem, index)) => self.columns.get(index).and_then(|column| match stem {
                    "TTYPE" => Some(column.name.clone()),
                    "TFORM" => Some(column.tform.clone()),
                    _ => column.tdim.as_deref().map(tform::format_tdim),
                }),
                None => self.keywords.get(&key).cloned(),
            },
        };
        Ok(value)
    }

    fn set_keyword(&mut self, key: &str, value: &str) -> Result<(), IoError> {
        self.require_table()?;
        let key = key.trim().to_ascii_uppercase();
        if matches!(key.as_str(), "XTENSION" | "NAXIS2" | "TFIELDS")
            || indexed_keyword(&key).is_some()
        {
            return Err(IoError::Metadata(format!("keyword {key} is reserved")));
        }
        self.keywords.insert(key, value.to_string());
        self.dirty = true;
        Ok(())
    }

    fn column_index(&self, name: &str) -> Result<Option<usize>, IoError> {
        self.require_table()?;
        Ok(self
            .columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name)))
    }

    fn column_name(&self, index: usize) -> Result<String, IoError> {
        Ok(self.column(index)?.name.clone())
    }

    fn column_type(&self, index: usize) -> Result<ColumnType, IoError> {
        let format = self.column(index)?.format;
        Ok(ColumnType {
            code: format.code,
            repeat: format.repeat,
            width: format.width,
        })
    }

    fn column_dims(&self, index: usize) -> Result<Vec<usize>, IoError> {
        let column = self.column(index)?;
        Ok(column
            .tdim
            .clone()
            .unwrap_or_else(|| vec![column.format.repeat]))
    }

    fn insert_column(&mut self, index: usize, name: &str, tform: &str) -> Result<(), IoError> {
        let extension = self.require_table()?;
        if index > self.columns.len() {
            return Err(IoError::NoSuchColumn(index));
        }
        let column = MemColumn::new(name, tform, extension, self.nrows)?;
        self.columns.insert(index, column);
        self.dirty = true;
        Ok(())
    }

    fn write_dims(&mut self, index: usize, dims: &[usize]) -> Result<(), IoError> {
        let column = self.column_mut(index)?;
        let size: usize = dims.iter().product();
        if dims.is_empty() || size != column.format.repeat {
            return Err(IoError::BadFormat(format!(
                "TDIM {} does not match TFORM {}",
                tform::format_tdim(dims),
                column.tform
            )));
        }
        column.tdim = Some(dims.to_vec());
        self.dirty = true;
        Ok(())
    }

    fn delete_column(&mut self, index: usize) -> Result<(), IoError> {
        self.column(index)?;
        self.columns.remove(index);
        if self.columns.is_empty() {
            self.nrows = 0;
        }
        self.dirty = true;
        Ok(())
    }

    fn set_decode_width(&mut self, index: usize, width: usize) -> Result<(), IoError> {
        self.column_mut(index)?.decode_width = width;
        Ok(())
    }

    fn reserve_rows(&mut self, rows: usize) -> Result<(), IoError> {
        self.require_table()?;
        self.grow(rows);
        Ok(())
    }

    /// Saves pending changes. A file that never received a table unit is left unwritten.
    fn flush(&mut self) -> Result<(), IoError> {
        if self.extension.is_none() {
            return Ok(());
        }
        if let (Some(path), true) = (&self.path, self.dirty) {
            ondisk::save(self, path)?;
            self.dirty = false;
        }
        Ok(())
    }

    fn read_elements<T: Element>(
        &mut self,
        index: usize,
        first_row: usize,
        first_elem: usize,
        out: &mut [T],
    ) -> Result<(), IoError> {
        let column = self.column(index)?;
        let start = column.cell_offset(first_row, first_elem, 1);
        column.data.read_into(start, out)
    }

    fn write_elements<T: Element>(
        &mut self,
        index: usize,
        first_row: usize,
        first_elem: usize,
        values: &[T],
    ) -> Result<(), IoError> {
        let start = self.column(index)?.cell_offset(first_row, first_elem, 1);
        self.grow_to_cell(index, start + values.len())?;
        self.dirty = true;
        self.column_mut(index)?.data.write_from(start, values)
    }

    fn read_strings(
        &mut self,
        index: usize,
        first_row: usize,
        first_elem: usize,
        slots: &mut [Box<[u8]>],
    ) -> Result<(), IoError> {
        let column = self.column(index)?;
        let ColumnData::Text(text) = &column.data else {
            return Err(IoError::Conversion {
                from: column.data.code(),
                to: TypeCode::Text,
            });
        };
        let width = column.decode_width;
        let start = column.cell_offset(first_row, first_elem, width);
        let end = start + slots.len() * width;
        let cells = text.get(start..end).ok_or(IoError::OutOfBounds {
            start,
            end,
            len: text.len(),
        })?;
        if width == 0 {
            return Ok(());
        }
        for (slot, chars) in slots.iter_mut().zip(cells.chunks(width)) {
            let n = slot.len().min(width);
            slot[..n].copy_from_slice(&chars[..n]);
            slot[n..].fill(0);
        }
        Ok(())
    }

    fn write_strings(
        &mut self,
        index: usize,
        first_row: usize,
        first_elem: usize,
        slots: &[Box<[u8]>],
    ) -> Result<(), IoError> {
        let column = self.column(index)?;
        if column.data.code() != TypeCode::Text {
            return Err(IoError::Conversion {
                from: TypeCode::Text,
                to: column.data.code(),
            });
        }
        let width = column.decode_width;
        if width == 0 {
            return Ok(());
        }
        let start = column.cell_offset(first_row, first_elem, width);
        self.grow_to_cell(index, start + slots.len() * width)?;
        self.dirty = true;
        if let ColumnData::Text(text) = &mut self.column_mut(index)?.data {
            for (chars, slot) in text[start..].chunks_mut(width).zip(slots) {
                let n = slot.len().min(width);
                chars[..n].copy_from_slice(&slot[..n]);
                chars[n..].fill(0);
            }
        }
        Ok(())
    }
}

impl Drop for MemTable {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            log_warn!(
                component = "mem",
                event = "flush_on_drop_failed",
                file = %self.file_name,
                error = %err,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(tform: &str) -> MemTable {
        let mut table = MemTable::in_memory("mem");
        table.create_table(Extension::BinTable).unwrap();
        table.insert_column(0, "X", tform).unwrap();
        table
    }

    #[test]
    fn writes_grow_rows_and_zero_fill() {
        let mut table = table_with("2J");
        table.insert_column(1, "Y", "E").unwrap();
        table
            .write_elements(0, 0, 0, &[1i32, 2, 3, 4, 5, 6])
            .unwrap();
        assert_eq!(table.num_rows().unwrap(), 3);

        let mut y = [1.0f32; 3];
        table.read_elements(1, 0, 0, &mut y).unwrap();
        assert_eq!(y, [0.0; 3]);

        let mut x = [0i64; 3];
        table.read_elements(0, 1, 1, &mut x).unwrap();
        assert_eq!(x, [4, 5, 6]);
    }

    #[test]
    fn out_of_bounds_read() {
        let mut table = table_with("J");
        table.write_elements(0, 0, 0, &[7i32]).unwrap();
        let mut out = [0i32; 2];
        let err = table.read_elements(0, 0, 0, &mut out).unwrap_err();
        assert!(matches!(err, IoError::OutOfBounds { end: 2, len: 1, .. }));
    }

    #[test]
    fn strings_are_fixed_width_slots() {
        let mut table = table_with("6A3");
        let slots: Vec<Box<[u8]>> = vec![b"ab".to_vec().into(), b"xyz".to_vec().into()];
        table.write_strings(0, 0, 0, &slots).unwrap();

        let mut back: Vec<Box<[u8]>> = vec![vec![9u8; 3].into(); 2];
        table.read_strings(0, 0, 0, &mut back).unwrap();
        assert_eq!(&*back[0], b"ab\0");
        assert_eq!(&*back[1], b"xyz");

        let mut second: Vec<Box<[u8]>> = vec![vec![0u8; 3].into()];
        table.read_strings(0, 0, 1, &mut second).unwrap();
        assert_eq!(&*second[0], b"xyz");
    }

    #[test]
    fn reserved_keywords() {
        let mut table = table_with("3D");
        table.write_dims(0, &[3]).unwrap();
        assert_eq!(table.keyword("tform1").unwrap().as_deref(), Some("3D"));
        assert_eq!(table.keyword("TTYPE1").unwrap().as_deref(), Some("X"));
        assert_eq!(table.keyword("TDIM1").unwrap().as_deref(), Some("(3)"));
        assert_eq!(table.keyword("XTENSION").unwrap().as_deref(), Some("BINTABLE"));
        assert!(table.set_keyword("NAXIS2", "4").is_err());
        table.set_keyword("origin", "unit test").unwrap();
        assert_eq!(table.keyword("ORIGIN").unwrap().as_deref(), Some("unit test"));
    }

    #[test]
    fn deleting_last_column_resets_rows() {
        let mut table = table_with("J");
        table.write_elements(0, 0, 0, &[1i32, 2, 3]).unwrap();
        table.delete_column(0).unwrap();
        assert_eq!(table.num_rows().unwrap(), 0);
        assert_eq!(table.column_index("x").unwrap(), None);
    }

    #[test]
    fn flush_without_table_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.parquet");
        let mut table = MemTable::create(&crate::option::TableOption::from(&path));
        table.flush().unwrap();
        assert!(!path.exists());

        table.create_table(Extension::BinTable).unwrap();
        table.flush().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn text_rejects_numeric_access() {
        let mut table = table_with("4A");
        let mut out = [0u8; 1];
        assert!(matches!(
            table.read_elements(0, 0, 0, &mut out),
            Err(IoError::Conversion { .. })
        ));
    }
}
