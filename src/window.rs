//! Row windows and their translation into element offsets for both table layouts.

use crate::{
    descriptor::{ColumnType, TypeCode},
    io::{tform, Extension, IoError, TableIo},
    observability::log_debug,
};

/// Resolved half-open row range `first..last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub first: usize,
    pub last: usize,
}

impl RowWindow {
    pub(crate) fn len(&self) -> usize {
        self.last - self.first
    }
}

/// Resolves a requested row range against `total` rows. Unbounded ends cover the whole
/// column; a reversed range is swapped.
pub fn resolve(first: Option<usize>, last: Option<usize>, total: usize) -> Option<RowWindow> {
    let mut first = first.unwrap_or(0);
    let mut last = last.unwrap_or(total);
    if last < first {
        log_debug!(
            component = "window",
            event = "reversed_range_swapped",
            first = first,
            last = last,
        );
        std::mem::swap(&mut first, &mut last);
    }
    (last <= total).then_some(RowWindow { first, last })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One stored row; rows of the window index the slowest extent of that array.
    ColumnOriented,
    /// One table row per window row.
    RowOriented,
}

/// On-disk geometry of one column as seen by a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    /// Extents, fastest first, including the row axis for row-oriented tables.
    pub naxes: Vec<usize>,
    pub repeat: usize,
    pub nrows: usize,
    pub layout: Layout,
    text: bool,
}

impl Geometry {
    pub fn of_column<F: TableIo>(io: &F, index: usize, ty: ColumnType) -> Result<Self, IoError> {
        let text = ty.code == TypeCode::Text;
        let mut naxes = io.column_dims(index)?;
        if naxes.is_empty() {
            naxes.push(ty.repeat);
        }

        // ASCII tables carry no TDIM; the string width only shows in TFORMn.
        if text && io.extension() == Some(Extension::AsciiTable) {
            let width = io
                .keyword(&format!("TFORM{}", index + 1))?
                .as_deref()
                .and_then(tform::ascii_text_width);
            if let Some(width) = width {
                naxes[0] = width;
            }
        }

        let nrows = io.num_rows()?;
        let layout = if nrows > 1 {
            if !text && naxes == [1] {
                naxes[0] = nrows;
            } else {
                naxes.push(nrows);
            }
            Layout::RowOriented
        } else {
            Layout::ColumnOriented
        };

        Ok(Geometry {
            naxes,
            repeat: ty.repeat,
            nrows,
            layout,
            text,
        })
    }

    /// Fixed width of the strings of a text column.
    pub fn text_width(&self) -> usize {
        if self.text {
            self.naxes[0]
        } else {
            0
        }
    }

    /// Extent the row window applies to: the slowest axis, or 1 for a text column that only
    /// has its width axis.
    pub fn row_extent(&self) -> usize {
        if self.text && self.naxes.len() == 1 {
            return 1;
        }
        self.naxes.last().copied().unwrap_or(1)
    }

    /// Extents with the row axis cut down to `window`.
    pub fn windowed(&self, window: RowWindow) -> Vec<usize> {
        let mut naxes = self.naxes.clone();
        if !(self.text && naxes.len() == 1) {
            if let Some(rows) = naxes.last_mut() {
                *rows = window.len();
            }
        }
        naxes
    }

    /// Start of `window` as `(first_row, first_elem)`, with elements counted in units of
    /// `unit` cells.
    pub fn offset(&self, window: RowWindow, unit: usize) -> (usize, usize) {
        match self.layout {
            Layout::RowOriented => (window.first, 0),
            Layout::ColumnOriented => {
                let per_row = self
                    .repeat
                    .checked_div(self.row_extent())
                    .and_then(|cells| cells.checked_div(unit))
                    .unwrap_or(0);
                (0, window.first * per_row)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemTable;

    #[test]
    fn resolve_defaults_and_bounds() {
        assert_eq!(resolve(None, None, 6), Some(RowWindow { first: 0, last: 6 }));
        assert_eq!(resolve(Some(2), Some(4), 6), Some(RowWindow { first: 2, last: 4 }));
        assert_eq!(resolve(Some(4), Some(2), 6), Some(RowWindow { first: 2, last: 4 }));
        assert_eq!(resolve(Some(2), Some(7), 6), None);
        assert_eq!(resolve(Some(9), None, 6), None);
    }

    fn column_table(tform: &str, tdim: Option<&[usize]>, rows: usize) -> MemTable {
        let mut io = MemTable::in_memory("geom");
        io.create_table(Extension::BinTable).unwrap();
        io.insert_column(0, "X", tform).unwrap();
        if let Some(dims) = tdim {
            io.write_dims(0, dims).unwrap();
        }
        io.reserve_rows(rows).unwrap();
        io
    }

    #[test]
    fn column_oriented_offsets_count_elements() {
        let io = column_table("12J", Some(&[3, 4]), 1);
        let ty = io.column_type(0).unwrap();
        let geometry = Geometry::of_column(&io, 0, ty).unwrap();
        assert_eq!(geometry.layout, Layout::ColumnOriented);
        assert_eq!(geometry.naxes, vec![3, 4]);

        let window = resolve(Some(1), Some(3), geometry.row_extent()).unwrap();
        assert_eq!(geometry.windowed(window), vec![3, 2]);
        assert_eq!(geometry.offset(window, 1), (0, 3));
    }

    #[test]
    fn column_oriented_string_offsets_count_strings() {
        let io = column_table("16A4", Some(&[4, 4]), 1);
        let ty = io.column_type(0).unwrap();
        let geometry = Geometry::of_column(&io, 0, ty).unwrap();
        assert_eq!(geometry.layout, Layout::ColumnOriented);
        assert_eq!(geometry.text_width(), 4);
        assert_eq!(geometry.row_extent(), 4);

        let window = resolve(Some(1), Some(3), geometry.row_extent()).unwrap();
        assert_eq!(geometry.windowed(window), vec![4, 2]);
        assert_eq!(geometry.offset(window, geometry.text_width()), (0, 1));
        assert_eq!(geometry.offset(window, 1), (0, 4));
    }

    #[test]
    fn row_oriented_scalars_gain_row_axis() {
        let io = column_table("J", None, 6);
        let ty = io.column_type(0).unwrap();
        let geometry = Geometry::of_column(&io, 0, ty).unwrap();
        assert_eq!(geometry.layout, Layout::RowOriented);
        assert_eq!(geometry.naxes, vec![6]);

        let window = resolve(Some(2), Some(4), geometry.row_extent()).unwrap();
        assert_eq!(geometry.offset(window, 1), (2, 0));
    }

    #[test]
    fn strings_keep_width_axis() {
        let io = column_table("1A1", Some(&[1]), 6);
        let ty = io.column_type(0).unwrap();
        let geometry = Geometry::of_column(&io, 0, ty).unwrap();
        assert_eq!(geometry.naxes, vec![1, 6]);
        assert_eq!(geometry.text_width(), 1);
        assert_eq!(geometry.row_extent(), 6);
    }

    #[test]
    fn ascii_width_comes_from_tform() {
        let mut io = MemTable::in_memory("legacy");
        io.create_table(Extension::AsciiTable).unwrap();
        io.insert_column(0, "NAME", "A10").unwrap();
        io.reserve_rows(1).unwrap();
        let ty = io.column_type(0).unwrap();
        let geometry = Geometry::of_column(&io, 0, ty).unwrap();
        assert_eq!(geometry.naxes, vec![10]);
        assert_eq!(geometry.text_width(), 10);
        assert_eq!(geometry.row_extent(), 1);
    }
}
