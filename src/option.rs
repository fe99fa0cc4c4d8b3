use std::{ops::BitOr, path::PathBuf};

use parquet::file::properties::WriterProperties;

use crate::format::TableFormat;

/// Policy applied when loading a column into an in-memory value.
///
/// Policies combine with `|`: every flag is OR-ed and the row range widens to cover both
/// operands. Unbounded rows are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// Accept conversions that may lose range or precision.
    pub allow_narrow: bool,
    /// Report an absent column as skipped instead of failing.
    pub allow_missing: bool,
    /// Accept on-disk data of lower rank than the target, padding leading extents with 1.
    pub allow_dim_promote: bool,
    /// Accept on-disk data of higher rank than a rank-1 target, flattening it.
    pub allow_flatten: bool,
    /// First row to read, `None` meaning the first row of the column.
    pub first_row: Option<usize>,
    /// One past the last row to read, `None` meaning all remaining rows.
    pub last_row: Option<usize>,
}

impl ReadOptions {
    pub const STRICT: Self = Self {
        allow_narrow: false,
        allow_missing: false,
        allow_dim_promote: false,
        allow_flatten: false,
        first_row: None,
        last_row: None,
    };

    pub const NARROW: Self = Self {
        allow_narrow: true,
        ..Self::STRICT
    };

    pub const MISSING: Self = Self {
        allow_missing: true,
        ..Self::STRICT
    };

    pub const DIM_PROMOTE: Self = Self {
        allow_dim_promote: true,
        ..Self::STRICT
    };

    pub const FLATTEN: Self = Self {
        allow_flatten: true,
        ..Self::STRICT
    };

    pub const PERMISSIVE: Self = Self {
        allow_narrow: true,
        allow_missing: true,
        allow_dim_promote: true,
        allow_flatten: true,
        ..Self::STRICT
    };

    /// Reads the single row `row`.
    pub const fn row(row: usize) -> Self {
        Self::rows(row, row.saturating_add(1))
    }

    /// Reads rows `first..last`.
    pub const fn rows(first: usize, last: usize) -> Self {
        Self {
            first_row: Some(first),
            last_row: Some(last),
            ..Self::STRICT
        }
    }

    pub fn allow_narrow(self, allow_narrow: bool) -> Self {
        ReadOptions {
            allow_narrow,
            ..self
        }
    }

    pub fn allow_missing(self, allow_missing: bool) -> Self {
        ReadOptions {
            allow_missing,
            ..self
        }
    }

    pub fn allow_dim_promote(self, allow_dim_promote: bool) -> Self {
        ReadOptions {
            allow_dim_promote,
            ..self
        }
    }

    pub fn allow_flatten(self, allow_flatten: bool) -> Self {
        ReadOptions {
            allow_flatten,
            ..self
        }
    }

    pub fn first_row(self, first_row: Option<usize>) -> Self {
        ReadOptions { first_row, ..self }
    }

    pub fn last_row(self, last_row: Option<usize>) -> Self {
        ReadOptions { last_row, ..self }
    }
}

impl BitOr for ReadOptions {
    type Output = ReadOptions;

    fn bitor(self, other: ReadOptions) -> ReadOptions {
        // An unbounded first row resolves to 0 and an unbounded last row to the end of the
        // column, so either one wins its side of the merge.
        let first_row = match (self.first_row, other.first_row) {
            (Some(a), Some(b)) => Some(a.min(b)),
            _ => None,
        };
        let last_row = match (self.last_row, other.last_row) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
        ReadOptions {
            allow_narrow: self.allow_narrow || other.allow_narrow,
            allow_missing: self.allow_missing || other.allow_missing,
            allow_dim_promote: self.allow_dim_promote || other.allow_dim_promote,
            allow_flatten: self.allow_flatten || other.allow_flatten,
            first_row,
            last_row,
        }
    }
}

/// Options used to open or create a file-backed table.
#[derive(Debug, Clone)]
pub struct TableOption {
    pub(crate) path: PathBuf,
    pub(crate) format: TableFormat,
    pub(crate) write_parquet_option: Option<WriterProperties>,
    pub(crate) verify_checksum: bool,
}

impl<P> From<P> for TableOption
where
    P: Into<PathBuf>,
{
    fn from(path: P) -> Self {
        TableOption {
            path: path.into(),
            format: TableFormat::ColumnOriented,
            write_parquet_option: None,
            verify_checksum: true,
        }
    }
}

impl TableOption {
    pub fn path(self, path: impl Into<PathBuf>) -> Self {
        TableOption {
            path: path.into(),
            ..self
        }
    }

    /// Layout used by newly created tables. Existing tables keep the layout found on disk.
    pub fn format(self, format: TableFormat) -> Self {
        TableOption { format, ..self }
    }

    pub fn write_parquet_option(self, write_parquet_option: WriterProperties) -> Self {
        TableOption {
            write_parquet_option: Some(write_parquet_option),
            ..self
        }
    }

    pub fn verify_checksum(self, verify_checksum: bool) -> Self {
        TableOption {
            verify_checksum,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_ors_flags() {
        let merged = ReadOptions::NARROW | ReadOptions::FLATTEN;
        assert!(merged.allow_narrow);
        assert!(merged.allow_flatten);
        assert!(!merged.allow_missing);
        assert!(!merged.allow_dim_promote);
        assert_eq!(ReadOptions::PERMISSIVE | ReadOptions::STRICT, ReadOptions::PERMISSIVE);
    }

    #[test]
    fn merge_widens_rows() {
        let merged = ReadOptions::rows(2, 4) | ReadOptions::rows(3, 8);
        assert_eq!(merged.first_row, Some(2));
        assert_eq!(merged.last_row, Some(8));

        let unbounded = ReadOptions::rows(2, 4) | ReadOptions::NARROW;
        assert_eq!(unbounded.first_row, None);
        assert_eq!(unbounded.last_row, None);
        assert!(unbounded.allow_narrow);
    }

    #[test]
    fn builder_keeps_rows() {
        let opts = ReadOptions::row(5).allow_narrow(true).allow_missing(true);
        assert_eq!(opts.first_row, Some(5));
        assert_eq!(opts.last_row, Some(6));
        assert!(opts.allow_narrow && opts.allow_missing);

        let last = ReadOptions::row(usize::MAX);
        assert_eq!(last.first_row, Some(usize::MAX));
        assert_eq!(last.last_row, Some(usize::MAX));
    }

    #[test]
    fn table_option_defaults() {
        let option = TableOption::from("/tmp/catalog.parquet").format(TableFormat::RowOriented);
        assert_eq!(option.format, TableFormat::RowOriented);
        assert!(option.verify_checksum);
        assert!(option.write_parquet_option.is_none());
    }
}
