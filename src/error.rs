use thiserror::Error;

use crate::{descriptor::TypeCode, io::IoError};

/// Failure of a table operation.
///
/// Every variant names the column involved, if any, and the file the table belongs to.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("column '{column}' not found\nnote: reading '{file}'")]
    MissingColumn { column: String, file: String },
    #[error(
        "cannot read column '{column}' of type {found} into {expected}\nnote: reading '{file}'"
    )]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: TypeCode,
        file: String,
    },
    #[error(
        "column '{column}' has {found} dimension(s), expected {expected}\nnote: reading '{file}'"
    )]
    DimensionMismatch {
        column: String,
        expected: usize,
        found: usize,
        file: String,
    },
    #[error(
        "cannot read {requested} of column '{column}' with dimensions {dims:?}\nnote: reading \
         '{file}'"
    )]
    RowRangeInvalid {
        column: String,
        requested: String,
        dims: Vec<usize>,
        file: String,
    },
    #[error("{reason}\nnote: writing '{file}'")]
    FormatConflict { reason: String, file: String },
    #[error("{context}: {source}\nnote: table '{file}'")]
    Io {
        context: String,
        file: String,
        #[source]
        source: IoError,
    },
}

impl TableError {
    pub(crate) fn io(context: impl Into<String>, file: &str, source: IoError) -> Self {
        TableError::Io {
            context: context.into(),
            file: file.to_string(),
            source,
        }
    }

    pub(crate) fn format_conflict(reason: impl Into<String>, file: &str) -> Self {
        TableError::FormatConflict {
            reason: reason.into(),
            file: file.to_string(),
        }
    }

    /// Whether this error reports an absent column.
    pub fn is_missing_column(&self) -> bool {
        matches!(self, TableError::MissingColumn { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_column_and_file() {
        let err = TableError::TypeMismatch {
            column: "FLUX".into(),
            expected: "i16",
            found: TypeCode::Double,
            file: "cat.parquet".into(),
        };
        let message = err.to_string();
        assert!(message.contains("'FLUX'"));
        assert!(message.contains("float64"));
        assert!(message.contains("note: reading 'cat.parquet'"));
    }

    #[test]
    fn io_error_keeps_backend_text() {
        let err = TableError::io(
            "cannot write column 'ID'",
            "out.parquet",
            IoError::NoSuchColumn(3),
        );
        assert_eq!(
            err.to_string(),
            "cannot write column 'ID': column index 3 out of range\nnote: table 'out.parquet'"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
