use crate::error::TableError;

/// What a successful read did to the target value.
#[must_use = "a read may have skipped the column"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The target now holds the column data.
    Loaded,
    /// The column was absent and missing columns were allowed; the target is untouched.
    Skipped,
}

impl Outcome {
    pub fn is_loaded(self) -> bool {
        matches!(self, Outcome::Loaded)
    }
}

/// Result of reading one column, a record, or a record field.
pub type ReadResult = Result<Outcome, TableError>;
