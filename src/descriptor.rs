use std::fmt;

/// Element encoding of a column as declared by its `TFORM` letter.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum TypeCode {
    Logical,
    Byte,
    SignedByte,
    Short,
    Int,
    UInt,
    Long,
    Float,
    Double,
    Text,
}

impl TypeCode {
    /// Letter used for this code in a binary table `TFORM` descriptor.
    pub fn tform_letter(self) -> char {
        match self {
            TypeCode::Logical => 'L',
            TypeCode::Byte => 'B',
            TypeCode::SignedByte => 'S',
            TypeCode::Short => 'I',
            TypeCode::Int => 'J',
            TypeCode::UInt => 'V',
            TypeCode::Long => 'K',
            TypeCode::Float => 'E',
            TypeCode::Double => 'D',
            TypeCode::Text => 'A',
        }
    }

    pub fn from_tform_letter(letter: char) -> Option<Self> {
        Some(match letter {
            'L' => TypeCode::Logical,
            'B' => TypeCode::Byte,
            'S' => TypeCode::SignedByte,
            'I' => TypeCode::Short,
            'J' => TypeCode::Int,
            'V' => TypeCode::UInt,
            'K' => TypeCode::Long,
            'E' => TypeCode::Float,
            'D' => TypeCode::Double,
            'A' => TypeCode::Text,
            _ => return None,
        })
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeCode::Logical => "logical",
            TypeCode::Byte => "uint8",
            TypeCode::SignedByte => "int8",
            TypeCode::Short => "int16",
            TypeCode::Int => "int32",
            TypeCode::UInt => "uint32",
            TypeCode::Long => "int64",
            TypeCode::Float => "float32",
            TypeCode::Double => "float64",
            TypeCode::Text => "string",
        };
        f.write_str(name)
    }
}

/// Coarse kind of a column, as reported by introspection.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Boolean,
    Byte,
    Integer,
    Float32,
    Float64,
}

impl ScalarKind {
    /// Kind of a column with the given code. Byte columns are refined by
    /// introspection, which may report them as booleans.
    pub fn of(code: TypeCode) -> Self {
        match code {
            TypeCode::Text => ScalarKind::String,
            TypeCode::Logical => ScalarKind::Boolean,
            TypeCode::Byte | TypeCode::SignedByte => ScalarKind::Byte,
            TypeCode::Short | TypeCode::Int | TypeCode::UInt | TypeCode::Long => {
                ScalarKind::Integer
            }
            TypeCode::Float => ScalarKind::Float32,
            TypeCode::Double => ScalarKind::Float64,
        }
    }
}

/// Element type of a column together with its `TFORM` repeat count and element width.
///
/// For text columns `repeat` counts characters and `width` is the fixed string width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnType {
    pub code: TypeCode,
    pub repeat: usize,
    pub width: usize,
}

/// Snapshot of a column's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Zero-based position of the column in the table.
    pub id: usize,
    pub name: String,
    pub kind: ScalarKind,
    /// Row-major extents of one cell. String columns exclude the width axis.
    pub dims: Vec<usize>,
    /// Fixed width of string cells, 1 for other kinds.
    pub length: usize,
}
