//! Parsing and formatting of `TFORMn` and `TDIMn` descriptors.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{error::IoError, Extension};
use crate::descriptor::TypeCode;

static BINARY_TFORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d*)([LBSIJVKEDA])(\d*)\s*$").expect("binary TFORM pattern is valid")
});

static ASCII_TFORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([AIFED])(\d+)(?:\.\d+)?\s*$").expect("ascii TFORM pattern is valid")
});

static TDIM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\(\s*(\d+(?:\s*,\s*\d+)*)\s*\)\s*$").expect("TDIM pattern is valid")
});

/// Decoded `TFORMn` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnFormat {
    pub code: TypeCode,
    /// Element count per row as declared. Always 1 in ASCII tables.
    pub repeat: usize,
    /// Fixed string width for text, 1 otherwise.
    pub width: usize,
    /// Storage cells per row: elements for numeric columns, characters for text.
    pub row_cells: usize,
}

impl ColumnFormat {
    pub fn parse(tform: &str, extension: Extension) -> Result<Self, IoError> {
        match extension {
            Extension::BinTable => Self::parse_binary(tform),
            Extension::AsciiTable => Self::parse_ascii(tform),
        }
    }

    fn parse_binary(tform: &str) -> Result<Self, IoError> {
        let caps = BINARY_TFORM
            .captures(tform)
            .ok_or_else(|| IoError::BadFormat(tform.to_string()))?;
        let repeat = match &caps[1] {
            "" => 1,
            digits => parse_count(digits, tform)?,
        };
        let letter = caps[2].chars().next().unwrap_or_default();
        let code = TypeCode::from_tform_letter(letter)
            .ok_or_else(|| IoError::BadFormat(tform.to_string()))?;
        let width = match (&caps[3], code) {
            ("", TypeCode::Text) => repeat,
            ("", _) => 1,
            (digits, TypeCode::Text) => parse_count(digits, tform)?,
            (_, _) => return Err(IoError::BadFormat(tform.to_string())),
        };
        Ok(ColumnFormat {
            code,
            repeat,
            width,
            row_cells: repeat,
        })
    }

    fn parse_ascii(tform: &str) -> Result<Self, IoError> {
        let caps = ASCII_TFORM
            .captures(tform)
            .ok_or_else(|| IoError::BadFormat(tform.to_string()))?;
        let field = parse_count(&caps[2], tform)?;
        let (code, width) = match &caps[1] {
            "A" => (TypeCode::Text, field),
            "I" => (TypeCode::Int, 1),
            "F" | "E" => (TypeCode::Float, 1),
            _ => (TypeCode::Double, 1),
        };
        Ok(ColumnFormat {
            code,
            repeat: 1,
            width,
            row_cells: width,
        })
    }
}

fn parse_count(digits: &str, tform: &str) -> Result<usize, IoError> {
    digits
        .parse()
        .map_err(|_| IoError::BadFormat(tform.to_string()))
}

/// Binary-table descriptor for `size` elements of `code`. Text columns also carry the
/// fixed string width.
pub fn format_tform(code: TypeCode, size: usize, width: usize) -> String {
    match code {
        TypeCode::Text => format!("{size}A{width}"),
        _ => format!("{size}{}", code.tform_letter()),
    }
}

/// String width declared by an ASCII-table `TFORMn`, such as `A12`.
pub fn ascii_text_width(tform: &str) -> Option<usize> {
    let caps = ASCII_TFORM.captures(tform)?;
    if &caps[1] != "A" {
        return None;
    }
    caps[2].parse().ok()
}

pub fn format_tdim(dims: &[usize]) -> String {
    let axes: Vec<String> = dims.iter().map(usize::to_string).collect();
    format!("({})", axes.join(","))
}

pub fn parse_tdim(tdim: &str) -> Result<Vec<usize>, IoError> {
    let caps = TDIM
        .captures(tdim)
        .ok_or_else(|| IoError::BadFormat(tdim.to_string()))?;
    caps[1]
        .split(',')
        .map(|axis| {
            axis.trim()
                .parse()
                .map_err(|_| IoError::BadFormat(tdim.to_string()))
        })
        .collect()
}
