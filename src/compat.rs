//! Which on-disk element codes may populate which in-memory element types.

use crate::descriptor::TypeCode;

#[derive(Debug, Clone, Copy)]
enum Domain {
    Int { min: i128, max: i128 },
    Float { mantissa: u32 },
}

fn domain(code: TypeCode) -> Option<Domain> {
    let int = |min: i128, max: i128| Some(Domain::Int { min, max });
    match code {
        TypeCode::Byte => int(0, u8::MAX as i128),
        TypeCode::SignedByte => int(i8::MIN as i128, i8::MAX as i128),
        TypeCode::Short => int(i16::MIN as i128, i16::MAX as i128),
        TypeCode::Int => int(i32::MIN as i128, i32::MAX as i128),
        TypeCode::UInt => int(0, u32::MAX as i128),
        TypeCode::Long => int(i64::MIN as i128, i64::MAX as i128),
        TypeCode::Float => Some(Domain::Float {
            mantissa: f32::MANTISSA_DIGITS,
        }),
        TypeCode::Double => Some(Domain::Float {
            mantissa: f64::MANTISSA_DIGITS,
        }),
        TypeCode::Logical | TypeCode::Text => None,
    }
}

/// Whether every value representable by `from` converts exactly into `to`.
pub fn is_lossless(from: TypeCode, to: TypeCode) -> bool {
    if from == to {
        return true;
    }
    match (domain(from), domain(to)) {
        (Some(Domain::Int { min, max }), Some(Domain::Int { min: lo, max: hi })) => {
            lo <= min && max <= hi
        }
        (Some(Domain::Int { min, max }), Some(Domain::Float { mantissa })) => {
            max.max(-min) <= 1i128 << mantissa
        }
        (Some(Domain::Float { mantissa: a }), Some(Domain::Float { mantissa: b })) => a <= b,
        _ => false,
    }
}

/// Decides whether a column stored as `on_disk` may be loaded into elements of type `target`.
///
/// Logical and text columns only ever load into their own kind. Numeric columns load into any
/// numeric type whose range and precision cover them, or into any numeric type at all when
/// `allow_narrow` is set.
pub fn accepts(on_disk: TypeCode, target: TypeCode, allow_narrow: bool) -> bool {
    match (on_disk, target) {
        (TypeCode::Logical, TypeCode::Logical) | (TypeCode::Text, TypeCode::Text) => true,
        (TypeCode::Logical | TypeCode::Text, _) | (_, TypeCode::Logical | TypeCode::Text) => false,
        _ => allow_narrow || is_lossless(on_disk, target),
    }
}
