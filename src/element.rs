use std::fmt::Debug;

use crate::descriptor::TypeCode;

/// Widest in-flight representation of a single numeric or logical cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
}

/// Plain element types that can be stored in, and loaded from, numeric or logical columns.
///
/// Conversions through [`Scalar`] follow `as` semantics; whether a conversion is allowed at all
/// is decided beforehand by [`crate::compat::accepts`].
pub trait Element: Copy + Default + Debug + PartialEq + Send + Sync + 'static {
    /// Code used when a column is created for this element type.
    const CODE: TypeCode;

    /// Name shown in diagnostics.
    const NAME: &'static str;

    fn to_scalar(self) -> Scalar;

    fn from_scalar(scalar: Scalar) -> Self;
}

impl Element for bool {
    const CODE: TypeCode = TypeCode::Logical;
    const NAME: &'static str = "bool";

    fn to_scalar(self) -> Scalar {
        Scalar::Bool(self)
    }

    fn from_scalar(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Bool(v) => v,
            Scalar::Int(v) => v != 0,
            Scalar::Float(v) => v != 0.0,
        }
    }
}

macro_rules! implement_int_element {
    ($($ty:ty => $code:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const CODE: TypeCode = TypeCode::$code;
                const NAME: &'static str = stringify!($ty);

                fn to_scalar(self) -> Scalar {
                    Scalar::Int(self as i64)
                }

                fn from_scalar(scalar: Scalar) -> Self {
                    match scalar {
                        Scalar::Bool(v) => v as $ty,
                        Scalar::Int(v) => v as $ty,
                        Scalar::Float(v) => v as $ty,
                    }
                }
            }
        )*
    };
}

macro_rules! implement_float_element {
    ($($ty:ty => $code:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const CODE: TypeCode = TypeCode::$code;
                const NAME: &'static str = stringify!($ty);

                fn to_scalar(self) -> Scalar {
                    Scalar::Float(self as f64)
                }

                fn from_scalar(scalar: Scalar) -> Self {
                    match scalar {
                        Scalar::Bool(v) => u8::from(v) as $ty,
                        Scalar::Int(v) => v as $ty,
                        Scalar::Float(v) => v as $ty,
                    }
                }
            }
        )*
    };
}

implement_int_element!(
    u8 => Byte,
    i8 => SignedByte,
    i16 => Short,
    i32 => Int,
    u32 => UInt,
    i64 => Long,
);

implement_float_element!(
    f32 => Float,
    f64 => Double,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_conversions_follow_as_semantics() {
        assert_eq!(i16::from_scalar(Scalar::Int(300)), 300);
        assert_eq!(u8::from_scalar(Scalar::Int(300)), 44);
        assert_eq!(i32::from_scalar(Scalar::Float(-2.7)), -2);
        assert_eq!(u32::from_scalar(Scalar::Bool(true)), 1);
        assert_eq!(u32::MAX.to_scalar(), Scalar::Int(u32::MAX as i64));
    }

    #[test]
    fn float_conversions() {
        assert_eq!(f32::from_scalar(Scalar::Bool(true)), 1.0);
        assert_eq!(f64::from_scalar(Scalar::Int(-7)), -7.0);
        assert_eq!(0.5f32.to_scalar(), Scalar::Float(0.5));
    }

    #[test]
    fn bool_from_numbers() {
        assert!(bool::from_scalar(Scalar::Int(2)));
        assert!(!bool::from_scalar(Scalar::Float(0.0)));
        assert_eq!(bool::CODE, TypeCode::Logical);
    }
}
