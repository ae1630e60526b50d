use crate::{
    coerce::CoercionError,
    value::{EnumDescriptor, EnumScalar, Scalar, ScalarType, TargetType},
};
use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime};

///
/// SimpleValue
///
/// Native type that a simple field can hold.
/// `TARGET` is the declared setter parameter type the coercion rules key on.
///

pub trait SimpleValue: Sized {
    const TARGET: TargetType;

    /// Read form; `None` only for absent optional values.
    fn to_scalar(&self) -> Option<Scalar>;

    /// Write form; `None` is only accepted by nullable targets.
    fn from_scalar(value: Option<Scalar>) -> Result<Self, CoercionError>;
}

// Bare types reject null and any scalar of a different kind.
macro_rules! impl_simple_value {
    (@one $ty:ty, $variant:ident, $read:expr) => {
        impl SimpleValue for $ty {
            const TARGET: TargetType = TargetType::required(ScalarType::$variant);

            fn to_scalar(&self) -> Option<Scalar> {
                Some(Scalar::$variant(($read)(self)))
            }

            fn from_scalar(value: Option<Scalar>) -> Result<Self, CoercionError> {
                match value {
                    Some(Scalar::$variant(v)) => Ok(v),
                    Some(other) => Err(CoercionError::Mismatch {
                        expected: Self::TARGET,
                        found: other.scalar_type(),
                    }),
                    None => Err(CoercionError::NullForRequired {
                        target: Self::TARGET,
                    }),
                }
            }
        }
    };

    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl_simple_value!(@one $ty, $variant, |v: &$ty| *v);)*
    };
}

impl_simple_value!(
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Decimal => Decimal,
    char => Char,
    PrimitiveDateTime => Date,
);

impl_simple_value!(@one String, Text, String::clone);

// calendar dates travel as midnight date-times
impl SimpleValue for Date {
    const TARGET: TargetType = TargetType::required(ScalarType::Date);

    fn to_scalar(&self) -> Option<Scalar> {
        Some(Scalar::Date(self.midnight()))
    }

    fn from_scalar(value: Option<Scalar>) -> Result<Self, CoercionError> {
        PrimitiveDateTime::from_scalar(value).map(PrimitiveDateTime::date)
    }
}

impl<T: SimpleValue> SimpleValue for Option<T> {
    const TARGET: TargetType = TargetType::nullable(T::TARGET.scalar);

    fn to_scalar(&self) -> Option<Scalar> {
        self.as_ref().and_then(T::to_scalar)
    }

    fn from_scalar(value: Option<Scalar>) -> Result<Self, CoercionError> {
        match value {
            Some(scalar) => T::from_scalar(Some(scalar)).map(Some),
            None => Ok(None),
        }
    }
}

///
/// ViewEnum
///
/// Enumeration with an external form. Labelled enumerations expose their label,
/// the rest expose the variant name. Declared through `view_enum!`.
///

pub trait ViewEnum: Copy + Sized + 'static {
    const DESCRIPTOR: &'static EnumDescriptor;
    const VARIANTS: &'static [Self];

    fn index(self) -> usize;

    #[must_use]
    fn external(self) -> &'static str {
        Self::DESCRIPTOR.external(self.index())
    }

    /// Resolve the external form: label for labelled enumerations, name otherwise.
    fn from_external(text: &str) -> Result<Self, CoercionError> {
        Self::DESCRIPTOR
            .match_text(text)
            .and_then(|index| Self::VARIANTS.get(index).copied())
            .ok_or_else(|| CoercionError::UnknownEnumValue {
                text: text.to_string(),
                target: Self::DESCRIPTOR.type_name,
            })
    }

    /// Resolve a label, ignoring variant names.
    fn from_label(label: &str) -> Result<Self, CoercionError> {
        Self::DESCRIPTOR
            .find_by_label(label)
            .and_then(|index| Self::VARIANTS.get(index).copied())
            .ok_or_else(|| CoercionError::UnknownEnumValue {
                text: label.to_string(),
                target: Self::DESCRIPTOR.type_name,
            })
    }
}

/// Scalar form of an enumeration value.
#[must_use]
pub fn enum_scalar<E: ViewEnum>(value: E) -> Scalar {
    Scalar::Enum(EnumScalar::new(E::DESCRIPTOR, value.index()))
}

/// Convert a coerced scalar back into an enumeration value.
pub fn enum_from_scalar<E: ViewEnum>(value: Option<Scalar>) -> Result<E, CoercionError> {
    let target = TargetType::required(ScalarType::Enum(E::DESCRIPTOR));

    match value {
        Some(Scalar::Enum(scalar)) if scalar.descriptor() == E::DESCRIPTOR => E::VARIANTS
            .get(scalar.index())
            .copied()
            .ok_or_else(|| CoercionError::UnknownEnumValue {
                text: scalar.name().to_string(),
                target: E::DESCRIPTOR.type_name,
            }),
        // text arrives here when a caller writes a raw scalar
        Some(Scalar::Text(text)) => E::from_external(&text),
        Some(other) => Err(CoercionError::Mismatch {
            expected: target,
            found: other.scalar_type(),
        }),
        None => Err(CoercionError::NullForRequired { target }),
    }
}
