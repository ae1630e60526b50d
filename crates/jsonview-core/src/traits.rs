use crate::{
    JsonMap,
    coerce::{CoercionError, parse_plain},
    error::ViewError,
    model::FieldTable,
    value::{Scalar, SimpleValue},
};
use rust_decimal::Decimal;
use std::any::Any;

///
/// Identity
///
/// `Entity` types carry a stable `id` and are resolved through the persistence
/// context during deserialization instead of being constructed fresh.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Identity {
    Value,
    Entity,
}

///
/// Viewable
///
/// Domain type the engine can walk.
/// Fields are declared once in `describe`; the table is cached per type.
///

pub trait Viewable: Any + Send + Sync + Sized {
    const TYPE_TAG: &'static str;
    const IDENTITY: Identity = Identity::Value;

    /// Register readable and writable fields in declaration order.
    fn describe(_fields: &mut FieldTable<Self>) {}

    /// Fresh instance, or `None` when the type cannot be constructed (abstract).
    fn instantiate() -> Option<Self>;

    /// Factory used instead of `instantiate` for value types that build
    /// themselves from the raw document.
    fn create_from_document(_raw: &JsonMap) -> Option<Result<Self, ViewError>> {
        None
    }

    /// Simple form, for types that are simple wrappers (enumerations, scalars).
    fn as_simple(&self) -> Option<Scalar> {
        None
    }

    /// Build from a string list element.
    fn from_simple(_text: &str) -> Result<Self, CoercionError> {
        Err(CoercionError::NotSimple {
            type_tag: Self::TYPE_TAG,
        })
    }
}

// Scalars can sit inside lists and maps; they read and write as text.
macro_rules! impl_viewable_scalar {
    ($($ty:ty => $tag:literal),* $(,)?) => {
        $(
            impl Viewable for $ty {
                const TYPE_TAG: &'static str = $tag;

                fn instantiate() -> Option<Self> {
                    Some(Self::default())
                }

                fn as_simple(&self) -> Option<Scalar> {
                    self.to_scalar()
                }

                fn from_simple(text: &str) -> Result<Self, CoercionError> {
                    Self::from_scalar(parse_plain(text, Self::TARGET)?)
                }
            }
        )*
    };
}

impl_viewable_scalar!(
    bool => "boolean",
    i8 => "byte",
    i16 => "short",
    i32 => "int",
    i64 => "long",
    f32 => "float",
    f64 => "double",
    char => "char",
    String => "string",
    Decimal => "decimal",
);

///
/// Tagged
///
/// Runtime type tag, used by multi-type dispatch.
/// Every `Viewable` is tagged; sum types implement it by delegating to the
/// active variant.
///

pub trait Tagged {
    fn type_tag(&self) -> &'static str;

    fn as_any(&self) -> &(dyn Any + 'static);
}

impl<T: Viewable> Tagged for T {
    fn type_tag(&self) -> &'static str {
        T::TYPE_TAG
    }

    fn as_any(&self) -> &(dyn Any + 'static) {
        self
    }
}
