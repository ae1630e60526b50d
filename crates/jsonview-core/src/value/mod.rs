//! Native scalar model shared by the coercion rules and the field tables.
//!
//! A `Scalar` is what a simple field reads as and what a simple setter
//! receives. `TargetType` is the declared parameter type of a setter and drives
//! the json → native coercion table.

mod macros;
mod simple;

#[cfg(test)]
mod tests;

use rust_decimal::Decimal;
use std::fmt;
use time::PrimitiveDateTime;

// re-exports
pub use simple::{SimpleValue, ViewEnum, enum_from_scalar, enum_scalar};

///
/// ScalarType
///
/// Semantic type of a simple field. Anything outside this set is compound.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScalarType {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Char,
    Text,
    Date,
    Enum(&'static EnumDescriptor),
}

impl ScalarType {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Char => "char",
            Self::Text => "string",
            Self::Date => "date",
            Self::Enum(descriptor) => descriptor.type_name,
        }
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Short
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
                | Self::Decimal
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///
/// TargetType
///
/// Declared parameter type of a simple setter.
/// `nullable` is false for bare primitives, which turn empty strings into zero.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TargetType {
    pub scalar: ScalarType,
    pub nullable: bool,
}

impl TargetType {
    #[must_use]
    pub const fn required(scalar: ScalarType) -> Self {
        Self {
            scalar,
            nullable: false,
        }
    }

    #[must_use]
    pub const fn nullable(scalar: ScalarType) -> Self {
        Self {
            scalar,
            nullable: true,
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "Option<{}>", self.scalar)
        } else {
            write!(f, "{}", self.scalar)
        }
    }
}

///
/// EnumDescriptor
///
/// Static description of an enumeration: its variants in declaration order and
/// whether it carries external labels.
///

#[derive(Debug, Eq, PartialEq)]
pub struct EnumDescriptor {
    pub type_name: &'static str,
    pub labeled: bool,
    pub variants: &'static [EnumVariant],
}

impl EnumDescriptor {
    /// External form of the variant at `index`.
    #[must_use]
    pub fn external(&self, index: usize) -> &'static str {
        self.variants.get(index).map_or("", EnumVariant::external)
    }

    /// Find a variant by its external label.
    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<usize> {
        self.variants
            .iter()
            .position(|variant| variant.label == Some(label))
    }

    /// Find a variant by its declared name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.variants.iter().position(|variant| variant.name == name)
    }

    /// Labelled enumerations match on label only; the rest match on name.
    #[must_use]
    pub fn match_text(&self, text: &str) -> Option<usize> {
        if self.labeled {
            self.find_by_label(text)
        } else {
            self.find_by_name(text)
        }
    }
}

///
/// EnumVariant
///

#[derive(Debug, Eq, PartialEq)]
pub struct EnumVariant {
    pub name: &'static str,
    pub label: Option<&'static str>,
}

impl EnumVariant {
    #[must_use]
    pub const fn external(&self) -> &'static str {
        match self.label {
            Some(label) => label,
            None => self.name,
        }
    }
}

///
/// EnumScalar
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EnumScalar {
    descriptor: &'static EnumDescriptor,
    index: usize,
}

impl EnumScalar {
    #[must_use]
    pub const fn new(descriptor: &'static EnumDescriptor, index: usize) -> Self {
        Self { descriptor, index }
    }

    #[must_use]
    pub const fn descriptor(&self) -> &'static EnumDescriptor {
        self.descriptor
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.descriptor
            .variants
            .get(self.index)
            .map_or("", |variant| variant.name)
    }

    /// Label when the enumeration carries labels, otherwise the variant name.
    #[must_use]
    pub fn external(&self) -> &'static str {
        self.descriptor.external(self.index)
    }
}

///
/// Scalar
///
/// Native simple value read from, or written to, a simple field.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Char(char),
    Text(String),
    Date(PrimitiveDateTime),
    Enum(EnumScalar),
}

impl Scalar {
    #[must_use]
    pub const fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Bool(_) => ScalarType::Bool,
            Self::Byte(_) => ScalarType::Byte,
            Self::Short(_) => ScalarType::Short,
            Self::Int(_) => ScalarType::Int,
            Self::Long(_) => ScalarType::Long,
            Self::Float(_) => ScalarType::Float,
            Self::Double(_) => ScalarType::Double,
            Self::Decimal(_) => ScalarType::Decimal,
            Self::Char(_) => ScalarType::Char,
            Self::Text(_) => ScalarType::Text,
            Self::Date(_) => ScalarType::Date,
            Self::Enum(value) => ScalarType::Enum(value.descriptor()),
        }
    }

    /// Zero value used for empty strings on non-nullable numeric targets.
    #[must_use]
    pub const fn zero(scalar: ScalarType) -> Option<Self> {
        match scalar {
            ScalarType::Byte => Some(Self::Byte(0)),
            ScalarType::Short => Some(Self::Short(0)),
            ScalarType::Int => Some(Self::Int(0)),
            ScalarType::Long => Some(Self::Long(0)),
            ScalarType::Float => Some(Self::Float(0.0)),
            ScalarType::Double => Some(Self::Double(0.0)),
            ScalarType::Decimal => Some(Self::Decimal(Decimal::ZERO)),
            _ => None,
        }
    }
}

// Dates have no canonical text without a format context; this form is only
// used in diagnostics.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Date(v) => write!(f, "{v}"),
            Self::Enum(v) => f.write_str(v.external()),
        }
    }
}
