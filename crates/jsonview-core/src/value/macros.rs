/// Declare an enumeration usable as a simple field value.
///
/// Labelled form, where the label is the external representation:
///
/// ```ignore
/// view_enum! {
///     pub enum Status {
///         Active => "ACTIVE",
///         Suspended => "SUSPENDED_ACCOUNT",
///     }
/// }
/// ```
///
/// Unlabelled form, where the variant name is the external representation:
///
/// ```ignore
/// view_enum! {
///     pub enum Color { Red, Green }
/// }
/// ```
#[macro_export]
macro_rules! view_enum {
    (@define [$($meta:tt)*] $vis:vis $name:ident $labeled:tt [$($variant:ident => $label:expr),+]) => {
        $($meta)*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::value::ViewEnum for $name {
            const DESCRIPTOR: &'static $crate::value::EnumDescriptor =
                &$crate::value::EnumDescriptor {
                    type_name: stringify!($name),
                    labeled: $labeled,
                    variants: &[
                        $(
                            $crate::value::EnumVariant {
                                name: stringify!($variant),
                                label: $label,
                            }
                        ),+
                    ],
                };

            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn index(self) -> usize {
                self as usize
            }
        }

        impl $crate::value::SimpleValue for $name {
            const TARGET: $crate::value::TargetType = $crate::value::TargetType::required(
                $crate::value::ScalarType::Enum(
                    <Self as $crate::value::ViewEnum>::DESCRIPTOR,
                ),
            );

            fn to_scalar(&self) -> ::core::option::Option<$crate::value::Scalar> {
                ::core::option::Option::Some($crate::value::enum_scalar(*self))
            }

            fn from_scalar(
                value: ::core::option::Option<$crate::value::Scalar>,
            ) -> ::core::result::Result<Self, $crate::coerce::CoercionError> {
                $crate::value::enum_from_scalar(value)
            }
        }

        impl $crate::traits::Viewable for $name {
            const TYPE_TAG: &'static str = stringify!($name);

            fn instantiate() -> ::core::option::Option<Self> {
                ::core::option::Option::None
            }

            fn as_simple(&self) -> ::core::option::Option<$crate::value::Scalar> {
                ::core::option::Option::Some($crate::value::enum_scalar(*self))
            }

            fn from_simple(
                text: &str,
            ) -> ::core::result::Result<Self, $crate::coerce::CoercionError> {
                <Self as $crate::value::ViewEnum>::from_external(text)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($crate::value::ViewEnum::external(*self))
            }
        }
    };

    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $crate::view_enum!(
            @define [$(#[$meta])*] $vis $name true
            [$($variant => ::core::option::Option::Some($label)),+]
        );
    };

    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident),+ $(,)? }) => {
        $crate::view_enum!(
            @define [$(#[$meta])*] $vis $name false
            [$($variant => ::core::option::Option::None),+]
        );
    };
}
