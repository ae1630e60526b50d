use super::*;
use crate::{
    coerce::CoercionError,
    test_fixtures::{Color, Status},
    traits::Viewable,
};
use time::{
    Date,
    macros::{date, datetime},
};

#[test]
fn labelled_enum_exposes_its_label() {
    assert_eq!(Status::Suspended.external(), "SUSPENDED_ACCOUNT");
    assert_eq!(Status::Active.to_string(), "ACTIVE");
    assert_eq!(Status::DESCRIPTOR.find_by_name("Suspended"), Some(1));
}

#[test]
fn unlabelled_enum_exposes_its_name() {
    assert_eq!(Color::Green.external(), "Green");
    assert!(!Color::DESCRIPTOR.labeled);
    assert_eq!(Color::from_external("Red"), Ok(Color::Red));
}

#[test]
fn labelled_enum_matches_on_label_only() {
    assert_eq!(
        Status::from_external("SUSPENDED_ACCOUNT"),
        Ok(Status::Suspended)
    );
    assert_eq!(
        Status::from_external("Suspended"),
        Err(CoercionError::UnknownEnumValue {
            text: "Suspended".to_string(),
            target: "Status",
        })
    );
    assert!(Color::from_label("Red").is_err());
}

#[test]
fn enum_scalar_round_trips_through_simple_value() {
    let scalar = Status::Suspended.to_scalar().expect("enums always have a scalar");

    assert_eq!(scalar.to_string(), "SUSPENDED_ACCOUNT");
    assert_eq!(scalar.scalar_type().name(), "Status");
    assert_eq!(Status::from_scalar(Some(scalar)), Ok(Status::Suspended));
}

#[test]
fn enum_from_scalar_accepts_external_text() {
    assert_eq!(
        Status::from_scalar(Some(Scalar::Text("ACTIVE".to_string()))),
        Ok(Status::Active)
    );
}

#[test]
fn enum_from_scalar_rejects_another_enumeration() {
    let err = Status::from_scalar(Color::Red.to_scalar()).expect_err("different enum");

    assert!(matches!(err, CoercionError::Mismatch { .. }));
}

#[test]
fn bare_types_reject_null_and_optional_types_accept_it() {
    assert_eq!(
        i32::from_scalar(None),
        Err(CoercionError::NullForRequired {
            target: i32::TARGET
        })
    );
    assert_eq!(Option::<i32>::from_scalar(None), Ok(None));
    assert_eq!(Option::<i32>::from_scalar(Some(Scalar::Int(4))), Ok(Some(4)));
}

#[test]
fn mismatched_scalar_kind_is_rejected() {
    let err = i64::from_scalar(Some(Scalar::Int(1))).expect_err("int is not long");

    assert_eq!(
        err,
        CoercionError::Mismatch {
            expected: TargetType::required(ScalarType::Long),
            found: ScalarType::Int,
        }
    );
}

#[test]
fn optional_targets_are_nullable() {
    assert!(!i32::TARGET.nullable);
    assert!(Option::<i32>::TARGET.nullable);
    assert_eq!(Option::<Status>::TARGET.scalar, Status::TARGET.scalar);
    assert_eq!(Option::<String>::TARGET.to_string(), "Option<string>");
}

#[test]
fn absent_optional_reads_as_no_scalar() {
    assert_eq!(None::<String>.to_scalar(), None);
    assert_eq!(
        Some("x".to_string()).to_scalar(),
        Some(Scalar::Text("x".to_string()))
    );
}

#[test]
fn calendar_dates_travel_as_midnight() {
    let day = date!(2024 - 02 - 29);

    assert_eq!(
        day.to_scalar(),
        Some(Scalar::Date(datetime!(2024 - 02 - 29 0:00)))
    );
    assert_eq!(
        Date::from_scalar(Some(Scalar::Date(datetime!(2024 - 02 - 29 13:45)))),
        Ok(day)
    );
}

#[test]
fn zero_exists_only_for_numerics() {
    assert_eq!(Scalar::zero(ScalarType::Int), Some(Scalar::Int(0)));
    assert_eq!(
        Scalar::zero(ScalarType::Decimal),
        Some(Scalar::Decimal(Decimal::ZERO))
    );
    assert_eq!(Scalar::zero(ScalarType::Text), None);
    assert!(ScalarType::Float.is_numeric());
    assert!(!ScalarType::Char.is_numeric());
}

#[test]
fn enums_are_simple_wrappers_but_not_instantiable() {
    assert_eq!(Status::instantiate(), None);
    assert_eq!(Status::from_simple("ACTIVE"), Ok(Status::Active));
    assert_eq!(
        Status::Active.as_simple(),
        Some(Scalar::Enum(EnumScalar::new(Status::DESCRIPTOR, 0)))
    );
}
