use super::*;
use crate::{
    model::FieldDescriptor,
    test_fixtures::{Address, Member, Profile, Team},
};

fn visible<T: Viewable>(schema: &ViewSchema<T>) -> Vec<&'static str> {
    schema
        .visible_simple_fields()
        .map(FieldDescriptor::name)
        .collect()
}

const fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn schemas_are_shareable_across_threads() {
    assert_send_sync::<ViewSchema<Profile>>();
    assert_send_sync::<ViewSchema<Member>>();
}

#[test]
fn builder_defaults() {
    let schema = ViewSchema::<Team>::builder().build();

    assert!(schema.detach_on_load());
    assert!(!schema.propagates_into_loaded_entity());
    assert!(!schema.shows_time_of_day());
    assert!(!schema.is_default_exclude());
    assert!(schema.is_entity_identified());
    assert!(!ViewSchema::<Address>::builder().build().is_entity_identified());
}

#[test]
fn every_simple_field_is_visible_by_default_in_declaration_order() {
    let schema = ViewSchema::<Team>::builder().build();

    assert_eq!(visible(&schema), ["id", "name", "version"]);
}

#[test]
fn excluded_fields_are_hidden() {
    let schema = ViewSchema::<Team>::builder()
        .exclude(&["version"])
        .expect("version exists")
        .build();

    assert_eq!(visible(&schema), ["id", "name"]);
}

#[test]
fn default_exclude_shows_only_included_fields_in_include_order() {
    let schema = ViewSchema::<Profile>::builder()
        .default_exclude()
        .include(&["age", "name"])
        .expect("simple fields")
        .include(&["age"])
        .expect("repeat include is harmless")
        .build();

    assert_eq!(visible(&schema), ["age", "name"]);
}

#[test]
fn including_an_unknown_field_fails() {
    let err = ViewSchema::<Profile>::builder()
        .include(&["nope"])
        .expect_err("unknown field");

    assert_eq!(
        err,
        SchemaError::UnknownField {
            type_tag: "Profile",
            field: "nope".to_string(),
        }
    );
}

#[test]
fn including_a_compound_field_as_simple_fails() {
    let err = ViewSchema::<Profile>::builder()
        .include(&["address"])
        .expect_err("compound field");

    assert_eq!(
        err,
        SchemaError::NotSimple {
            type_tag: "Profile",
            field: "address".to_string(),
        }
    );
}

#[test]
fn excluding_an_unknown_field_fails() {
    let err = ViewSchema::<Team>::builder()
        .exclude(&["owner"])
        .expect_err("unknown field");

    assert!(matches!(err, SchemaError::UnknownField { .. }));
}

#[test]
fn nested_binding_checks_the_field_and_element_type() {
    let err = ViewSchema::<Member>::builder()
        .include_nested("manager", ViewSchema::<Team>::builder())
        .expect_err("unknown field");
    assert!(matches!(err, SchemaError::UnknownField { .. }));

    let err = ViewSchema::<Member>::builder()
        .include_nested("team", ViewSchema::<Address>::builder())
        .expect_err("team holds a Team");
    assert_eq!(
        err,
        SchemaError::NestedTypeMismatch {
            type_tag: "Member",
            field: "team",
            expected: "Team",
            found: "Address",
        }
    );
}

#[test]
fn nested_bindings_keep_registration_order_and_replace_repeats() {
    let schema = ViewSchema::<Member>::builder()
        .include_nested("teams", ViewSchema::<Team>::builder())
        .expect("list of teams")
        .include_nested("team", ViewSchema::<Team>::builder())
        .expect("single team")
        .include_nested(
            "teams",
            ViewSchema::<Team>::builder().default_exclude(),
        )
        .expect("rebinding replaces")
        .build();

    let bound: Vec<_> = schema
        .nested_bindings()
        .map(|(name, view)| (name, view.type_tag()))
        .collect();

    assert_eq!(bound, [("teams", "Team"), ("team", "Team")]);
}

#[test]
fn simple_fields_bound_to_a_nested_schema_leave_the_simple_list() {
    let schema = ViewSchema::<Member>::builder()
        .include_nested("name", ViewSchema::<String>::builder())
        .expect("simple fields bind as they are")
        .build();

    assert!(visible(&schema).is_empty());
    assert_eq!(schema.nested_bindings().count(), 1);
}

#[test]
fn additional_bindings_are_found_by_key() {
    let schema = ViewSchema::<Member>::builder()
        .include_additional("owner", ViewSchema::<Team>::builder())
        .build();

    assert_eq!(
        schema.additional_binding("owner").map(ErasedView::type_tag),
        Some("Team")
    );
    assert!(schema.additional_binding("other").is_none());
}

#[test]
fn debug_output_names_the_configuration() {
    let schema = ViewSchema::<Team>::builder()
        .set_detach(false)
        .show_date_time()
        .build();
    let text = format!("{schema:?}");

    assert!(text.contains("type_tag: \"Team\""));
    assert!(text.contains("detach: false"));
    assert!(!schema.detach_on_load());
    assert!(schema.shows_time_of_day());
}
