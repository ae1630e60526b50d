use crate::{
    traits::Viewable,
    value::{Scalar, SimpleValue},
};
use serde_json::Value as JsonValue;
use std::{any::Any, collections::BTreeMap, fmt::Display};

///
/// AdditionalValue
///
/// An out-of-band value. `Json` nodes are spliced in verbatim; every other
/// variant needs a schema registered under its key with `include_additional`.
///

pub enum AdditionalValue<'a> {
    Json(JsonValue),
    Simple(Option<Scalar>),
    Object(Option<&'a (dyn Any + 'static)>),
    List(Vec<&'a (dyn Any + 'static)>),
    Map(Vec<(String, &'a (dyn Any + 'static))>),
}

///
/// Additional
///
/// Ordered out-of-band values attached to one serialize call. Emitted after
/// every field, in insertion order; a repeated key replaces the earlier value.
///

#[derive(Default)]
pub struct Additional<'a> {
    entries: Vec<(String, AdditionalValue<'a>)>,
}

impl<'a> Additional<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ready-made document node, including an explicit `null`.
    #[must_use]
    pub fn json(self, key: impl Into<String>, value: JsonValue) -> Self {
        self.with(key, AdditionalValue::Json(value))
    }

    #[must_use]
    pub fn simple<V: SimpleValue>(self, key: impl Into<String>, value: &V) -> Self {
        self.with(key, AdditionalValue::Simple(value.to_scalar()))
    }

    #[must_use]
    pub fn object<U: Viewable>(self, key: impl Into<String>, value: Option<&'a U>) -> Self {
        self.with(
            key,
            AdditionalValue::Object(value.map(|value| value as &(dyn Any + 'static))),
        )
    }

    #[must_use]
    pub fn list<U: Viewable>(self, key: impl Into<String>, values: &'a [U]) -> Self {
        self.with(
            key,
            AdditionalValue::List(
                values
                    .iter()
                    .map(|value| value as &(dyn Any + 'static))
                    .collect(),
            ),
        )
    }

    #[must_use]
    pub fn map<U: Viewable, K: Display>(
        self,
        key: impl Into<String>,
        values: &'a BTreeMap<K, U>,
    ) -> Self {
        self.with(
            key,
            AdditionalValue::Map(
                values
                    .iter()
                    .map(|(key, value)| (key.to_string(), value as &(dyn Any + 'static)))
                    .collect(),
            ),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AdditionalValue<'a>)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn with(mut self, key: impl Into<String>, value: AdditionalValue<'a>) -> Self {
        let key = key.into();

        if let Some(slot) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }

        self
    }
}
