//! Multi-type dispatch: serialize keyed collections whose values have
//! different concrete types, picking each value's schema by its type tag.

use crate::{
    JsonMap,
    document::SerializedDocument,
    engine::ViewSession,
    error::ViewError,
    schema::{ErasedView, ItemPosition, SchemaError, ViewSchema},
    traits::{Tagged, Viewable},
};
use serde_json::Value as JsonValue;
use std::{
    collections::HashMap,
    fmt::{self, Display},
    sync::Arc,
};

///
/// MultiTypeView
///
/// Dispatch table from type tag to schema. One explicit registration per
/// concrete type; an unregistered tag is a configuration error.
///

pub struct MultiTypeView {
    views: HashMap<&'static str, Arc<dyn ErasedView>>,
}

impl MultiTypeView {
    #[must_use]
    pub fn builder() -> MultiTypeViewBuilder {
        MultiTypeViewBuilder::default()
    }

    #[must_use]
    pub fn get(&self, type_tag: &str) -> Option<&dyn ErasedView> {
        self.views.get(type_tag).map(AsRef::as_ref)
    }

    /// Serialize every value with the schema registered for its tag.
    pub fn serialize<'a, M, K, V>(
        &self,
        session: &ViewSession<'_>,
        values: &'a M,
    ) -> Result<SerializedDocument<'a, M>, ViewError>
    where
        M: ?Sized,
        &'a M: IntoIterator<Item = (&'a K, &'a V)>,
        K: Display + 'a,
        V: Tagged + 'a,
    {
        let mut out = JsonMap::new();

        for (key, value) in values {
            let key = key.to_string();
            let type_tag = value.type_tag();
            let Some(view) = self.get(type_tag) else {
                return Err(ViewError::from(SchemaError::NoDispatch { type_tag }).with_field(&key));
            };

            let json = view
                .serialize_item(value.as_any(), ItemPosition::MapValue, session)
                .map_err(|err| err.with_field(&key))?;
            out.insert(key, json);
        }

        Ok(SerializedDocument::new(Some(values), JsonValue::Object(out)))
    }

    /// `serialize` with a default session.
    pub fn serialize_default<'a, M, K, V>(
        &self,
        values: &'a M,
    ) -> Result<SerializedDocument<'a, M>, ViewError>
    where
        M: ?Sized,
        &'a M: IntoIterator<Item = (&'a K, &'a V)>,
        K: Display + 'a,
        V: Tagged + 'a,
    {
        self.serialize(&ViewSession::new(), values)
    }
}

impl fmt::Debug for MultiTypeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.views.keys().collect();
        tags.sort();

        f.debug_struct("MultiTypeView").field("tags", &tags).finish()
    }
}

///
/// MultiTypeViewBuilder
///

#[derive(Default)]
pub struct MultiTypeViewBuilder {
    views: HashMap<&'static str, Arc<dyn ErasedView>>,
}

impl MultiTypeViewBuilder {
    /// Register the schema for `T`; each tag may be registered once.
    pub fn register<T: Viewable>(mut self, schema: ViewSchema<T>) -> Result<Self, SchemaError> {
        if self.views.contains_key(T::TYPE_TAG) {
            return Err(SchemaError::DuplicateDispatch {
                type_tag: T::TYPE_TAG,
            });
        }
        self.views.insert(T::TYPE_TAG, Arc::new(schema));

        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> MultiTypeView {
        MultiTypeView { views: self.views }
    }
}

impl fmt::Debug for MultiTypeViewBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiTypeViewBuilder")
            .field("registered", &self.views.len())
            .finish()
    }
}
