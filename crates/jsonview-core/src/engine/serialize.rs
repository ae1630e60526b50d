use crate::{
    JsonMap,
    coerce::{render, render_text},
    engine::{Additional, AdditionalValue, ViewSession},
    error::{AccessError, ViewError},
    model::FieldRead,
    obs::ViewTraceEvent,
    schema::{ErasedView, ItemPosition, SchemaError, ViewSchema},
    traits::Viewable,
};
use serde_json::Value as JsonValue;
use std::any::Any;

impl<T: Viewable> ViewSchema<T> {
    /// Build the json object for one value.
    ///
    /// Emission order: visible simple fields, then nested bindings, then
    /// additional values. Absent values are omitted, never written as null.
    pub(crate) fn write_object(
        &self,
        value: Option<&T>,
        additional: &Additional<'_>,
        session: &ViewSession<'_>,
    ) -> Result<JsonMap, ViewError> {
        let mut out = JsonMap::new();
        let show_time = self.shows_time_of_day();

        if let Some(value) = value {
            // Phase 1: simple fields.
            for field in self.visible_simple_fields() {
                let Some(FieldRead::Simple(Some(scalar))) = field.read(value) else {
                    continue;
                };
                let json = render(&scalar, show_time, session.formats())
                    .map_err(|err| ViewError::from(err).with_field(field.name()))?;

                out.insert(field.name().to_string(), json);
            }

            // Phase 2: nested bindings.
            for (name, view) in self.nested_bindings() {
                let Some(read) = self.fields().get(name).and_then(|field| field.read(value))
                else {
                    continue;
                };

                if let Some(json) = write_read(read, view, show_time, session)
                    .map_err(|err| err.with_field(name))?
                {
                    out.insert(name.to_string(), json);
                }
            }
        }

        // Phase 3: additional values.
        for (key, entry) in additional.iter() {
            let read = match entry {
                AdditionalValue::Json(json) => {
                    out.insert(key.to_string(), json.clone());
                    continue;
                }
                AdditionalValue::Simple(scalar) => FieldRead::Simple(scalar.clone()),
                AdditionalValue::Object(item) => FieldRead::Object(*item),
                AdditionalValue::List(items) => FieldRead::List(items.clone()),
                AdditionalValue::Map(entries) => FieldRead::Map(entries.clone()),
            };

            let view = self
                .additional_binding(key)
                .ok_or_else(|| SchemaError::UnknownAdditional {
                    type_tag: T::TYPE_TAG,
                    key: key.to_string(),
                })?;

            if let Some(json) =
                write_read(read, view, show_time, session).map_err(|err| err.with_field(key))?
            {
                out.insert(key.to_string(), json);
            }
        }

        session.debug_log(format!("serialized {} ({} keys)", T::TYPE_TAG, out.len()));
        session.trace(ViewTraceEvent::Serialized {
            type_tag: T::TYPE_TAG,
            keys: out.len(),
        });

        Ok(out)
    }

    pub(crate) fn write_list<'a>(
        &self,
        values: impl Iterator<Item = &'a T>,
        session: &ViewSession<'_>,
    ) -> Result<Vec<JsonValue>, ViewError> {
        values
            .enumerate()
            .map(|(index, value)| {
                self.write_item(value, ItemPosition::ListElement, session)
                    .map_err(|err| err.with_index(index))
            })
            .collect()
    }

    pub(crate) fn write_map<'a>(
        &self,
        entries: impl Iterator<Item = (String, &'a T)>,
        session: &ViewSession<'_>,
    ) -> Result<JsonMap, ViewError> {
        let mut out = JsonMap::new();

        for (key, value) in entries {
            let json = self
                .write_item(value, ItemPosition::MapValue, session)
                .map_err(|err| err.with_field(&key))?;
            out.insert(key, json);
        }

        Ok(out)
    }

    // Simple wrappers render as scalars (text inside lists); the rest as objects.
    pub(crate) fn write_item(
        &self,
        value: &T,
        position: ItemPosition,
        session: &ViewSession<'_>,
    ) -> Result<JsonValue, ViewError> {
        if let Some(scalar) = value.as_simple() {
            let show_time = self.shows_time_of_day();
            let json = match position {
                ItemPosition::ListElement => {
                    render_text(&scalar, show_time, session.formats()).map(JsonValue::String)
                }
                _ => render(&scalar, show_time, session.formats()),
            };

            return json.map_err(ViewError::from);
        }

        self.write_object(Some(value), &Additional::new(), session)
            .map(JsonValue::Object)
    }

    pub(crate) fn downcast_item<'v>(&self, value: &'v dyn Any) -> Result<&'v T, ViewError> {
        value.downcast_ref::<T>().ok_or_else(|| {
            AccessError::new(T::TYPE_TAG, "value handed to the view has a different type").into()
        })
    }
}

// Convert one getter result with the nested view bound to it.
fn write_read(
    read: FieldRead<'_>,
    view: &dyn ErasedView,
    show_time: bool,
    session: &ViewSession<'_>,
) -> Result<Option<JsonValue>, ViewError> {
    let json = match read {
        FieldRead::Simple(None) | FieldRead::Object(None) => return Ok(None),
        FieldRead::Simple(Some(scalar)) => render(&scalar, show_time, session.formats())?,
        FieldRead::Object(Some(item)) => view.serialize_item(item, ItemPosition::Field, session)?,
        FieldRead::List(items) => JsonValue::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    view.serialize_item(item, ItemPosition::ListElement, session)
                        .map_err(|err| err.with_index(index))
                })
                .collect::<Result<_, _>>()?,
        ),
        FieldRead::Map(entries) => {
            let mut out = JsonMap::new();
            for (key, item) in entries {
                let json = view
                    .serialize_item(item, ItemPosition::MapValue, session)
                    .map_err(|err| err.with_field(&key))?;
                out.insert(key, json);
            }

            JsonValue::Object(out)
        }
    };

    Ok(Some(json))
}
