use crate::{
    ID_FIELD, JsonMap,
    coerce::{CoercionError, coerce},
    engine::{ResolutionError, ViewSession, unexpected_shape},
    error::{AccessError, ViewError},
    model::{FieldShape, FieldWrite},
    obs::ViewTraceEvent,
    schema::{ErasedView, ViewSchema},
    store::EntityId,
    traits::Viewable,
};
use serde_json::Value as JsonValue;

///
/// Resolved
///
/// Outcome of the identity step. A `Kept` entity is returned as loaded, with
/// every field write in the document discarded.
///

enum Resolved<T> {
    Fresh(T),
    Loaded(T),
    Kept(T),
}

impl<T: Viewable> ViewSchema<T> {
    /// Deserialize one json object. Deserialization is a partial patch: keys
    /// absent from the document leave the target's fields untouched.
    pub(crate) fn read_object(
        &self,
        raw: &JsonMap,
        root: bool,
        session: &ViewSession<'_>,
    ) -> Result<T, ViewError> {
        // Phase 1: instantiate, or resolve the entity by id.
        let mut target = match self.resolve(raw, root, session)? {
            Resolved::Fresh(value) | Resolved::Loaded(value) => value,
            Resolved::Kept(value) => return Ok(value),
        };

        // Phase 2: simple fields.
        for field in self.visible_simple_fields() {
            let FieldShape::Simple(target_type) = field.shape() else {
                continue;
            };
            let Some(json) = raw.get(field.name()) else {
                continue;
            };
            if !field.is_writable() {
                continue;
            }

            let scalar = coerce(json, target_type, session.formats())
                .map_err(|err| ViewError::from(err).with_field(field.name()))?;
            field
                .write(&mut target, FieldWrite::Simple(scalar))
                .map_err(|err| err.with_field(field.name()))?;
        }

        // Phase 3: nested bindings.
        for (name, view) in self.nested_bindings() {
            let (Some(field), Some(json)) = (self.fields().get(name), raw.get(name)) else {
                continue;
            };
            if !field.is_writable() {
                continue;
            }

            let write = read_nested(field.shape(), json, view, session)
                .map_err(|err| err.with_field(name))?;
            field
                .write(&mut target, write)
                .map_err(|err| err.with_field(name))?;
        }

        session.trace(ViewTraceEvent::Deserialized {
            type_tag: T::TYPE_TAG,
            root,
        });

        Ok(target)
    }

    /// Deserialize a json array element by element.
    pub(crate) fn read_list(
        &self,
        raw: &[JsonValue],
        root: bool,
        session: &ViewSession<'_>,
    ) -> Result<Vec<T>, ViewError> {
        raw.iter()
            .enumerate()
            .map(|(index, item)| {
                self.read_element(item, root, session)
                    .map_err(|err| err.with_index(index))
            })
            .collect()
    }

    // Strings (and other scalars) use the simple form; objects recurse.
    pub(crate) fn read_element(
        &self,
        raw: &JsonValue,
        root: bool,
        session: &ViewSession<'_>,
    ) -> Result<T, ViewError> {
        match raw {
            JsonValue::String(text) => Ok(T::from_simple(text)?),
            JsonValue::Number(_) | JsonValue::Bool(_) => Ok(T::from_simple(&raw.to_string())?),
            JsonValue::Object(object) => self.read_object(object, root, session),
            JsonValue::Null | JsonValue::Array(_) => Err(unexpected_shape("object", raw)),
        }
    }

    fn resolve(
        &self,
        raw: &JsonMap,
        root: bool,
        session: &ViewSession<'_>,
    ) -> Result<Resolved<T>, ViewError> {
        if !self.is_entity_identified() {
            if let Some(created) = T::create_from_document(raw) {
                return created.map(Resolved::Fresh);
            }

            return T::instantiate().map(Resolved::Fresh).ok_or_else(|| {
                ResolutionError::NotInstantiable {
                    type_tag: T::TYPE_TAG,
                }
                .into()
            });
        }

        // No id: a new entity, unless the type is abstract.
        let id = match raw.get(ID_FIELD) {
            None | Some(JsonValue::Null) => {
                let value = T::instantiate().ok_or(ResolutionError::AbstractWithoutId {
                    type_tag: T::TYPE_TAG,
                })?;
                session.trace(ViewTraceEvent::EntityCreated {
                    type_tag: T::TYPE_TAG,
                });

                return Ok(Resolved::Fresh(value));
            }
            Some(json) => entity_id::<T>(json)?,
        };

        let persistence = session
            .persistence()
            .ok_or(ResolutionError::NoPersistenceContext {
                type_tag: T::TYPE_TAG,
            })?;
        let loaded = persistence
            .find_by_id(T::TYPE_TAG, id)
            .ok_or(ResolutionError::NotFound {
                type_tag: T::TYPE_TAG,
                id,
            })?;
        let value = loaded.downcast::<T>().map(|value| *value).map_err(|_| {
            AccessError::new(
                T::TYPE_TAG,
                format!("persistence returned another type for id {id}"),
            )
        })?;

        let detached = self.detach_on_load();
        if detached {
            persistence.detach(T::TYPE_TAG, id);
        }

        // Below the root, a referenced entity is only a selection.
        let short_circuit = !root && !self.propagates_into_loaded_entity();

        session.debug_log(format!(
            "loaded {} {id} (detached={detached}, short_circuit={short_circuit})",
            T::TYPE_TAG
        ));
        session.trace(ViewTraceEvent::EntityLoaded {
            type_tag: T::TYPE_TAG,
            id,
            detached,
            short_circuit,
        });

        Ok(if short_circuit {
            Resolved::Kept(value)
        } else {
            Resolved::Loaded(value)
        })
    }
}

fn entity_id<T: Viewable>(json: &JsonValue) -> Result<EntityId, ResolutionError> {
    json.as_i64().ok_or_else(|| ResolutionError::InvalidId {
        type_tag: T::TYPE_TAG,
        found: json.to_string(),
    })
}

// Build the setter argument for a nested binding.
fn read_nested(
    shape: FieldShape,
    json: &JsonValue,
    view: &dyn ErasedView,
    session: &ViewSession<'_>,
) -> Result<FieldWrite, ViewError> {
    let write = match (shape, json) {
        (FieldShape::Simple(target), _) => {
            FieldWrite::Simple(coerce(json, target, session.formats())?)
        }

        // null clears; rust collections have no null, so they become empty
        (FieldShape::Object(_), JsonValue::Null) => FieldWrite::Object(None),
        (FieldShape::List(_), JsonValue::Null) => FieldWrite::List(Vec::new()),
        (FieldShape::Map(_), JsonValue::Null) => FieldWrite::Map(Vec::new()),

        (FieldShape::List(_), JsonValue::Array(items)) => FieldWrite::List(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    view.deserialize_element(item, false, session)
                        .map_err(|err| err.with_index(index))
                })
                .collect::<Result<_, _>>()?,
        ),
        (FieldShape::List(_), other) => return Err(unexpected_shape("array", other)),

        // a blank string stands for null; any other string is an error
        (FieldShape::Object(_), JsonValue::String(text)) if text.trim().is_empty() => {
            FieldWrite::Object(None)
        }
        (FieldShape::Map(_), JsonValue::String(text)) if text.trim().is_empty() => {
            FieldWrite::Map(Vec::new())
        }
        (_, JsonValue::String(text)) => {
            return Err(CoercionError::NotAnObject { text: text.clone() }.into());
        }

        (FieldShape::Object(_), JsonValue::Object(object)) => {
            FieldWrite::Object(Some(view.deserialize_object(object, false, session)?))
        }
        (FieldShape::Map(_), JsonValue::Object(object)) => FieldWrite::Map(
            object
                .iter()
                .map(|(key, item)| {
                    view.deserialize_element(item, false, session)
                        .map(|value| (key.clone(), value))
                        .map_err(|err| err.with_field(key))
                })
                .collect::<Result<_, _>>()?,
        ),
        (_, other) => return Err(unexpected_shape("object", other)),
    };

    Ok(write)
}
