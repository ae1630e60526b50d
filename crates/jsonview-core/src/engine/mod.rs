//! View engine: walks a value (or a json document) under a `ViewSchema`.
//!
//! Work is a synchronous recursive tree walk bounded by document size and
//! schema depth. Everything a call needs (formats, persistence, trace sink)
//! lives on the `ViewSession`, which the caller scopes to one unit of work.

mod additional;
mod deserialize;
mod serialize;


use crate::{
    JsonMap,
    coerce::{CoercionError, FormatContext, json_kind},
    config::{ConfigError, EngineConfig},
    document::SerializedDocument,
    error::ViewError,
    model::ElementType,
    obs::{ViewTraceEvent, ViewTraceSink},
    schema::{ErasedView, ItemPosition, ViewSchema},
    store::{EntityId, PersistenceContext},
    traits::Viewable,
};
use serde_json::Value as JsonValue;
use std::{
    any::Any,
    fmt::{self, Display},
};
use thiserror::Error as ThisError;

// re-exports
pub use additional::{Additional, AdditionalValue};

///
/// ResolutionError
///
/// Identity resolution failures. Fatal for the call; no partial object is
/// returned.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ResolutionError {
    #[error("{type_tag} entity with id {id} not found")]
    NotFound { type_tag: &'static str, id: EntityId },

    #[error("{type_tag} cannot be instantiated")]
    NotInstantiable { type_tag: &'static str },

    #[error("{type_tag} is abstract and the document carries no id")]
    AbstractWithoutId { type_tag: &'static str },

    #[error("{type_tag} entity has an id but no persistence context is attached")]
    NoPersistenceContext { type_tag: &'static str },

    #[error("{type_tag} id must be an integer, found {found}")]
    InvalidId {
        type_tag: &'static str,
        found: String,
    },
}

///
/// ViewSession
///
/// Per-task handle carrying the format context, the caller's persistence
/// context, an optional trace sink and a debug flag.
///

pub struct ViewSession<'p> {
    formats: FormatContext,
    persistence: Option<&'p dyn PersistenceContext>,
    trace: Option<&'p dyn ViewTraceSink>,
    debug: bool,
}

impl<'p> ViewSession<'p> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            formats: FormatContext::new(),
            persistence: None,
            trace: None,
            debug: false,
        }
    }

    /// Build a session from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            formats: FormatContext::from_config(config)?,
            persistence: None,
            trace: None,
            debug: config.debug,
        })
    }

    #[must_use]
    pub fn with_persistence(mut self, persistence: &'p dyn PersistenceContext) -> Self {
        self.persistence = Some(persistence);
        self
    }

    #[must_use]
    pub fn trace_sink(mut self, sink: &'p dyn ViewTraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    #[must_use]
    pub const fn formats(&self) -> &FormatContext {
        &self.formats
    }

    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    /// Bind a schema to this session.
    #[must_use]
    pub const fn view<'s, T: Viewable>(
        &'s self,
        schema: &'s ViewSchema<T>,
    ) -> SessionView<'s, 'p, T> {
        SessionView {
            session: self,
            schema,
        }
    }

    pub(crate) const fn persistence(&self) -> Option<&'p dyn PersistenceContext> {
        self.persistence
    }

    pub(crate) fn trace(&self, event: ViewTraceEvent) {
        if let Some(sink) = self.trace {
            sink.on_event(event);
        }
    }

    pub(crate) fn debug_log(&self, s: impl Into<String>) {
        if self.debug {
            log::debug!("[debug] {}", s.into());
        }
    }
}

impl Default for ViewSession<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ViewSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSession")
            .field("formats", &self.formats)
            .field("persistence", &self.persistence.is_some())
            .field("trace", &self.trace.is_some())
            .field("debug", &self.debug)
            .finish()
    }
}

///
/// SessionView
///
/// A schema bound to a session; the entry point for every view operation.
///

pub struct SessionView<'s, 'p, T: Viewable> {
    session: &'s ViewSession<'p>,
    schema: &'s ViewSchema<T>,
}

impl<T: Viewable> SessionView<'_, '_, T> {
    /// Serialize one value.
    pub fn serialize<'a>(&self, value: &'a T) -> Result<SerializedDocument<'a, T>, ViewError> {
        self.serialize_with(Some(value), &Additional::new())
    }

    /// Serialize one value (or none) followed by out-of-band values.
    pub fn serialize_with<'a>(
        &self,
        value: Option<&'a T>,
        additional: &Additional<'_>,
    ) -> Result<SerializedDocument<'a, T>, ViewError> {
        let object = self.schema.write_object(value, additional, self.session)?;

        Ok(SerializedDocument::new(value, JsonValue::Object(object)))
    }

    /// Serialize a sequence as a json array.
    pub fn serialize_list<'a>(
        &self,
        values: &'a [T],
    ) -> Result<SerializedDocument<'a, [T]>, ViewError> {
        let items = self.schema.write_list(values.iter(), self.session)?;

        Ok(SerializedDocument::new(Some(values), JsonValue::Array(items)))
    }

    /// Serialize a keyed collection as a json object; keys use their text form.
    pub fn serialize_map<'a, M, K>(
        &self,
        values: &'a M,
    ) -> Result<SerializedDocument<'a, M>, ViewError>
    where
        M: ?Sized,
        &'a M: IntoIterator<Item = (&'a K, &'a T)>,
        K: Display + 'a,
    {
        let object = self.schema.write_map(
            values.into_iter().map(|(key, value)| (key.to_string(), value)),
            self.session,
        )?;

        Ok(SerializedDocument::new(Some(values), JsonValue::Object(object)))
    }

    /// Deserialize a root json object.
    pub fn deserialize(&self, raw: &JsonMap) -> Result<T, ViewError> {
        self.schema.read_object(raw, true, self.session)
    }

    /// Deserialize a root json array; every element is a root.
    pub fn deserialize_list(&self, raw: &[JsonValue]) -> Result<Vec<T>, ViewError> {
        self.schema.read_list(raw, true, self.session)
    }

    /// Parse text as a json object, then deserialize it.
    pub fn deserialize_str(&self, text: &str) -> Result<T, ViewError> {
        match serde_json::from_str::<JsonValue>(text)? {
            JsonValue::Object(raw) => self.deserialize(&raw),
            other => Err(unexpected_shape("object", &other)),
        }
    }

    /// Parse text as a json array, then deserialize it.
    pub fn deserialize_list_str(&self, text: &str) -> Result<Vec<T>, ViewError> {
        match serde_json::from_str::<JsonValue>(text)? {
            JsonValue::Array(raw) => self.deserialize_list(&raw),
            other => Err(unexpected_shape("array", &other)),
        }
    }
}

// Serializing needs no persistence, so the schema offers sessionless shortcuts.
impl<T: Viewable> ViewSchema<T> {
    pub fn serialize<'a>(&self, value: &'a T) -> Result<SerializedDocument<'a, T>, ViewError> {
        ViewSession::new().view(self).serialize(value)
    }

    pub fn serialize_list<'a>(
        &self,
        values: &'a [T],
    ) -> Result<SerializedDocument<'a, [T]>, ViewError> {
        ViewSession::new().view(self).serialize_list(values)
    }

    pub fn serialize_map<'a, M, K>(
        &self,
        values: &'a M,
    ) -> Result<SerializedDocument<'a, M>, ViewError>
    where
        M: ?Sized,
        &'a M: IntoIterator<Item = (&'a K, &'a T)>,
        K: Display + 'a,
    {
        ViewSession::new().view(self).serialize_map(values)
    }
}

impl<T: Viewable> ErasedView for ViewSchema<T> {
    fn type_tag(&self) -> &'static str {
        T::TYPE_TAG
    }

    fn value_type(&self) -> ElementType {
        ElementType::of::<T>()
    }

    fn serialize_item(
        &self,
        value: &dyn Any,
        position: ItemPosition,
        session: &ViewSession<'_>,
    ) -> Result<JsonValue, ViewError> {
        self.write_item(self.downcast_item(value)?, position, session)
    }

    fn deserialize_object(
        &self,
        raw: &JsonMap,
        root: bool,
        session: &ViewSession<'_>,
    ) -> Result<Box<dyn Any>, ViewError> {
        let value = self.read_object(raw, root, session)?;

        Ok(Box::new(value))
    }

    fn deserialize_element(
        &self,
        raw: &JsonValue,
        root: bool,
        session: &ViewSession<'_>,
    ) -> Result<Box<dyn Any>, ViewError> {
        let value = self.read_element(raw, root, session)?;

        Ok(Box::new(value))
    }
}

pub(crate) fn unexpected_shape(expected: &'static str, found: &JsonValue) -> ViewError {
    CoercionError::UnexpectedShape {
        expected,
        found: json_kind(found),
    }
    .into()
}
