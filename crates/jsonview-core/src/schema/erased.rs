use crate::{JsonMap, engine::ViewSession, error::ViewError, model::ElementType};
use serde_json::Value as JsonValue;
use std::any::Any;

///
/// ItemPosition
///
/// Where a value sits in the document; decides how a simple value renders.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ItemPosition {
    Root,
    Field,
    ListElement,
    MapValue,
}

///
/// ErasedView
///
/// Type-erased schema, as held by a parent schema or a dispatch table.
/// Values cross this boundary as `dyn Any` and are downcast to the schema's
/// own type.
///

pub trait ErasedView: Send + Sync {
    fn type_tag(&self) -> &'static str;

    fn value_type(&self) -> ElementType;

    /// Serialize one value of the schema's type.
    fn serialize_item(
        &self,
        value: &dyn Any,
        position: ItemPosition,
        session: &ViewSession<'_>,
    ) -> Result<JsonValue, ViewError>;

    /// Deserialize a json object into a fresh or resolved instance.
    fn deserialize_object(
        &self,
        raw: &JsonMap,
        root: bool,
        session: &ViewSession<'_>,
    ) -> Result<Box<dyn Any>, ViewError>;

    /// Deserialize one array element: strings go through the simple form,
    /// objects recurse.
    fn deserialize_element(
        &self,
        raw: &JsonValue,
        root: bool,
        session: &ViewSession<'_>,
    ) -> Result<Box<dyn Any>, ViewError>;
}
