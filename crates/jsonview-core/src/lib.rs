//! Core runtime for jsonview: schema-driven projection of domain values to and
//! from json documents, with entity resolution through a caller-supplied
//! persistence context.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod coerce;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod engine;
pub mod error;
pub mod model;
pub mod obs;
pub mod schema;
pub mod store;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Document key that carries an entity's identifier.
pub const ID_FIELD: &str = "id";

/// Json object as produced and consumed by the engine (insertion ordered).
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

///
/// Prelude
///
/// Vocabulary needed to declare viewable types and run view operations.
///

pub mod prelude {
    pub use crate::{
        JsonMap,
        config::EngineConfig,
        dispatch::MultiTypeView,
        document::SerializedDocument,
        engine::{Additional, ViewSession},
        error::{ErrorClass, ViewError},
        model::FieldTable,
        schema::{ViewBuilder, ViewSchema},
        store::{EntityId, InMemoryStore, PersistenceContext},
        traits::{Identity, Tagged, Viewable},
        value::{SimpleValue as _, ViewEnum as _},
    };
}
