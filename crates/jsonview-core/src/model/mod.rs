//! Field descriptor tables: the explicit accessor registry each domain type
//! declares through `Viewable::describe`.

mod field;
mod registry;


// re-exports
pub use field::{ElementType, FieldDescriptor, FieldRead, FieldShape, FieldTable, FieldWrite};
