//! ## Crate layout
//! - `core`: field tables, view schemas, the view engine, coercion rules,
//!   multi-type dispatch, and the persistence collaborator.
//!
//! The `prelude` module carries what application code needs to declare
//! viewable types and to serialize or deserialize them.

pub use jsonview_core as core;

/// re-exports
///
/// domain types name these in their fields; re-exporting them keeps the
/// versions in step with the engine
pub mod __reexports {
    pub use rust_decimal;
    pub use serde_json;
    pub use time;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Macros
//

pub use jsonview_core::view_enum;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::view_enum;
    pub use jsonview_core::prelude::*;
    pub use serde_json::{Value as JsonValue, json};
}
