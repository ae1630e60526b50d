//! View schemas: immutable per-type projections built through `ViewBuilder`.
//!
//! A schema decides which simple fields are visible, which compound fields
//! bind to nested schemas, and which out-of-band values may be attached at
//! call time. Every builder call validates eagerly, so a schema that builds is
//! a schema that can be used.

mod erased;

#[cfg(test)]
mod tests;

use crate::{
    model::{FieldDescriptor, FieldTable},
    traits::{Identity, Viewable},
};
use std::{any::TypeId, collections::BTreeSet, fmt, sync::Arc};
use thiserror::Error as ThisError;

// re-exports
pub use erased::{ErasedView, ItemPosition};

///
/// SchemaError
///
/// Configuration failures raised while building or registering schemas.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("{type_tag} has no field '{field}'")]
    UnknownField {
        type_tag: &'static str,
        field: String,
    },

    #[error("field '{field}' on {type_tag} is not a simple type")]
    NotSimple {
        type_tag: &'static str,
        field: String,
    },

    #[error("field '{field}' on {type_tag} holds {expected}, not {found}")]
    NestedTypeMismatch {
        type_tag: &'static str,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown additional value '{key}' for {type_tag}")]
    UnknownAdditional { type_tag: &'static str, key: String },

    #[error("view for {type_tag} already registered")]
    DuplicateDispatch { type_tag: &'static str },

    #[error("no view registered for {type_tag}")]
    NoDispatch { type_tag: &'static str },
}

///
/// ViewSchema
///
/// Frozen view over `T`. Immutable after `build`, `Send + Sync`, and safe to
/// share from a static.
///

pub struct ViewSchema<T: Viewable> {
    table: Arc<FieldTable<T>>,
    default_exclude: bool,
    detach: bool,
    force_entity_propagation: bool,
    show_date_time: bool,
    include: Vec<&'static str>,
    exclude: BTreeSet<&'static str>,
    nested: Vec<(&'static str, Arc<dyn ErasedView>)>,
    additional: Vec<(String, Arc<dyn ErasedView>)>,
}

impl<T: Viewable> ViewSchema<T> {
    #[must_use]
    pub fn builder() -> ViewBuilder<T> {
        ViewBuilder::new()
    }

    #[must_use]
    pub fn fields(&self) -> &FieldTable<T> {
        &self.table
    }

    /// Simple fields in emission order.
    ///
    /// With `default_exclude` only included fields are visible, in include
    /// order. Otherwise every simple field not excluded is visible, in
    /// declaration order. Fields bound to a nested schema are never listed here.
    pub fn visible_simple_fields(&self) -> Box<dyn Iterator<Item = &FieldDescriptor<T>> + '_> {
        if self.default_exclude {
            Box::new(
                self.include
                    .iter()
                    .filter_map(|name| self.table.get(name))
                    .filter(|field| !self.is_nested(field.name())),
            )
        } else {
            Box::new(self.table.iter().filter(|field| {
                field.is_simple()
                    && !self.exclude.contains(field.name())
                    && !self.is_nested(field.name())
            }))
        }
    }

    /// Nested bindings in registration order.
    pub fn nested_bindings(&self) -> impl Iterator<Item = (&'static str, &dyn ErasedView)> {
        self.nested.iter().map(|(name, view)| (*name, view.as_ref()))
    }

    #[must_use]
    pub fn additional_binding(&self, key: &str) -> Option<&dyn ErasedView> {
        self.additional
            .iter()
            .find(|(registered, _)| registered == key)
            .map(|(_, view)| view.as_ref())
    }

    #[must_use]
    pub const fn is_entity_identified(&self) -> bool {
        matches!(T::IDENTITY, Identity::Entity)
    }

    #[must_use]
    pub const fn detach_on_load(&self) -> bool {
        self.detach
    }

    #[must_use]
    pub const fn propagates_into_loaded_entity(&self) -> bool {
        self.force_entity_propagation
    }

    #[must_use]
    pub const fn shows_time_of_day(&self) -> bool {
        self.show_date_time
    }

    #[must_use]
    pub const fn is_default_exclude(&self) -> bool {
        self.default_exclude
    }

    fn is_nested(&self, name: &str) -> bool {
        self.nested.iter().any(|(nested, _)| *nested == name)
    }
}

impl<T: Viewable> fmt::Debug for ViewSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSchema")
            .field("type_tag", &T::TYPE_TAG)
            .field("default_exclude", &self.default_exclude)
            .field("detach", &self.detach)
            .field("force_entity_propagation", &self.force_entity_propagation)
            .field("show_date_time", &self.show_date_time)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field(
                "nested",
                &self.nested.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
            )
            .field(
                "additional",
                &self
                    .additional
                    .iter()
                    .map(|(key, _)| key.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

///
/// ViewBuilder
///
/// Mutable configuration phase of a `ViewSchema`.
/// Nested builders are moved into their parent, so a schema graph is always a
/// tree and cannot contain a cycle.
///

pub struct ViewBuilder<T: Viewable> {
    table: Arc<FieldTable<T>>,
    default_exclude: bool,
    detach: bool,
    force_entity_propagation: bool,
    show_date_time: bool,
    include: Vec<&'static str>,
    exclude: BTreeSet<&'static str>,
    nested: Vec<(&'static str, Box<dyn ErasedBuilder>)>,
    additional: Vec<(String, Box<dyn ErasedBuilder>)>,
}

impl<T: Viewable> ViewBuilder<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: FieldTable::<T>::of(),
            default_exclude: false,
            detach: true,
            force_entity_propagation: false,
            show_date_time: false,
            include: Vec::new(),
            exclude: BTreeSet::new(),
            nested: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// Hide simple fields unless explicitly included.
    #[must_use]
    pub fn default_exclude(mut self) -> Self {
        self.default_exclude = true;
        self
    }

    /// Apply field writes to entities loaded below the document root.
    #[must_use]
    pub fn force_entity_propagation(mut self) -> Self {
        self.force_entity_propagation = true;
        self
    }

    /// Render dates with their time of day.
    #[must_use]
    pub fn show_date_time(mut self) -> Self {
        self.show_date_time = true;
        self
    }

    /// Detach loaded entities from the persistence context (default: true).
    #[must_use]
    pub fn set_detach(mut self, detach: bool) -> Self {
        self.detach = detach;
        self
    }

    /// Include simple fields. Only meaningful together with `default_exclude`.
    pub fn include(mut self, names: &[&str]) -> Result<Self, SchemaError> {
        for name in names {
            let field = self.field(name)?;
            if !field.is_simple() {
                return Err(SchemaError::NotSimple {
                    type_tag: T::TYPE_TAG,
                    field: (*name).to_string(),
                });
            }

            let name = field.name();
            if !self.include.contains(&name) {
                self.include.push(name);
            }
        }

        Ok(self)
    }

    /// Exclude fields from the default-visible set.
    pub fn exclude(mut self, names: &[&str]) -> Result<Self, SchemaError> {
        for name in names {
            let name = self.field(name)?.name();
            self.exclude.insert(name);
        }

        Ok(self)
    }

    /// Bind a field to a nested schema.
    /// Compound fields must hold `U`; simple fields are accepted as they are.
    pub fn include_nested<U: Viewable>(
        mut self,
        name: &str,
        nested: ViewBuilder<U>,
    ) -> Result<Self, SchemaError> {
        let field = self.field(name)?;
        let name = field.name();

        if let Some(element) = field.shape().element()
            && element.id != TypeId::of::<U>()
        {
            return Err(SchemaError::NestedTypeMismatch {
                type_tag: T::TYPE_TAG,
                field: name,
                expected: element.tag,
                found: U::TYPE_TAG,
            });
        }

        let nested: Box<dyn ErasedBuilder> = Box::new(nested);
        if let Some(slot) = self.nested.iter_mut().find(|(bound, _)| *bound == name) {
            slot.1 = nested;
        } else {
            self.nested.push((name, nested));
        }

        Ok(self)
    }

    /// Register a schema for an out-of-band value attached at call time.
    #[must_use]
    pub fn include_additional<U: Viewable>(
        mut self,
        key: impl Into<String>,
        nested: ViewBuilder<U>,
    ) -> Self {
        let key = key.into();
        let nested: Box<dyn ErasedBuilder> = Box::new(nested);

        if let Some(slot) = self.additional.iter_mut().find(|(bound, _)| *bound == key) {
            slot.1 = nested;
        } else {
            self.additional.push((key, nested));
        }

        self
    }

    /// Freeze the configuration, building nested schemas depth-first.
    #[must_use]
    pub fn build(self) -> ViewSchema<T> {
        ViewSchema {
            table: self.table,
            default_exclude: self.default_exclude,
            detach: self.detach,
            force_entity_propagation: self.force_entity_propagation,
            show_date_time: self.show_date_time,
            include: self.include,
            exclude: self.exclude,
            nested: self
                .nested
                .into_iter()
                .map(|(name, nested)| (name, nested.build()))
                .collect(),
            additional: self
                .additional
                .into_iter()
                .map(|(key, nested)| (key, nested.build()))
                .collect(),
        }
    }

    fn field(&self, name: &str) -> Result<&FieldDescriptor<T>, SchemaError> {
        self.table.get(name).ok_or_else(|| SchemaError::UnknownField {
            type_tag: T::TYPE_TAG,
            field: name.to_string(),
        })
    }
}

impl<T: Viewable> fmt::Debug for ViewBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewBuilder")
            .field("type_tag", &T::TYPE_TAG)
            .field("default_exclude", &self.default_exclude)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field(
                "nested",
                &self.nested.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl<T: Viewable> Default for ViewBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

///
/// ErasedBuilder
///

trait ErasedBuilder {
    fn build(self: Box<Self>) -> Arc<dyn ErasedView>;
}

impl<T: Viewable> ErasedBuilder for ViewBuilder<T> {
    fn build(self: Box<Self>) -> Arc<dyn ErasedView> {
        Arc::new((*self).build())
    }
}
