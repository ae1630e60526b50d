//! Persistence collaborator used to resolve entity-identified types.

use std::{
    any::Any,
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    fmt,
};

/// External identifier of an entity; read from the `id` key.
pub type EntityId = i64;

///
/// PersistenceContext
///
/// Caller-scoped unit of work (request or transaction). The engine borrows it
/// for one call and never stores it.
///

pub trait PersistenceContext {
    /// Load an instance by type tag and id, or `None` when no row matches.
    fn find_by_id(&self, type_tag: &'static str, id: EntityId) -> Option<Box<dyn Any>>;

    /// Stop tracking the instance so later writes are not persisted implicitly.
    fn detach(&self, type_tag: &'static str, id: EntityId);
}

///
/// StoredRow
///

trait StoredRow {
    fn clone_row(&self) -> Box<dyn Any>;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Clone> StoredRow for T {
    fn clone_row(&self) -> Box<dyn Any> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

type RowKey = (&'static str, EntityId);

///
/// InMemoryStore
///
/// Reference persistence context. Loading a row marks it managed; `detach`
/// clears the mark.
///

#[derive(Default)]
pub struct InMemoryStore {
    rows: RefCell<BTreeMap<RowKey, Box<dyn StoredRow>>>,
    managed: RefCell<BTreeSet<RowKey>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a row.
    pub fn insert<T: Any + Clone>(&self, type_tag: &'static str, id: EntityId, row: T) {
        self.rows.borrow_mut().insert((type_tag, id), Box::new(row));
    }

    /// Typed copy of a stored row.
    #[must_use]
    pub fn find<T: Any + Clone>(&self, type_tag: &'static str, id: EntityId) -> Option<T> {
        self.rows
            .borrow()
            .get(&(type_tag, id))
            .and_then(|row| (**row).as_any().downcast_ref::<T>())
            .cloned()
    }

    /// Typed copies of every row stored under `type_tag`, in id order.
    #[must_use]
    pub fn find_all<T: Any + Clone>(&self, type_tag: &'static str) -> Vec<T> {
        self.rows
            .borrow()
            .iter()
            .filter(|((tag, _), _)| *tag == type_tag)
            .filter_map(|(_, row)| (**row).as_any().downcast_ref::<T>().cloned())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    /// Whether the row was loaded and not detached since.
    #[must_use]
    pub fn is_managed(&self, type_tag: &'static str, id: EntityId) -> bool {
        self.managed.borrow().contains(&(type_tag, id))
    }
}

impl PersistenceContext for InMemoryStore {
    fn find_by_id(&self, type_tag: &'static str, id: EntityId) -> Option<Box<dyn Any>> {
        let row = (**self.rows.borrow().get(&(type_tag, id))?).clone_row();
        self.managed.borrow_mut().insert((type_tag, id));

        Some(row)
    }

    fn detach(&self, type_tag: &'static str, id: EntityId) {
        self.managed.borrow_mut().remove(&(type_tag, id));
    }
}

impl fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("rows", &self.rows.borrow().keys().collect::<Vec<_>>())
            .field("managed", &self.managed.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        name: String,
    }

    fn row(name: &str) -> Row {
        Row {
            name: name.to_string(),
        }
    }

    #[test]
    fn find_by_id_returns_a_copy_and_marks_it_managed() {
        let store = InMemoryStore::new();
        store.insert("Row", 7, row("seven"));

        let loaded = store.find_by_id("Row", 7).expect("row 7 should exist");

        assert_eq!(loaded.downcast_ref::<Row>(), Some(&row("seven")));
        assert!(store.is_managed("Row", 7));
    }

    #[test]
    fn find_by_id_misses_on_unknown_id_or_tag() {
        let store = InMemoryStore::new();
        store.insert("Row", 7, row("seven"));

        assert!(store.find_by_id("Row", 999).is_none());
        assert!(store.find_by_id("Other", 7).is_none());
        assert!(!store.is_managed("Row", 999));
    }

    #[test]
    fn detach_clears_tracking_state() {
        let store = InMemoryStore::new();
        store.insert("Row", 1, row("one"));
        let _ = store.find_by_id("Row", 1);

        store.detach("Row", 1);

        assert!(!store.is_managed("Row", 1));
    }

    #[test]
    fn find_all_filters_by_tag_in_id_order() {
        let store = InMemoryStore::new();
        store.insert("Row", 2, row("two"));
        store.insert("Row", 1, row("one"));
        store.insert("Other", 3, row("three"));

        let rows: Vec<Row> = store.find_all("Row");

        assert_eq!(rows, vec![row("one"), row("two")]);
        assert_eq!(store.len(), 3);
        assert!(!store.is_empty());
    }

    #[test]
    fn loaded_copies_do_not_alias_the_stored_row() {
        let store = InMemoryStore::new();
        store.insert("Row", 1, row("one"));

        let mut loaded = store.find::<Row>("Row", 1).expect("row 1 should exist");
        loaded.name = "changed".to_string();

        assert_eq!(store.find::<Row>("Row", 1), Some(row("one")));
    }
}
