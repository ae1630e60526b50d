use crate::{model::FieldTable, traits::Viewable};
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

type TableCache = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

static CACHE: OnceLock<Mutex<TableCache>> = OnceLock::new();

impl<T: Viewable> FieldTable<T> {
    /// Shared accessor table for `T`, described on first use.
    #[must_use]
    pub fn of() -> Arc<Self> {
        let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

        // Phase 1: cached lookup.
        if let Some(table) = lookup::<T>(cache) {
            return table;
        }

        // Phase 2: describe outside the lock; `describe` may ask for other tables.
        let table = Arc::new(Self::describe());
        log::debug!(
            "described {} with {} field(s)",
            table.type_tag(),
            table.len()
        );

        // Phase 3: first writer wins so every caller shares one table.
        let mut guard = cache.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = guard
            .entry(TypeId::of::<T>())
            .or_insert_with(|| table.clone() as Arc<dyn Any + Send + Sync>)
            .clone();
        drop(guard);

        entry.downcast::<Self>().unwrap_or(table)
    }
}

fn lookup<T: Viewable>(cache: &Mutex<TableCache>) -> Option<Arc<FieldTable<T>>> {
    let guard = cache.lock().unwrap_or_else(PoisonError::into_inner);
    let entry = guard.get(&TypeId::of::<T>())?.clone();
    drop(guard);

    entry.downcast::<FieldTable<T>>().ok()
}
