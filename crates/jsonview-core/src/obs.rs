//! Observability boundary for view operations.
//!
//! Sinks are injected per session and only observe; they never change what a
//! serialize or deserialize call produces.

use crate::store::EntityId;

///
/// ViewTraceSink
///

pub trait ViewTraceSink: Send + Sync {
    fn on_event(&self, event: ViewTraceEvent);
}

///
/// ViewTraceEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ViewTraceEvent {
    Serialized {
        type_tag: &'static str,
        keys: usize,
    },
    Deserialized {
        type_tag: &'static str,
        root: bool,
    },
    EntityCreated {
        type_tag: &'static str,
    },
    EntityLoaded {
        type_tag: &'static str,
        id: EntityId,
        detached: bool,
        short_circuit: bool,
    },
}
