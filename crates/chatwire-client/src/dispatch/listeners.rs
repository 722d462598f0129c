use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use super::event::{ClientEvent, EventKind};

/// Listener callback. Runs on the connection task that observed the event.
pub type Callback = Arc<dyn Fn(&ClientEvent) + Send + Sync>;

/// Handle returned by `on`, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registry of listeners per event kind, kept in registration order.
#[derive(Default)]
pub struct Listeners {
    map: DashMap<EventKind, Vec<(ListenerId, Callback)>>,
    seq: AtomicU64,
}

impl Listeners {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn on(&self, kind: EventKind, cb: Callback) -> ListenerId {
        let id = ListenerId(self.seq.fetch_add(1, Ordering::Relaxed));
        self.map.entry(kind).or_default().push((id, cb));
        id
    }

    /// Returns false if `id` was not registered for `kind`.
    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        let Some(mut list) = self.map.get_mut(&kind) else { return false; };
        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        before != list.len()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.map.get(&kind).map(|l| l.len()).unwrap_or(0)
    }

    /// Invoke every listener for the event's kind. A panicking callback is
    /// logged and skipped; the rest still run.
    pub fn emit(&self, event: &ClientEvent) {
        let kind = event.kind();
        // snapshot so callbacks may call on/off without deadlocking the shard
        let snapshot: Vec<Callback> = match self.map.get(&kind) {
            Some(list) => list.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
            None => return,
        };

        for cb in snapshot {
            if catch_unwind(AssertUnwindSafe(|| cb(event))).is_err() {
                tracing::error!(event = %kind, "listener panicked");
            }
        }
    }
}
