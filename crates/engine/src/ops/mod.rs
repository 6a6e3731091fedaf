//! Write path and queries over a [`GroupStore`].
//!
//! Every mutation loads a consistent [`GroupState`], validates against it,
//! builds the new rows plus their [`Activity`](crate::Activity) and hands
//! both to the store in a single write. Queries recompute from the store on
//! every call; nothing is cached here.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    EngineError, Group, Participant, ResultEngine,
    store::{GroupState, GroupStore, MemoryStore},
};

mod balances;
mod expenses;
mod groups;

#[derive(Clone, Debug)]
pub struct Engine {
    store: Arc<dyn GroupStore>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn load(&self, group_id: Uuid) -> ResultEngine<GroupState> {
        self.store.load(group_id)
    }
}

fn require_actor(group: &Group, actor_id: Uuid) -> ResultEngine<&Participant> {
    group.participant(actor_id).ok_or_else(|| {
        EngineError::KeyNotFound(format!("actor {actor_id} in group {}", group.id))
    })
}

/// Log internal faults before handing them back. Input errors are the
/// caller's business and stay quiet.
fn log_fault(group_id: Uuid, err: EngineError) -> EngineError {
    if !err.is_user_facing() {
        tracing::error!(%group_id, "ledger fault: {err}");
    }
    err
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn GroupStore>>,
}

impl EngineBuilder {
    /// Pass the store backing the engine.
    pub fn store(mut self, store: impl GroupStore + 'static) -> EngineBuilder {
        self.store = Some(Arc::new(store));
        self
    }

    /// Pass a store shared with other components.
    pub fn shared_store(mut self, store: Arc<dyn GroupStore>) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    /// Construct `Engine`. Defaults to an empty [`MemoryStore`].
    pub fn build(self) -> Engine {
        Engine {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryStore::new())),
        }
    }
}
