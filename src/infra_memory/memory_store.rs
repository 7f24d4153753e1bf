use crate::domain_model::*;
use crate::domain_port::{StorageTx, TxManager};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::any::Any;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

#[derive(Debug, Clone)]
pub(crate) struct StoredRequest {
    pub id: FriendRequestId,
    pub sender: PlayerId,
    pub receiver: PlayerId,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryState {
    /// Insertion order.
    pub players: Vec<Player>,
    pub requests: Vec<StoredRequest>,
}

impl MemoryState {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.player_name == name)
    }

    pub fn resolve(&self, stored: &StoredRequest) -> Option<FriendRequest> {
        let sender = self.player(stored.sender)?;
        let receiver = self.player(stored.receiver)?;
        Some(FriendRequest {
            id: stored.id,
            sending_player_id: sender.id,
            sending_player_name: sender.player_name.clone(),
            receiving_player_id: receiver.id,
            receiving_player_name: receiver.player_name.clone(),
            status: stored.status,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }
}

/// Shared handle to the in-memory tables. Clones point at the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().await
    }

    async fn lock_owned(&self) -> OwnedMutexGuard<MemoryState> {
        self.state.clone().lock_owned().await
    }
}

/// Transactions are serialized: `begin` holds the store lock until the
/// transaction ends, and writes go to a working copy applied on commit.
pub struct MemoryTxManager {
    store: MemoryStore,
}

impl MemoryTxManager {
    pub fn new(store: MemoryStore) -> Self {
        MemoryTxManager { store }
    }
}

#[async_trait::async_trait]
impl TxManager for MemoryTxManager {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        let guard = self.store.lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

impl MemoryTx {
    pub(crate) fn state(&mut self) -> &mut MemoryState {
        &mut self.working
    }
}

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MemoryTx {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}
