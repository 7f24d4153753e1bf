use super::memory_store::{MemoryState, StoredRequest};
use super::util::downcast;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};

#[derive(Default)]
pub struct MemoryFriendRequestRepo;

impl MemoryFriendRequestRepo {
    pub fn new() -> Self {
        MemoryFriendRequestRepo
    }
}

fn resolve_all<'a>(
    state: &MemoryState,
    rows: impl Iterator<Item = &'a StoredRequest>,
) -> Result<Vec<FriendRequest>, StoreError> {
    rows.map(|r| {
        state
            .resolve(r)
            .ok_or_else(|| StoreError::Store(format!("friend request {} has no players", r.id)))
    })
    .collect()
}

#[async_trait::async_trait]
impl FriendRequestRepo for MemoryFriendRequestRepo {
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        request: &FriendRequestNew,
    ) -> Result<FriendRequest, StoreError> {
        let state = downcast(tx)?.state();
        if state.requests.iter().any(|r| r.id == request.id) {
            return Err(StoreError::Duplicate(request.id.to_string()));
        }
        let stored = StoredRequest {
            id: request.id,
            sender: request.sending_player_id,
            receiver: request.receiving_player_id,
            status: FriendRequestStatus::Pending,
            created_at: request.created_at,
            updated_at: request.created_at,
        };
        let resolved = state
            .resolve(&stored)
            .ok_or_else(|| StoreError::Store("insert friend request: unknown player".to_string()))?;
        state.requests.push(stored);
        Ok(resolved)
    }

    async fn find_pending_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        sender: PlayerId,
        receiver: PlayerId,
    ) -> Result<Option<FriendRequest>, StoreError> {
        let state = downcast(tx)?.state();
        let found = state.requests.iter().find(|r| {
            r.sender == sender && r.receiver == receiver && r.status == FriendRequestStatus::Pending
        });
        Ok(resolve_all(state, found.into_iter())?.pop())
    }

    async fn find_pending_between_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        pair: PlayerPair,
    ) -> Result<Option<FriendRequest>, StoreError> {
        let state = downcast(tx)?.state();
        let found = state.requests.iter().find(|r| {
            r.status == FriendRequestStatus::Pending
                && r.sender != r.receiver
                && pair.contains(r.sender)
                && pair.contains(r.receiver)
        });
        Ok(resolve_all(state, found.into_iter())?.pop())
    }

    async fn transition_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: FriendRequestId,
        from: FriendRequestStatus,
        to: FriendRequestStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let state = downcast(tx)?.state();
        match state.requests.iter_mut().find(|r| r.id == id) {
            Some(r) if r.status == from => {
                r.status = to;
                r.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_by_sender_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        sender: PlayerId,
        status: FriendRequestStatus,
    ) -> Result<Vec<FriendRequest>, StoreError> {
        let state = downcast(tx)?.state();
        let rows = state
            .requests
            .iter()
            .filter(|r| r.sender == sender && r.status == status);
        resolve_all(state, rows)
    }

    async fn list_by_receiver_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        receiver: PlayerId,
        status: FriendRequestStatus,
    ) -> Result<Vec<FriendRequest>, StoreError> {
        let state = downcast(tx)?.state();
        let rows = state
            .requests
            .iter()
            .filter(|r| r.receiver == receiver && r.status == status);
        resolve_all(state, rows)
    }
}
