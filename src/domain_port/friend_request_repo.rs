use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct FriendRequestNew {
    pub id: FriendRequestId,
    pub sending_player_id: PlayerId,
    pub receiving_player_id: PlayerId,
    pub created_at: DateTime<Utc>,
}

/// The friend request ledger. Rows are never deleted.
#[async_trait::async_trait]
pub trait FriendRequestRepo: Send + Sync {
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        request: &FriendRequestNew,
    ) -> Result<FriendRequest, StoreError>;

    /// The pending request sent by `sender` to `receiver`, if any.
    async fn find_pending_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        sender: PlayerId,
        receiver: PlayerId,
    ) -> Result<Option<FriendRequest>, StoreError>;

    /// Any pending request within the pair, in either direction.
    async fn find_pending_between_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        pair: PlayerPair,
    ) -> Result<Option<FriendRequest>, StoreError>;

    /// Moves the request to `to` only if it is currently in `from`.
    /// Returns false when the status did not match.
    async fn transition_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: FriendRequestId,
        from: FriendRequestStatus,
        to: FriendRequestStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    async fn list_by_sender_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        sender: PlayerId,
        status: FriendRequestStatus,
    ) -> Result<Vec<FriendRequest>, StoreError>;

    async fn list_by_receiver_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        receiver: PlayerId,
        status: FriendRequestStatus,
    ) -> Result<Vec<FriendRequest>, StoreError>;
}
