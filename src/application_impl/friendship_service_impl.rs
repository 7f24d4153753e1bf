use crate::application_impl::PairLocks;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealFriendshipService {
    player_repo: Arc<dyn PlayerRepo>,
    friend_request_repo: Arc<dyn FriendRequestRepo>,
    tx_manager: Arc<dyn TxManager>,
    pair_locks: Arc<PairLocks>,
}

impl RealFriendshipService {
    pub fn new(
        player_repo: Arc<dyn PlayerRepo>,
        friend_request_repo: Arc<dyn FriendRequestRepo>,
        tx_manager: Arc<dyn TxManager>,
        pair_locks: Arc<PairLocks>,
    ) -> Self {
        Self {
            player_repo,
            friend_request_repo,
            tx_manager,
            pair_locks,
        }
    }

    async fn resolve_players<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        from_name: &str,
        to_name: &str,
    ) -> Result<(Player, Player), FriendshipError> {
        if from_name == to_name {
            return Err(FriendshipError::InvalidPlayers);
        }
        let from = self.player_repo.find_by_name_in_tx(tx, from_name).await?;
        let to = self.player_repo.find_by_name_in_tx(tx, to_name).await?;
        match (from, to) {
            (Some(from), Some(to)) => Ok((from, to)),
            _ => Err(FriendshipError::InvalidPlayers),
        }
    }

    /// Moves the pending `from -> to` request to `next`. Acceptance also makes
    /// both players friends, within the same transaction.
    async fn resolve_request(
        &self,
        from_name: &str,
        to_name: &str,
        next: FriendRequestStatus,
    ) -> Result<FriendRequest, FriendshipError> {
        if from_name == to_name {
            return Err(FriendshipError::InvalidPlayers);
        }
        let _pair = self.pair_locks.lock(from_name, to_name).await;

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| FriendshipError::Store(e.to_string()))?;

        let (from, to) = self.resolve_players(&mut *tx, from_name, to_name).await?;

        let mut request = self
            .friend_request_repo
            .find_pending_in_tx(&mut *tx, from.id, to.id)
            .await?
            .ok_or(FriendshipError::RequestNotFound)?;

        if !request.status.can_transition_to(next) {
            debug!(request_id = %request.id, from = %request.status, to = %next, "illegal transition");
            return Err(FriendshipError::RequestNotFound);
        }

        let now = Utc::now();
        let moved = self
            .friend_request_repo
            .transition_in_tx(&mut *tx, request.id, request.status, next, now)
            .await?;
        if !moved {
            // resolved by someone else between our read and write
            return Err(FriendshipError::RequestNotFound);
        }
        request.status = next;
        request.updated_at = now;

        if next == FriendRequestStatus::Accepted {
            // order matters: sender first, then receiver
            if !from.is_friend_of(to.id) {
                self.player_repo
                    .append_friend_in_tx(&mut *tx, from.id, to.id)
                    .await?;
            }
            if !to.is_friend_of(from.id) {
                self.player_repo
                    .append_friend_in_tx(&mut *tx, to.id, from.id)
                    .await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| FriendshipError::Store(e.to_string()))?;

        info!(
            request_id = %request.id,
            from = from_name,
            to = to_name,
            status = %next,
            "friend request resolved"
        );
        Ok(request)
    }
}

#[async_trait::async_trait]
impl FriendshipService for RealFriendshipService {
    async fn send_friend_request(
        &self,
        from_name: &str,
        to_name: &str,
    ) -> Result<FriendRequest, FriendshipError> {
        if from_name == to_name {
            return Err(FriendshipError::InvalidPlayers);
        }
        let _pair = self.pair_locks.lock(from_name, to_name).await;

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| FriendshipError::Store(e.to_string()))?;

        let (from, to) = self.resolve_players(&mut *tx, from_name, to_name).await?;

        if from.is_friend_of(to.id) || to.is_friend_of(from.id) {
            debug!(from = from_name, to = to_name, "friend request between friends");
            return Err(FriendshipError::AlreadyFriends);
        }

        let pair = PlayerPair::new(from.id, to.id);
        if let Some(existing) = self
            .friend_request_repo
            .find_pending_between_in_tx(&mut *tx, pair)
            .await?
        {
            debug!(request_id = %existing.id, "friend request already pending");
            return Err(FriendshipError::RequestAlreadyPending);
        }

        let new_request = FriendRequestNew {
            id: FriendRequestId::new_v4(),
            sending_player_id: from.id,
            receiving_player_id: to.id,
            created_at: Utc::now(),
        };
        let request = self
            .friend_request_repo
            .insert_in_tx(&mut *tx, &new_request)
            .await?;

        tx.commit()
            .await
            .map_err(|e| FriendshipError::Store(e.to_string()))?;

        info!(request_id = %request.id, from = from_name, to = to_name, "friend request sent");
        Ok(request)
    }

    async fn accept_friend_request(
        &self,
        from_name: &str,
        to_name: &str,
    ) -> Result<FriendRequest, FriendshipError> {
        self.resolve_request(from_name, to_name, FriendRequestStatus::Accepted)
            .await
    }

    async fn reject_friend_request(
        &self,
        from_name: &str,
        to_name: &str,
    ) -> Result<FriendRequest, FriendshipError> {
        self.resolve_request(from_name, to_name, FriendRequestStatus::Rejected)
            .await
    }
}
