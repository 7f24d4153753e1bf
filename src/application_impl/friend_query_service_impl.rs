use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

pub struct RealFriendQueryService {
    player_repo: Arc<dyn PlayerRepo>,
    friend_request_repo: Arc<dyn FriendRequestRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealFriendQueryService {
    pub fn new(
        player_repo: Arc<dyn PlayerRepo>,
        friend_request_repo: Arc<dyn FriendRequestRepo>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        Self {
            player_repo,
            friend_request_repo,
            tx_manager,
        }
    }

    async fn pending_requests(
        &self,
        player_name: &str,
        sent: bool,
    ) -> Result<Vec<FriendRequest>, FriendshipError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| FriendshipError::Store(e.to_string()))?;

        let player = self
            .player_repo
            .find_by_name_in_tx(&mut *tx, player_name)
            .await?
            .ok_or(FriendshipError::PlayerNotFound)?;

        let requests = if sent {
            self.friend_request_repo
                .list_by_sender_in_tx(&mut *tx, player.id, FriendRequestStatus::Pending)
                .await?
        } else {
            self.friend_request_repo
                .list_by_receiver_in_tx(&mut *tx, player.id, FriendRequestStatus::Pending)
                .await?
        };

        tx.commit()
            .await
            .map_err(|e| FriendshipError::Store(e.to_string()))?;

        Ok(requests)
    }
}

#[async_trait::async_trait]
impl FriendQueryService for RealFriendQueryService {
    async fn all_players(&self) -> Result<Vec<Player>, FriendshipError> {
        Ok(self.player_repo.list_all().await?)
    }

    async fn friends_of(&self, player_name: &str) -> Result<Vec<Player>, FriendshipError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| FriendshipError::Store(e.to_string()))?;

        let player = self
            .player_repo
            .find_by_name_in_tx(&mut *tx, player_name)
            .await?
            .ok_or(FriendshipError::PlayerNotFound)?;

        let mut friends = Vec::with_capacity(player.friend_ids.len());
        for friend_id in &player.friend_ids {
            match self.player_repo.find_by_id_in_tx(&mut *tx, *friend_id).await? {
                Some(friend) => friends.push(friend),
                None => {
                    warn!(player = player_name, %friend_id, "friend id does not resolve");
                    return Err(FriendshipError::UnresolvedFriendId(*friend_id));
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| FriendshipError::Store(e.to_string()))?;

        Ok(friends)
    }

    async fn sent_requests(
        &self,
        player_name: &str,
    ) -> Result<Vec<FriendRequest>, FriendshipError> {
        self.pending_requests(player_name, true).await
    }

    async fn received_requests(
        &self,
        player_name: &str,
    ) -> Result<Vec<FriendRequest>, FriendshipError> {
        self.pending_requests(player_name, false).await
    }
}
