use crate::application_port::FriendshipError;
use crate::domain_model::*;

/// Read-only projections over the directory and the ledger.
#[async_trait::async_trait]
pub trait FriendQueryService: Send + Sync {
    async fn all_players(&self) -> Result<Vec<Player>, FriendshipError>;
    async fn friends_of(&self, player_name: &str) -> Result<Vec<Player>, FriendshipError>;
    /// Pending requests only.
    async fn sent_requests(&self, player_name: &str)
    -> Result<Vec<FriendRequest>, FriendshipError>;
    /// Pending requests only.
    async fn received_requests(
        &self,
        player_name: &str,
    ) -> Result<Vec<FriendRequest>, FriendshipError>;
}
