use crate::domain_model::*;
use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum FriendshipError {
    #[error("players are missing or identical")]
    InvalidPlayers,
    #[error("no pending friend request between the players")]
    RequestNotFound,
    #[error("a friend request between the players is already pending")]
    RequestAlreadyPending,
    #[error("players are already friends")]
    AlreadyFriends,
    #[error("player not found")]
    PlayerNotFound,
    #[error("friend id {0} does not resolve to a player")]
    UnresolvedFriendId(PlayerId),
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for FriendshipError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(e) => FriendshipError::Store(format!("duplicate key: {e}")),
            StoreError::Store(e) => FriendshipError::Store(e),
            StoreError::InternalError(e) => FriendshipError::Store(e.to_string()),
        }
    }
}

/// The request/accept/reject workflow. Names are resolved once on entry.
#[async_trait::async_trait]
pub trait FriendshipService: Send + Sync {
    async fn send_friend_request(
        &self,
        from_name: &str,
        to_name: &str,
    ) -> Result<FriendRequest, FriendshipError>;
    async fn accept_friend_request(
        &self,
        from_name: &str,
        to_name: &str,
    ) -> Result<FriendRequest, FriendshipError>;
    async fn reject_friend_request(
        &self,
        from_name: &str,
        to_name: &str,
    ) -> Result<FriendRequest, FriendshipError>;
}
