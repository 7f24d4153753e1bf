use crate::domain_model::Player;
use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("player not found")]
    PlayerNotFound,
    #[error("player name already taken")]
    PlayerExists,
    #[error("invalid player name: {0}")]
    InvalidName(String),
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for PlayerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => PlayerError::PlayerExists,
            StoreError::Store(e) => PlayerError::Store(e),
            StoreError::InternalError(e) => PlayerError::Store(e.to_string()),
        }
    }
}

#[async_trait::async_trait]
pub trait PlayerService: Send + Sync {
    /// `Ok(None)` when no player has this name.
    async fn login(&self, player_name: &str) -> Result<Option<Player>, PlayerError>;
    async fn signup(&self, player_name: &str) -> Result<Player, PlayerError>;
    /// An empty `town_id` means the player left their town.
    async fn update_town(&self, player_name: &str, town_id: &str) -> Result<(), PlayerError>;
}
