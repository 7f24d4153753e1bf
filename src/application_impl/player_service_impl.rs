use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

pub struct RealPlayerService {
    player_repo: Arc<dyn PlayerRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealPlayerService {
    pub fn new(player_repo: Arc<dyn PlayerRepo>, tx_manager: Arc<dyn TxManager>) -> Self {
        RealPlayerService {
            player_repo,
            tx_manager,
        }
    }
}

#[async_trait::async_trait]
impl PlayerService for RealPlayerService {
    async fn login(&self, player_name: &str) -> Result<Option<Player>, PlayerError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| PlayerError::Store(e.to_string()))?;

        let player = self
            .player_repo
            .find_by_name_in_tx(&mut *tx, player_name)
            .await?;

        tx.commit()
            .await
            .map_err(|e| PlayerError::Store(e.to_string()))?;

        Ok(player)
    }

    async fn signup(&self, player_name: &str) -> Result<Player, PlayerError> {
        let player_name = validate_player_name(player_name).map_err(PlayerError::InvalidName)?;

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| PlayerError::Store(e.to_string()))?;

        if self
            .player_repo
            .find_by_name_in_tx(&mut *tx, player_name)
            .await?
            .is_some()
        {
            return Err(PlayerError::PlayerExists);
        }

        // a concurrent signup loses on the unique name key
        let player = self
            .player_repo
            .insert_in_tx(&mut *tx, &Player::new(player_name))
            .await?;

        tx.commit()
            .await
            .map_err(|e| PlayerError::Store(e.to_string()))?;

        info!(player_id = %player.id, player = player_name, "player signed up");
        Ok(player)
    }

    async fn update_town(&self, player_name: &str, town_id: &str) -> Result<(), PlayerError> {
        let town_id = Some(town_id.trim()).filter(|t| !t.is_empty());

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| PlayerError::Store(e.to_string()))?;

        let found = self
            .player_repo
            .set_current_town_in_tx(&mut *tx, player_name, town_id)
            .await?;
        if !found {
            return Err(PlayerError::PlayerNotFound);
        }

        tx.commit()
            .await
            .map_err(|e| PlayerError::Store(e.to_string()))?;

        debug!(player = player_name, town = ?town_id, "player town updated");
        Ok(())
    }
}
