use super::memory_store::MemoryStore;
use super::util::downcast;
use crate::domain_model::*;
use crate::domain_port::*;

pub struct MemoryPlayerRepo {
    store: MemoryStore,
}

impl MemoryPlayerRepo {
    pub fn new(store: MemoryStore) -> Self {
        MemoryPlayerRepo { store }
    }
}

#[async_trait::async_trait]
impl PlayerRepo for MemoryPlayerRepo {
    async fn list_all(&self) -> Result<Vec<Player>, StoreError> {
        Ok(self.store.lock().await.players.clone())
    }

    async fn find_by_name_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_name: &str,
    ) -> Result<Option<Player>, StoreError> {
        let tx = downcast(tx)?;
        Ok(tx.state().player_by_name(player_name).cloned())
    }

    async fn find_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_id: PlayerId,
    ) -> Result<Option<Player>, StoreError> {
        let tx = downcast(tx)?;
        Ok(tx.state().player(player_id).cloned())
    }

    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player: &Player,
    ) -> Result<Player, StoreError> {
        let state = downcast(tx)?.state();
        if state.player_by_name(&player.player_name).is_some() {
            return Err(StoreError::Duplicate(player.player_name.clone()));
        }
        if state.player(player.id).is_some() {
            return Err(StoreError::Duplicate(player.id.to_string()));
        }
        state.players.push(player.clone());
        Ok(player.clone())
    }

    async fn append_friend_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_id: PlayerId,
        friend_id: PlayerId,
    ) -> Result<(), StoreError> {
        let state = downcast(tx)?.state();
        let player = state
            .player_mut(player_id)
            .ok_or_else(|| StoreError::Store(format!("append friend: no player {player_id}")))?;
        player.friend_ids.push(friend_id);
        Ok(())
    }

    async fn set_current_town_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_name: &str,
        town_id: Option<&str>,
    ) -> Result<bool, StoreError> {
        let state = downcast(tx)?.state();
        match state.players.iter_mut().find(|p| p.player_name == player_name) {
            Some(player) => {
                player.current_town_id = town_id.map(str::to_string);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
