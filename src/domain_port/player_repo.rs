use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;
use crate::domain_port::StoreError;

/// The player directory.
///
/// Lookups return `Ok(None)` when nothing matches; absence is not a fault.
#[async_trait::async_trait]
pub trait PlayerRepo: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Player>, StoreError>;

    async fn find_by_name_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_name: &str,
    ) -> Result<Option<Player>, StoreError>;

    async fn find_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_id: PlayerId,
    ) -> Result<Option<Player>, StoreError>;

    /// Fails with `StoreError::Duplicate` when the name is taken.
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player: &Player,
    ) -> Result<Player, StoreError>;

    /// Append-only; neither deduplicates nor checks that `friend_id` exists.
    async fn append_friend_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_id: PlayerId,
        friend_id: PlayerId,
    ) -> Result<(), StoreError>;

    /// `None` clears presence. Returns false when no player has this name.
    async fn set_current_town_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_name: &str,
        town_id: Option<&str>,
    ) -> Result<bool, StoreError>;
}
