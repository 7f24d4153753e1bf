use super::util::{downcast, is_dup_key, store_err};
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlConnection, MySqlPool, Row};
use std::collections::HashMap;

pub struct MySqlPlayerRepo {
    pool: MySqlPool,
}

impl MySqlPlayerRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlPlayerRepo { pool }
    }

    // friend_ids are filled in by the caller
    fn row_to_player(r: &MySqlRow) -> Result<Player, StoreError> {
        let id = r
            .try_get::<PlayerId, _>("player_id")
            .map_err(store_err("decode player_id"))?;
        let player_name = r
            .try_get::<String, _>("player_name")
            .map_err(store_err("decode player_name"))?;
        let town = r
            .try_get::<String, _>("current_town_id")
            .map_err(store_err("decode current_town_id"))?;
        Ok(Player {
            id,
            player_name,
            friend_ids: Vec::new(),
            current_town_id: (!town.is_empty()).then_some(town),
        })
    }

    async fn load_friend_ids(
        conn: &mut MySqlConnection,
        player_id: PlayerId,
    ) -> Result<Vec<PlayerId>, StoreError> {
        let ids = sqlx::query_scalar::<_, PlayerId>(
            "SELECT friend_id FROM player_friend WHERE player_id = ? ORDER BY seq",
        )
        .bind(player_id)
        .fetch_all(conn)
        .await
        .map_err(store_err("select friend ids"))?;
        Ok(ids)
    }

    async fn hydrate(
        conn: &mut MySqlConnection,
        row: Option<MySqlRow>,
    ) -> Result<Option<Player>, StoreError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let mut player = Self::row_to_player(&row)?;
        player.friend_ids = Self::load_friend_ids(conn, player.id).await?;
        Ok(Some(player))
    }
}

#[async_trait::async_trait]
impl PlayerRepo for MySqlPlayerRepo {
    async fn list_all(&self) -> Result<Vec<Player>, StoreError> {
        let rows = sqlx::query(
            "SELECT player_id, player_name, current_town_id FROM player ORDER BY created_at, player_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err("list players"))?;

        let friend_rows = sqlx::query("SELECT player_id, friend_id FROM player_friend ORDER BY seq")
            .fetch_all(&self.pool)
            .await
            .map_err(store_err("list friend ids"))?;

        let mut friends: HashMap<PlayerId, Vec<PlayerId>> = HashMap::new();
        for r in &friend_rows {
            let owner = r
                .try_get::<PlayerId, _>("player_id")
                .map_err(store_err("decode player_id"))?;
            let friend = r
                .try_get::<PlayerId, _>("friend_id")
                .map_err(store_err("decode friend_id"))?;
            friends.entry(owner).or_default().push(friend);
        }

        rows.iter()
            .map(|r| -> Result<Player, StoreError> {
                let mut player = Self::row_to_player(r)?;
                player.friend_ids = friends.remove(&player.id).unwrap_or_default();
                Ok(player)
            })
            .collect()
    }

    async fn find_by_name_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_name: &str,
    ) -> Result<Option<Player>, StoreError> {
        let tx = downcast(tx)?;

        let row = sqlx::query(
            "SELECT player_id, player_name, current_town_id FROM player WHERE player_name = ?",
        )
        .bind(player_name)
        .fetch_optional(tx.conn())
        .await
        .map_err(store_err("select player by name"))?;

        Self::hydrate(tx.conn(), row).await
    }

    async fn find_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_id: PlayerId,
    ) -> Result<Option<Player>, StoreError> {
        let tx = downcast(tx)?;

        let row = sqlx::query(
            "SELECT player_id, player_name, current_town_id FROM player WHERE player_id = ?",
        )
        .bind(player_id)
        .fetch_optional(tx.conn())
        .await
        .map_err(store_err("select player by id"))?;

        Self::hydrate(tx.conn(), row).await
    }

    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player: &Player,
    ) -> Result<Player, StoreError> {
        let tx = downcast(tx)?;

        let res = sqlx::query(
            r#"
INSERT INTO player (player_id, player_name, current_town_id)
VALUES (?, ?, ?)
"#,
        )
        .bind(player.id)
        .bind(&player.player_name)
        .bind(player.current_town_id.as_deref().unwrap_or(""))
        .execute(tx.conn())
        .await;

        match res {
            Ok(_) => {}
            Err(e) if is_dup_key(&e) => {
                return Err(StoreError::Duplicate(player.player_name.clone()));
            }
            Err(e) => return Err(StoreError::Store(format!("insert player: {e}"))),
        }

        for friend_id in &player.friend_ids {
            sqlx::query("INSERT INTO player_friend (player_id, friend_id) VALUES (?, ?)")
                .bind(player.id)
                .bind(*friend_id)
                .execute(tx.conn())
                .await
                .map_err(store_err("insert friend id"))?;
        }

        Ok(player.clone())
    }

    async fn append_friend_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_id: PlayerId,
        friend_id: PlayerId,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        sqlx::query("INSERT INTO player_friend (player_id, friend_id) VALUES (?, ?)")
            .bind(player_id)
            .bind(friend_id)
            .execute(tx.conn())
            .await
            .map_err(store_err("append friend id"))?;

        Ok(())
    }

    async fn set_current_town_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        player_name: &str,
        town_id: Option<&str>,
    ) -> Result<bool, StoreError> {
        let tx = downcast(tx)?;

        // MySQL reports matched-but-unchanged rows as 0 affected, so check existence first
        let exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM player WHERE player_name = ? FOR UPDATE")
                .bind(player_name)
                .fetch_one(tx.conn())
                .await
                .map_err(store_err("select player for town update"))?;
        if exists == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE player SET current_town_id = ? WHERE player_name = ?")
            .bind(town_id.unwrap_or(""))
            .bind(player_name)
            .execute(tx.conn())
            .await
            .map_err(store_err("update current town"))?;

        Ok(true)
    }
}
