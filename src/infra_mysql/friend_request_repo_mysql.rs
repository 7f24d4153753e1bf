use super::util::{downcast, store_err};
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlConnection, Row};

const SELECT_REQUEST: &str = r#"
SELECT
    fr.request_id          AS request_id,
    fr.sending_player_id   AS sending_player_id,
    s.player_name          AS sending_player_name,
    fr.receiving_player_id AS receiving_player_id,
    r.player_name          AS receiving_player_name,
    fr.status              AS status,
    fr.created_at          AS created_at,
    fr.updated_at          AS updated_at
FROM friend_request fr
JOIN player s ON s.player_id = fr.sending_player_id
JOIN player r ON r.player_id = fr.receiving_player_id
"#;

/// Every ledger access runs inside a caller-owned transaction, so no pool is kept.
#[derive(Default)]
pub struct MySqlFriendRequestRepo;

impl MySqlFriendRequestRepo {
    pub fn new() -> Self {
        MySqlFriendRequestRepo
    }

    fn row_to_item(r: &MySqlRow) -> Result<FriendRequest, StoreError> {
        Ok(FriendRequest {
            id: r
                .try_get::<FriendRequestId, _>("request_id")
                .map_err(store_err("decode request_id"))?,
            sending_player_id: r
                .try_get::<PlayerId, _>("sending_player_id")
                .map_err(store_err("decode sending_player_id"))?,
            sending_player_name: r
                .try_get::<String, _>("sending_player_name")
                .map_err(store_err("decode sending_player_name"))?,
            receiving_player_id: r
                .try_get::<PlayerId, _>("receiving_player_id")
                .map_err(store_err("decode receiving_player_id"))?,
            receiving_player_name: r
                .try_get::<String, _>("receiving_player_name")
                .map_err(store_err("decode receiving_player_name"))?,
            status: r
                .try_get::<FriendRequestStatus, _>("status")
                .map_err(store_err("decode status"))?,
            created_at: r
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(store_err("decode created_at"))?,
            updated_at: r
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(store_err("decode updated_at"))?,
        })
    }

    async fn fetch_by_id(
        conn: &mut MySqlConnection,
        id: FriendRequestId,
    ) -> Result<FriendRequest, StoreError> {
        let sql = format!("{SELECT_REQUEST} WHERE fr.request_id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_one(conn)
            .await
            .map_err(store_err("select friend request"))?;
        Self::row_to_item(&row)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepo for MySqlFriendRequestRepo {
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        request: &FriendRequestNew,
    ) -> Result<FriendRequest, StoreError> {
        let tx = downcast(tx)?;

        sqlx::query(
            r#"
INSERT INTO friend_request
    (request_id, sending_player_id, receiving_player_id, status, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(request.id)
        .bind(request.sending_player_id)
        .bind(request.receiving_player_id)
        .bind(FriendRequestStatus::Pending)
        .bind(request.created_at)
        .bind(request.created_at)
        .execute(tx.conn())
        .await
        .map_err(store_err("insert friend request"))?;

        Self::fetch_by_id(tx.conn(), request.id).await
    }

    async fn find_pending_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        sender: PlayerId,
        receiver: PlayerId,
    ) -> Result<Option<FriendRequest>, StoreError> {
        let tx = downcast(tx)?;

        // lock the row so the status transition that follows cannot race
        let sql = format!(
            r#"{SELECT_REQUEST}
WHERE fr.sending_player_id = ? AND fr.receiving_player_id = ? AND fr.status = ?
ORDER BY fr.created_at
LIMIT 1
FOR UPDATE OF fr"#
        );
        let row = sqlx::query(&sql)
            .bind(sender)
            .bind(receiver)
            .bind(FriendRequestStatus::Pending)
            .fetch_optional(tx.conn())
            .await
            .map_err(store_err("select pending friend request"))?;

        row.as_ref().map(Self::row_to_item).transpose()
    }

    async fn find_pending_between_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        pair: PlayerPair,
    ) -> Result<Option<FriendRequest>, StoreError> {
        let tx = downcast(tx)?;

        let sql = format!(
            r#"{SELECT_REQUEST}
WHERE fr.status = ?
  AND ((fr.sending_player_id = ? AND fr.receiving_player_id = ?)
    OR (fr.sending_player_id = ? AND fr.receiving_player_id = ?))
ORDER BY fr.created_at
LIMIT 1
FOR UPDATE OF fr"#
        );
        let row = sqlx::query(&sql)
            .bind(FriendRequestStatus::Pending)
            .bind(pair.min())
            .bind(pair.max())
            .bind(pair.max())
            .bind(pair.min())
            .fetch_optional(tx.conn())
            .await
            .map_err(store_err("select pending friend request for pair"))?;

        row.as_ref().map(Self::row_to_item).transpose()
    }

    async fn transition_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: FriendRequestId,
        from: FriendRequestStatus,
        to: FriendRequestStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let tx = downcast(tx)?;

        let res = sqlx::query(
            "UPDATE friend_request SET status = ?, updated_at = ? WHERE request_id = ? AND status = ?",
        )
        .bind(to)
        .bind(at)
        .bind(id)
        .bind(from)
        .execute(tx.conn())
        .await
        .map_err(store_err("update friend request status"))?;

        Ok(res.rows_affected() == 1)
    }

    async fn list_by_sender_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        sender: PlayerId,
        status: FriendRequestStatus,
    ) -> Result<Vec<FriendRequest>, StoreError> {
        let tx = downcast(tx)?;

        let sql = format!(
            "{SELECT_REQUEST} WHERE fr.sending_player_id = ? AND fr.status = ? ORDER BY fr.created_at"
        );
        let rows = sqlx::query(&sql)
            .bind(sender)
            .bind(status)
            .fetch_all(tx.conn())
            .await
            .map_err(store_err("list sent friend requests"))?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn list_by_receiver_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        receiver: PlayerId,
        status: FriendRequestStatus,
    ) -> Result<Vec<FriendRequest>, StoreError> {
        let tx = downcast(tx)?;

        let sql = format!(
            "{SELECT_REQUEST} WHERE fr.receiving_player_id = ? AND fr.status = ? ORDER BY fr.created_at"
        );
        let rows = sqlx::query(&sql)
            .bind(receiver)
            .bind(status)
            .fetch_all(tx.conn())
            .await
            .map_err(store_err("list received friend requests"))?;

        rows.iter().map(Self::row_to_item).collect()
    }
}
