use super::repo_tx_mysql::MySqlTx;
use crate::domain_port::*;
use anyhow::anyhow;
use sqlx::mysql::MySqlDatabaseError;

const ER_DUP_ENTRY: u16 = 1062;

pub fn downcast<'a, 't>(tx: &'a mut dyn StorageTx<'t>) -> Result<&'a mut MySqlTx, StoreError> {
    tx.as_any_mut()
        .downcast_mut::<MySqlTx>()
        .ok_or_else(|| StoreError::InternalError(anyhow!("mysql repo handed a foreign transaction")))
}

/// True when MySQL refused a row because a unique key already holds its value.
pub fn is_dup_key(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .try_downcast_ref::<MySqlDatabaseError>()
            .is_some_and(|e| e.number() == ER_DUP_ENTRY),
        _ => false,
    }
}

pub fn store_err(context: &str) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
    move |e| StoreError::Store(format!("{context}: {e}"))
}
