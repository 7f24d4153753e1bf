use crate::domain_port::{StorageTx, TxManager};
use anyhow::Context;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, MySqlConnection, MySqlPool, Transaction};
use std::any::Any;

/// Opens the pool shared by every MySQL repo of the process.
pub async fn connect_pool(dsn: &str, max_connections: u32) -> anyhow::Result<MySqlPool> {
    MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(dsn)
        .await
        .context("connect mysql pool")
}

/// Each `begin` checks a connection out of the pool for the life of the tx.
pub struct MySqlTxManager {
    pool: MySqlPool,
}

impl MySqlTxManager {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlTxManager { pool }
    }
}

#[async_trait::async_trait]
impl TxManager for MySqlTxManager {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        let inner = self.pool.begin().await.context("begin mysql transaction")?;
        Ok(Box::new(MySqlTx { inner }))
    }
}

pub struct MySqlTx {
    inner: Transaction<'static, MySql>,
}

impl MySqlTx {
    pub fn conn(&mut self) -> &mut MySqlConnection {
        &mut self.inner
    }
}

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MySqlTx {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.inner.commit().await.context("commit mysql transaction")
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        self.inner.rollback().await.context("rollback mysql transaction")
    }
}
