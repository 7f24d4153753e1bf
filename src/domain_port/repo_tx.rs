use std::any::Any;

/// Hands out one scoped transaction per logical operation.
#[async_trait::async_trait]
pub trait TxManager: Send + Sync {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>>;
}

/// Dropping a transaction without committing rolls it back.
#[async_trait::async_trait]
pub trait StorageTx<'t>: Send {
    /// Lets a backend's repos recover their own transaction type.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}
