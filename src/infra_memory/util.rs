use super::memory_store::MemoryTx;
use crate::domain_port::*;
use anyhow::anyhow;

pub fn downcast<'a, 't>(tx: &'a mut dyn StorageTx<'t>) -> Result<&'a mut MemoryTx, StoreError> {
    tx.as_any_mut()
        .downcast_mut::<MemoryTx>()
        .ok_or_else(|| StoreError::InternalError(anyhow!("memory repo handed a foreign transaction")))
}
