//! Abstract transactional store for batches and stock changes
//!
//! The persistence technology is an external collaborator: the engine only
//! requires a store whose transactions take snapshot reads, buffer writes,
//! and fail at commit with [`StoreError::Conflict`] when any batch read
//! inside the transaction was committed by another writer in the meantime.
//! Optimistic concurrency and serializable backends both satisfy this.

use async_trait::async_trait;
use shared::{OwnerScope, StockBatch, StockChange};
use thiserror::Error;
use uuid::Uuid;

mod memory;

pub use memory::{MemoryStore, MemoryTxn};

/// Store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Another writer committed a conflicting batch mutation
    #[error("transaction conflict")]
    Conflict,

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to a transactional batch/stock-change store
#[async_trait]
pub trait BatchStore: Send + Sync {
    type Txn: BatchTxn;

    /// Begin a transaction. Dropping the transaction without committing
    /// discards all buffered writes.
    async fn begin(&self) -> StoreResult<Self::Txn>;
}

/// One atomic read-modify-write unit
///
/// Reads return committed state as of the read and register the touched
/// batches for conflict detection; writes are buffered until [`commit`].
///
/// Ordering contract: `batches_for_owner` and `batches_for_tenant` return
/// batches sorted by `(created_at, id)` ascending; `changes_for_owner`
/// returns changes sorted by `created_at` descending (history display
/// order).
///
/// [`commit`]: BatchTxn::commit
#[async_trait]
pub trait BatchTxn: Send {
    async fn get_batch(
        &mut self,
        tenant_id: Uuid,
        batch_id: Uuid,
    ) -> StoreResult<Option<StockBatch>>;

    async fn batches_for_owner(&mut self, scope: &OwnerScope) -> StoreResult<Vec<StockBatch>>;

    async fn batches_for_tenant(&mut self, tenant_id: Uuid) -> StoreResult<Vec<StockBatch>>;

    async fn changes_for_owner(&mut self, scope: &OwnerScope) -> StoreResult<Vec<StockChange>>;

    async fn insert_batch(&mut self, batch: StockBatch) -> StoreResult<()>;

    async fn update_batch(&mut self, batch: StockBatch) -> StoreResult<()>;

    /// Physically remove a batch row. Prior stock changes are never removed;
    /// they remain as historical evidence after the batch is gone.
    async fn delete_batch(&mut self, tenant_id: Uuid, batch_id: Uuid) -> StoreResult<()>;

    async fn append_change(&mut self, change: StockChange) -> StoreResult<()>;

    async fn commit(self) -> StoreResult<()>;
}
