//! Deletion guard
//!
//! A batch may be physically removed only if it has never been touched, or
//! if it is fully drawn down and either naturally depleted or explicitly
//! reconciled by a human correction. A partially consumed, still-active
//! batch can never be deleted; the caller must deplete or reconcile it
//! first.

use shared::{BatchStatus, StockBatch};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::store::{BatchStore, BatchTxn, StoreError};

/// Whether a batch may be physically removed
pub fn can_delete(batch: &StockBatch) -> bool {
    batch.remaining_quantity == batch.quantity
        || (batch.remaining_quantity == 0
            && matches!(batch.status, BatchStatus::Depleted | BatchStatus::Corrected))
}

/// Guarded physical removal of batches
#[derive(Clone)]
pub struct DeletionService<S> {
    store: S,
    config: LedgerConfig,
}

impl<S: BatchStore> DeletionService<S> {
    /// Create a new DeletionService instance
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Delete a batch after revalidating the guard inside the transaction
    ///
    /// The predicate is re-evaluated against the transaction's own read, so
    /// a stale check-then-act from the caller cannot slip a forbidden
    /// deletion through. Prior stock changes survive as historical
    /// evidence; no new change is appended for the deletion itself.
    pub async fn delete(&self, tenant_id: Uuid, batch_id: Uuid, user_id: Uuid) -> LedgerResult<()> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_delete(tenant_id, batch_id).await {
                Err(LedgerError::Store(StoreError::Conflict)) => {
                    if attempt >= self.config.max_txn_retries {
                        return Err(LedgerError::ConcurrentModification);
                    }
                    tracing::warn!(attempt, %batch_id, "deletion conflict, retrying");
                }
                Ok(()) => {
                    tracing::info!(%batch_id, %user_id, "batch deleted");
                    return Ok(());
                }
                result => return result,
            }
        }
    }

    async fn try_delete(&self, tenant_id: Uuid, batch_id: Uuid) -> LedgerResult<()> {
        let mut txn = self.store.begin().await?;
        let batch = txn
            .get_batch(tenant_id, batch_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("Batch {}", batch_id)))?;

        if !can_delete(&batch) {
            tracing::debug!(%batch_id, status = %batch.status, remaining = batch.remaining_quantity, "deletion refused");
            return Err(LedgerError::DeletionNotAllowed(format!(
                "batch {} is partially consumed; deplete or reconcile it first",
                batch_id
            )));
        }

        txn.delete_batch(tenant_id, batch_id).await?;
        txn.commit().await?;

        Ok(())
    }
}
