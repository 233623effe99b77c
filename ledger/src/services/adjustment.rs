//! Restock and adjustment engine
//!
//! Creates new batches (restock) and performs single-batch corrective
//! writes: damage write-off, manual quantity correction, cost-price
//! correction. Every operation is a single-batch, single-transaction write;
//! none needs cross-batch coordination.

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    validate_corrected_quantity, validate_cost_price, validate_damage_quantity,
    validate_positive_quantity, BatchStatus, ChangeReason, OwnerScope, Provenance, StockBatch,
    StockChange,
};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::store::{BatchStore, BatchTxn, StoreError};

/// Input for creating a new batch
#[derive(Debug, Clone, Deserialize)]
pub struct RestockInput {
    pub quantity: i64,
    pub cost_price: Decimal,
    #[serde(default)]
    pub provenance: Provenance,
    pub notes: Option<String>,
}

/// Input for a damage write-off
#[derive(Debug, Clone, Deserialize)]
pub struct DamageInput {
    pub quantity: i64,
    pub notes: Option<String>,
}

/// Input for a manual quantity correction
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectQuantityInput {
    pub new_remaining_quantity: i64,
    /// Explicitly allow the correction to raise the original lot size.
    /// Without this flag a target above `quantity` is rejected.
    #[serde(default)]
    pub redefine_quantity: bool,
    pub notes: Option<String>,
}

/// Restock/adjustment service for single-batch corrective writes
#[derive(Clone)]
pub struct AdjustmentService<S> {
    store: S,
    config: LedgerConfig,
}

impl<S: BatchStore> AdjustmentService<S> {
    /// Create a new AdjustmentService instance
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Create one new active batch and its restock audit record
    pub async fn restock(
        &self,
        scope: OwnerScope,
        user_id: Uuid,
        input: RestockInput,
    ) -> LedgerResult<StockBatch> {
        validate_positive_quantity(input.quantity)
            .map_err(|msg| LedgerError::InvalidQuantity(msg.to_string()))?;
        validate_cost_price(input.cost_price)
            .map_err(|msg| LedgerError::InvalidQuantity(msg.to_string()))?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_restock(&scope, user_id, &input).await {
                Err(LedgerError::Store(StoreError::Conflict)) => {
                    if attempt >= self.config.max_txn_retries {
                        return Err(LedgerError::ConcurrentModification);
                    }
                    tracing::warn!(attempt, owner_id = %scope.owner_id, "restock conflict, retrying");
                }
                result => return result,
            }
        }
    }

    async fn try_restock(
        &self,
        scope: &OwnerScope,
        user_id: Uuid,
        input: &RestockInput,
    ) -> LedgerResult<StockBatch> {
        let batch = StockBatch::new(
            *scope,
            input.quantity,
            input.cost_price,
            input.provenance.clone(),
            input.notes.clone(),
        );
        let change = StockChange::for_batch(
            &batch,
            input.quantity,
            ChangeReason::Restock,
            input.cost_price,
            user_id,
        );

        let mut txn = self.store.begin().await?;
        txn.insert_batch(batch.clone()).await?;
        txn.append_change(change).await?;
        txn.commit().await?;

        Ok(batch)
    }

    /// Write off damaged stock against one batch
    ///
    /// Reduces physical stock without touching any supplier-debt-bearing
    /// field; damage does not reverse a purchase obligation.
    pub async fn write_off_damage(
        &self,
        tenant_id: Uuid,
        batch_id: Uuid,
        user_id: Uuid,
        input: DamageInput,
    ) -> LedgerResult<()> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_write_off(tenant_id, batch_id, user_id, &input).await {
                Err(LedgerError::Store(StoreError::Conflict)) => {
                    if attempt >= self.config.max_txn_retries {
                        return Err(LedgerError::ConcurrentModification);
                    }
                    tracing::warn!(attempt, %batch_id, "damage write-off conflict, retrying");
                }
                result => return result,
            }
        }
    }

    async fn try_write_off(
        &self,
        tenant_id: Uuid,
        batch_id: Uuid,
        user_id: Uuid,
        input: &DamageInput,
    ) -> LedgerResult<()> {
        let mut txn = self.store.begin().await?;
        let mut batch = txn
            .get_batch(tenant_id, batch_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("Batch {}", batch_id)))?;

        validate_damage_quantity(input.quantity, batch.remaining_quantity)
            .map_err(|msg| LedgerError::InvalidQuantity(msg.to_string()))?;

        batch.remaining_quantity -= input.quantity;
        if batch.remaining_quantity == 0 && batch.status == BatchStatus::Active {
            batch.status = BatchStatus::Depleted;
        }
        if input.notes.is_some() {
            batch.notes = input.notes.clone();
        }

        let change = StockChange::for_batch(
            &batch,
            -input.quantity,
            ChangeReason::Damage,
            batch.cost_price,
            user_id,
        );
        txn.update_batch(batch).await?;
        txn.append_change(change).await?;
        txn.commit().await?;

        Ok(())
    }

    /// Manually correct a batch's remaining quantity
    ///
    /// Marks the batch `Corrected` regardless of the resulting quantity;
    /// the status is sticky from then on.
    pub async fn correct_quantity(
        &self,
        tenant_id: Uuid,
        batch_id: Uuid,
        user_id: Uuid,
        input: CorrectQuantityInput,
    ) -> LedgerResult<()> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .try_correct_quantity(tenant_id, batch_id, user_id, &input)
                .await
            {
                Err(LedgerError::Store(StoreError::Conflict)) => {
                    if attempt >= self.config.max_txn_retries {
                        return Err(LedgerError::ConcurrentModification);
                    }
                    tracing::warn!(attempt, %batch_id, "quantity correction conflict, retrying");
                }
                result => return result,
            }
        }
    }

    async fn try_correct_quantity(
        &self,
        tenant_id: Uuid,
        batch_id: Uuid,
        user_id: Uuid,
        input: &CorrectQuantityInput,
    ) -> LedgerResult<()> {
        let mut txn = self.store.begin().await?;
        let mut batch = txn
            .get_batch(tenant_id, batch_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("Batch {}", batch_id)))?;

        validate_corrected_quantity(
            input.new_remaining_quantity,
            batch.quantity,
            input.redefine_quantity,
        )
        .map_err(|msg| LedgerError::InvalidCorrection(msg.to_string()))?;

        let delta = input.new_remaining_quantity - batch.remaining_quantity;
        batch.remaining_quantity = input.new_remaining_quantity;
        if input.redefine_quantity && input.new_remaining_quantity > batch.quantity {
            batch.quantity = input.new_remaining_quantity;
        }
        batch.status = BatchStatus::Corrected;
        if input.notes.is_some() {
            batch.notes = input.notes.clone();
        }

        let change = StockChange::for_batch(
            &batch,
            delta,
            ChangeReason::ManualCorrection,
            batch.cost_price,
            user_id,
        );
        txn.update_batch(batch).await?;
        txn.append_change(change).await?;
        txn.commit().await?;

        Ok(())
    }

    /// Rewrite a batch's cost price, leaving quantities untouched
    ///
    /// A zero-quantity audit record is appended purely to preserve the
    /// trail of cost changes.
    pub async fn correct_cost_price(
        &self,
        tenant_id: Uuid,
        batch_id: Uuid,
        user_id: Uuid,
        new_cost_price: Decimal,
    ) -> LedgerResult<()> {
        validate_cost_price(new_cost_price)
            .map_err(|msg| LedgerError::InvalidCorrection(msg.to_string()))?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .try_correct_cost_price(tenant_id, batch_id, user_id, new_cost_price)
                .await
            {
                Err(LedgerError::Store(StoreError::Conflict)) => {
                    if attempt >= self.config.max_txn_retries {
                        return Err(LedgerError::ConcurrentModification);
                    }
                    tracing::warn!(attempt, %batch_id, "cost correction conflict, retrying");
                }
                result => return result,
            }
        }
    }

    async fn try_correct_cost_price(
        &self,
        tenant_id: Uuid,
        batch_id: Uuid,
        user_id: Uuid,
        new_cost_price: Decimal,
    ) -> LedgerResult<()> {
        let mut txn = self.store.begin().await?;
        let mut batch = txn
            .get_batch(tenant_id, batch_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("Batch {}", batch_id)))?;

        batch.cost_price = new_cost_price;

        let change = StockChange::for_batch(
            &batch,
            0,
            ChangeReason::CostCorrection,
            new_cost_price,
            user_id,
        );
        txn.update_batch(batch).await?;
        txn.append_change(change).await?;
        txn.commit().await?;

        Ok(())
    }
}
