//! Consumption engine
//!
//! Drives multi-batch depletion for a requested quantity under a costing
//! policy. The only operation whose transaction legitimately spans multiple
//! batch rows; everything is validated against the transaction's read
//! snapshot before the first write is staged, so an insufficient request
//! fails without mutating any batch.

use std::collections::HashMap;

use anyhow::anyhow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    validate_positive_quantity, BatchStatus, ConsumptionReason, CostingMethod, OwnerScope,
    StockChange,
};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::services::costing::{self, DrawPlan};
use crate::store::{BatchStore, BatchTxn, StoreError};

/// Input for a policy-driven consumption
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumeInput {
    pub quantity: i64,
    pub method: CostingMethod,
    pub reason: ConsumptionReason,
}

/// Per-batch cost breakdown returned to the caller
///
/// Downstream debt/ledger effects are the caller's responsibility, driven
/// off this breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct ConsumptionResult {
    pub draw_plan: DrawPlan,
    pub total_cost: Decimal,
}

/// Consumption service depleting batches under a costing policy
#[derive(Clone)]
pub struct ConsumptionService<S> {
    store: S,
    config: LedgerConfig,
}

impl<S: BatchStore> ConsumptionService<S> {
    /// Create a new ConsumptionService instance
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Consume `input.quantity` units from an owner's batches
    ///
    /// Transaction conflicts are retried with a fresh read up to the
    /// configured bound, then surfaced as `ConcurrentModification`.
    pub async fn consume(
        &self,
        scope: OwnerScope,
        user_id: Uuid,
        input: ConsumeInput,
    ) -> LedgerResult<ConsumptionResult> {
        validate_positive_quantity(input.quantity)
            .map_err(|msg| LedgerError::InvalidQuantity(msg.to_string()))?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_consume(&scope, user_id, &input).await {
                Err(LedgerError::Store(StoreError::Conflict)) => {
                    if attempt >= self.config.max_txn_retries {
                        return Err(LedgerError::ConcurrentModification);
                    }
                    tracing::warn!(attempt, owner_id = %scope.owner_id, "consumption conflict, retrying");
                }
                result => return result,
            }
        }
    }

    async fn try_consume(
        &self,
        scope: &OwnerScope,
        user_id: Uuid,
        input: &ConsumeInput,
    ) -> LedgerResult<ConsumptionResult> {
        let mut txn = self.store.begin().await?;

        let batches = txn.batches_for_owner(scope).await?;
        if batches.is_empty() {
            return Err(LedgerError::NotFound(format!(
                "{} {}",
                scope.owner_kind, scope.owner_id
            )));
        }

        let plan = costing::select_batches(input.method, &batches, input.quantity);
        if plan.total_drawn() < input.quantity {
            let available = costing::available_quantity(&batches);
            tracing::debug!(
                requested = input.quantity,
                available,
                owner_id = %scope.owner_id,
                "insufficient stock, no batch mutated"
            );
            return Err(LedgerError::InsufficientStock {
                requested: input.quantity,
                available,
            });
        }

        let reason = input.reason.as_change_reason();
        let mut by_id: HashMap<Uuid, _> = batches.into_iter().map(|b| (b.id, b)).collect();

        for line in &plan.lines {
            let batch = by_id
                .get_mut(&line.batch_id)
                .ok_or_else(|| anyhow!("draw plan referenced unknown batch {}", line.batch_id))?;

            batch.remaining_quantity -= line.quantity;
            if batch.remaining_quantity == 0 && batch.status == BatchStatus::Active {
                batch.status = BatchStatus::Depleted;
            }

            let change =
                StockChange::for_batch(batch, -line.quantity, reason, line.unit_cost, user_id);
            txn.update_batch(batch.clone()).await?;
            txn.append_change(change).await?;
        }

        txn.commit().await?;

        let total_cost = plan.total_cost();
        Ok(ConsumptionResult {
            draw_plan: plan,
            total_cost,
        })
    }
}
