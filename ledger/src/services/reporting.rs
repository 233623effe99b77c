//! Aggregation and reporting
//!
//! Derived stock totals and listings. Batches are the source of truth:
//! every figure here is recomputed from the batch set on demand, so two
//! calls with no intervening mutation always agree.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{BatchStatus, OwnerScope, StockBatch, StockChange};
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::store::{BatchStore, BatchTxn};

/// Derived stock figures for one owner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockSummary {
    /// Current undepleted amount over all batches, any status
    pub remaining: i64,
    /// Sum of original lot sizes, used only for display ratios
    pub total: i64,
    pub active_count: i64,
    pub depleted_count: i64,
    /// Weighted average cost of the remaining stock; this figure feeds
    /// downstream cost-of-goods and profit calculations
    pub average_cost: Decimal,
}

/// Tenant-wide portfolio statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioStats {
    pub total_stock_value: Decimal,
    pub average_cost_price: Decimal,
    pub batch_count: i64,
}

/// Reporting service computing derived totals from the batch set
#[derive(Clone)]
pub struct ReportingService<S> {
    store: S,
}

impl<S: BatchStore> ReportingService<S> {
    /// Create a new ReportingService instance
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Compute current stock figures for an owner
    pub async fn aggregate(&self, scope: OwnerScope) -> LedgerResult<StockSummary> {
        let mut txn = self.store.begin().await?;
        let batches = txn.batches_for_owner(&scope).await?;
        Ok(summarize(&batches))
    }

    /// Portfolio statistics across every owner of one tenant
    pub async fn portfolio(&self, tenant_id: Uuid) -> LedgerResult<PortfolioStats> {
        let mut txn = self.store.begin().await?;
        let batches = txn.batches_for_tenant(tenant_id).await?;

        let remaining: i64 = batches.iter().map(|b| b.remaining_quantity).sum();
        let total_stock_value: Decimal = batches
            .iter()
            .map(|b| Decimal::from(b.remaining_quantity) * b.cost_price)
            .sum();
        let average_cost_price = if remaining == 0 {
            Decimal::ZERO
        } else {
            total_stock_value / Decimal::from(remaining)
        };

        Ok(PortfolioStats {
            total_stock_value,
            average_cost_price,
            batch_count: batches.len() as i64,
        })
    }

    /// List an owner's batches, oldest first, optionally filtered by status
    pub async fn list_batches(
        &self,
        scope: OwnerScope,
        status_filter: Option<BatchStatus>,
    ) -> LedgerResult<Vec<StockBatch>> {
        let mut txn = self.store.begin().await?;
        let batches = txn.batches_for_owner(&scope).await?;
        Ok(match status_filter {
            Some(status) => batches.into_iter().filter(|b| b.status == status).collect(),
            None => batches,
        })
    }

    /// List an owner's stock changes, newest first
    pub async fn list_changes(&self, scope: OwnerScope) -> LedgerResult<Vec<StockChange>> {
        let mut txn = self.store.begin().await?;
        Ok(txn.changes_for_owner(&scope).await?)
    }
}

/// Fold a batch set into its derived summary
fn summarize(batches: &[StockBatch]) -> StockSummary {
    let remaining: i64 = batches.iter().map(|b| b.remaining_quantity).sum();
    let total: i64 = batches.iter().map(|b| b.quantity).sum();
    let active_count = batches
        .iter()
        .filter(|b| b.status == BatchStatus::Active)
        .count() as i64;
    let depleted_count = batches
        .iter()
        .filter(|b| b.status == BatchStatus::Depleted)
        .count() as i64;

    let average_cost = if remaining == 0 {
        Decimal::ZERO
    } else {
        let value: Decimal = batches
            .iter()
            .map(|b| Decimal::from(b.remaining_quantity) * b.cost_price)
            .sum();
        value / Decimal::from(remaining)
    };

    StockSummary {
        remaining,
        total,
        active_count,
        depleted_count,
        average_cost,
    }
}
