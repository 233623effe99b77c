//! Stock change audit records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::StockBatch;
use crate::types::OwnerKind;

/// Enumerated cause of a stock change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeReason {
    Restock,
    SaleConsumption,
    DirectConsumption,
    Damage,
    ManualCorrection,
    CostCorrection,
}

impl ChangeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeReason::Restock => "restock",
            ChangeReason::SaleConsumption => "sale-consumption",
            ChangeReason::DirectConsumption => "direct-consumption",
            ChangeReason::Damage => "damage",
            ChangeReason::ManualCorrection => "manual-correction",
            ChangeReason::CostCorrection => "cost-correction",
        }
    }
}

/// Why a consumption was requested
///
/// The only two reasons a caller may attach to policy-driven consumption;
/// the remaining [`ChangeReason`] variants belong to other operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionReason {
    Sale,
    Direct,
}

impl ConsumptionReason {
    pub fn as_change_reason(&self) -> ChangeReason {
        match self {
            ConsumptionReason::Sale => ChangeReason::SaleConsumption,
            ConsumptionReason::Direct => ChangeReason::DirectConsumption,
        }
    }
}

/// Append-only audit record of one quantity delta against one batch
///
/// `change` is signed: positive means added, negative means consumed or
/// removed. `cost_price` is the unit cost attributed to this change, which
/// under FIFO/LIFO can differ per line of a single consumption.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockChange {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub owner_kind: OwnerKind,
    pub owner_id: Uuid,
    pub batch_id: Uuid,
    pub change: i64,
    pub reason: ChangeReason,
    pub cost_price: Decimal,
    /// Actor who triggered the change
    pub user_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub is_own_purchase: bool,
    pub is_credit: bool,
    pub created_at: DateTime<Utc>,
}

impl StockChange {
    /// Record a delta against a batch, mirroring its provenance fields
    pub fn for_batch(
        batch: &StockBatch,
        change: i64,
        reason: ChangeReason,
        cost_price: Decimal,
        user_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: batch.tenant_id,
            owner_kind: batch.owner_kind,
            owner_id: batch.owner_id,
            batch_id: batch.id,
            change,
            reason,
            cost_price,
            user_id,
            supplier_id: batch.supplier_id,
            is_own_purchase: batch.is_own_purchase,
            is_credit: batch.is_credit,
            created_at: Utc::now(),
        }
    }
}
