//! Stock batch model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{OwnerKind, OwnerScope, Provenance};

/// Lifecycle status of a batch
///
/// Derived state kept for query efficiency: it can always be recomputed
/// from `(remaining_quantity, correction history)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Active,
    Depleted,
    /// A manual correction touched this batch. Sticky: the batch stays
    /// `Corrected` even if later replenished or drawn down to zero.
    Corrected,
}

impl BatchStatus {
    /// Recompute the status a batch should carry, for reconciliation jobs.
    pub fn derive(remaining_quantity: i64, was_corrected: bool) -> Self {
        if was_corrected {
            BatchStatus::Corrected
        } else if remaining_quantity == 0 {
            BatchStatus::Depleted
        } else {
            BatchStatus::Active
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Active => write!(f, "Active"),
            BatchStatus::Depleted => write!(f, "Depleted"),
            BatchStatus::Corrected => write!(f, "Corrected"),
        }
    }
}

/// An immutable-origin, mutably-depleted lot of inventory
///
/// `quantity` is the original lot size and never changes outside an explicit
/// quantity redefinition; `remaining_quantity` is drawn down by consumption
/// and damage. Invariant: `0 <= remaining_quantity <= quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockBatch {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub owner_kind: OwnerKind,
    pub owner_id: Uuid,
    /// Original lot size at creation time
    pub quantity: i64,
    /// Current undepleted amount
    pub remaining_quantity: i64,
    /// Unit cost recorded at creation, rewritten only by cost correction
    pub cost_price: Decimal,
    pub status: BatchStatus,
    pub supplier_id: Option<Uuid>,
    pub is_own_purchase: bool,
    pub is_credit: bool,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl StockBatch {
    /// Create a fresh, untouched batch for an owner
    pub fn new(
        scope: OwnerScope,
        quantity: i64,
        cost_price: Decimal,
        provenance: Provenance,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            owner_kind: scope.owner_kind,
            owner_id: scope.owner_id,
            quantity,
            remaining_quantity: quantity,
            cost_price,
            status: BatchStatus::Active,
            supplier_id: provenance.supplier_id,
            is_own_purchase: provenance.is_own_purchase,
            is_credit: provenance.is_credit,
            created_at: Utc::now(),
            notes,
        }
    }

    /// Scope this batch belongs to
    pub fn scope(&self) -> OwnerScope {
        OwnerScope::new(self.tenant_id, self.owner_kind, self.owner_id)
    }

    /// Provenance metadata mirrored onto audit records
    pub fn provenance(&self) -> Provenance {
        Provenance {
            supplier_id: self.supplier_id,
            is_own_purchase: self.is_own_purchase,
            is_credit: self.is_credit,
        }
    }

    /// Whether a costing policy may draw from this batch
    pub fn is_consumable(&self) -> bool {
        self.status == BatchStatus::Active && self.remaining_quantity > 0
    }

    /// Whether the batch has never been touched since creation
    pub fn is_untouched(&self) -> bool {
        self.remaining_quantity == self.quantity && self.status == BatchStatus::Active
    }
}
