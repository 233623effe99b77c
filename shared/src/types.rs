//! Common types used across the ledger

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inventory class a batch belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Product,
    Material,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Product => "product",
            OwnerKind::Material => "material",
        }
    }
}

impl std::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tenant-scoped reference to the product or material a batch belongs to
///
/// Every ledger operation is scoped to exactly one tenant; the scope is the
/// unit of contention for concurrent writers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct OwnerScope {
    pub tenant_id: Uuid,
    pub owner_kind: OwnerKind,
    pub owner_id: Uuid,
}

impl OwnerScope {
    pub fn new(tenant_id: Uuid, owner_kind: OwnerKind, owner_id: Uuid) -> Self {
        Self {
            tenant_id,
            owner_kind,
            owner_id,
        }
    }
}

/// Provenance and financing metadata carried by a batch
///
/// Orthogonal to quantity bookkeeping but mirrored onto audit records for
/// downstream debt accounting.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provenance {
    pub supplier_id: Option<Uuid>,
    pub is_own_purchase: bool,
    pub is_credit: bool,
}

/// Costing policy used to pick which batches a consumption draws from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CostingMethod {
    Fifo,
    Lifo,
    /// Weighted-average costing (CMUP): one blended unit cost across all
    /// active batches instead of each batch's own cost.
    WeightedAverage,
}

impl CostingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostingMethod::Fifo => "fifo",
            CostingMethod::Lifo => "lifo",
            CostingMethod::WeightedAverage => "weighted_average",
        }
    }
}
