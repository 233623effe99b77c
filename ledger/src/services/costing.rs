//! Costing policies
//!
//! Pure functions selecting which batches a consumption draws from and in
//! what order. Only active batches with stock left are candidates; ties on
//! `created_at` break on `id` ascending so plans are reproducible.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{CostingMethod, StockBatch};
use uuid::Uuid;

/// One line of a draw plan: a quantity taken from one batch at a unit cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawLine {
    pub batch_id: Uuid,
    pub quantity: i64,
    pub unit_cost: Decimal,
}

/// Ordered multi-batch draw produced by a costing policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawPlan {
    pub lines: Vec<DrawLine>,
}

impl DrawPlan {
    pub fn total_drawn(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total_cost(&self) -> Decimal {
        self.lines
            .iter()
            .map(|l| Decimal::from(l.quantity) * l.unit_cost)
            .sum()
    }
}

/// Select batches to satisfy `requested` under the given policy
///
/// The plan's total draw is at most `requested`; a short plan means the
/// owner does not hold enough stock and the caller must fail without
/// writing anything.
pub fn select_batches(
    method: CostingMethod,
    candidates: &[StockBatch],
    requested: i64,
) -> DrawPlan {
    let mut pool: Vec<&StockBatch> = candidates.iter().filter(|b| b.is_consumable()).collect();
    pool.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

    match method {
        CostingMethod::Fifo => greedy_draw(&pool, requested),
        CostingMethod::Lifo => {
            pool.reverse();
            greedy_draw(&pool, requested)
        }
        CostingMethod::WeightedAverage => proportional_draw(&pool, requested),
    }
}

/// Total quantity the policies can draw from for an owner's batch set
pub fn available_quantity(candidates: &[StockBatch]) -> i64 {
    candidates
        .iter()
        .filter(|b| b.is_consumable())
        .map(|b| b.remaining_quantity)
        .sum()
}

/// Greedily drain batches in pool order, each at its own cost price
fn greedy_draw(pool: &[&StockBatch], requested: i64) -> DrawPlan {
    let mut plan = DrawPlan::default();
    let mut left = requested;

    for batch in pool {
        if left == 0 {
            break;
        }
        let take = left.min(batch.remaining_quantity);
        plan.lines.push(DrawLine {
            batch_id: batch.id,
            quantity: take,
            unit_cost: batch.cost_price,
        });
        left -= take;
    }

    plan
}

/// CMUP: draw proportionally from every candidate, reporting one blended
/// unit cost on every line
///
/// Each batch gets the floor of its proportional share; the integer
/// remainder is handed out in pool order to batches with capacity left.
fn proportional_draw(pool: &[&StockBatch], requested: i64) -> DrawPlan {
    let available: i64 = pool.iter().map(|b| b.remaining_quantity).sum();
    if available == 0 {
        return DrawPlan::default();
    }

    let weighted_cost = weighted_unit_cost(pool, available);
    let target = requested.min(available);

    let mut shares: Vec<i64> = pool
        .iter()
        .map(|b| {
            // i128 keeps the product from overflowing for large lots
            let share = (target as i128 * b.remaining_quantity as i128) / available as i128;
            share as i64
        })
        .collect();

    let mut remainder = target - shares.iter().sum::<i64>();
    for (share, batch) in shares.iter_mut().zip(pool) {
        if remainder == 0 {
            break;
        }
        let top_up = remainder.min(batch.remaining_quantity - *share);
        *share += top_up;
        remainder -= top_up;
    }

    let lines = shares
        .into_iter()
        .zip(pool)
        .filter(|(share, _)| *share > 0)
        .map(|(share, batch)| DrawLine {
            batch_id: batch.id,
            quantity: share,
            unit_cost: weighted_cost,
        })
        .collect();

    DrawPlan { lines }
}

/// `sum(remaining_i * cost_i) / sum(remaining_i)` over the candidate pool
fn weighted_unit_cost(pool: &[&StockBatch], available: i64) -> Decimal {
    let value: Decimal = pool
        .iter()
        .map(|b| Decimal::from(b.remaining_quantity) * b.cost_price)
        .sum();
    value / Decimal::from(available)
}
