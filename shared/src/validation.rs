//! Validation utilities for the stock batch ledger
//!
//! Pure checks returning `Result<(), &'static str>`; the engine maps
//! failures onto its typed error taxonomy.

use rust_decimal::Decimal;

// ============================================================================
// Quantity Validations
// ============================================================================

/// Validate a quantity that must be strictly positive (restock, consumption)
pub fn validate_positive_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a damage write-off against the batch's remaining quantity
pub fn validate_damage_quantity(quantity: i64, remaining: i64) -> Result<(), &'static str> {
    validate_positive_quantity(quantity)?;
    if quantity > remaining {
        return Err("Damage quantity exceeds remaining quantity");
    }
    Ok(())
}

/// Validate a manual correction target
///
/// Raising the target above the original lot size requires the explicit
/// quantity-redefinition flag; silent inflation is rejected.
pub fn validate_corrected_quantity(
    new_remaining: i64,
    original_quantity: i64,
    redefine_quantity: bool,
) -> Result<(), &'static str> {
    if new_remaining < 0 {
        return Err("Corrected quantity cannot be negative");
    }
    if new_remaining > original_quantity && !redefine_quantity {
        return Err("Corrected quantity exceeds the original lot size");
    }
    Ok(())
}

// ============================================================================
// Cost Validations
// ============================================================================

/// Validate a unit cost price (zero is allowed, e.g. for free samples)
pub fn validate_cost_price(cost_price: Decimal) -> Result<(), &'static str> {
    if cost_price < Decimal::ZERO {
        return Err("Cost price cannot be negative");
    }
    Ok(())
}
