//! Money calculation utilities using rust_decimal for precision
//!
//! All discount arithmetic is done with `Decimal` internally, then converted
//! to `f64` for storage/serialization. Inputs are validated for finiteness
//! at the boundary.

use rust_decimal::prelude::*;
use shared::{AppError, ErrorCode};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed order amount (€1,000,000)
pub const MAX_ORDER_AMOUNT: f64 = 1_000_000.0;

/// Maximum allowed fixed-amount promotion value (€100,000)
pub const MAX_PROMOTION_VALUE: f64 = 100_000.0;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{} must be a finite number, got {}", field_name, value),
        ));
    }
    Ok(())
}

/// Validate an order amount before evaluation
pub fn validate_order_amount(amount: f64) -> Result<(), AppError> {
    require_finite(amount, "order amount")?;
    if amount < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::OrderInvalidAmount,
            format!("order amount must be non-negative, got {}", amount),
        ));
    }
    if amount > MAX_ORDER_AMOUNT {
        return Err(AppError::with_message(
            ErrorCode::OrderInvalidAmount,
            format!(
                "order amount exceeds maximum allowed ({}), got {}",
                MAX_ORDER_AMOUNT, amount
            ),
        ));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
///
/// Input values should be pre-validated via `require_finite()` at the
/// boundary. If NaN/Infinity somehow reaches here, logs an error and returns
/// ZERO to avoid silent data corruption in financial calculations.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round a monetary Decimal to 2 decimal places, half-up
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value)
        .to_f64()
        // SAFETY: Decimal rounded to 2dp with max input ≤ 1_000_000 (validated at boundary)
        // is always within f64 representable range (~1.8e308)
        .expect("Decimal rounded to 2dp is always representable as f64")
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}
