//! Redemption Ledger Model

use serde::{Deserialize, Serialize};

/// Redemption ledger row, exactly one per confirmed order
///
/// The UNIQUE order_id column is the idempotency guard: replaying a redeem
/// for the same order returns this row instead of consuming another use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Redemption {
    pub id: i64,
    pub promotion_id: i64,
    pub order_id: i64,
    pub client_id: i64,
    pub discount_amount: f64,
    pub order_amount: f64,
    pub redeemed_at: i64,
}
