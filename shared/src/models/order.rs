//! Order Snapshot Model
//!
//! Read-only input supplied by the order subsystem. The promotion engine
//! never loads orders itself; it evaluates whatever snapshot it is handed.

use serde::{Deserialize, Serialize};

use crate::models::ClientKind;

/// Item reference for eligibility-scope matching
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: i64,
    /// Category of the product (from catalog metadata; None if uncategorized)
    pub category_id: Option<i64>,
}

/// Snapshot of a candidate order at evaluation time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub order_id: i64,
    pub client_id: i64,
    /// Order total before any promotion
    pub amount: f64,
    pub client_kind: ClientKind,
    pub is_first_order: bool,
    pub items: Vec<OrderItem>,
    /// Evaluation timestamp (Unix millis), explicit for testability
    pub placed_at: i64,
}
