//! Client Model

use serde::{Deserialize, Serialize};

/// Client classification, supplied by the client subsystem
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ClientKind {
    New,
    Regular,
    Vip,
}

/// Client-side context for evaluating one promotion against one order
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClientContext {
    pub kind: ClientKind,
    pub is_first_order: bool,
    /// This client's prior redemptions of the promotion under evaluation
    pub prior_uses: i64,
}
