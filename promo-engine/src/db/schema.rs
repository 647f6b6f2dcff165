//! Database Schema
//!
//! Idempotent table creation, applied on every startup.

use shared::AppError;
use sqlx::SqlitePool;

/// Promotion table
///
/// `code` is BINARY-collated TEXT: lookups are case-sensitive on purpose.
/// `eligibility` and `valid_weekdays` are JSON columns.
const CREATE_PROMOTION: &str = "CREATE TABLE IF NOT EXISTS promotion (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT,
    kind TEXT NOT NULL,
    value REAL NOT NULL,
    min_order_amount REAL,
    max_discount REAL,
    starts_at INTEGER NOT NULL,
    ends_at INTEGER NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    max_uses INTEGER,
    per_client_max_uses INTEGER NOT NULL DEFAULT 1,
    current_uses INTEGER NOT NULL DEFAULT 0,
    audience TEXT NOT NULL DEFAULT 'ALL',
    eligibility TEXT NOT NULL DEFAULT '{\"kind\":\"ALL_PRODUCTS\"}',
    valid_weekdays TEXT,
    is_stackable INTEGER NOT NULL DEFAULT 0,
    first_order_only INTEGER NOT NULL DEFAULT 0,
    show_on_site INTEGER NOT NULL DEFAULT 0,
    notify_email INTEGER NOT NULL DEFAULT 0,
    notify_sms INTEGER NOT NULL DEFAULT 0,
    theme_color TEXT,
    image_path TEXT,
    accrued_revenue REAL NOT NULL DEFAULT 0,
    accrued_orders INTEGER NOT NULL DEFAULT 0,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_by INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)";

/// Redemption ledger
///
/// UNIQUE(order_id) ties each redemption 1:1 to a confirmed order and makes
/// redeem replays no-ops.
const CREATE_REDEMPTION: &str = "CREATE TABLE IF NOT EXISTS redemption (
    id INTEGER PRIMARY KEY,
    promotion_id INTEGER NOT NULL REFERENCES promotion(id),
    order_id INTEGER NOT NULL UNIQUE,
    client_id INTEGER NOT NULL,
    discount_amount REAL NOT NULL,
    order_amount REAL NOT NULL,
    redeemed_at INTEGER NOT NULL
)";

/// Per-client usage lookups during gating
const CREATE_REDEMPTION_CLIENT_INDEX: &str = "CREATE INDEX IF NOT EXISTS \
    idx_redemption_promotion_client ON redemption (promotion_id, client_id)";

/// Apply the schema to a fresh or existing database
pub async fn init(pool: &SqlitePool) -> Result<(), AppError> {
    for statement in [
        CREATE_PROMOTION,
        CREATE_REDEMPTION,
        CREATE_REDEMPTION_CLIENT_INDEX,
    ] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;
    }
    Ok(())
}
