//! Redemption Repository
//!
//! The redemption ledger ties each promotion use 1:1 to a confirmed order.
//! UNIQUE(order_id) makes replays detectable: `insert` reports whether the
//! row was actually written.

use super::RepoResult;
use shared::models::Redemption;
use sqlx::{SqliteExecutor, SqlitePool};

const REDEMPTION_SELECT: &str = "SELECT id, promotion_id, order_id, client_id, \
    discount_amount, order_amount, redeemed_at FROM redemption";

/// Find the redemption recorded for an order, if any
pub async fn find_by_order(
    executor: impl SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Option<Redemption>> {
    let sql = format!("{} WHERE order_id = ?", REDEMPTION_SELECT);
    let row = sqlx::query_as::<_, Redemption>(&sql)
        .bind(order_id)
        .fetch_optional(executor)
        .await?;
    Ok(row)
}

/// Redemption history of a promotion, newest first
pub async fn find_by_promotion(
    pool: &SqlitePool,
    promotion_id: i64,
) -> RepoResult<Vec<Redemption>> {
    let sql = format!(
        "{} WHERE promotion_id = ? ORDER BY redeemed_at DESC",
        REDEMPTION_SELECT
    );
    let rows = sqlx::query_as::<_, Redemption>(&sql)
        .bind(promotion_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// How many times a client has redeemed a promotion
pub async fn count_for_client(
    executor: impl SqliteExecutor<'_>,
    promotion_id: i64,
    client_id: i64,
) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM redemption WHERE promotion_id = ? AND client_id = ?",
    )
    .bind(promotion_id)
    .bind(client_id)
    .fetch_one(executor)
    .await?;
    Ok(count)
}

/// Insert a ledger row
///
/// INSERT OR IGNORE on the UNIQUE order_id: returns false when the order
/// already has a redemption, leaving the original row untouched.
pub async fn insert(executor: impl SqliteExecutor<'_>, r: &Redemption) -> RepoResult<bool> {
    let rows = sqlx::query(
        "INSERT OR IGNORE INTO redemption (id, promotion_id, order_id, client_id, \
         discount_amount, order_amount, redeemed_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(r.id)
    .bind(r.promotion_id)
    .bind(r.order_id)
    .bind(r.client_id)
    .bind(r.discount_amount)
    .bind(r.order_amount)
    .bind(r.redeemed_at)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}
