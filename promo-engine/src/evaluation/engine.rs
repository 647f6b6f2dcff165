//! Promotion Engine
//!
//! Facade wiring the repositories to the pure evaluation layer.
//! `validate` is the side-effect-free checkout preview; `redeem` is the
//! transactional, exactly-once-per-order consumption.

use shared::models::{
    ClientContext, EligibilityResult, OrderSnapshot, PromotionStatus, PromotionWithStatus,
    Redemption, RejectionReason,
};
use shared::{AppError, AppResult, ErrorCode};
use sqlx::{SqliteConnection, SqlitePool};

use super::{calculator, matcher};
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{promotion, redemption};
use crate::money;

/// Promotion Engine: evaluation and redemption over a database pool
#[derive(Clone)]
pub struct PromotionEngine {
    pool: SqlitePool,
    config: Config,
}

impl std::fmt::Debug for PromotionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromotionEngine")
            .field("config", &self.config)
            .finish()
    }
}

impl PromotionEngine {
    /// Create an engine over an initialized database
    pub fn new(db: &DbService, config: Config) -> Self {
        Self {
            pool: db.pool.clone(),
            config,
        }
    }

    /// The underlying pool. Admin CRUD goes straight to the repositories
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Read-only eligibility preview for the cart / checkout page.
    ///
    /// Never writes: calling it repeatedly with identical inputs yields
    /// identical results. Rejections come back as a result with the
    /// user-facing reason and an unmodified total, not as errors.
    pub async fn validate(
        &self,
        code: &str,
        order: &OrderSnapshot,
    ) -> AppResult<EligibilityResult> {
        money::validate_order_amount(order.amount)?;

        let Some(promotion) = promotion::find_by_code(&self.pool, code).await? else {
            return Ok(EligibilityResult::rejected(
                RejectionReason::NotFound,
                order.amount,
                None,
            ));
        };

        let prior_uses =
            redemption::count_for_client(&self.pool, promotion.id, order.client_id).await?;
        let client = ClientContext {
            kind: order.client_kind,
            is_first_order: order.is_first_order,
            prior_uses,
        };

        match matcher::resolve(&promotion, order, &client) {
            Err(reason) => {
                tracing::debug!(code, reason = ?reason, "Promotion rejected");
                Ok(EligibilityResult::rejected(
                    reason,
                    order.amount,
                    Some(promotion.id),
                ))
            }
            Ok(()) => {
                let discount =
                    calculator::compute_discount(&promotion, order.amount, self.config.shipping_fee);
                let new_total = money::to_decimal(order.amount) - discount;
                Ok(EligibilityResult::eligible(
                    promotion.id,
                    money::to_f64(discount),
                    money::to_f64(new_total),
                ))
            }
        }
    }

    /// Redeem a promotion for a confirmed order: transactional, exactly
    /// once per order id.
    ///
    /// The whole read-check-increment sequence runs inside one immediate
    /// write transaction, so concurrent redemptions serialize and the
    /// usage-limit check cannot be raced past. Replaying the same order id
    /// returns the original ledger row without consuming another use.
    ///
    /// Failures roll the transaction back. `PromotionExhausted` and database
    /// contention are retryable at the order-confirmation layer; every other
    /// rejection is terminal for this code.
    pub async fn redeem(&self, code: &str, order: &OrderSnapshot) -> AppResult<Redemption> {
        money::validate_order_amount(order.amount)?;

        let mut conn = self.pool.acquire().await.map_err(db_err)?;

        // Immediate transaction: take the write lock before the first read
        // so check-then-increment is serialized across redeemers.
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(db_err)?;

        let result = self.redeem_in_tx(&mut conn, code, order).await;

        match &result {
            Ok(_) => {
                if let Err(e) = sqlx::query("COMMIT").execute(&mut *conn).await {
                    let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                    return Err(db_err(e));
                }
            }
            Err(_) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
            }
        }

        result
    }

    async fn redeem_in_tx(
        &self,
        conn: &mut SqliteConnection,
        code: &str,
        order: &OrderSnapshot,
    ) -> AppResult<Redemption> {
        // Replay guard first: a confirmed order keeps its original redemption
        // even if the promotion has expired since
        if let Some(existing) = redemption::find_by_order(&mut *conn, order.order_id).await? {
            let original = promotion::find_by_id(&mut *conn, existing.promotion_id).await?;
            if original.is_some_and(|p| p.code == code) {
                tracing::info!(
                    code,
                    order_id = order.order_id,
                    "Redeem replay, returning existing ledger row"
                );
                return Ok(existing);
            }
            return Err(AppError::with_message(
                ErrorCode::OrderAlreadyRedeemed,
                format!(
                    "Order {} already redeemed a different promotion",
                    order.order_id
                ),
            ));
        }

        let promotion = promotion::find_by_code(&mut *conn, code)
            .await?
            .ok_or_else(|| RejectionReason::NotFound.into_app_error())?;

        let prior_uses =
            redemption::count_for_client(&mut *conn, promotion.id, order.client_id).await?;
        let client = ClientContext {
            kind: order.client_kind,
            is_first_order: order.is_first_order,
            prior_uses,
        };

        matcher::resolve(&promotion, order, &client).map_err(RejectionReason::into_app_error)?;

        let discount = money::to_f64(calculator::compute_discount(
            &promotion,
            order.amount,
            self.config.shipping_fee,
        ));
        let now = shared::util::now_millis();

        let ledger_row = Redemption {
            id: shared::util::snowflake_id(),
            promotion_id: promotion.id,
            order_id: order.order_id,
            client_id: order.client_id,
            discount_amount: discount,
            order_amount: order.amount,
            redeemed_at: now,
        };
        if !redemption::insert(&mut *conn, &ledger_row).await? {
            // Unreachable under the replay guard above; kept as a hard stop
            return Err(AppError::with_message(
                ErrorCode::OrderAlreadyRedeemed,
                format!("Order {} already redeemed a promotion", order.order_id),
            ));
        }

        // Conditional counter bump, the second safeguard against racing
        // past max_uses
        if !promotion::record_redemption(&mut *conn, promotion.id, discount, now).await? {
            return Err(RejectionReason::Exhausted.into_app_error());
        }

        tracing::info!(code, order_id = order.order_id, discount, "Promotion redeemed");
        Ok(ledger_row)
    }

    /// Derived status of a promotion code right now (None for unknown codes)
    pub async fn promotion_status(&self, code: &str) -> AppResult<Option<PromotionStatus>> {
        let promotion = promotion::find_by_code(&self.pool, code).await?;
        Ok(promotion.map(|p| p.status_at(shared::util::now_millis())))
    }

    /// All promotions with their derived status, for the back office
    pub async fn list_with_status(&self) -> AppResult<Vec<PromotionWithStatus>> {
        let now = shared::util::now_millis();
        let rows = promotion::find_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|p| {
                let status = p.status_at(now);
                PromotionWithStatus {
                    promotion: p,
                    status,
                }
            })
            .collect())
    }
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::database(e.to_string())
}
