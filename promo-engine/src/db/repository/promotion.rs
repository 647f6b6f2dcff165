//! Promotion Repository
//!
//! Persistence and invariant validation for promotion entities. Promotions
//! are soft-deleted so historical usage statistics survive removal from the
//! back office.

use super::{RepoError, RepoResult};
use crate::money::{MAX_ORDER_AMOUNT, MAX_PROMOTION_VALUE};
use shared::models::{DiscountKind, EligibilityScope, Promotion, PromotionCreate, PromotionUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const PROMOTION_SELECT: &str = "SELECT id, code, name, description, kind, value, \
    min_order_amount, max_discount, starts_at, ends_at, is_active, max_uses, \
    per_client_max_uses, current_uses, audience, eligibility, valid_weekdays, \
    is_stackable, first_order_only, show_on_site, notify_email, notify_sms, \
    theme_color, image_path, accrued_revenue, accrued_orders, is_deleted, \
    created_by, created_at, updated_at FROM promotion";

/// Length of auto-generated promotion codes
const CODE_LENGTH: usize = 8;

// ── Text length limits ───────────────────────────────────────

const MAX_NAME_LEN: usize = 200;
const MAX_CODE_LEN: usize = 32;
const MAX_NOTE_LEN: usize = 500;
const MAX_SHORT_TEXT_LEN: usize = 100;
const MAX_URL_LEN: usize = 2048;

/// Maximum promotion duration (365 days)
const MAX_DURATION_MS: i64 = 365 * 24 * 60 * 60 * 1000;

// ── Queries ──────────────────────────────────────────────────

/// Find all non-deleted promotions, newest first
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Promotion>> {
    let sql = format!(
        "{} WHERE is_deleted = 0 ORDER BY created_at DESC",
        PROMOTION_SELECT
    );
    let rows = sqlx::query_as::<_, Promotion>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Find a promotion by id (soft-deleted rows included, for history views)
pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<Promotion>> {
    let sql = format!("{} WHERE id = ?", PROMOTION_SELECT);
    let row = sqlx::query_as::<_, Promotion>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row)
}

/// Find a non-deleted promotion by code
///
/// The lookup is case-sensitive: SQLite TEXT compares with BINARY collation.
pub async fn find_by_code(
    executor: impl SqliteExecutor<'_>,
    code: &str,
) -> RepoResult<Option<Promotion>> {
    let sql = format!("{} WHERE code = ? AND is_deleted = 0", PROMOTION_SELECT);
    let row = sqlx::query_as::<_, Promotion>(&sql)
        .bind(code)
        .fetch_optional(executor)
        .await?;
    Ok(row)
}

/// Whether a code is taken by any promotion, soft-deleted ones included
/// (the UNIQUE constraint spans them)
async fn code_exists(pool: &SqlitePool, code: &str) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM promotion WHERE code = ?")
        .bind(code)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Generate a code no existing promotion uses
async fn generate_unique_code(pool: &SqlitePool) -> RepoResult<String> {
    for _ in 0..8 {
        let code = shared::util::promo_code(CODE_LENGTH);
        if !code_exists(pool, &code).await? {
            return Ok(code);
        }
    }
    Err(RepoError::Database(
        "Failed to generate a unique promotion code".to_string(),
    ))
}

/// Create a new promotion
///
/// Validates every invariant, rejects duplicate codes, and auto-generates a
/// code when the payload carries none.
pub async fn create(pool: &SqlitePool, data: PromotionCreate) -> RepoResult<Promotion> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    let code = match data.code {
        Some(code) => {
            let code = code.trim().to_string();
            if code_exists(pool, &code).await? {
                return Err(RepoError::Duplicate(format!(
                    "Promotion code '{}' already exists",
                    code
                )));
            }
            code
        }
        None => generate_unique_code(pool).await?,
    };

    let promotion = Promotion {
        id,
        code,
        name: data.name,
        description: data.description,
        kind: data.kind,
        value: data.value,
        min_order_amount: data.min_order_amount,
        max_discount: data.max_discount,
        starts_at: data.starts_at,
        ends_at: data.ends_at,
        is_active: true,
        max_uses: data.max_uses,
        per_client_max_uses: data.per_client_max_uses.unwrap_or(1),
        current_uses: 0,
        audience: data.audience.unwrap_or(shared::models::Audience::All),
        eligibility: data.eligibility.unwrap_or_default(),
        valid_weekdays: data.valid_weekdays,
        is_stackable: data.is_stackable.unwrap_or(false),
        first_order_only: data.first_order_only.unwrap_or(false),
        show_on_site: data.show_on_site.unwrap_or(false),
        notify_email: data.notify_email.unwrap_or(false),
        notify_sms: data.notify_sms.unwrap_or(false),
        theme_color: data.theme_color,
        image_path: data.image_path,
        accrued_revenue: 0.0,
        accrued_orders: 0,
        is_deleted: false,
        created_by: data.created_by,
        created_at: now,
        updated_at: now,
    };

    validate_entity(&promotion)?;
    insert(pool, &promotion).await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create promotion".to_string()))
}

/// Update a promotion
///
/// Missing payload fields keep their current values; the merged entity is
/// revalidated against every invariant before the write.
pub async fn update(pool: &SqlitePool, id: i64, data: PromotionUpdate) -> RepoResult<Promotion> {
    let mut promotion = find_by_id(pool, id)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or_else(|| RepoError::NotFound(format!("Promotion {id} not found")))?;

    data.apply_to(&mut promotion);
    promotion.updated_at = shared::util::now_millis();
    validate_entity(&promotion)?;

    sqlx::query(
        "UPDATE promotion SET name = ?1, description = ?2, kind = ?3, value = ?4, \
         min_order_amount = ?5, max_discount = ?6, starts_at = ?7, ends_at = ?8, \
         is_active = ?9, max_uses = ?10, per_client_max_uses = ?11, audience = ?12, \
         eligibility = ?13, valid_weekdays = ?14, is_stackable = ?15, \
         first_order_only = ?16, show_on_site = ?17, notify_email = ?18, \
         notify_sms = ?19, theme_color = ?20, image_path = ?21, updated_at = ?22 \
         WHERE id = ?23",
    )
    .bind(&promotion.name)
    .bind(&promotion.description)
    .bind(promotion.kind)
    .bind(promotion.value)
    .bind(promotion.min_order_amount)
    .bind(promotion.max_discount)
    .bind(promotion.starts_at)
    .bind(promotion.ends_at)
    .bind(promotion.is_active)
    .bind(promotion.max_uses)
    .bind(promotion.per_client_max_uses)
    .bind(promotion.audience)
    .bind(sqlx::types::Json(&promotion.eligibility))
    .bind(promotion.valid_weekdays.as_ref().map(sqlx::types::Json))
    .bind(promotion.is_stackable)
    .bind(promotion.first_order_only)
    .bind(promotion.show_on_site)
    .bind(promotion.notify_email)
    .bind(promotion.notify_sms)
    .bind(&promotion.theme_color)
    .bind(&promotion.image_path)
    .bind(promotion.updated_at)
    .bind(promotion.id)
    .execute(pool)
    .await?;

    Ok(promotion)
}

/// Toggle a promotion on or off
pub async fn set_active(pool: &SqlitePool, id: i64, active: bool) -> RepoResult<Promotion> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE promotion SET is_active = ?1, updated_at = ?2 WHERE id = ?3 AND is_deleted = 0",
    )
    .bind(active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Promotion {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Promotion {id} not found")))
}

/// Duplicate a promotion
///
/// The copy gets a fresh id and generated code, zeroed counters, and starts
/// deactivated so the dates can be adjusted before it goes live.
pub async fn duplicate(pool: &SqlitePool, id: i64) -> RepoResult<Promotion> {
    let source = find_by_id(pool, id)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or_else(|| RepoError::NotFound(format!("Promotion {id} not found")))?;

    let now = shared::util::now_millis();
    let copy = Promotion {
        id: shared::util::snowflake_id(),
        code: generate_unique_code(pool).await?,
        is_active: false,
        current_uses: 0,
        accrued_revenue: 0.0,
        accrued_orders: 0,
        created_at: now,
        updated_at: now,
        ..source
    };

    insert(pool, &copy).await?;

    find_by_id(pool, copy.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to duplicate promotion".to_string()))
}

/// Soft delete a promotion (usage statistics are preserved)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE promotion SET is_deleted = 1, updated_at = ?1 WHERE id = ?2 AND is_deleted = 0",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Atomically consume one use and update the attribution counters
///
/// The WHERE clause carries the usage-limit guard: zero affected rows means
/// the promotion vanished or a concurrent redemption took the last remaining
/// use, and the caller must treat the redemption as exhausted.
pub async fn record_redemption(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    discount_amount: f64,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE promotion SET current_uses = current_uses + 1, \
         accrued_orders = accrued_orders + 1, accrued_revenue = accrued_revenue + ?1, \
         updated_at = ?2 \
         WHERE id = ?3 AND is_deleted = 0 \
         AND (max_uses IS NULL OR current_uses < max_uses)",
    )
    .bind(discount_amount)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Internal helpers ─────────────────────────────────────────

async fn insert(pool: &SqlitePool, p: &Promotion) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO promotion (id, code, name, description, kind, value, \
         min_order_amount, max_discount, starts_at, ends_at, is_active, max_uses, \
         per_client_max_uses, current_uses, audience, eligibility, valid_weekdays, \
         is_stackable, first_order_only, show_on_site, notify_email, notify_sms, \
         theme_color, image_path, accrued_revenue, accrued_orders, is_deleted, \
         created_by, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
         ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30)",
    )
    .bind(p.id)
    .bind(&p.code)
    .bind(&p.name)
    .bind(&p.description)
    .bind(p.kind)
    .bind(p.value)
    .bind(p.min_order_amount)
    .bind(p.max_discount)
    .bind(p.starts_at)
    .bind(p.ends_at)
    .bind(p.is_active)
    .bind(p.max_uses)
    .bind(p.per_client_max_uses)
    .bind(p.current_uses)
    .bind(p.audience)
    .bind(sqlx::types::Json(&p.eligibility))
    .bind(p.valid_weekdays.as_ref().map(sqlx::types::Json))
    .bind(p.is_stackable)
    .bind(p.first_order_only)
    .bind(p.show_on_site)
    .bind(p.notify_email)
    .bind(p.notify_sms)
    .bind(&p.theme_color)
    .bind(&p.image_path)
    .bind(p.accrued_revenue)
    .bind(p.accrued_orders)
    .bind(p.is_deleted)
    .bind(p.created_by)
    .bind(p.created_at)
    .bind(p.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Validate every promotion invariant on the final entity
fn validate_entity(p: &Promotion) -> RepoResult<()> {
    // Text fields
    if p.code.trim().is_empty() {
        return Err(RepoError::Validation("code must not be empty".into()));
    }
    if p.code.len() > MAX_CODE_LEN {
        return Err(RepoError::Validation(format!(
            "code is too long ({} chars, max {MAX_CODE_LEN})",
            p.code.len()
        )));
    }
    if p.code.contains(char::is_whitespace) {
        return Err(RepoError::Validation(
            "code must not contain whitespace".into(),
        ));
    }
    if p.name.trim().is_empty() {
        return Err(RepoError::Validation("name must not be empty".into()));
    }
    if p.name.len() > MAX_NAME_LEN {
        return Err(RepoError::Validation(format!(
            "name is too long ({} chars, max {MAX_NAME_LEN})",
            p.name.len()
        )));
    }
    check_optional_len(&p.description, "description", MAX_NOTE_LEN)?;
    check_optional_len(&p.theme_color, "theme_color", MAX_SHORT_TEXT_LEN)?;
    check_optional_len(&p.image_path, "image_path", MAX_URL_LEN)?;

    // Schedule window
    if p.ends_at <= p.starts_at {
        return Err(RepoError::Validation(
            "end date must be after start date".into(),
        ));
    }
    if p.ends_at - p.starts_at > MAX_DURATION_MS {
        return Err(RepoError::Validation(
            "promotion duration must not exceed 365 days".into(),
        ));
    }

    // Discount value, per kind
    if !p.value.is_finite() {
        return Err(RepoError::Validation(format!(
            "value must be a finite number, got {}",
            p.value
        )));
    }
    match p.kind {
        DiscountKind::Percentage => {
            if !(0.0..=100.0).contains(&p.value) {
                return Err(RepoError::Validation(format!(
                    "percentage value must be between 0 and 100, got {}",
                    p.value
                )));
            }
        }
        DiscountKind::FixedAmount => {
            if p.value <= 0.0 || p.value > MAX_PROMOTION_VALUE {
                return Err(RepoError::Validation(format!(
                    "fixed amount value must be between 0 and {}, got {}",
                    MAX_PROMOTION_VALUE, p.value
                )));
            }
        }
        DiscountKind::FreeShipping => {
            if p.value != 0.0 {
                return Err(RepoError::Validation(
                    "free shipping promotions must have value 0".into(),
                ));
            }
        }
    }

    // Optional monetary constraints
    check_money_field(p.min_order_amount, "min_order_amount")?;
    check_money_field(p.max_discount, "max_discount")?;

    // A fixed-amount cap above the order floor could never bind
    if p.kind == DiscountKind::FixedAmount
        && let (Some(cap), Some(min)) = (p.max_discount, p.min_order_amount)
        && cap > min
    {
        return Err(RepoError::Validation(
            "max_discount must not exceed min_order_amount for fixed amount promotions".into(),
        ));
    }

    // Usage limits
    if p.per_client_max_uses < 1 {
        return Err(RepoError::Validation(
            "per_client_max_uses must be at least 1".into(),
        ));
    }
    if let Some(max) = p.max_uses {
        if max < 1 {
            return Err(RepoError::Validation("max_uses must be at least 1".into()));
        }
        if p.per_client_max_uses > max {
            return Err(RepoError::Validation(
                "per_client_max_uses must not exceed max_uses".into(),
            ));
        }
    }

    // Weekday restriction
    if let Some(days) = &p.valid_weekdays {
        if days.is_empty() {
            return Err(RepoError::Validation(
                "valid_weekdays must not be empty".into(),
            ));
        }
        if days.iter().any(|d| *d > 6) {
            return Err(RepoError::Validation(
                "weekday values must be 0 (Sunday) to 6 (Saturday)".into(),
            ));
        }
    }

    // Eligibility allow-lists
    match &p.eligibility {
        EligibilityScope::Categories(ids) | EligibilityScope::Products(ids) if ids.is_empty() => {
            return Err(RepoError::Validation(
                "eligibility list must not be empty".into(),
            ));
        }
        _ => {}
    }

    Ok(())
}

fn check_optional_len(value: &Option<String>, field: &str, max_len: usize) -> RepoResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(RepoError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

fn check_money_field(value: Option<f64>, field: &str) -> RepoResult<()> {
    if let Some(v) = value {
        if !v.is_finite() {
            return Err(RepoError::Validation(format!(
                "{field} must be a finite number, got {v}"
            )));
        }
        if v < 0.0 {
            return Err(RepoError::Validation(format!(
                "{field} must be non-negative, got {v}"
            )));
        }
        if v > MAX_ORDER_AMOUNT {
            return Err(RepoError::Validation(format!(
                "{field} exceeds maximum allowed ({MAX_ORDER_AMOUNT}), got {v}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::Audience;
    use shared::util::now_millis;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    async fn test_pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    /// Valid percentage promotion payload, running from yesterday to next month
    fn make_create(code: Option<&str>) -> PromotionCreate {
        let now = now_millis();
        PromotionCreate {
            code: code.map(|c| c.to_string()),
            name: "Summer sale".to_string(),
            description: None,
            kind: DiscountKind::Percentage,
            value: 10.0,
            min_order_amount: None,
            max_discount: None,
            starts_at: now - DAY_MS,
            ends_at: now + 30 * DAY_MS,
            max_uses: None,
            per_client_max_uses: None,
            audience: None,
            eligibility: None,
            valid_weekdays: None,
            is_stackable: None,
            first_order_only: None,
            show_on_site: None,
            notify_email: None,
            notify_sms: None,
            theme_color: None,
            image_path: None,
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_create_basic() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create(Some("SUMMER10"))).await.unwrap();

        assert_eq!(promo.code, "SUMMER10");
        assert_eq!(promo.kind, DiscountKind::Percentage);
        assert!(promo.is_active);
        assert_eq!(promo.per_client_max_uses, 1); // default
        assert_eq!(promo.current_uses, 0);
        assert_eq!(promo.audience, Audience::All);
        assert_eq!(promo.eligibility, EligibilityScope::AllProducts);
        assert!(!promo.is_deleted);
    }

    #[tokio::test]
    async fn test_create_generates_code_when_absent() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create(None)).await.unwrap();
        assert_eq!(promo.code.len(), CODE_LENGTH);
        assert!(promo.code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_create_duplicate_code_rejected() {
        let pool = test_pool().await;
        create(&pool, make_create(Some("WELCOME"))).await.unwrap();
        let err = create(&pool, make_create(Some("WELCOME"))).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_code_stays_reserved_after_soft_delete() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create(Some("WELCOME"))).await.unwrap();
        assert!(delete(&pool, promo.id).await.unwrap());

        // Soft-deleted rows still hold the UNIQUE code
        let err = create(&pool, make_create(Some("WELCOME"))).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_find_by_code_is_case_sensitive() {
        let pool = test_pool().await;
        create(&pool, make_create(Some("Summer10"))).await.unwrap();

        assert!(find_by_code(&pool, "Summer10").await.unwrap().is_some());
        assert!(find_by_code(&pool, "SUMMER10").await.unwrap().is_none());
        assert!(find_by_code(&pool, "summer10").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_code_excludes_deleted() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create(Some("GONE"))).await.unwrap();
        delete(&pool, promo.id).await.unwrap();

        assert!(find_by_code(&pool, "GONE").await.unwrap().is_none());
        // find_by_id keeps returning the row for history views
        let row = find_by_id(&pool, promo.id).await.unwrap().unwrap();
        assert!(row.is_deleted);
    }

    #[tokio::test]
    async fn test_eligibility_scope_roundtrips_through_db() {
        let pool = test_pool().await;
        let mut data = make_create(Some("CAT20"));
        data.eligibility = Some(EligibilityScope::Categories(vec![10, 20]));
        data.valid_weekdays = Some(vec![5, 6]);
        let promo = create(&pool, data).await.unwrap();

        let loaded = find_by_id(&pool, promo.id).await.unwrap().unwrap();
        assert_eq!(loaded.eligibility, EligibilityScope::Categories(vec![10, 20]));
        assert_eq!(loaded.valid_weekdays, Some(vec![5, 6]));
    }

    #[tokio::test]
    async fn test_update_merges_and_revalidates() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create(Some("EDIT"))).await.unwrap();

        let updated = update(
            &pool,
            promo.id,
            PromotionUpdate {
                name: Some("Renamed".to_string()),
                value: Some(15.0),
                ..empty_update()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.value, 15.0);
        assert_eq!(updated.code, "EDIT"); // code immutable

        // Merged entity is revalidated: 150% is out of range
        let err = update(
            &pool,
            promo.id,
            PromotionUpdate {
                value: Some(150.0),
                ..empty_update()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_set_active_toggle() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create(Some("TOGGLE"))).await.unwrap();

        let off = set_active(&pool, promo.id, false).await.unwrap();
        assert!(!off.is_active);
        let on = set_active(&pool, promo.id, true).await.unwrap();
        assert!(on.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_resets_counters_and_deactivates() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create(Some("ORIG"))).await.unwrap();
        record_redemption(&pool, promo.id, 12.5, now_millis())
            .await
            .unwrap();

        let copy = duplicate(&pool, promo.id).await.unwrap();
        assert_ne!(copy.id, promo.id);
        assert_ne!(copy.code, promo.code);
        assert_eq!(copy.name, promo.name);
        assert!(!copy.is_active);
        assert_eq!(copy.current_uses, 0);
        assert_eq!(copy.accrued_orders, 0);
        assert_eq!(copy.accrued_revenue, 0.0);
    }

    #[tokio::test]
    async fn test_delete_is_soft_and_idempotent() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create(Some("DEL"))).await.unwrap();

        assert!(delete(&pool, promo.id).await.unwrap());
        assert!(!delete(&pool, promo.id).await.unwrap()); // already deleted
        assert!(find_all(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_redemption_increments_counters() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create(Some("COUNT"))).await.unwrap();

        assert!(record_redemption(&pool, promo.id, 10.0, 1000).await.unwrap());
        assert!(record_redemption(&pool, promo.id, 2.5, 2000).await.unwrap());

        let loaded = find_by_id(&pool, promo.id).await.unwrap().unwrap();
        assert_eq!(loaded.current_uses, 2);
        assert_eq!(loaded.accrued_orders, 2);
        assert_eq!(loaded.accrued_revenue, 12.5);
    }

    #[tokio::test]
    async fn test_record_redemption_stops_at_max_uses() {
        let pool = test_pool().await;
        let mut data = make_create(Some("LIMIT2"));
        data.max_uses = Some(2);
        let promo = create(&pool, data).await.unwrap();

        assert!(record_redemption(&pool, promo.id, 1.0, 1000).await.unwrap());
        assert!(record_redemption(&pool, promo.id, 1.0, 2000).await.unwrap());
        // Third redemption hits the conditional guard
        assert!(!record_redemption(&pool, promo.id, 1.0, 3000).await.unwrap());

        let loaded = find_by_id(&pool, promo.id).await.unwrap().unwrap();
        assert_eq!(loaded.current_uses, 2);
    }

    #[tokio::test]
    async fn test_record_redemption_rejected_for_deleted() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create(Some("DELRED"))).await.unwrap();
        delete(&pool, promo.id).await.unwrap();
        assert!(!record_redemption(&pool, promo.id, 1.0, 1000).await.unwrap());
    }

    // ========== Invariant validation ==========

    fn empty_update() -> PromotionUpdate {
        PromotionUpdate {
            name: None,
            description: None,
            kind: None,
            value: None,
            min_order_amount: None,
            max_discount: None,
            starts_at: None,
            ends_at: None,
            is_active: None,
            max_uses: None,
            per_client_max_uses: None,
            audience: None,
            eligibility: None,
            valid_weekdays: None,
            is_stackable: None,
            first_order_only: None,
            show_on_site: None,
            notify_email: None,
            notify_sms: None,
            theme_color: None,
            image_path: None,
        }
    }

    async fn assert_rejected(data: PromotionCreate) {
        let pool = test_pool().await;
        let err = create(&pool, data).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_reject_end_before_start() {
        let mut data = make_create(Some("BAD"));
        data.ends_at = data.starts_at - 1;
        assert_rejected(data).await;
    }

    #[tokio::test]
    async fn test_reject_duration_over_a_year() {
        let mut data = make_create(Some("BAD"));
        data.ends_at = data.starts_at + 366 * DAY_MS;
        assert_rejected(data).await;
    }

    #[tokio::test]
    async fn test_reject_percentage_out_of_range() {
        let mut data = make_create(Some("BAD"));
        data.value = 150.0;
        assert_rejected(data).await;

        let mut data = make_create(Some("BAD2"));
        data.value = -5.0;
        assert_rejected(data).await;
    }

    #[tokio::test]
    async fn test_reject_fixed_amount_zero_or_over_ceiling() {
        let mut data = make_create(Some("BAD"));
        data.kind = DiscountKind::FixedAmount;
        data.value = 0.0;
        assert_rejected(data).await;

        let mut data = make_create(Some("BAD2"));
        data.kind = DiscountKind::FixedAmount;
        data.value = MAX_PROMOTION_VALUE + 1.0;
        assert_rejected(data).await;
    }

    #[tokio::test]
    async fn test_reject_free_shipping_with_value() {
        let mut data = make_create(Some("BAD"));
        data.kind = DiscountKind::FreeShipping;
        data.value = 5.0;
        assert_rejected(data).await;
    }

    #[tokio::test]
    async fn test_reject_fixed_cap_above_min_order() {
        let mut data = make_create(Some("BAD"));
        data.kind = DiscountKind::FixedAmount;
        data.value = 30.0;
        data.min_order_amount = Some(50.0);
        data.max_discount = Some(80.0);
        assert_rejected(data).await;
    }

    #[tokio::test]
    async fn test_reject_per_client_above_global_limit() {
        let mut data = make_create(Some("BAD"));
        data.max_uses = Some(3);
        data.per_client_max_uses = Some(5);
        assert_rejected(data).await;

        let mut data = make_create(Some("BAD2"));
        data.per_client_max_uses = Some(0);
        assert_rejected(data).await;
    }

    #[tokio::test]
    async fn test_reject_invalid_weekday() {
        let mut data = make_create(Some("BAD"));
        data.valid_weekdays = Some(vec![7]);
        assert_rejected(data).await;

        let mut data = make_create(Some("BAD2"));
        data.valid_weekdays = Some(vec![]);
        assert_rejected(data).await;
    }

    #[tokio::test]
    async fn test_reject_empty_eligibility_list() {
        let mut data = make_create(Some("BAD"));
        data.eligibility = Some(EligibilityScope::Categories(vec![]));
        assert_rejected(data).await;
    }

    #[tokio::test]
    async fn test_reject_empty_name_and_bad_code() {
        let mut data = make_create(Some("OK"));
        data.name = "  ".to_string();
        assert_rejected(data).await;

        let data = make_create(Some("HAS SPACE"));
        assert_rejected(data).await;
    }
}
