//! Promotion Model

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Discount kind enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum DiscountKind {
    Percentage,
    FixedAmount,
    FreeShipping,
}

/// Target audience enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Audience {
    All,
    NewCustomers,
    Vip,
    Regulars,
}

/// Which items a promotion applies to.
///
/// Category and product allow-lists are mutually exclusive by construction:
/// a promotion targets everything, a category list, or a product list.
/// Stored as a single JSON column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "ids", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityScope {
    AllProducts,
    Categories(Vec<i64>),
    Products(Vec<i64>),
}

impl EligibilityScope {
    /// Whether this scope covers the whole catalog
    pub fn is_all_products(&self) -> bool {
        matches!(self, EligibilityScope::AllProducts)
    }
}

impl Default for EligibilityScope {
    fn default() -> Self {
        EligibilityScope::AllProducts
    }
}

/// Derived lifecycle status of a promotion
///
/// Always computed from the evaluation clock, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionStatus {
    Inactive,
    Scheduled,
    Expired,
    Exhausted,
    Active,
}

/// Promotion entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Promotion {
    pub id: i64,
    /// Unique redemption code (case-sensitive lookup key)
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: DiscountKind,
    /// Discount value (percentage: 10 = 10%, fixed: 30.00 = €30, free shipping: 0)
    pub value: f64,
    /// Minimum order amount floor
    pub min_order_amount: Option<f64>,
    /// Cap on the computed discount
    pub max_discount: Option<f64>,
    /// Valid from datetime (Unix millis)
    pub starts_at: i64,
    /// Valid until datetime (Unix millis)
    pub ends_at: i64,
    pub is_active: bool,
    /// Global usage limit (None = unlimited)
    pub max_uses: Option<i64>,
    /// Per-client usage limit
    pub per_client_max_uses: i64,
    /// Global use counter, bumped transactionally on each redemption
    pub current_uses: i64,
    pub audience: Audience,
    /// Eligible items (JSON column)
    #[cfg_attr(feature = "db", sqlx(json))]
    pub eligibility: EligibilityScope,
    /// Valid days of week (JSON array: 0=Sunday..6=Saturday, None = every day)
    #[cfg_attr(feature = "db", sqlx(json(nullable)))]
    pub valid_weekdays: Option<Vec<u8>>,
    pub is_stackable: bool,
    pub first_order_only: bool,
    pub show_on_site: bool,
    pub notify_email: bool,
    pub notify_sms: bool,
    pub theme_color: Option<String>,
    pub image_path: Option<String>,
    /// Revenue attributed to this promotion
    pub accrued_revenue: f64,
    /// Order count attributed to this promotion
    pub accrued_orders: i64,
    pub is_deleted: bool,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Promotion {
    /// Derive the lifecycle status at `now_millis`.
    ///
    /// Precedence (first match wins): inactive flag, not yet started,
    /// expired, global usage exhausted, active.
    pub fn status_at(&self, now_millis: i64) -> PromotionStatus {
        if !self.is_active {
            return PromotionStatus::Inactive;
        }
        if now_millis < self.starts_at {
            return PromotionStatus::Scheduled;
        }
        if now_millis > self.ends_at {
            return PromotionStatus::Expired;
        }
        if let Some(max) = self.max_uses
            && self.current_uses >= max
        {
            return PromotionStatus::Exhausted;
        }
        PromotionStatus::Active
    }
}

/// Create promotion payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionCreate {
    /// Redemption code; auto-generated when absent
    pub code: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub kind: DiscountKind,
    pub value: f64,
    pub min_order_amount: Option<f64>,
    pub max_discount: Option<f64>,
    pub starts_at: i64,
    pub ends_at: i64,
    pub max_uses: Option<i64>,
    pub per_client_max_uses: Option<i64>,
    pub audience: Option<Audience>,
    pub eligibility: Option<EligibilityScope>,
    pub valid_weekdays: Option<Vec<u8>>,
    pub is_stackable: Option<bool>,
    pub first_order_only: Option<bool>,
    pub show_on_site: Option<bool>,
    pub notify_email: Option<bool>,
    pub notify_sms: Option<bool>,
    pub theme_color: Option<String>,
    pub image_path: Option<String>,
    pub created_by: Option<i64>,
}

/// Update promotion payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<DiscountKind>,
    pub value: Option<f64>,
    pub min_order_amount: Option<f64>,
    pub max_discount: Option<f64>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub is_active: Option<bool>,
    pub max_uses: Option<i64>,
    pub per_client_max_uses: Option<i64>,
    pub audience: Option<Audience>,
    pub eligibility: Option<EligibilityScope>,
    pub valid_weekdays: Option<Vec<u8>>,
    pub is_stackable: Option<bool>,
    pub first_order_only: Option<bool>,
    pub show_on_site: Option<bool>,
    pub notify_email: Option<bool>,
    pub notify_sms: Option<bool>,
    pub theme_color: Option<String>,
    pub image_path: Option<String>,
}

impl PromotionUpdate {
    /// Merge this payload into an existing promotion.
    ///
    /// `None` fields keep the current value (COALESCE semantics). Counters,
    /// code, and timestamps are never touched by an update payload.
    pub fn apply_to(&self, promotion: &mut Promotion) {
        if let Some(v) = &self.name {
            promotion.name = v.clone();
        }
        if let Some(v) = &self.description {
            promotion.description = Some(v.clone());
        }
        if let Some(v) = self.kind {
            promotion.kind = v;
        }
        if let Some(v) = self.value {
            promotion.value = v;
        }
        if let Some(v) = self.min_order_amount {
            promotion.min_order_amount = Some(v);
        }
        if let Some(v) = self.max_discount {
            promotion.max_discount = Some(v);
        }
        if let Some(v) = self.starts_at {
            promotion.starts_at = v;
        }
        if let Some(v) = self.ends_at {
            promotion.ends_at = v;
        }
        if let Some(v) = self.is_active {
            promotion.is_active = v;
        }
        if let Some(v) = self.max_uses {
            promotion.max_uses = Some(v);
        }
        if let Some(v) = self.per_client_max_uses {
            promotion.per_client_max_uses = v;
        }
        if let Some(v) = self.audience {
            promotion.audience = v;
        }
        if let Some(v) = &self.eligibility {
            promotion.eligibility = v.clone();
        }
        if let Some(v) = &self.valid_weekdays {
            promotion.valid_weekdays = Some(v.clone());
        }
        if let Some(v) = self.is_stackable {
            promotion.is_stackable = v;
        }
        if let Some(v) = self.first_order_only {
            promotion.first_order_only = v;
        }
        if let Some(v) = self.show_on_site {
            promotion.show_on_site = v;
        }
        if let Some(v) = self.notify_email {
            promotion.notify_email = v;
        }
        if let Some(v) = self.notify_sms {
            promotion.notify_sms = v;
        }
        if let Some(v) = &self.theme_color {
            promotion.theme_color = Some(v.clone());
        }
        if let Some(v) = &self.image_path {
            promotion.image_path = Some(v.clone());
        }
    }
}

/// Promotion with its derived status (admin listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionWithStatus {
    pub promotion: Promotion,
    pub status: PromotionStatus,
}

/// Why a promotion cannot be applied to an order
///
/// Every variant is an expected, user-facing rejection, never an error to
/// propagate as a failure of the checkout flow itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    NotFound,
    Inactive,
    Scheduled,
    Expired,
    Exhausted,
    BelowMinimum { minimum: f64 },
    AudienceMismatch,
    WeekdayRestricted,
    PerClientLimitReached,
    FirstOrderOnly,
    ItemsNotEligible,
}

impl RejectionReason {
    /// Map a non-active derived status to its rejection
    pub fn from_status(status: PromotionStatus) -> Option<Self> {
        match status {
            PromotionStatus::Inactive => Some(Self::Inactive),
            PromotionStatus::Scheduled => Some(Self::Scheduled),
            PromotionStatus::Expired => Some(Self::Expired),
            PromotionStatus::Exhausted => Some(Self::Exhausted),
            PromotionStatus::Active => None,
        }
    }

    /// The unified error code for this rejection
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotFound => ErrorCode::PromotionNotFound,
            Self::Inactive => ErrorCode::PromotionInactive,
            Self::Scheduled => ErrorCode::PromotionScheduled,
            Self::Expired => ErrorCode::PromotionExpired,
            Self::Exhausted => ErrorCode::PromotionExhausted,
            Self::BelowMinimum { .. } => ErrorCode::BelowMinimumAmount,
            Self::AudienceMismatch => ErrorCode::AudienceMismatch,
            Self::WeekdayRestricted => ErrorCode::WeekdayRestricted,
            Self::PerClientLimitReached => ErrorCode::PerClientLimitReached,
            Self::FirstOrderOnly => ErrorCode::FirstOrderOnly,
            Self::ItemsNotEligible => ErrorCode::ItemsNotEligible,
        }
    }

    /// Human-readable message shown at checkout
    pub fn message(&self) -> String {
        match self {
            Self::BelowMinimum { minimum } => {
                format!("Order amount is below the promotion minimum of {minimum:.2}")
            }
            other => other.error_code().message().to_string(),
        }
    }

    /// Convert into the unified application error
    pub fn into_app_error(self) -> AppError {
        AppError::with_message(self.error_code(), self.message())
    }
}

/// Result of a read-only promotion validation (checkout preview)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: bool,
    /// Present iff not eligible
    pub reason: Option<RejectionReason>,
    /// Human-readable rejection message, present iff not eligible
    pub message: Option<String>,
    /// Computed discount (0 when not eligible)
    pub discount: f64,
    /// Order total after discount (unmodified when not eligible)
    pub new_total: f64,
    pub promotion_id: Option<i64>,
}

impl EligibilityResult {
    /// Build an eligible result
    pub fn eligible(promotion_id: i64, discount: f64, new_total: f64) -> Self {
        Self {
            eligible: true,
            reason: None,
            message: None,
            discount,
            new_total,
            promotion_id: Some(promotion_id),
        }
    }

    /// Build a rejection; the order total stays unmodified
    pub fn rejected(reason: RejectionReason, order_amount: f64, promotion_id: Option<i64>) -> Self {
        Self {
            eligible: false,
            message: Some(reason.message()),
            reason: Some(reason),
            discount: 0.0,
            new_total: order_amount,
            promotion_id,
        }
    }
}
