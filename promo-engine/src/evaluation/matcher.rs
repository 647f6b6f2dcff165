//! Promotion Matcher
//!
//! Pure status and gating checks. Given a promotion, an order snapshot and
//! the client context, decides whether the promotion applies. No clock
//! reads, no I/O: the evaluation timestamp comes in on the snapshot.

use chrono::{Datelike, Weekday};
use shared::models::{
    Audience, ClientContext, ClientKind, EligibilityScope, OrderItem, OrderSnapshot, Promotion,
    RejectionReason,
};

/// Full eligibility resolution: status derivation, then gating checks.
///
/// Returns the single user-facing rejection reason on failure; the first
/// failing check wins, in the documented precedence order.
pub fn resolve(
    promotion: &Promotion,
    order: &OrderSnapshot,
    client: &ClientContext,
) -> Result<(), RejectionReason> {
    if let Some(reason) = RejectionReason::from_status(promotion.status_at(order.placed_at)) {
        return Err(reason);
    }
    check_gates(promotion, order, client)
}

/// Gating checks, applied only once a promotion resolved to Active
pub fn check_gates(
    promotion: &Promotion,
    order: &OrderSnapshot,
    client: &ClientContext,
) -> Result<(), RejectionReason> {
    if let Some(minimum) = promotion.min_order_amount
        && order.amount < minimum
    {
        return Err(RejectionReason::BelowMinimum { minimum });
    }

    if !matches_audience(promotion.audience, client) {
        return Err(RejectionReason::AudienceMismatch);
    }

    if let Some(days) = &promotion.valid_weekdays
        && !days.contains(&weekday_index(order.placed_at))
    {
        return Err(RejectionReason::WeekdayRestricted);
    }

    if client.prior_uses >= promotion.per_client_max_uses {
        return Err(RejectionReason::PerClientLimitReached);
    }

    if promotion.first_order_only && !client.is_first_order {
        return Err(RejectionReason::FirstOrderOnly);
    }

    if !matches_scope(&promotion.eligibility, &order.items) {
        return Err(RejectionReason::ItemsNotEligible);
    }

    Ok(())
}

/// Check if the client matches the promotion's target audience
pub fn matches_audience(audience: Audience, client: &ClientContext) -> bool {
    match audience {
        Audience::All => true,
        Audience::NewCustomers => client.is_first_order,
        Audience::Vip => client.kind == ClientKind::Vip,
        Audience::Regulars => client.kind == ClientKind::Regular,
    }
}

/// Check if any order item falls inside the eligibility scope
pub fn matches_scope(scope: &EligibilityScope, items: &[OrderItem]) -> bool {
    match scope {
        EligibilityScope::AllProducts => true,
        EligibilityScope::Categories(ids) => items
            .iter()
            .any(|item| item.category_id.is_some_and(|c| ids.contains(&c))),
        EligibilityScope::Products(ids) => {
            items.iter().any(|item| ids.contains(&item.product_id))
        }
    }
}

/// Weekday of a millisecond UTC timestamp (0=Sunday..6=Saturday)
pub fn weekday_index(timestamp_millis: i64) -> u8 {
    let dt = chrono::DateTime::from_timestamp_millis(timestamp_millis)
        .unwrap_or_else(chrono::Utc::now);
    match dt.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}
