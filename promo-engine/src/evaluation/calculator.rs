//! Discount Calculator
//!
//! Pure discount computation over `Decimal`. The result never exceeds the
//! order amount, whatever the promotion says.

use rust_decimal::prelude::*;
use shared::models::{DiscountKind, Promotion};

use crate::money::{round_money, to_decimal};

/// Compute the discount a promotion grants on an order amount.
///
/// `shipping_fee` is the configured flat fee credited by free-shipping
/// promotions. It is supplied by the caller, never stored on the promotion.
///
/// The raw discount is capped at `max_discount` when set, then clamped to
/// [0, order_amount] and rounded to 2 decimal places.
pub fn compute_discount(promotion: &Promotion, order_amount: f64, shipping_fee: f64) -> Decimal {
    let amount = to_decimal(order_amount);

    let raw = match promotion.kind {
        DiscountKind::Percentage => amount * to_decimal(promotion.value) / Decimal::ONE_HUNDRED,
        DiscountKind::FixedAmount => to_decimal(promotion.value).min(amount),
        DiscountKind::FreeShipping => to_decimal(shipping_fee).min(amount),
    };

    let capped = match promotion.max_discount {
        Some(cap) => raw.min(to_decimal(cap)),
        None => raw,
    };

    round_money(capped.clamp(Decimal::ZERO, amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::to_f64;
    use shared::models::{Audience, EligibilityScope};

    const SHIPPING_FEE: f64 = 5.90;

    /// Helper to create a promotion with the given discount shape
    fn make_promotion(kind: DiscountKind, value: f64, max_discount: Option<f64>) -> Promotion {
        Promotion {
            id: 1,
            code: "CALC".to_string(),
            name: "Calc".to_string(),
            description: None,
            kind,
            value,
            min_order_amount: None,
            max_discount,
            starts_at: 0,
            ends_at: 1,
            is_active: true,
            max_uses: None,
            per_client_max_uses: 1,
            current_uses: 0,
            audience: Audience::All,
            eligibility: EligibilityScope::AllProducts,
            valid_weekdays: None,
            is_stackable: false,
            first_order_only: false,
            show_on_site: false,
            notify_email: false,
            notify_sms: false,
            theme_color: None,
            image_path: None,
            accrued_revenue: 0.0,
            accrued_orders: 0,
            is_deleted: false,
            created_by: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_percentage_discount() {
        // 10% of 20000 = 2000
        let promo = make_promotion(DiscountKind::Percentage, 10.0, None);
        assert_eq!(to_f64(compute_discount(&promo, 20000.0, SHIPPING_FEE)), 2000.0);
    }

    #[test]
    fn test_percentage_rounds_to_cents() {
        // 10% of 19.99 = 1.999 → 2.00
        let promo = make_promotion(DiscountKind::Percentage, 10.0, None);
        assert_eq!(to_f64(compute_discount(&promo, 19.99, SHIPPING_FEE)), 2.0);
    }

    #[test]
    fn test_fixed_amount_discount() {
        let promo = make_promotion(DiscountKind::FixedAmount, 30.0, None);
        assert_eq!(to_f64(compute_discount(&promo, 120.0, SHIPPING_FEE)), 30.0);
    }

    #[test]
    fn test_fixed_amount_capped_at_order_total() {
        // Fixed 3000 on a 2000 order never exceeds the order
        let promo = make_promotion(DiscountKind::FixedAmount, 3000.0, None);
        assert_eq!(to_f64(compute_discount(&promo, 2000.0, SHIPPING_FEE)), 2000.0);
    }

    #[test]
    fn test_free_shipping_credits_the_fee() {
        let promo = make_promotion(DiscountKind::FreeShipping, 0.0, None);
        assert_eq!(to_f64(compute_discount(&promo, 120.0, SHIPPING_FEE)), 5.90);
    }

    #[test]
    fn test_free_shipping_capped_at_order_total() {
        // A cart cheaper than the shipping fee still never goes negative
        let promo = make_promotion(DiscountKind::FreeShipping, 0.0, None);
        assert_eq!(to_f64(compute_discount(&promo, 3.0, SHIPPING_FEE)), 3.0);
    }

    #[test]
    fn test_max_discount_cap() {
        // 50% of 1000 = 500, capped at 100
        let promo = make_promotion(DiscountKind::Percentage, 50.0, Some(100.0));
        assert_eq!(to_f64(compute_discount(&promo, 1000.0, SHIPPING_FEE)), 100.0);

        // Cap higher than the raw discount does nothing
        let promo = make_promotion(DiscountKind::Percentage, 10.0, Some(500.0));
        assert_eq!(to_f64(compute_discount(&promo, 1000.0, SHIPPING_FEE)), 100.0);
    }

    #[test]
    fn test_zero_order_amount() {
        let promo = make_promotion(DiscountKind::Percentage, 50.0, None);
        assert_eq!(to_f64(compute_discount(&promo, 0.0, SHIPPING_FEE)), 0.0);

        let promo = make_promotion(DiscountKind::FixedAmount, 10.0, None);
        assert_eq!(to_f64(compute_discount(&promo, 0.0, SHIPPING_FEE)), 0.0);
    }

    #[test]
    fn test_discount_never_exceeds_order_amount() {
        // Property: ∀ promotions, compute_discount(p, amount) ≤ amount
        let amounts = [0.0, 0.01, 3.0, 19.99, 100.0, 2000.0, 999_999.0];
        let promos = [
            make_promotion(DiscountKind::Percentage, 100.0, None),
            make_promotion(DiscountKind::FixedAmount, 100_000.0, None),
            make_promotion(DiscountKind::FreeShipping, 0.0, None),
            make_promotion(DiscountKind::Percentage, 33.33, Some(50.0)),
        ];
        for promo in &promos {
            for &amount in &amounts {
                let discount = to_f64(compute_discount(promo, amount, SHIPPING_FEE));
                assert!(
                    discount <= amount,
                    "kind {:?}: discount {} > amount {}",
                    promo.kind,
                    discount,
                    amount
                );
                assert!(discount >= 0.0);
            }
        }
    }

    #[test]
    fn test_discount_never_exceeds_cap() {
        // Property: ∀ promotions with a cap, compute_discount ≤ cap
        let amounts = [0.0, 10.0, 100.0, 10_000.0];
        for &cap in &[0.0, 5.0, 50.0] {
            let promo = make_promotion(DiscountKind::Percentage, 80.0, Some(cap));
            for &amount in &amounts {
                let discount = to_f64(compute_discount(&promo, amount, SHIPPING_FEE));
                assert!(discount <= cap, "discount {} > cap {}", discount, cap);
            }
        }
    }
}
