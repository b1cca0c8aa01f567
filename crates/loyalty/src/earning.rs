//! Points earned per purchase.
//!
//! One rate applies to a purchase: the category multiplier when the category
//! has one, otherwise the program's base points-per-dollar. The product is
//! floored, so guests never receive fractional points.

use loyalty_core::error::EarningError;
use loyalty_core::program::EligibleScope;
use loyalty_core::transaction::PurchaseContext;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::validator::ValidConfiguration;

/// How a purchase's points were arrived at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EarnBreakdown {
    pub base_points: u64,
    pub bonus_points: u64,
    pub rate_applied: Decimal,
    /// Whether a category multiplier replaced the base rate.
    pub category_override: bool,
    pub eligible: bool,
}

impl EarnBreakdown {
    pub fn total(&self) -> u64 {
        // Bounded in `earn_breakdown`.
        self.base_points + self.bonus_points
    }
}

/// Total points awarded for `purchase`.
pub fn points_earned(
    config: &ValidConfiguration,
    purchase: &PurchaseContext,
) -> Result<u64, EarningError> {
    earn_breakdown(config, purchase).map(|b| b.total())
}

pub fn earn_breakdown(
    config: &ValidConfiguration,
    purchase: &PurchaseContext,
) -> Result<EarnBreakdown, EarningError> {
    let amount = purchase.amount_dollars;
    if amount < Decimal::ZERO {
        return Err(EarningError::InvalidAmount(amount));
    }

    let rule = config.earning_rule();
    let override_rate = config.earning_override(&purchase.category);
    let rate = override_rate.unwrap_or(rule.points_per_dollar);

    if rule.eligible_scope == EligibleScope::SelectedProducts && !purchase.is_eligible {
        return Ok(EarnBreakdown {
            base_points: 0,
            bonus_points: 0,
            rate_applied: Decimal::ZERO,
            category_override: false,
            eligible: false,
        });
    }

    let overflow = || EarningError::Overflow { amount, rate };
    // A product that needs more than 28 fractional digits comes back rounded,
    // which can carry it across an integer and defeat the floor.
    let (exact_amount, exact_rate) = (amount.normalize(), rate.normalize());
    let product = exact_amount.checked_mul(exact_rate).ok_or_else(overflow)?;
    if product.scale() != exact_amount.scale() + exact_rate.scale() {
        return Err(EarningError::Imprecise { amount, rate });
    }
    let base_points = product.floor().to_u64().ok_or_else(overflow)?;

    let bonus_points = match purchase.sign_up_bonus {
        Some(bonus) if rule.sign_up_bonus_enabled => bonus.get(),
        _ => 0,
    };
    if base_points.checked_add(bonus_points).is_none() {
        return Err(overflow());
    }

    Ok(EarnBreakdown {
        base_points,
        bonus_points,
        rate_applied: rate,
        category_override: override_rate.is_some(),
        eligible: true,
    })
}
