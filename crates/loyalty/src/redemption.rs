//! Paying with points.
//!
//! Checks run in a fixed order and the first failure is the answer:
//! exclusion, increment, minimum, balance, minimum spend. A request off the
//! increment grid is reported as such even when it is also under the
//! minimum. Nothing here touches a live balance; the caller applies
//! `points_consumed` itself.

use loyalty_core::error::RedemptionError;
use loyalty_core::transaction::{RedemptionOutcome, RedemptionRequest};
use rust_decimal::Decimal;

use crate::validator::ValidConfiguration;

/// Dollars per point for `category`: the adjustment when one exists, else
/// the program's base point value.
pub fn effective_point_value(config: &ValidConfiguration, category: &str) -> Decimal {
    config
        .value_override(category)
        .unwrap_or(config.redemption_rule().point_value)
}

pub fn redeem(
    config: &ValidConfiguration,
    request: &RedemptionRequest,
) -> Result<RedemptionOutcome, RedemptionError> {
    let points = request.points_to_redeem;

    if config.is_excluded(&request.product_id) {
        return Err(RedemptionError::ProductExcluded(request.product_id.clone()));
    }

    let increment = config.redemption_increment();
    if points % increment != 0 {
        return Err(RedemptionError::NotAnIncrement {
            requested: points,
            increment,
        });
    }

    let minimum = config.minimum_points_to_redeem();
    if points < minimum {
        return Err(RedemptionError::BelowMinimum {
            requested: points,
            minimum,
        });
    }

    if points > request.point_balance {
        return Err(RedemptionError::InsufficientBalance {
            requested: points,
            balance: request.point_balance,
        });
    }

    if config.redemption_rule().minimum_spend_required
        && request.current_spend_dollars <= Decimal::ZERO
    {
        return Err(RedemptionError::MinimumSpendNotMet);
    }

    let value = effective_point_value(config, &request.category);
    let dollar_value = Decimal::from(points)
        .checked_mul(value)
        .ok_or(RedemptionError::Overflow { points })?;

    Ok(RedemptionOutcome {
        dollar_value,
        points_consumed: points,
    })
}
