//! Loyalty rules engine: holds the active program and runs earning,
//! redemption and expiry decisions against it.

use chrono::{DateTime, Utc};
use loyalty_core::error::{LoyaltyError, LoyaltyResult};
use loyalty_core::program::Configuration;
use loyalty_core::transaction::{PurchaseContext, RedemptionOutcome, RedemptionRequest};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::earning::{earn_breakdown, EarnBreakdown};
use crate::expiry::{self, ExpiryWindow};
use crate::redemption;
use crate::validator::{validate, ValidConfiguration};

/// Loyalty rules engine — stateless computation over the active program.
///
/// Activation is the only write path. Every call reads one immutable
/// snapshot, so concurrent callers never see a half-applied program.
pub struct LoyaltyEngine {
    active: RwLock<Option<Arc<ValidConfiguration>>>,
}

impl Default for LoyaltyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LoyaltyEngine {
    /// Engine with no program yet.
    pub fn new() -> Self {
        Self {
            active: RwLock::new(None),
        }
    }

    pub fn with_program(program: ValidConfiguration) -> Self {
        info!(program = %program.program_info().name, "Loyalty engine initialized");
        Self {
            active: RwLock::new(Some(Arc::new(program))),
        }
    }

    /// Validate `draft` and, if it passes, make it the active program.
    /// A rejected draft leaves the current program untouched.
    pub fn activate(&self, draft: Configuration) -> LoyaltyResult<Arc<ValidConfiguration>> {
        let name = draft.program_info.name.clone();
        match validate(draft) {
            Ok(valid) => {
                let valid = Arc::new(valid);
                *self.active.write() = Some(valid.clone());
                metrics::counter!("loyalty.activations").increment(1);
                info!(
                    program = %name,
                    points_per_dollar = %valid.earning_rule().points_per_dollar,
                    point_value = %valid.redemption_rule().point_value,
                    increment = valid.redemption_increment(),
                    minimum = valid.minimum_points_to_redeem(),
                    expiry = valid.expiry_rule().enabled,
                    "Loyalty program activated"
                );
                Ok(valid)
            }
            Err(errors) => {
                metrics::counter!("loyalty.activation_rejected").increment(1);
                warn!(
                    program = %name,
                    violations = errors.len(),
                    "Loyalty program rejected"
                );
                Err(LoyaltyError::Validation(errors))
            }
        }
    }

    /// Snapshot of the active program.
    pub fn current(&self) -> LoyaltyResult<Arc<ValidConfiguration>> {
        self.active
            .read()
            .clone()
            .ok_or(LoyaltyError::NoActiveProgram)
    }

    /// Editable copy of the active program.
    pub fn edit(&self) -> LoyaltyResult<Configuration> {
        Ok(self.current()?.to_draft())
    }

    /// Points for a purchase under the active program.
    pub fn earn(&self, purchase: &PurchaseContext) -> LoyaltyResult<EarnBreakdown> {
        let program = self.current()?;
        let breakdown = earn_breakdown(&program, purchase)?;

        metrics::counter!("loyalty.points_earned").increment(breakdown.total());

        debug!(
            amount = %purchase.amount_dollars,
            category = %purchase.category,
            rate = %breakdown.rate_applied,
            category_override = breakdown.category_override,
            base = breakdown.base_points,
            bonus = breakdown.bonus_points,
            "Points earned"
        );

        Ok(breakdown)
    }

    /// Price a redemption under the active program. The balance is not
    /// touched; apply `points_consumed` on success.
    pub fn redeem(&self, request: &RedemptionRequest) -> LoyaltyResult<RedemptionOutcome> {
        let program = self.current()?;
        match redemption::redeem(&program, request) {
            Ok(outcome) => {
                metrics::counter!("loyalty.redemptions").increment(1);
                info!(
                    product = %request.product_id,
                    category = %request.category,
                    points = outcome.points_consumed,
                    dollars = %outcome.dollar_value,
                    "Points redeemed"
                );
                Ok(outcome)
            }
            Err(e) => {
                metrics::counter!("loyalty.redemptions_rejected", "reason" => e.reason())
                    .increment(1);
                warn!(
                    product = %request.product_id,
                    points = request.points_to_redeem,
                    reason = e.reason(),
                    "Redemption rejected"
                );
                Err(e.into())
            }
        }
    }

    pub fn expiry_date(
        &self,
        earned_at: DateTime<Utc>,
        window: &ExpiryWindow,
    ) -> LoyaltyResult<Option<DateTime<Utc>>> {
        let program = self.current()?;
        Ok(expiry::expiry_date(&program, earned_at, window.period()))
    }

    pub fn reminder_due(
        &self,
        expiry: DateTime<Utc>,
        window: &ExpiryWindow,
        now: DateTime<Utc>,
    ) -> LoyaltyResult<bool> {
        let program = self.current()?;
        Ok(expiry::reminder_due(
            &program,
            expiry,
            window.reminder_lead(),
            now,
        ))
    }
}
