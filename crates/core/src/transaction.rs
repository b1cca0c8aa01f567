//! Per-transaction inputs and outputs of the rules engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// A purchase to award points for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseContext {
    pub amount_dollars: Decimal,
    pub category: String,
    /// Whether the catalog marks the product as eligible. Only consulted for
    /// programs scoped to selected products.
    #[serde(default = "default_eligible")]
    pub is_eligible: bool,
    /// Set to the bonus amount when this is the guest's qualifying first
    /// transaction. The amount itself is configured outside the program rules.
    #[serde(default)]
    pub sign_up_bonus: Option<NonZeroU64>,
}

fn default_eligible() -> bool {
    true
}

impl PurchaseContext {
    pub fn new(amount_dollars: Decimal, category: impl Into<String>) -> Self {
        Self {
            amount_dollars,
            category: category.into(),
            is_eligible: true,
            sign_up_bonus: None,
        }
    }
}

/// A guest asking to pay with points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRequest {
    pub points_to_redeem: u64,
    pub category: String,
    pub product_id: String,
    pub current_spend_dollars: Decimal,
    pub point_balance: u64,
}

/// Result of an accepted redemption. Applying it to the guest's balance is
/// the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionOutcome {
    pub dollar_value: Decimal,
    pub points_consumed: u64,
}
