//! Loyalty program configuration model — the rules an operator edits on the
//! settings screen, and the JSON shape they are stored in.
//!
//! A [`Configuration`] is always a draft: any values are representable,
//! including ones the validator will reject (negative rates, duplicate
//! categories). Activation turns it into a `ValidConfiguration` in the engine
//! crate; editing an active program starts from a fresh draft copy.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::LoyaltyResult;

// ─── Program Info ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

// ─── Earning ────────────────────────────────────────────────────────────────

/// Which purchases earn points at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EligibleScope {
    #[default]
    #[serde(alias = "all")]
    AllProducts,
    /// Only products the catalog marks as eligible; membership is resolved by
    /// the caller and passed in with the purchase.
    #[serde(alias = "selected")]
    SelectedProducts,
}

/// Per-category override of the base earning rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMultiplier {
    pub id: u64,
    pub category: String,
    pub points_per_dollar: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningRule {
    pub points_per_dollar: Decimal,
    #[serde(default)]
    pub sign_up_bonus_enabled: bool,
    #[serde(default)]
    pub eligible_scope: EligibleScope,
    /// Insertion-ordered; duplicates are caught by validation.
    #[serde(default)]
    pub category_multipliers: Vec<CategoryMultiplier>,
}

// ─── Redemption ─────────────────────────────────────────────────────────────

/// Per-category override of the dollars-per-point conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAdjustment {
    pub id: u64,
    pub category: String,
    pub point_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRule {
    /// Dollars per point.
    pub point_value: Decimal,
    pub redemption_increment: i64,
    pub minimum_points_to_redeem: i64,
    #[serde(default)]
    pub minimum_spend_required: bool,
    /// Product identifiers that cannot be paid for with points.
    #[serde(default)]
    pub excluded_products: Vec<String>,
    #[serde(default)]
    pub redemption_value_adjustments: Vec<ValueAdjustment>,
}

impl RedemptionRule {
    /// Operator-facing conversion summary, e.g. `100 points = $1.00`.
    pub fn point_value_display(&self) -> String {
        let hundred = (Decimal::ONE_HUNDRED * self.point_value)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("100 points = ${:.2}", hundred)
    }

    pub fn increment_display(&self) -> String {
        let n = self.redemption_increment;
        format!(
            "Guests can redeem points in multiples of {} (e.g., {}, {}, {}...).",
            n,
            n,
            n.saturating_mul(2),
            n.saturating_mul(3)
        )
    }

    /// `None` when nothing is excluded.
    pub fn excluded_summary(&self) -> Option<String> {
        if self.excluded_products.is_empty() {
            None
        } else {
            Some(format!("{} product(s) excluded", self.excluded_products.len()))
        }
    }
}

// ─── Expiry ─────────────────────────────────────────────────────────────────

/// Rolling point expiry. The period and reminder lead time are not part of
/// the stored rules; callers supply them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryRule {
    pub enabled: bool,
    #[serde(default)]
    pub reminder_enabled: bool,
}

// ─── Configuration ──────────────────────────────────────────────────────────

/// Complete set of program rules in draft form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub program_info: ProgramInfo,
    pub earning_rule: EarningRule,
    pub redemption_rule: RedemptionRule,
    #[serde(default)]
    pub expiry_rule: ExpiryRule,
    /// Next row id to hand out. Persisted so ids are never reused after a
    /// row is deleted, even across a save and reload.
    #[serde(default)]
    next_entry_id: u64,
}

// Row ids are addressing only; two drafts with the same rules are equal
// whatever their edit history.
impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.program_info == other.program_info
            && self.earning_rule == other.earning_rule
            && self.redemption_rule == other.redemption_rule
            && self.expiry_rule == other.expiry_rule
    }
}

impl Eq for Configuration {}

impl Configuration {
    pub fn new(
        program_info: ProgramInfo,
        earning_rule: EarningRule,
        redemption_rule: RedemptionRule,
        expiry_rule: ExpiryRule,
    ) -> Self {
        Self {
            program_info,
            earning_rule,
            redemption_rule,
            expiry_rule,
            next_entry_id: 0,
        }
    }

    /// New program with the settings screen's initial values: one point per
    /// dollar, 100 points = $1.00, redeemed in blocks of 10 once the guest
    /// holds 100.
    pub fn starter(name: impl Into<String>) -> Self {
        Self::new(
            ProgramInfo {
                name: name.into(),
                description: String::new(),
            },
            EarningRule {
                points_per_dollar: Decimal::ONE,
                sign_up_bonus_enabled: false,
                eligible_scope: EligibleScope::AllProducts,
                category_multipliers: Vec::new(),
            },
            RedemptionRule {
                point_value: Decimal::new(1, 2),
                redemption_increment: 10,
                minimum_points_to_redeem: 100,
                minimum_spend_required: false,
                excluded_products: Vec::new(),
                redemption_value_adjustments: Vec::new(),
            },
            ExpiryRule::default(),
        )
    }

    pub fn from_json(json: &str) -> LoyaltyResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> LoyaltyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> LoyaltyResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> LoyaltyResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    // ── Row editing ─────────────────────────────────────────────────────

    /// Append a blank multiplier row earning one point per dollar.
    /// Returns the new row's id.
    pub fn add_category_multiplier(&mut self) -> u64 {
        let id = self.fresh_entry_id();
        self.earning_rule.category_multipliers.push(CategoryMultiplier {
            id,
            category: String::new(),
            points_per_dollar: Decimal::ONE,
        });
        id
    }

    pub fn category_multiplier_mut(&mut self, id: u64) -> Option<&mut CategoryMultiplier> {
        self.earning_rule
            .category_multipliers
            .iter_mut()
            .find(|m| m.id == id)
    }

    pub fn remove_category_multiplier(&mut self, id: u64) -> Option<CategoryMultiplier> {
        let rows = &mut self.earning_rule.category_multipliers;
        let pos = rows.iter().position(|m| m.id == id)?;
        Some(rows.remove(pos))
    }

    /// Append a blank adjustment row valued at the current base point value.
    pub fn add_value_adjustment(&mut self) -> u64 {
        let id = self.fresh_entry_id();
        let point_value = self.redemption_rule.point_value;
        self.redemption_rule
            .redemption_value_adjustments
            .push(ValueAdjustment {
                id,
                category: String::new(),
                point_value,
            });
        id
    }

    pub fn value_adjustment_mut(&mut self, id: u64) -> Option<&mut ValueAdjustment> {
        self.redemption_rule
            .redemption_value_adjustments
            .iter_mut()
            .find(|a| a.id == id)
    }

    pub fn remove_value_adjustment(&mut self, id: u64) -> Option<ValueAdjustment> {
        let rows = &mut self.redemption_rule.redemption_value_adjustments;
        let pos = rows.iter().position(|a| a.id == id)?;
        Some(rows.remove(pos))
    }

    /// Add or remove a product from the exclusion list. Returns whether the
    /// list changed.
    pub fn set_product_excluded(&mut self, product: &str, excluded: bool) -> bool {
        let products = &mut self.redemption_rule.excluded_products;
        let present = products.iter().any(|p| p == product);
        match (excluded, present) {
            (true, false) => {
                products.push(product.to_string());
                true
            }
            (false, true) => {
                products.retain(|p| p != product);
                true
            }
            _ => false,
        }
    }

    fn fresh_entry_id(&mut self) -> u64 {
        // Ids loaded from storage may be ahead of the counter.
        let highest = self
            .earning_rule
            .category_multipliers
            .iter()
            .map(|m| m.id)
            .chain(
                self.redemption_rule
                    .redemption_value_adjustments
                    .iter()
                    .map(|a| a.id),
            )
            .max()
            .unwrap_or(0);
        let id = self.next_entry_id.max(highest.saturating_add(1));
        self.next_entry_id = id.saturating_add(1);
        id
    }
}
