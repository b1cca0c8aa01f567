//! Program rules validation — the gate between a draft [`Configuration`] and
//! the [`ValidConfiguration`] the calculators accept.

use loyalty_core::error::{RuleSection, ValidationError};
use loyalty_core::program::{
    Configuration, EarningRule, ExpiryRule, ProgramInfo, RedemptionRule,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Program rules that passed every validation check.
///
/// Immutable: the only way to change an active program is to take a draft
/// copy with [`ValidConfiguration::to_draft`] and validate it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidConfiguration {
    config: Configuration,
    earning_overrides: HashMap<String, Decimal>,
    value_overrides: HashMap<String, Decimal>,
    excluded_products: HashSet<String>,
    redemption_increment: u64,
    minimum_points_to_redeem: u64,
}

impl ValidConfiguration {
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn program_info(&self) -> &ProgramInfo {
        &self.config.program_info
    }

    pub fn earning_rule(&self) -> &EarningRule {
        &self.config.earning_rule
    }

    pub fn redemption_rule(&self) -> &RedemptionRule {
        &self.config.redemption_rule
    }

    pub fn expiry_rule(&self) -> &ExpiryRule {
        &self.config.expiry_rule
    }

    pub fn redemption_increment(&self) -> u64 {
        self.redemption_increment
    }

    pub fn minimum_points_to_redeem(&self) -> u64 {
        self.minimum_points_to_redeem
    }

    /// Category multiplier for `category`, if one is configured.
    pub fn earning_override(&self, category: &str) -> Option<Decimal> {
        self.earning_overrides.get(category.trim()).copied()
    }

    /// Per-category point value, if one is configured.
    pub fn value_override(&self, category: &str) -> Option<Decimal> {
        self.value_overrides.get(category.trim()).copied()
    }

    pub fn is_excluded(&self, product_id: &str) -> bool {
        self.excluded_products.contains(product_id)
    }

    /// Fresh editable copy of these rules.
    pub fn to_draft(&self) -> Configuration {
        self.config.clone()
    }
}

impl TryFrom<Configuration> for ValidConfiguration {
    type Error = Vec<ValidationError>;

    fn try_from(config: Configuration) -> Result<Self, Self::Error> {
        validate(config)
    }
}

/// Check every rule and report every violation at once.
pub fn validate(config: Configuration) -> Result<ValidConfiguration, Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.program_info.name.trim().is_empty() {
        errors.push(ValidationError::MissingName);
    }

    let earning = &config.earning_rule;
    if earning.points_per_dollar < Decimal::ZERO {
        errors.push(ValidationError::NegativeRate {
            rate: earning.points_per_dollar,
        });
    }
    let earning_overrides = collect_overrides(
        RuleSection::CategoryMultipliers,
        earning
            .category_multipliers
            .iter()
            .map(|m| (m.category.as_str(), m.points_per_dollar)),
        |rate| rate >= Decimal::ZERO,
        |category, rate| ValidationError::InvalidMultiplier { category, rate },
        &mut errors,
    );

    let redemption = &config.redemption_rule;
    if redemption.point_value <= Decimal::ZERO {
        errors.push(ValidationError::InvalidPointValue {
            value: redemption.point_value,
        });
    }
    let redemption_increment = match u64::try_from(redemption.redemption_increment) {
        Ok(n) if n >= 1 => n,
        _ => {
            errors.push(ValidationError::InvalidIncrement {
                increment: redemption.redemption_increment,
            });
            0
        }
    };
    // Deliberately independent of the increment.
    let minimum_points_to_redeem = match u64::try_from(redemption.minimum_points_to_redeem) {
        Ok(n) => n,
        Err(_) => {
            errors.push(ValidationError::InvalidMinimum {
                minimum: redemption.minimum_points_to_redeem,
            });
            0
        }
    };
    let value_overrides = collect_overrides(
        RuleSection::RedemptionValueAdjustments,
        redemption
            .redemption_value_adjustments
            .iter()
            .map(|a| (a.category.as_str(), a.point_value)),
        |value| value > Decimal::ZERO,
        |category, value| ValidationError::InvalidAdjustment { category, value },
        &mut errors,
    );

    if config.expiry_rule.reminder_enabled && !config.expiry_rule.enabled {
        errors.push(ValidationError::ReminderWithoutExpiry);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let excluded_products = redemption.excluded_products.iter().cloned().collect();

    Ok(ValidConfiguration {
        config,
        earning_overrides,
        value_overrides,
        excluded_products,
        redemption_increment,
        minimum_points_to_redeem,
    })
}

/// Build a category → value lookup from override rows, recording invalid
/// rows and each duplicated category name once.
fn collect_overrides<'a>(
    section: RuleSection,
    rows: impl Iterator<Item = (&'a str, Decimal)>,
    value_ok: impl Fn(Decimal) -> bool,
    invalid: impl Fn(String, Decimal) -> ValidationError,
    errors: &mut Vec<ValidationError>,
) -> HashMap<String, Decimal> {
    let mut lookup = HashMap::new();
    let mut reported = HashSet::new();

    for (raw_category, value) in rows {
        let category = raw_category.trim();
        if category.is_empty() || !value_ok(value) {
            errors.push(invalid(raw_category.to_string(), value));
        }
        if category.is_empty() {
            continue;
        }
        if lookup.insert(category.to_string(), value).is_some() && reported.insert(category) {
            errors.push(ValidationError::DuplicateCategory {
                section,
                category: category.to_string(),
            });
        }
    }

    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starter() -> Configuration {
        Configuration::starter("Sky Zone Loyalty")
    }

    #[test]
    fn test_starter_is_valid() {
        let valid = validate(starter()).unwrap();
        assert_eq!(valid.redemption_increment(), 10);
        assert_eq!(valid.minimum_points_to_redeem(), 100);
        assert_eq!(valid.program_info().name, "Sky Zone Loyalty");
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut config = starter();
        config.program_info.name = "   ".to_string();
        assert_eq!(validate(config).unwrap_err(), vec![ValidationError::MissingName]);
    }

    #[test]
    fn test_all_violations_collected() {
        let mut config = starter();
        config.program_info.name.clear();
        config.earning_rule.points_per_dollar = Decimal::new(-1, 0);
        config.redemption_rule.point_value = Decimal::ZERO;
        config.redemption_rule.redemption_increment = 0;
        config.redemption_rule.minimum_points_to_redeem = -5;
        config.expiry_rule.reminder_enabled = true;

        let errors = validate(config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingName,
                ValidationError::NegativeRate { rate: Decimal::new(-1, 0) },
                ValidationError::InvalidPointValue { value: Decimal::ZERO },
                ValidationError::InvalidIncrement { increment: 0 },
                ValidationError::InvalidMinimum { minimum: -5 },
                ValidationError::ReminderWithoutExpiry,
            ]
        );
    }

    #[test]
    fn test_zero_point_value_reported_with_missing_name() {
        let mut config = starter();
        config.program_info.name.clear();
        config.redemption_rule.point_value = Decimal::ZERO;

        let errors = validate(config).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingName));
        assert!(errors.contains(&ValidationError::InvalidPointValue { value: Decimal::ZERO }));
    }

    #[test]
    fn test_negative_increment_rejected() {
        let mut config = starter();
        config.redemption_rule.redemption_increment = -10;
        assert_eq!(
            validate(config).unwrap_err(),
            vec![ValidationError::InvalidIncrement { increment: -10 }]
        );
    }

    #[test]
    fn test_minimum_need_not_align_with_increment() {
        let mut config = starter();
        config.redemption_rule.minimum_points_to_redeem = 95;
        assert!(validate(config).is_ok());
    }

    #[test]
    fn test_multiplier_rules() {
        let mut config = starter();
        for (category, rate) in [
            ("Food", Decimal::new(2, 0)),
            ("", Decimal::ONE),
            ("Merch", Decimal::new(-1, 0)),
            (" Food ", Decimal::new(3, 0)),
            ("Food", Decimal::new(4, 0)),
            ("Free", Decimal::ZERO),
        ] {
            let id = config.add_category_multiplier();
            let row = config.category_multiplier_mut(id).unwrap();
            row.category = category.to_string();
            row.points_per_dollar = rate;
        }

        let errors = validate(config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidMultiplier {
                    category: String::new(),
                    rate: Decimal::ONE
                },
                ValidationError::InvalidMultiplier {
                    category: "Merch".to_string(),
                    rate: Decimal::new(-1, 0)
                },
                ValidationError::DuplicateCategory {
                    section: RuleSection::CategoryMultipliers,
                    category: "Food".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_adjustment_rules() {
        let mut config = starter();
        for (category, value) in [
            ("Arcade", Decimal::ZERO),
            ("Food", Decimal::new(2, 2)),
            ("Food", Decimal::new(3, 2)),
        ] {
            let id = config.add_value_adjustment();
            let row = config.value_adjustment_mut(id).unwrap();
            row.category = category.to_string();
            row.point_value = value;
        }

        let errors = validate(config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidAdjustment {
                    category: "Arcade".to_string(),
                    value: Decimal::ZERO
                },
                ValidationError::DuplicateCategory {
                    section: RuleSection::RedemptionValueAdjustments,
                    category: "Food".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_same_category_in_both_sections_is_fine() {
        let mut config = starter();
        let m = config.add_category_multiplier();
        config.category_multiplier_mut(m).unwrap().category = "Food".to_string();
        let a = config.add_value_adjustment();
        config.value_adjustment_mut(a).unwrap().category = "Food".to_string();

        let valid = validate(config).unwrap();
        assert_eq!(valid.earning_override("Food"), Some(Decimal::ONE));
        assert_eq!(valid.value_override(" Food"), Some(Decimal::new(1, 2)));
        assert_eq!(valid.earning_override("Merch"), None);
    }

    #[test]
    fn test_reminder_with_expiry_is_valid() {
        let mut config = starter();
        config.expiry_rule.enabled = true;
        config.expiry_rule.reminder_enabled = true;
        assert!(validate(config).is_ok());
    }

    #[test]
    fn test_draft_round_trip() {
        let valid = validate(starter()).unwrap();
        let mut draft = valid.to_draft();
        draft.earning_rule.points_per_dollar = Decimal::new(2, 0);

        assert_eq!(valid.earning_rule().points_per_dollar, Decimal::ONE);
        let revalidated = ValidConfiguration::try_from(draft).unwrap();
        assert_eq!(revalidated.earning_rule().points_per_dollar, Decimal::new(2, 0));
    }
}
