use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

pub type LoyaltyResult<T> = Result<T, LoyaltyError>;

#[derive(Error, Debug)]
pub enum LoyaltyError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Program rules rejected with {} violation(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("No loyalty program has been activated")]
    NoActiveProgram,

    #[error("Earning error: {0}")]
    Earning(#[from] EarningError),

    #[error("Redemption rejected: {0}")]
    Redemption(#[from] RedemptionError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which keyed collection a duplicate category was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSection {
    CategoryMultipliers,
    RedemptionValueAdjustments,
}

impl std::fmt::Display for RuleSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleSection::CategoryMultipliers => write!(f, "category multipliers"),
            RuleSection::RedemptionValueAdjustments => write!(f, "redemption value adjustments"),
        }
    }
}

/// Authoring-time violation. The validator reports every one it finds.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("program name is required")]
    MissingName,

    #[error("points per dollar must not be negative (got {rate})")]
    NegativeRate { rate: Decimal },

    #[error("category multiplier `{category}` has an invalid rate {rate}")]
    InvalidMultiplier { category: String, rate: Decimal },

    #[error("category `{category}` appears more than once in {section}")]
    DuplicateCategory { section: RuleSection, category: String },

    #[error("point value must be greater than zero (got {value})")]
    InvalidPointValue { value: Decimal },

    #[error("redemption increment must be at least 1 (got {increment})")]
    InvalidIncrement { increment: i64 },

    #[error("minimum points to redeem must not be negative (got {minimum})")]
    InvalidMinimum { minimum: i64 },

    #[error("redemption value adjustment `{category}` has an invalid point value {value}")]
    InvalidAdjustment { category: String, value: Decimal },

    #[error("expiry reminders require point expiry to be enabled")]
    ReminderWithoutExpiry,
}

/// Transaction-time failure while computing earned points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EarningError {
    #[error("purchase amount must not be negative (got {0})")]
    InvalidAmount(Decimal),

    #[error("points for a purchase of {amount} at rate {rate} exceed the representable range")]
    Overflow { amount: Decimal, rate: Decimal },

    #[error("points for a purchase of {amount} at rate {rate} cannot be computed exactly")]
    Imprecise { amount: Decimal, rate: Decimal },
}

/// First failed check of a redemption attempt. A rejected redemption moves
/// zero points and zero dollars.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RedemptionError {
    #[error("product `{0}` cannot be paid for with points")]
    ProductExcluded(String),

    #[error("at least {minimum} points must be redeemed (requested {requested})")]
    BelowMinimum { requested: u64, minimum: u64 },

    #[error("points must be redeemed in multiples of {increment} (requested {requested})")]
    NotAnIncrement { requested: u64, increment: u64 },

    #[error("insufficient balance: requested {requested}, available {balance}")]
    InsufficientBalance { requested: u64, balance: u64 },

    #[error("a purchase is required before points can be redeemed")]
    MinimumSpendNotMet,

    #[error("redemption value for {points} points exceeds the representable range")]
    Overflow { points: u64 },
}

impl RedemptionError {
    /// Short machine-readable reason, used as a metrics label.
    pub fn reason(&self) -> &'static str {
        match self {
            RedemptionError::ProductExcluded(_) => "product_excluded",
            RedemptionError::BelowMinimum { .. } => "below_minimum",
            RedemptionError::NotAnIncrement { .. } => "not_an_increment",
            RedemptionError::InsufficientBalance { .. } => "insufficient_balance",
            RedemptionError::MinimumSpendNotMet => "minimum_spend_not_met",
            RedemptionError::Overflow { .. } => "overflow",
        }
    }
}

/// Rejected expiry parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpiryError {
    #[error("expiry period must be positive")]
    NonPositivePeriod,

    #[error("reminder lead time must not be negative")]
    NegativeLeadTime,
}
