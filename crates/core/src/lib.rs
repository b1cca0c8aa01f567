//! Shared types for the loyalty rules engine: the program configuration
//! model, transaction inputs/outputs, error taxonomy and app settings.

pub mod config;
pub mod error;
pub mod program;
pub mod transaction;

pub use config::AppConfig;
pub use error::{
    EarningError, ExpiryError, LoyaltyError, LoyaltyResult, RedemptionError, RuleSection,
    ValidationError,
};
pub use program::{
    CategoryMultiplier, Configuration, EarningRule, EligibleScope, ExpiryRule, ProgramInfo,
    RedemptionRule, ValueAdjustment,
};
pub use transaction::{PurchaseContext, RedemptionRequest, RedemptionOutcome};
