//! Loyalty rules engine — validation, earning, redemption and expiry
//! policy over a loyalty program's configuration.
//!
//! Calculators are pure functions over a [`ValidConfiguration`]; the
//! [`LoyaltyEngine`] wraps them around a single active program.

pub mod earning;
pub mod engine;
pub mod expiry;
pub mod redemption;
pub mod validator;

pub use earning::{earn_breakdown, points_earned, EarnBreakdown};
pub use engine::LoyaltyEngine;
pub use expiry::{expiry_date, reminder_due, ExpiryWindow};
pub use redemption::{effective_point_value, redeem};
pub use validator::{validate, ValidConfiguration};
