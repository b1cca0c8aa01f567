//! Rolling point expiry. Each earned batch runs its own clock from the time
//! it was earned; there is no program-wide anniversary.

use chrono::{DateTime, Duration, Utc};
use loyalty_core::error::ExpiryError;

use crate::validator::ValidConfiguration;

/// Caller-supplied expiry period and reminder lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindow {
    period: Duration,
    reminder_lead: Duration,
}

impl ExpiryWindow {
    pub fn new(period: Duration, reminder_lead: Duration) -> Result<Self, ExpiryError> {
        if period <= Duration::zero() {
            return Err(ExpiryError::NonPositivePeriod);
        }
        if reminder_lead < Duration::zero() {
            return Err(ExpiryError::NegativeLeadTime);
        }
        Ok(Self {
            period,
            reminder_lead,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn reminder_lead(&self) -> Duration {
        self.reminder_lead
    }
}

/// When a batch earned at `earned_at` expires, or `None` if points never
/// expire under this program.
pub fn expiry_date(
    config: &ValidConfiguration,
    earned_at: DateTime<Utc>,
    expiry_period: Duration,
) -> Option<DateTime<Utc>> {
    if !config.expiry_rule().enabled {
        return None;
    }
    // Out-of-range dates clamp toward the direction of the period.
    let limit = if expiry_period < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    };
    Some(earned_at.checked_add_signed(expiry_period).unwrap_or(limit))
}

/// Whether the expiry reminder for a batch expiring at `expiry` is due at
/// `now`: inside `[expiry - lead, expiry)`.
pub fn reminder_due(
    config: &ValidConfiguration,
    expiry: DateTime<Utc>,
    reminder_lead_time: Duration,
    now: DateTime<Utc>,
) -> bool {
    let rule = config.expiry_rule();
    if !rule.enabled || !rule.reminder_enabled {
        return false;
    }
    let limit = if reminder_lead_time < Duration::zero() {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    };
    let window_opens = expiry
        .checked_sub_signed(reminder_lead_time)
        .unwrap_or(limit);
    now >= window_opens && now < expiry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate;
    use chrono::TimeZone;
    use loyalty_core::program::Configuration;

    fn program(enabled: bool, reminder: bool) -> ValidConfiguration {
        let mut config = Configuration::starter("Test");
        config.expiry_rule.enabled = enabled;
        config.expiry_rule.reminder_enabled = reminder;
        validate(config).unwrap()
    }

    fn earned_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_disabled_never_expires() {
        let config = program(false, false);
        assert_eq!(expiry_date(&config, earned_at(), Duration::days(90)), None);
        assert_eq!(
            expiry_date(&config, DateTime::<Utc>::MIN_UTC, Duration::days(1)),
            None
        );
    }

    #[test]
    fn test_rolling_expiry() {
        let config = program(true, false);
        let expiry = expiry_date(&config, earned_at(), Duration::days(90)).unwrap();
        assert_eq!(expiry, Utc.with_ymd_and_hms(2026, 4, 15, 12, 0, 0).unwrap());

        let later = earned_at() + Duration::days(10);
        let later_expiry = expiry_date(&config, later, Duration::days(90)).unwrap();
        assert_eq!(later_expiry - expiry, Duration::days(10));
    }

    #[test]
    fn test_expiry_saturates() {
        let config = program(true, false);
        let expiry = expiry_date(&config, DateTime::<Utc>::MAX_UTC, Duration::days(1)).unwrap();
        assert_eq!(expiry, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_negative_period_saturates_toward_past() {
        let config = program(true, false);
        let expiry = expiry_date(&config, DateTime::<Utc>::MIN_UTC, Duration::days(-1)).unwrap();
        assert_eq!(expiry, DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_negative_lead_never_opens_window() {
        let config = program(true, true);
        let expiry = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        let lead = Duration::days(-2);
        assert!(!reminder_due(&config, expiry, lead, expiry - Duration::seconds(1)));
        assert!(!reminder_due(&config, expiry, lead, DateTime::<Utc>::MIN_UTC));
    }

    #[test]
    fn test_reminder_window() {
        let config = program(true, true);
        let expiry = earned_at() + Duration::days(90);
        let lead = Duration::days(7);

        assert!(!reminder_due(&config, expiry, lead, expiry - Duration::days(8)));
        assert!(reminder_due(&config, expiry, lead, expiry - lead));
        assert!(reminder_due(&config, expiry, lead, expiry - Duration::seconds(1)));
        assert!(!reminder_due(&config, expiry, lead, expiry));
        assert!(!reminder_due(&config, expiry, lead, expiry + Duration::days(1)));
    }

    #[test]
    fn test_reminder_disabled() {
        let config = program(true, false);
        let expiry = earned_at() + Duration::days(90);
        assert!(!reminder_due(&config, expiry, Duration::days(7), expiry - Duration::days(1)));
    }

    #[test]
    fn test_window_rejects_bad_durations() {
        assert_eq!(
            ExpiryWindow::new(Duration::zero(), Duration::days(1)),
            Err(ExpiryError::NonPositivePeriod)
        );
        assert_eq!(
            ExpiryWindow::new(Duration::days(90), Duration::days(-1)),
            Err(ExpiryError::NegativeLeadTime)
        );
        let window = ExpiryWindow::new(Duration::days(90), Duration::zero()).unwrap();
        assert_eq!(window.period(), Duration::days(90));
        assert_eq!(window.reminder_lead(), Duration::zero());
    }
}
