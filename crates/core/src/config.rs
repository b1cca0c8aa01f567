use chrono::Duration;
use serde::Deserialize;

use crate::error::LoyaltyResult;

/// Root application configuration. Loaded from environment variables with
/// the prefix `LOYALTY_RULES__` and an optional TOML file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub program: ProgramSource,
}

/// Values the rules engine needs from outside the stored program rules.
///
/// None of these have defaults: the settings form never captured them, so a
/// command that needs one and finds it unset fails instead of guessing.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineSettings {
    /// Points granted on a guest's qualifying first transaction.
    #[serde(default)]
    pub sign_up_bonus_points: Option<u64>,
    /// Rolling expiry period, in days, applied to every earned batch.
    #[serde(default)]
    pub expiry_period_days: Option<u32>,
    /// How long before expiry a reminder becomes due, in days.
    #[serde(default)]
    pub reminder_lead_days: Option<u32>,
}

impl EngineSettings {
    pub fn expiry_period(&self) -> Option<Duration> {
        self.expiry_period_days.map(|d| Duration::days(i64::from(d)))
    }

    pub fn reminder_lead(&self) -> Option<Duration> {
        self.reminder_lead_days.map(|d| Duration::days(i64::from(d)))
    }
}

/// Where the program rules JSON lives.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramSource {
    #[serde(default = "default_program_path")]
    pub path: String,
}

fn default_program_path() -> String {
    "loyalty-program.json".to_string()
}

impl Default for ProgramSource {
    fn default() -> Self {
        Self {
            path: default_program_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional config file and environment
    /// variables. Environment values win.
    pub fn load(file: Option<&str>) -> LoyaltyResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("LOYALTY_RULES")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
