//! loyalty-rules — operator tool for authoring and exercising a spend-based
//! loyalty program stored as JSON.

use anyhow::{bail, Context};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use loyalty_core::config::AppConfig;
use loyalty_core::error::LoyaltyError;
use loyalty_core::program::Configuration;
use loyalty_core::transaction::{PurchaseContext, RedemptionRequest};
use loyalty_engine::{validate, EarnBreakdown, ExpiryWindow, LoyaltyEngine};
use rust_decimal::Decimal;
use serde::Serialize;
use std::num::NonZeroU64;
use std::path::Path;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "loyalty-rules")]
#[command(about = "Validate and exercise a spend-based loyalty program")]
#[command(version)]
struct Cli {
    /// Settings file (TOML); environment variables override it
    #[arg(long, global = true, env = "LOYALTY_RULES_SETTINGS")]
    settings: Option<String>,

    /// Program rules JSON file (overrides config)
    #[arg(long, global = true, env = "LOYALTY_RULES__PROGRAM__PATH")]
    program: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a starter program file
    Init {
        #[arg(long)]
        name: String,
        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Check the program rules and list every violation
    Validate,
    /// Show the program the way the settings screen describes it
    Summary,
    /// Points a purchase would earn
    Earn {
        #[arg(long)]
        amount: Decimal,
        #[arg(long, default_value = "")]
        category: String,
        /// Product is not in the eligible set
        #[arg(long, default_value_t = false)]
        ineligible: bool,
        /// Guest's qualifying first transaction
        #[arg(long, default_value_t = false)]
        first_transaction: bool,
        /// Sign-up bonus amount (overrides config)
        #[arg(long, env = "LOYALTY_RULES__ENGINE__SIGN_UP_BONUS_POINTS")]
        sign_up_bonus: Option<u64>,
    },
    /// Price a redemption without touching any balance
    Redeem {
        #[arg(long)]
        points: u64,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long)]
        product: String,
        #[arg(long)]
        spend: Decimal,
        #[arg(long)]
        balance: u64,
    },
    /// Expiry date and reminder status for a batch of points
    Expiry {
        /// When the batch was earned (RFC 3339)
        #[arg(long)]
        earned_at: DateTime<Utc>,
        /// Evaluate the reminder at this instant instead of now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
        /// Expiry period in days (overrides config)
        #[arg(long, env = "LOYALTY_RULES__ENGINE__EXPIRY_PERIOD_DAYS")]
        expiry_days: Option<u32>,
        /// Reminder lead time in days (overrides config)
        #[arg(long, env = "LOYALTY_RULES__ENGINE__REMINDER_LEAD_DAYS")]
        reminder_days: Option<u32>,
    },
}

#[derive(Serialize)]
struct EarnReport {
    points: u64,
    #[serde(flatten)]
    breakdown: EarnBreakdown,
}

#[derive(Serialize)]
struct RedeemReport {
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    dollar_value: Option<Decimal>,
    points_consumed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
struct ExpiryReport {
    expires_at: Option<DateTime<Utc>>,
    reminder_due: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loyalty_rules=info,loyalty_engine=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.settings.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(path) = cli.program {
        config.program.path = path;
    }

    info!(program = %config.program.path, "Configuration loaded");

    match cli.command {
        Command::Init { name, force } => init(&config, name, force),
        Command::Validate => validate_program(&config),
        Command::Summary => summary(&config),
        Command::Earn {
            amount,
            category,
            ineligible,
            first_transaction,
            sign_up_bonus,
        } => {
            let engine = activate(&config)?;
            let mut purchase = PurchaseContext::new(amount, category);
            purchase.is_eligible = !ineligible;
            if first_transaction {
                let bonus = sign_up_bonus
                    .or(config.engine.sign_up_bonus_points)
                    .context("sign-up bonus amount is not configured")?;
                purchase.sign_up_bonus =
                    Some(NonZeroU64::new(bonus).context("sign-up bonus must be non-zero")?);
            }
            let breakdown = engine.earn(&purchase)?;
            print_json(&EarnReport {
                points: breakdown.total(),
                breakdown,
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Redeem {
            points,
            category,
            product,
            spend,
            balance,
        } => {
            let engine = activate(&config)?;
            let request = RedemptionRequest {
                points_to_redeem: points,
                category,
                product_id: product,
                current_spend_dollars: spend,
                point_balance: balance,
            };
            match engine.redeem(&request) {
                Ok(outcome) => {
                    print_json(&RedeemReport {
                        accepted: true,
                        dollar_value: Some(outcome.dollar_value),
                        points_consumed: outcome.points_consumed,
                        reason: None,
                        message: None,
                    })?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(LoyaltyError::Redemption(e)) => {
                    print_json(&RedeemReport {
                        accepted: false,
                        dollar_value: None,
                        points_consumed: 0,
                        reason: Some(e.reason()),
                        message: Some(e.to_string()),
                    })?;
                    Ok(ExitCode::from(2))
                }
                Err(e) => Err(e.into()),
            }
        }
        Command::Expiry {
            earned_at,
            now,
            expiry_days,
            reminder_days,
        } => {
            let engine = activate(&config)?;
            let program = engine.current()?;
            if !program.expiry_rule().enabled {
                print_json(&ExpiryReport {
                    expires_at: None,
                    reminder_due: false,
                })?;
                return Ok(ExitCode::SUCCESS);
            }

            let period = expiry_days
                .map(|d| Duration::days(i64::from(d)))
                .or_else(|| config.engine.expiry_period())
                .context("expiry period is not configured")?;
            let lead = match reminder_days
                .map(|d| Duration::days(i64::from(d)))
                .or_else(|| config.engine.reminder_lead())
            {
                Some(lead) => lead,
                None if program.expiry_rule().reminder_enabled => {
                    bail!("reminder lead time is not configured")
                }
                None => Duration::zero(),
            };
            let window = ExpiryWindow::new(period, lead)?;

            let expires_at = engine.expiry_date(earned_at, &window)?;
            let reminder_due = match expires_at {
                Some(expiry) => engine.reminder_due(expiry, &window, now.unwrap_or_else(Utc::now))?,
                None => false,
            };
            print_json(&ExpiryReport {
                expires_at,
                reminder_due,
            })?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_program(config: &AppConfig) -> anyhow::Result<Configuration> {
    let path = &config.program.path;
    Configuration::load(path).with_context(|| format!("failed to load program file {}", path))
}

fn activate(config: &AppConfig) -> anyhow::Result<LoyaltyEngine> {
    let engine = LoyaltyEngine::new();
    engine.activate(load_program(config)?)?;
    Ok(engine)
}

fn init(config: &AppConfig, name: String, force: bool) -> anyhow::Result<ExitCode> {
    let path = &config.program.path;
    if Path::new(path).exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path);
    }
    let program = Configuration::starter(name);
    program
        .save(path)
        .with_context(|| format!("failed to write program file {}", path))?;
    info!(program = %program.program_info.name, path = %path, "Starter program written");
    Ok(ExitCode::SUCCESS)
}

fn validate_program(config: &AppConfig) -> anyhow::Result<ExitCode> {
    match validate(load_program(config)?) {
        Ok(valid) => {
            println!("{} is valid", valid.program_info().name);
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            print_json(&errors)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn summary(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let program = load_program(config)?;
    let info = &program.program_info;
    let earning = &program.earning_rule;
    let redemption = &program.redemption_rule;

    println!("{}", info.name);
    if !info.description.is_empty() {
        println!("  {}", info.description);
    }
    println!();
    println!("Earning: {} point(s) per $1 spend", earning.points_per_dollar);
    println!(
        "  Sign-up bonus: {}",
        if earning.sign_up_bonus_enabled { "on" } else { "off" }
    );
    println!("  Eligible products: {:?}", earning.eligible_scope);
    for m in &earning.category_multipliers {
        println!("  {}: {} point(s) per $1", m.category, m.points_per_dollar);
    }
    println!();
    println!("Redemption: {}", redemption.point_value_display());
    println!("  {}", redemption.increment_display());
    println!(
        "  Minimum points to redeem: {}",
        redemption.minimum_points_to_redeem
    );
    if redemption.minimum_spend_required {
        println!("  Guests must make a purchase before redeeming");
    }
    if let Some(excluded) = redemption.excluded_summary() {
        println!("  {}: {}", excluded, redemption.excluded_products.join(", "));
    }
    for a in &redemption.redemption_value_adjustments {
        println!("  {}: 1 point = ${}", a.category, a.point_value);
    }
    println!();
    println!(
        "Expiry: {} (reminders {})",
        if program.expiry_rule.enabled { "rolling" } else { "never" },
        if program.expiry_rule.reminder_enabled { "on" } else { "off" }
    );
    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
