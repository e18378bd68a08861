//! Configuration for the listing lifecycle service.
//!
//! This module centralizes magic numbers and configuration values
//! to improve maintainability and enable easier tuning.

use crate::error::{PlazaError, PlazaResult};
use crate::marketplace::Plan;
use crate::money::Money;

/// Delay between order creation and the one-shot reconciliation sweep.
pub const SWEEP_DELAY_SECS: u64 = 60;

/// Length of one plan month in milliseconds (fixed 30 days).
pub const PLAN_MONTH_MS: u64 = 30 * 24 * 60 * 60 * 1000;

/// Request timeout applied to every gateway and store HTTP call.
pub const HTTP_TIMEOUT_SECS: u64 = 20;

/// Single checkout currency for gateway orders.
pub const CHECKOUT_CURRENCY: &str = "USD";

/// Capacity of the store change-notification channel.
pub const STORE_EVENT_CAPACITY: usize = 256;

/// Default listen port when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable names consumed at startup.
pub mod env_keys {
    pub const PAYPAL_CLIENT_ID: &str = "PAYPAL_CLIENT_ID";
    pub const PAYPAL_CLIENT_SECRET: &str = "PAYPAL_CLIENT_SECRET";
    pub const PAYPAL_SANDBOX: &str = "PAYPAL_SANDBOX";
    pub const STORE_URL: &str = "STORE_URL";
    pub const STORE_AUTH_TOKEN: &str = "STORE_AUTH_TOKEN";
    pub const ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
    pub const PORT: &str = "PORT";
}

/// Price table per listing plan.
#[derive(Debug, Clone)]
pub struct PlanPricing {
    one_month: Money,
    three_months: Money,
    six_months: Money,
    twelve_months: Money,
}

impl PlanPricing {
    pub fn price(&self, plan: Plan) -> Money {
        match plan {
            Plan::OneMonth => self.one_month,
            Plan::ThreeMonths => self.three_months,
            Plan::SixMonths => self.six_months,
            Plan::TwelveMonths => self.twelve_months,
        }
    }

    /// Override the price for a single plan.
    #[must_use]
    pub fn with_price(mut self, plan: Plan, price: Money) -> Self {
        match plan {
            Plan::OneMonth => self.one_month = price,
            Plan::ThreeMonths => self.three_months = price,
            Plan::SixMonths => self.six_months = price,
            Plan::TwelveMonths => self.twelve_months = price,
        }
        self
    }
}

impl Default for PlanPricing {
    fn default() -> Self {
        Self {
            one_month: Money::from_cents(10_00),
            three_months: Money::from_cents(27_00),
            six_months: Money::from_cents(48_00),
            twelve_months: Money::from_cents(84_00),
        }
    }
}

/// Process configuration, read once at startup.
///
/// Absence of a required value is a fatal startup error; callers are
/// expected to abort rather than run with a partial configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub paypal_client_id: String,
    pub paypal_client_secret: String,
    pub paypal_sandbox: bool,
    pub store_url: String,
    pub store_auth_token: Option<String>,
    pub allowed_origins: Vec<String>,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> PlazaResult<Self> {
        Ok(Self {
            paypal_client_id: require(env_keys::PAYPAL_CLIENT_ID)?,
            paypal_client_secret: require(env_keys::PAYPAL_CLIENT_SECRET)?,
            paypal_sandbox: std::env::var(env_keys::PAYPAL_SANDBOX)
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            store_url: require(env_keys::STORE_URL)?,
            store_auth_token: std::env::var(env_keys::STORE_AUTH_TOKEN).ok(),
            allowed_origins: std::env::var(env_keys::ALLOWED_ORIGINS)
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            port: std::env::var(env_keys::PORT)
                .ok()
                .map(|v| {
                    v.parse()
                        .map_err(|_| PlazaError::Config(format!("invalid PORT '{v}'")))
                })
                .transpose()?
                .unwrap_or(DEFAULT_PORT),
        })
    }
}

fn require(key: &str) -> PlazaResult<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PlazaError::Config(format!("missing required environment variable {key}")))
}

/// Return the current epoch timestamp in milliseconds.
///
/// This is a convenience wrapper that avoids the boilerplate of
/// `SystemTimeProvider::new().now_ms()` in production code paths.
/// For testable code, prefer accepting a `TimeProvider` parameter instead.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
