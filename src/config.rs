//! # config: read configuration from environment variables
//!
//! | Variable                | Default        |
//! |-------------------------|----------------|
//! | `BIND_ADDR`             | `0.0.0.0:3000` |
//! | `API_KEY`               | (unset)        |
//! | `LADDER_RUN_LEN`        | `5`            |
//! | `FEE_RATE`              | `0.001425`     |
//! | `MIN_FEE`               | `20`           |
//! | `TAX_RATE_INTRADAY`     | `0.0015`       |
//! | `TAX_RATE_REGULAR`      | `0.003`        |
//! | `ROI_POLICY`            | `floor`        |
//! | `SESSION_IDLE_TTL_SECS` | `3600`         |
//! | `SESSION_SWEEP_SECS`    | `60`           |
//!
//! A variable that is set but malformed is a startup error.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use rust_decimal::Decimal;

use crate::engine::{RoiPolicy, SettlementCalculator};
use crate::ladder::DEFAULT_RUN_LEN;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr:        SocketAddr,
    /// `None` = dev mode, every request allowed.
    pub api_key:          Option<String>,
    pub ladder_run_len:   usize,
    pub settlement:       SettlementCalculator,
    pub session_idle_ttl: Duration,
    pub session_sweep:    Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr:        SocketAddr::from(([0, 0, 0, 0], 3000)),
            api_key:          None,
            ladder_run_len:   DEFAULT_RUN_LEN,
            settlement:       SettlementCalculator::default(),
            session_idle_ttl: Duration::from_secs(3600),
            session_sweep:    Duration::from_secs(60),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let calc = defaults.settlement;

        let ladder_run_len: usize = env_parse("LADDER_RUN_LEN", defaults.ladder_run_len)?;
        if ladder_run_len == 0 {
            bail!("LADDER_RUN_LEN must be at least 1");
        }

        let settlement = SettlementCalculator {
            fee_rate:          env_decimal("FEE_RATE", calc.fee_rate)?,
            min_fee:           env_decimal("MIN_FEE", calc.min_fee)?,
            intraday_tax_rate: env_decimal("TAX_RATE_INTRADAY", calc.intraday_tax_rate)?,
            regular_tax_rate:  env_decimal("TAX_RATE_REGULAR", calc.regular_tax_rate)?,
            roi_policy:        match std::env::var("ROI_POLICY") {
                Ok(v) => RoiPolicy::from_str(&v).map_err(anyhow::Error::msg)?,
                Err(_) => calc.roi_policy,
            },
        };

        let sweep_secs: u64 = env_parse("SESSION_SWEEP_SECS", defaults.session_sweep.as_secs())?;
        if sweep_secs == 0 {
            bail!("SESSION_SWEEP_SECS must be at least 1");
        }

        Ok(Self {
            bind_addr: env_parse("BIND_ADDR", defaults.bind_addr)?,
            api_key: std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            ladder_run_len,
            settlement,
            session_idle_ttl: Duration::from_secs(env_parse(
                "SESSION_IDLE_TTL_SECS",
                defaults.session_idle_ttl.as_secs(),
            )?),
            session_sweep: Duration::from_secs(sweep_secs),
        })
    }
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v.trim().parse().with_context(|| format!("{key} is malformed: '{v}'")),
        Err(_) => Ok(default),
    }
}

fn env_decimal(key: &str, default: Decimal) -> anyhow::Result<Decimal> {
    let value: Decimal = env_parse(key, default)?;
    if value < Decimal::ZERO {
        bail!("{key} must not be negative");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_match_exchange_rates() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.ladder_run_len, 5);
        assert_eq!(cfg.settlement.fee_rate, dec!(0.001425));
        assert_eq!(cfg.settlement.min_fee, dec!(20));
        assert_eq!(cfg.settlement.roi_policy, RoiPolicy::FloorPercent);
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn test_env_parse_reports_key() {
        std::env::set_var("TICKLADDER_TEST_BAD_NUM", "abc");
        let err = env_parse::<u64>("TICKLADDER_TEST_BAD_NUM", 1).unwrap_err();
        assert!(err.to_string().contains("TICKLADDER_TEST_BAD_NUM"));
        std::env::remove_var("TICKLADDER_TEST_BAD_NUM");
    }

    #[test]
    fn test_env_parse_falls_back_when_unset() {
        assert_eq!(env_parse::<u64>("TICKLADDER_TEST_UNSET_VAR", 42).unwrap(), 42);
    }
}
