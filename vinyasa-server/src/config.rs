//! Server configuration from the environment.
//!
//! All validation happens in [`Config::from_env`] at startup and
//! surfaces as a [`CommerceError::Config`] to the caller — nothing deep
//! in the stack terminates the process over a missing variable.
//!
//! # Environment Variables
//!
//! - `STRIPE_SECRET_KEY` — required; `sk_live_` means real money,
//!   `sk_test_` means test mode
//! - `X402_NETWORK` — V1 network name (default: `base-sepolia`)
//! - `X402_PAY_TO` — required recipient address for x402 challenges
//! - `FACILITATOR_URL` — facilitator endpoint (default: the public
//!   x402.org facilitator)
//! - `X402_DEMO_MODE` — `true`/`1` enables the sentinel-proof bypass
//! - `ALLOW_CANCEL_COMPLETED` — `true`/`1` restores permissive cancel
//! - `PAYMENT_TIMEOUT_SECS` — gateway/facilitator HTTP timeout (default 30)
//! - `BASE_URL` — public base URL for resource links (default derived
//!   from host/port)
//! - `HOST` / `PORT` — bind address (defaults `0.0.0.0:4021`)

use std::net::IpAddr;
use std::time::Duration;

use vinyasa_core::CommerceError;
use vinyasa_core::gateway::PaymentMode;
use vinyasa_x402::facilitator::DEFAULT_FACILITATOR_URL;
use vinyasa_x402::networks::network_by_name;
use vinyasa_x402::requirements::checksum_address;

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address.
    pub host: IpAddr,
    /// Bind port.
    pub port: u16,
    /// Public base URL used when building resource links.
    pub base_url: String,
    /// Stripe secret key.
    pub stripe_secret_key: String,
    /// Live vs. test settlement, derived from the key prefix.
    pub mode: PaymentMode,
    /// V1 network name for x402 challenges.
    pub network: String,
    /// Recipient address for x402 payments.
    pub pay_to: String,
    /// Facilitator endpoint URL.
    pub facilitator_url: String,
    /// Sentinel-proof bypass; demo only, defaults off.
    pub demo_mode: bool,
    /// Permissive cancel semantics; defaults off.
    pub allow_cancel_completed: bool,
    /// Timeout for gateway and facilitator HTTP calls.
    pub payment_timeout: Duration,
}

impl Config {
    /// Loads and validates configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Config`] for a missing or malformed
    /// required variable.
    pub fn from_env() -> Result<Self, CommerceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an explicit lookup, so tests can
    /// inject values without mutating process-global state.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Config`] for a missing or malformed
    /// required variable.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CommerceError> {
        let host: IpAddr = match lookup("HOST") {
            Some(raw) => raw
                .parse()
                .map_err(|_| CommerceError::Config(format!("invalid HOST {raw:?}")))?,
            None => IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        };
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| CommerceError::Config(format!("invalid PORT {raw:?}")))?,
            None => 4021,
        };

        let stripe_secret_key = lookup("STRIPE_SECRET_KEY")
            .ok_or_else(|| CommerceError::Config("STRIPE_SECRET_KEY is not set".to_owned()))?;
        let mode = PaymentMode::from_secret_key(&stripe_secret_key)?;

        let network = lookup("X402_NETWORK").unwrap_or_else(|| "base-sepolia".to_owned());
        if network_by_name(&network).is_none() {
            return Err(CommerceError::Config(format!(
                "unsupported X402_NETWORK {network:?}"
            )));
        }

        let pay_to = lookup("X402_PAY_TO")
            .ok_or_else(|| CommerceError::Config("X402_PAY_TO is not set".to_owned()))?;
        if checksum_address(&pay_to).is_err() {
            return Err(CommerceError::Config(format!(
                "X402_PAY_TO is not a valid EVM address: {pay_to:?}"
            )));
        }

        let facilitator_url =
            lookup("FACILITATOR_URL").unwrap_or_else(|| DEFAULT_FACILITATOR_URL.to_owned());

        let demo_mode = flag(lookup("X402_DEMO_MODE"));
        let allow_cancel_completed = flag(lookup("ALLOW_CANCEL_COMPLETED"));

        let payment_timeout = match lookup("PAYMENT_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                CommerceError::Config(format!("invalid PAYMENT_TIMEOUT_SECS {raw:?}"))
            })?),
            None => Duration::from_secs(30),
        };

        let base_url =
            lookup("BASE_URL").unwrap_or_else(|| format!("http://{host}:{port}"));

        Ok(Self {
            host,
            port,
            base_url: base_url.trim_end_matches('/').to_owned(),
            stripe_secret_key,
            mode,
            network,
            pay_to,
            facilitator_url,
            demo_mode,
            allow_cancel_completed,
            payment_timeout,
        })
    }
}

/// Parses a boolean flag variable: `true` and `1` enable it.
fn flag(value: Option<String>) -> bool {
    matches!(value.as_deref(), Some("true" | "1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<Config, CommerceError> {
        let vars = env(pairs);
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const PAY_TO: &str = "0x209693Bc6afc0C5328bA36FaF03C514EF312287C";

    #[test]
    fn test_minimal_valid_config() {
        let config = load(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc"),
            ("X402_PAY_TO", PAY_TO),
        ])
        .unwrap();
        assert_eq!(config.mode, PaymentMode::Test);
        assert_eq!(config.network, "base-sepolia");
        assert_eq!(config.facilitator_url, DEFAULT_FACILITATOR_URL);
        assert!(!config.demo_mode);
        assert_eq!(config.payment_timeout, Duration::from_secs(30));
        assert_eq!(config.base_url, "http://0.0.0.0:4021");
    }

    #[test]
    fn test_live_key_sets_live_mode() {
        let config = load(&[
            ("STRIPE_SECRET_KEY", "sk_live_abc"),
            ("X402_PAY_TO", PAY_TO),
            ("X402_NETWORK", "base"),
        ])
        .unwrap();
        assert!(config.mode.is_live());
        assert_eq!(config.network, "base");
    }

    #[test]
    fn test_missing_and_invalid_values_fail_fast() {
        assert!(load(&[("X402_PAY_TO", PAY_TO)]).is_err());
        assert!(load(&[("STRIPE_SECRET_KEY", "sk_test_abc")]).is_err());
        assert!(
            load(&[
                ("STRIPE_SECRET_KEY", "whatever"),
                ("X402_PAY_TO", PAY_TO),
            ])
            .is_err()
        );
        assert!(
            load(&[
                ("STRIPE_SECRET_KEY", "sk_test_abc"),
                ("X402_PAY_TO", "not-an-address"),
            ])
            .is_err()
        );
        assert!(
            load(&[
                ("STRIPE_SECRET_KEY", "sk_test_abc"),
                ("X402_PAY_TO", PAY_TO),
                ("X402_NETWORK", "dogechain"),
            ])
            .is_err()
        );
    }

    #[test]
    fn test_flags_and_overrides() {
        let config = load(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc"),
            ("X402_PAY_TO", PAY_TO),
            ("X402_DEMO_MODE", "1"),
            ("ALLOW_CANCEL_COMPLETED", "true"),
            ("PAYMENT_TIMEOUT_SECS", "5"),
            ("BASE_URL", "https://shop.example/"),
        ])
        .unwrap();
        assert!(config.demo_mode);
        assert!(config.allow_cancel_completed);
        assert_eq!(config.payment_timeout, Duration::from_secs(5));
        assert_eq!(config.base_url, "https://shop.example");
    }
}
