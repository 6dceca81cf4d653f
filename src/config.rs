//! Process configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::persistence::CorruptPolicy;
use crate::quotes::DEFAULT_BASE_URL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Where prices come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteSource {
    Yahoo { base_url: String, timeout: Duration },
    /// `SYM=price,...` table, see [`crate::quotes::FixedQuotes::parse`].
    Static(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub data_file: PathBuf,
    /// `None` means generate a per-process secret.
    pub jwt_secret: Option<Vec<u8>>,
    pub starting_balance: Decimal,
    pub currency: String,
    pub quote_source: QuoteSource,
    pub corrupt_policy: CorruptPolicy,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr = parse_or(&get, "BIND_ADDR", "0.0.0.0:3000".parse().ok())?;
        let data_file = get("DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("users.json"));
        let jwt_secret = get("JWT_SECRET").map(String::into_bytes);
        let starting_balance: Decimal =
            parse_or(&get, "STARTING_BALANCE", Some(Decimal::from(100_000)))?;
        if starting_balance.is_sign_negative() {
            return Err(invalid(
                "STARTING_BALANCE",
                starting_balance.to_string(),
                "must not be negative",
            ));
        }
        let currency = get("CURRENCY_SYMBOL").unwrap_or_else(|| "₹".to_string());

        let quote_source = match get("STATIC_QUOTES") {
            Some(table) => QuoteSource::Static(table),
            None => {
                let secs: u64 = parse_or(&get, "QUOTE_TIMEOUT_SECS", Some(10))?;
                QuoteSource::Yahoo {
                    base_url: get("QUOTE_API_BASE").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                    timeout: Duration::from_secs(secs),
                }
            }
        };

        let corrupt_policy = match get("CORRUPT_STORE_POLICY").as_deref().map(str::trim) {
            None | Some("fail") => CorruptPolicy::FailFast,
            Some("empty") => CorruptPolicy::TreatAsEmpty,
            Some(other) => {
                return Err(invalid(
                    "CORRUPT_STORE_POLICY",
                    other.to_string(),
                    "expected fail or empty",
                ));
            }
        };

        let secure_cookies: bool = parse_or(&get, "SECURE_COOKIES", Some(false))?;

        Ok(Self {
            bind_addr,
            data_file,
            jwt_secret,
            starting_balance,
            currency,
            quote_source,
            corrupt_policy,
            secure_cookies,
        })
    }
}

fn invalid(name: &'static str, value: String, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        value,
        reason: reason.into(),
    }
}

fn parse_or<G, T>(get: &G, name: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(name, raw.clone(), e.to_string())),
        None => default.ok_or_else(|| invalid(name, String::new(), "missing")),
    }
}
