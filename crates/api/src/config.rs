//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use cart_store::{CartStoreConfig, CartStoreError};
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("invalid value '{value}' for {name}")]
    Invalid { name: &'static str, value: String },

    /// The cart store settings are inconsistent.
    #[error(transparent)]
    CartStore(#[from] CartStoreError),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `CART_STORE`: `memory` or `postgres` (default: `memory`)
/// - `DATABASE_URL`: required when `CART_STORE=postgres`
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `CURRENCY_RATES_PATH`: JSON rate table (default: bundled table)
/// - `CHECKOUT_CALL_TIMEOUT_MS`: per-call deadline (default: `5000`)
/// - `ORDER_JOURNAL_CAPACITY`: order records kept for `/orders/{id}`
///   (default: `10000`)
/// - `CATALOG_SERVICE_URL`, `SHIPPING_SERVICE_URL`, `PAYMENT_SERVICE_URL`:
///   remote collaborators; in-memory ones are used when unset
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub cart_store: CartStoreConfig,
    pub currency_rates_path: Option<PathBuf>,
    pub call_timeout: Duration,
    pub journal_capacity: usize,
    pub catalog_url: Option<String>,
    pub shipping_url: Option<String>,
    pub payment_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's
    /// value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = parse_or(var("PORT"), "PORT", 3000u16)?;
        let max_connections = parse_or(
            var("DATABASE_MAX_CONNECTIONS"),
            "DATABASE_MAX_CONNECTIONS",
            5u32,
        )?;
        let timeout_ms = parse_or(
            var("CHECKOUT_CALL_TIMEOUT_MS"),
            "CHECKOUT_CALL_TIMEOUT_MS",
            5000u64,
        )?;
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "CHECKOUT_CALL_TIMEOUT_MS",
                value: "0".into(),
            });
        }

        let journal_capacity = parse_or(
            var("ORDER_JOURNAL_CAPACITY"),
            "ORDER_JOURNAL_CAPACITY",
            checkout::DEFAULT_JOURNAL_CAPACITY,
        )?;
        if journal_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "ORDER_JOURNAL_CAPACITY",
                value: "0".into(),
            });
        }

        let log_format = match var("LOG_FORMAT") {
            None => LogFormat::Text,
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "text" | "pretty" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "LOG_FORMAT",
                        value: v,
                    });
                }
            },
        };

        let cart_store = CartStoreConfig::from_parts(
            var("CART_STORE").as_deref().unwrap_or("memory"),
            var("DATABASE_URL"),
            max_connections,
        )?;

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_level: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            log_format,
            cart_store,
            currency_rates_path: var("CURRENCY_RATES_PATH").map(PathBuf::from),
            call_timeout: Duration::from_millis(timeout_ms),
            journal_capacity,
            catalog_url: var("CATALOG_SERVICE_URL"),
            shipping_url: var("SHIPPING_SERVICE_URL"),
            payment_url: var("PAYMENT_SERVICE_URL"),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: v }),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            cart_store: CartStoreConfig::InMemory,
            currency_rates_path: None,
            call_timeout: checkout::DEFAULT_CALL_TIMEOUT,
            journal_capacity: checkout::DEFAULT_JOURNAL_CAPACITY,
            catalog_url: None,
            shipping_url: None,
            payment_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.cart_store, CartStoreConfig::InMemory);
        assert_eq!(config.call_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_environment_matches_defaults() {
        let config = load(&[]).unwrap();
        let defaults = Config::default();
        assert_eq!(config.addr(), defaults.addr());
        assert_eq!(config.cart_store, defaults.cart_store);
        assert_eq!(config.call_timeout, defaults.call_timeout);
        assert!(config.catalog_url.is_none());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("LOG_FORMAT", "JSON"),
            ("CART_STORE", "postgres"),
            ("DATABASE_URL", "postgres://db/carts"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("CURRENCY_RATES_PATH", "/etc/rates.json"),
            ("CHECKOUT_CALL_TIMEOUT_MS", "750"),
            ("ORDER_JOURNAL_CAPACITY", "250"),
            ("PAYMENT_SERVICE_URL", "http://payment:8080"),
        ])
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.cart_store,
            CartStoreConfig::Postgres {
                url: "postgres://db/carts".into(),
                max_connections: 12
            }
        );
        assert_eq!(
            config.currency_rates_path,
            Some(PathBuf::from("/etc/rates.json"))
        );
        assert_eq!(config.call_timeout, Duration::from_millis(750));
        assert_eq!(config.journal_capacity, 250);
        assert_eq!(config.payment_url.as_deref(), Some("http://payment:8080"));
        assert!(config.shipping_url.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn test_invalid_log_format_and_timeout() {
        assert!(matches!(
            load(&[("LOG_FORMAT", "xml")]),
            Err(ConfigError::Invalid { name: "LOG_FORMAT", .. })
        ));
        assert!(matches!(
            load(&[("CHECKOUT_CALL_TIMEOUT_MS", "0")]),
            Err(ConfigError::Invalid {
                name: "CHECKOUT_CALL_TIMEOUT_MS",
                ..
            })
        ));
        assert!(matches!(
            load(&[("ORDER_JOURNAL_CAPACITY", "0")]),
            Err(ConfigError::Invalid {
                name: "ORDER_JOURNAL_CAPACITY",
                ..
            })
        ));
    }

    #[test]
    fn test_postgres_without_url() {
        let err = load(&[("CART_STORE", "postgres")]).unwrap_err();
        assert!(matches!(err, ConfigError::CartStore(_)));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }
}
