//! Runtime settings read from the environment (and `.env` via dotenvy).

use crate::pricing::{PriceSource, PricingPolicy, ShippingPolicy};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub nats_url: Option<String>,
    pub pricing: PricingPolicy,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| value(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| value(key).unwrap_or_else(|| default.to_string());

        let shipping = ShippingPolicy {
            free_threshold: parse("FREE_SHIPPING_THRESHOLD", or_default("FREE_SHIPPING_THRESHOLD", "50000"))?,
            flat_cost: parse("FLAT_SHIPPING_COST", or_default("FLAT_SHIPPING_COST", "5000"))?,
        };
        let price_source = parse("CHECKOUT_PRICE_SOURCE", or_default("CHECKOUT_PRICE_SOURCE", "catalog"))?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: parse("DB_MAX_CONNECTIONS", or_default("DB_MAX_CONNECTIONS", "10"))?,
            secret_key: required("SECRET_KEY")?,
            access_token_expire_minutes: parse(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "30"),
            )?,
            frontend_url: or_default("FRONTEND_URL", "http://localhost:5173"),
            api_host: or_default("API_HOST", "0.0.0.0"),
            api_port: parse("API_PORT", or_default("API_PORT", "8000"))?,
            nats_url: value("NATS_URL"),
            pricing: PricingPolicy { shipping, price_source },
        })
    }

    /// Origins allowed by CORS: the configured frontend plus the local dev server.
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins = vec![
            self.frontend_url.clone(),
            "http://localhost:5173".to_string(),
            "http://127.0.0.1:5173".to_string(),
        ];
        origins.dedup();
        origins
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid { key, value })
}

impl FromStr for PriceSource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "catalog" => Ok(Self::Catalog),
            "client" => Ok(Self::Client),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let s = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/shop"), ("SECRET_KEY", "k")])).unwrap();
        assert_eq!(s.api_port, 8000);
        assert_eq!(s.access_token_expire_minutes, 30);
        assert_eq!(s.pricing.shipping.free_threshold, dec!(50000));
        assert_eq!(s.pricing.shipping.flat_cost, dec!(5000));
        assert_eq!(s.pricing.price_source, PriceSource::Catalog);
        assert!(s.nats_url.is_none());
        assert_eq!(s.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_missing_secret() {
        let err = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/shop")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SECRET_KEY")));
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let s = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/shop"),
            ("SECRET_KEY", "k"),
            ("CHECKOUT_PRICE_SOURCE", "Client"),
            ("FLAT_SHIPPING_COST", "2990.50"),
        ]))
        .unwrap();
        assert_eq!(s.pricing.price_source, PriceSource::Client);
        assert_eq!(s.pricing.shipping.flat_cost, dec!(2990.50));

        let err = Settings::from_lookup(lookup(&[("DATABASE_URL", "x"), ("SECRET_KEY", "k"), ("API_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "API_PORT", .. }));
    }

    #[test]
    fn test_cors_origins_dedup_default_frontend() {
        let s = Settings::from_lookup(lookup(&[("DATABASE_URL", "x"), ("SECRET_KEY", "k")])).unwrap();
        assert_eq!(s.cors_origins(), vec!["http://localhost:5173", "http://127.0.0.1:5173"]);
    }
}
