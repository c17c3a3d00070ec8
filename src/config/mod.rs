//! Runtime configuration from environment variables (optionally seeded from a `.env` file by
//! the binary via dotenvy).

use crate::error::ConfigError;
use crate::query::PageLimits;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/bookshelf";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::UnknownStore(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// `BOOKSHELF_STORE`: `postgres` (default) or `memory`.
    pub store: StoreBackend,
    /// `DATABASE_URL`.
    pub database_url: String,
    /// `BIND_ADDR`.
    pub bind_addr: String,
    /// `DB_MAX_CONNECTIONS`.
    pub max_connections: u32,
    /// `DEFAULT_PER_PAGE` and `MAX_PER_PAGE`.
    pub limits: PageLimits,
    /// `BODY_LIMIT_BYTES`.
    pub body_limit_bytes: usize,
    /// `SEED_SAMPLE_DATA`.
    pub seed_sample_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            store: StoreBackend::Postgres,
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_addr: "0.0.0.0:3000".into(),
            max_connections: 5,
            limits: PageLimits::default(),
            body_limit_bytes: 64 * 1024,
            seed_sample_data: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = AppConfig::default();

        let store = match get("BOOKSHELF_STORE") {
            Some(v) => v.parse()?,
            None => defaults.store,
        };
        let limits = PageLimits {
            default_per_page: parse_or("DEFAULT_PER_PAGE", get("DEFAULT_PER_PAGE"), defaults.limits.default_per_page)?,
            max_per_page: parse_or("MAX_PER_PAGE", get("MAX_PER_PAGE"), defaults.limits.max_per_page)?,
        };
        if limits.max_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MAX_PER_PAGE",
                value: "0".into(),
            });
        }
        if limits.default_per_page == 0 || limits.default_per_page > limits.max_per_page {
            return Err(ConfigError::InvalidValue {
                key: "DEFAULT_PER_PAGE",
                value: limits.default_per_page.to_string(),
            });
        }

        Ok(AppConfig {
            store,
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), defaults.max_connections)?,
            limits,
            body_limit_bytes: parse_or("BODY_LIMIT_BYTES", get("BODY_LIMIT_BYTES"), defaults.body_limit_bytes)?,
            seed_sample_data: match get("SEED_SAMPLE_DATA") {
                Some(v) => parse_bool("SEED_SAMPLE_DATA", &v)?,
                None => defaults.seed_sample_data,
            },
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue { key, value: v }),
        None => Ok(default),
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let c = config(&[
            ("BOOKSHELF_STORE", "Memory"),
            ("MAX_PER_PAGE", "50"),
            ("DEFAULT_PER_PAGE", "20"),
            ("SEED_SAMPLE_DATA", "off"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ])
        .unwrap();
        assert_eq!(c.store, StoreBackend::Memory);
        assert_eq!(c.limits, PageLimits { default_per_page: 20, max_per_page: 50 });
        assert!(!c.seed_sample_data);
        assert_eq!(c.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(config(&[("BOOKSHELF_STORE", "redis")]), Err(ConfigError::UnknownStore(_))));
        assert!(matches!(
            config(&[("DB_MAX_CONNECTIONS", "many")]),
            Err(ConfigError::InvalidValue { key: "DB_MAX_CONNECTIONS", .. })
        ));
        assert!(matches!(
            config(&[("DEFAULT_PER_PAGE", "500")]),
            Err(ConfigError::InvalidValue { key: "DEFAULT_PER_PAGE", .. })
        ));
    }
}
