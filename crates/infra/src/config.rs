//! Configuration loading and representation.
//!
//! Values come from the process environment. `from_lookup` takes any
//! `key -> value` function so tests can feed a map instead of mutating the
//! real environment.

use std::net::SocketAddr;

use thiserror::Error;

use stockroom_core::pagination::{DEFAULT_LIMIT, MAX_LIMIT};

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub addr: SocketAddr,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub default_page_limit: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr = match get("APP_ADDR") {
            Some(raw) => raw
                .trim()
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::invalid("APP_ADDR", &raw, e))?,
            None => DEFAULT_ADDR
                .parse()
                .map_err(|e| ConfigError::invalid("APP_ADDR", DEFAULT_ADDR, e))?,
        };

        let database_url = get("DATABASE_URL").or_else(|| database_url_from_parts(&get));

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => {
                    return Err(ConfigError::invalid(
                        "DATABASE_MAX_CONNECTIONS",
                        &raw,
                        "must be at least 1",
                    ));
                }
                Ok(n) => n,
                Err(e) => return Err(ConfigError::invalid("DATABASE_MAX_CONNECTIONS", &raw, e)),
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let default_page_limit = match get("DEFAULT_PAGE_LIMIT") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(n) if (1..=MAX_LIMIT).contains(&n) => n,
                Ok(_) => {
                    return Err(ConfigError::invalid(
                        "DEFAULT_PAGE_LIMIT",
                        &raw,
                        format!("must be between 1 and {MAX_LIMIT}"),
                    ));
                }
                Err(e) => return Err(ConfigError::invalid("DEFAULT_PAGE_LIMIT", &raw, e)),
            },
            None => DEFAULT_LIMIT,
        };

        Ok(Self {
            addr,
            database_url,
            max_connections,
            default_page_limit,
        })
    }

    pub fn uses_postgres(&self) -> bool {
        self.database_url.is_some()
    }
}

/// Legacy `DB_HOST`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`/`DB_PORT` variables.
fn database_url_from_parts(get: &impl Fn(&str) -> Option<String>) -> Option<String> {
    let host = get("DB_HOST")?;
    let user = get("DB_USER").unwrap_or_else(|| "postgres".to_string());
    let password = get("DB_PASSWORD");
    let name = get("DB_NAME").unwrap_or_else(|| "postgres".to_string());
    let port = get("DB_PORT").unwrap_or_else(|| "5432".to_string());

    let credentials = match password {
        Some(password) => format!("{user}:{password}"),
        None => user,
    };
    Some(format!("postgres://{credentials}@{host}:{port}/{name}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_select_in_memory_store() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(cfg.database_url, None);
        assert!(!cfg.uses_postgres());
        assert_eq!(cfg.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(cfg.default_page_limit, DEFAULT_LIMIT);
    }

    #[test]
    fn explicit_values_are_used() {
        let cfg = config(&[
            ("APP_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://u:p@db:5432/stock"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("DEFAULT_PAGE_LIMIT", "25"),
        ])
        .unwrap();

        assert_eq!(cfg.addr.port(), 9000);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://u:p@db:5432/stock"));
        assert_eq!(cfg.max_connections, 12);
        assert_eq!(cfg.default_page_limit, 25);
    }

    #[test]
    fn legacy_db_variables_assemble_a_url() {
        let cfg = config(&[
            ("DB_HOST", "db"),
            ("DB_USER", "shop"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "inventory"),
            ("DB_PORT", "6543"),
        ])
        .unwrap();
        assert_eq!(
            cfg.database_url.as_deref(),
            Some("postgres://shop:secret@db:6543/inventory")
        );
    }

    #[test]
    fn database_url_wins_over_legacy_variables() {
        let cfg = config(&[("DATABASE_URL", "postgres://a@b/c"), ("DB_HOST", "db")]).unwrap();
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://a@b/c"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("DATABASE_URL", "  "), ("APP_ADDR", "")]).unwrap();
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.addr.to_string(), DEFAULT_ADDR);
    }

    #[test]
    fn invalid_values_are_typed_errors() {
        assert!(matches!(
            config(&[("APP_ADDR", "nope")]),
            Err(ConfigError::Invalid { key: "APP_ADDR", .. })
        ));
        assert!(matches!(
            config(&[("DATABASE_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                ..
            })
        ));
        assert!(matches!(
            config(&[("DEFAULT_PAGE_LIMIT", "5000")]),
            Err(ConfigError::Invalid {
                key: "DEFAULT_PAGE_LIMIT",
                ..
            })
        ));
        assert!(matches!(
            config(&[("DEFAULT_PAGE_LIMIT", "ten")]),
            Err(ConfigError::Invalid {
                key: "DEFAULT_PAGE_LIMIT",
                ..
            })
        ));
    }
}
