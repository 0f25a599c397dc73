//! Connection settings shared by every binary that opens a pool:
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_CONNECTIONS`: Size of the connection pool (default: 5)

use std::env;

use eyre::{Result, WrapErr, eyre};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;
        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(value) => value
                .trim()
                .parse()
                .wrap_err_with(|| format!("Invalid DB_MAX_CONNECTIONS value: {value}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_requires_database_url() {
        assert!(DbConfig::from_lookup(lookup(&[])).is_err());
        assert!(DbConfig::from_lookup(lookup(&[("DATABASE_URL", " ")])).is_err());
    }

    #[test]
    fn test_pool_size_default_and_override() {
        let config = DbConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/timeline")])).unwrap();
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);

        let config = DbConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/timeline"),
            ("DB_MAX_CONNECTIONS", "12"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "postgres://localhost/timeline");
        assert_eq!(config.max_connections, 12);
    }

    #[test]
    fn test_rejects_bad_pool_size() {
        let result = DbConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/timeline"),
            ("DB_MAX_CONNECTIONS", "many"),
        ]));
        assert!(result.is_err());
    }
}
