use anyhow::{Context, Result, anyhow};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub db_min_conn: u32,
    pub db_max_conn: u32,
    pub run_migrations: bool,
    pub lock_timeout: Duration,
    pub otel_endpoint: Option<String>,
}

impl Config {
    pub fn init() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; `init` reads the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("APP_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("APP_PORT must be a valid u16 integer")?;

        let storage = match lookup("STORAGE_BACKEND").as_deref() {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(anyhow!(
                    "STORAGE_BACKEND must be 'postgres' or 'memory', got '{}'",
                    other
                ));
            }
        };

        let database_url = lookup("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("Missing environment variable: DATABASE_URL"));
        }

        let db_min_conn = lookup("DB_MIN_CONN")
            .unwrap_or_else(|| "1".to_string())
            .parse::<u32>()
            .context("DB_MIN_CONN must be a valid u32 integer")?;

        let db_max_conn = lookup("DB_MAX_CONN")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONN must be a valid u32 integer")?;

        if db_min_conn > db_max_conn {
            return Err(anyhow!(
                "DB_MIN_CONN ({}) must not exceed DB_MAX_CONN ({})",
                db_min_conn,
                db_max_conn
            ));
        }

        let run_migrations = match lookup("RUN_MIGRATIONS").as_deref() {
            None | Some("true") => true,
            Some("false") => false,
            Some(other) => {
                return Err(anyhow!(
                    "RUN_MIGRATIONS must be 'true' or 'false', got '{}'",
                    other
                ));
            }
        };

        let lock_timeout_ms = lookup("LOCK_TIMEOUT_MS")
            .unwrap_or_else(|| "5000".to_string())
            .parse::<u64>()
            .context("LOCK_TIMEOUT_MS must be a valid u64 integer")?;

        let otel_endpoint = lookup("OTEL_ENDPOINT").filter(|v| !v.trim().is_empty());

        Ok(Self {
            port,
            storage,
            database_url,
            db_min_conn,
            db_max_conn,
            run_migrations,
            lock_timeout: Duration::from_millis(lock_timeout_ms),
            otel_endpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_for_memory_backend() {
        let config = config_from(&[("STORAGE_BACKEND", "memory")]).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.run_migrations);
        assert_eq!(config.lock_timeout, Duration::from_millis(5000));
        assert!(config.otel_endpoint.is_none());
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let config = config_from(&[("DATABASE_URL", "postgres://localhost/shop")]).unwrap();
        assert_eq!(config.storage, StorageBackend::Postgres);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(config_from(&[("STORAGE_BACKEND", "memory"), ("APP_PORT", "http")]).is_err());
        assert!(config_from(&[("STORAGE_BACKEND", "memory"), ("RUN_MIGRATIONS", "yes")]).is_err());
        assert!(config_from(&[("STORAGE_BACKEND", "sqlite")]).is_err());
        assert!(
            config_from(&[
                ("STORAGE_BACKEND", "memory"),
                ("DB_MIN_CONN", "20"),
                ("DB_MAX_CONN", "5"),
            ])
            .is_err()
        );
    }
}
