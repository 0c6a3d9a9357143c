use crate::Driver;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown database driver: {0}")]
    UnknownDriver(String),
}

impl FromStr for Driver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            other => Err(ConfigError::UnknownDriver(other.to_string())),
        }
    }
}

/// Connection settings supplied by the owning process, read from the
/// environment (a `.env` file is honored) with development defaults.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub driver: Driver,
    pub dsn: String,
}

impl StoreConfig {
    pub fn from_env() -> Result<StoreConfig, ConfigError> {
        let _ = dotenvy::dotenv();

        let driver = std::env::var("WARDEN_DB_DRIVER")
            .unwrap_or_else(|_| "sqlite".into())
            .parse()?;
        let dsn = std::env::var("WARDEN_DB_PATH").unwrap_or_else(|_| "warden.db".into());

        Ok(StoreConfig { driver, dsn })
    }
}
