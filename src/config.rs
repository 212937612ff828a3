use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Posts and users live in memory when unset.
    pub database_url: Option<String>,
    pub port: u16,
    pub jwt_secret: String,
    pub max_connections: u32,
    /// Upper bound on optimistic read-modify-write attempts per like toggle.
    pub like_max_attempts: u32,
    /// JSON array of users loaded into the store at startup.
    pub seed_users_path: Option<String>,
}

impl Config {
    pub fn init() -> Result<Config> {
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| Error::Config("JWT_SECRET must be set".to_string()))?;
        if jwt_secret.is_empty() {
            return Err(Error::Config("JWT_SECRET cannot be empty".to_string()));
        }

        let like_max_attempts: u32 = try_load("LIKE_MAX_ATTEMPTS", "5")?;
        if like_max_attempts == 0 {
            return Err(Error::Config("LIKE_MAX_ATTEMPTS must be at least 1".to_string()));
        }

        Ok(Config {
            database_url,
            port: try_load("PORT", "6001")?,
            jwt_secret,
            max_connections: try_load("DATABASE_MAX_CONNECTIONS", "10")?,
            like_max_attempts,
            seed_users_path: env::var("SEED_USERS_PATH").ok().filter(|path| !path.is_empty()),
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            Error::Config(format!("invalid value for {key}: {e}"))
        })
}
