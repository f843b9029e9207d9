use std::{env, str::FromStr};

use thiserror::Error;

/// Minimum length of `COOKIE_SECRET`, as required for private cookies
pub const MIN_COOKIE_SECRET_LEN: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::Invalid {
                name: "ENVIRONMENT",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("COOKIE_SECRET must be at least {MIN_COOKIE_SECRET_LEN} bytes, got {0}")]
    CookieSecretTooShort(usize),
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub cookie_secret: String,
    pub env: Environment,
    pub port: u16,
    pub db_max_connections: u32,
    pub session_ttl_minutes: i64,
    pub metrics_enabled: bool,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let database_url = lookup("DB_DSN")
            .or_else(|| lookup("DATABASE_URL"))
            .ok_or(ConfigError::Missing("DB_DSN"))?;

        let cookie_secret = required("COOKIE_SECRET")?;
        if cookie_secret.len() < MIN_COOKIE_SECRET_LEN {
            return Err(ConfigError::CookieSecretTooShort(cookie_secret.len()));
        }

        let env = lookup("ENVIRONMENT")
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            database_url,
            jwt_secret: required("JWT_SECRET")?,
            cookie_secret,
            env,
            port: parse_or(&lookup, "PORT", 3000)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            session_ttl_minutes: parse_or(&lookup, "SESSION_TTL_MINUTES", 120)?,
            metrics_enabled: parse_or(&lookup, "METRICS_ENABLED", true)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
