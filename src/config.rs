use std::env;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be set in production")]
    Missing(&'static str),
}

/// Deployment mode read from `NODE_ENV`.
///
/// Anything other than the three known modes is kept as `Unrecognized` so
/// callers have to decide what to do with it instead of falling through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
    Unrecognized(String),
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "development" => Environment::Development,
            "testing" => Environment::Testing,
            "production" => Environment::Production,
            other => Environment::Unrecognized(other.to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Testing => f.write_str("testing"),
            Environment::Production => f.write_str("production"),
            Environment::Unrecognized(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub users_collection: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    /// Requests allowed per window and client. Zero disables the limiter.
    pub max_requests: u64,
    pub window_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub environment: Environment,
    pub whitelist: Vec<String>,
    pub host: String,
    pub port: u16,
    pub redis: RedisConfig,
    pub mongo: MongoConfig,
    pub jwt_secret: String,
    pub jwt_expires_in_days: i64,
    pub bcrypt_cost: u32,
    pub rate_limit: RateLimitConfig,
    pub playground: bool,
}

const DEV_JWT_SECRET: &str = "dev-secret-not-for-production";
const JWT_EXPIRES_IN_DAYS: RangeInclusive<i64> = 1..=3650;
const BCRYPT_COST: RangeInclusive<u32> = 4..=31;

impl ServerConfig {
    /// Loads configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = var("NODE_ENV")
            .map(|value| Environment::parse(&value))
            .unwrap_or(Environment::Development);

        let whitelist = var("CORS_WHITELIST")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => return Err(ConfigError::Missing("JWT_SECRET")),
            None => DEV_JWT_SECRET.to_string(),
        };

        let playground = match var("GRAPHQL_PLAYGROUND") {
            Some(value) => parse_bool("GRAPHQL_PLAYGROUND", &value)?,
            None => !environment.is_production(),
        };

        Ok(Self {
            whitelist,
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or("PORT", var("PORT"), 4000)?,
            redis: RedisConfig {
                host: var("REDIS_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
                port: parse_or("REDIS_PORT", var("REDIS_PORT"), 6379)?,
                password: var("REDIS_PASS"),
            },
            mongo: MongoConfig {
                uri: var("MONGODB_URI").unwrap_or_else(|| "mongodb://localhost:27017".to_string()),
                database: var("DB_NAME").unwrap_or_else(|| "users_service".to_string()),
                users_collection: var("DB_USERS_COLLECTION").unwrap_or_else(|| "users".to_string()),
            },
            jwt_secret,
            jwt_expires_in_days: parse_in_range(
                "JWT_EXPIRES_IN_DAYS",
                var("JWT_EXPIRES_IN_DAYS"),
                1,
                JWT_EXPIRES_IN_DAYS,
            )?,
            bcrypt_cost: parse_in_range(
                "BCRYPT_COST",
                var("BCRYPT_COST"),
                bcrypt::DEFAULT_COST,
                BCRYPT_COST,
            )?,
            rate_limit: RateLimitConfig {
                max_requests: parse_or("RATE_LIMIT_MAX", var("RATE_LIMIT_MAX"), 100)?,
                window_secs: parse_or("RATE_LIMIT_WINDOW_SECS", var("RATE_LIMIT_WINDOW_SECS"), 60)?,
            },
            playground,
            environment,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_or<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

/// Like [`parse_or`], but also rejects values outside `range`.
fn parse_in_range<T>(
    key: &'static str,
    value: Option<String>,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + fmt::Display,
{
    let parsed = parse_or(key, value, default)?;
    if range.contains(&parsed) {
        Ok(parsed)
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: parsed.to_string(),
        })
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
