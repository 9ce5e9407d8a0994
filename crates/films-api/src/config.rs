use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default bcrypt cost factor for password hashing.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Lowest accepted bcrypt cost.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Highest accepted bcrypt cost.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Minimum length of the token signing secret in bytes (HS256 key size).
pub const MIN_JWT_SECRET_BYTES: usize = 32;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:4000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// Process-wide token signing secret. Read-only after startup.
    pub jwt_secret: SecretString,
    pub bcrypt_cost: u32,
    pub seed_database: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid bcrypt cost: {0}")]
    InvalidBcryptCost(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_secret = SecretString::from(
            vars.get("FILMS_JWT_SECRET")
                .ok_or_else(|| ConfigError::MissingEnvVar("FILMS_JWT_SECRET".to_string()))?
                .clone(),
        );

        if jwt_secret.expose_secret().len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                jwt_secret.expose_secret().len()
            )));
        }

        let bcrypt_cost = match vars.get("BCRYPT_COST") {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                ConfigError::InvalidBcryptCost(format!("'{}' is not a number", raw))
            })?,
            None => DEFAULT_BCRYPT_COST,
        };

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(format!(
                "{} is outside {}-{}",
                bcrypt_cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
            )));
        }

        let seed_database = match vars.get("SEED_DATABASE").map(|v| v.to_ascii_lowercase()) {
            None => true,
            Some(v) if v == "true" || v == "1" => true,
            Some(v) if v == "false" || v == "0" => false,
            Some(v) => {
                return Err(ConfigError::InvalidValue {
                    name: "SEED_DATABASE".to_string(),
                    value: v,
                })
            }
        };

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret,
            bcrypt_cost,
            seed_database,
        })
    }
}
