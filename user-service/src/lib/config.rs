use std::env;
use std::time::Duration;

use auth::password::MAX_BCRYPT_COST;
use auth::password::MIN_BCRYPT_COST;
use auth::AuthConfig;
use auth::ConfigurationError;
use auth::HashAlgorithm;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub rate_limit: RateLimitConfig,
}

/// Longest token validity a deployment may configure (one year).
pub const MAX_EXPIRATION_HOURS: i64 = 24 * 365;

/// PostgreSQL database configuration.
///
/// Without a URL the service keeps users in memory.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PasswordAlgorithm {
    Bcrypt,
    Argon2,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub algorithm: PasswordAlgorithm,
    pub cost: u32,
}

/// Per-client budget for register and login attempts.
#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub max_attempts: usize,
    pub window_seconds: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationLoadError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] ConfigurationError),

    #[error("Invalid bcrypt cost {cost} (must be {min}-{max})")]
    InvalidCost { cost: u32, min: u32, max: u32 },

    #[error("Invalid token expiration: {0} hours (must be 1-{})", MAX_EXPIRATION_HOURS)]
    InvalidExpiration(i64),
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. `JWT_SECRET`
    /// 2. Environment variables (DATABASE__URL, SERVER__HTTP_PORT, JWT__SECRET, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    /// 5. Built-in defaults (everything except the JWT secret)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("server.http_port", 3000)?
            .set_default("database.max_connections", 5)?
            .set_default("jwt.expiration_hours", 24)?
            .set_default("password.algorithm", "bcrypt")?
            .set_default("password.cost", 12)?
            .set_default("rate_limit.max_attempts", 5)?
            .set_default("rate_limit.window_seconds", 900)?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::with_prefix("").separator("__"))
            .set_override_option("jwt.secret", env::var("JWT_SECRET").ok())?
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    /// Build the authentication core configuration.
    ///
    /// Fails when the signing secret is empty or hashing/expiry settings are
    /// out of range; callers should abort startup.
    pub fn auth_config(&self) -> Result<AuthConfig, ConfigurationLoadError> {
        if !(1..=MAX_EXPIRATION_HOURS).contains(&self.jwt.expiration_hours) {
            return Err(ConfigurationLoadError::InvalidExpiration(
                self.jwt.expiration_hours,
            ));
        }

        let hash_algorithm = self.password.hash_algorithm()?;

        Ok(AuthConfig::from_secret(self.jwt.secret.clone())?
            .with_token_ttl(chrono::Duration::hours(self.jwt.expiration_hours))
            .with_hash_algorithm(hash_algorithm))
    }
}

impl PasswordConfig {
    fn hash_algorithm(&self) -> Result<HashAlgorithm, ConfigurationLoadError> {
        match self.algorithm {
            PasswordAlgorithm::Argon2 => Ok(HashAlgorithm::Argon2),
            PasswordAlgorithm::Bcrypt => {
                if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.cost) {
                    return Err(ConfigurationLoadError::InvalidCost {
                        cost: self.cost,
                        min: MIN_BCRYPT_COST,
                        max: MAX_BCRYPT_COST,
                    });
                }
                Ok(HashAlgorithm::Bcrypt { cost: self.cost })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, algorithm: PasswordAlgorithm, cost: u32) -> Config {
        Config {
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
            },
            server: ServerConfig { http_port: 3000 },
            jwt: JwtConfig {
                secret: secret.to_string(),
                expiration_hours: 24,
            },
            password: PasswordConfig { algorithm, cost },
            rate_limit: RateLimitConfig {
                max_attempts: 5,
                window_seconds: 900,
            },
        }
    }

    #[test]
    fn test_auth_config_defaults() {
        let config = config(
            "test-secret-key-for-jwt-signing-at-least-32-bytes",
            PasswordAlgorithm::Bcrypt,
            12,
        );

        let auth_config = config.auth_config().expect("valid configuration");
        assert_eq!(auth_config.hash_algorithm, HashAlgorithm::Bcrypt { cost: 12 });
        assert_eq!(auth_config.token_ttl, chrono::Duration::hours(24));
    }

    #[test]
    fn test_auth_config_requires_secret() {
        let config = config("", PasswordAlgorithm::Bcrypt, 12);

        assert!(matches!(
            config.auth_config(),
            Err(ConfigurationLoadError::Auth(
                ConfigurationError::MissingSigningSecret
            ))
        ));
    }

    #[test]
    fn test_auth_config_rejects_cost_out_of_range() {
        let low = config("test-secret", PasswordAlgorithm::Bcrypt, 4);
        let high = config("test-secret", PasswordAlgorithm::Bcrypt, 15);

        assert!(matches!(
            low.auth_config(),
            Err(ConfigurationLoadError::InvalidCost { cost: 4, .. })
        ));
        assert!(matches!(
            high.auth_config(),
            Err(ConfigurationLoadError::InvalidCost { cost: 15, .. })
        ));
    }

    #[test]
    fn test_auth_config_rejects_expiration_out_of_range() {
        let mut config = config("test-secret", PasswordAlgorithm::Bcrypt, 12);

        for hours in [0, -1, MAX_EXPIRATION_HOURS + 1, 5_000_000_000] {
            config.jwt.expiration_hours = hours;
            assert!(
                matches!(
                    config.auth_config(),
                    Err(ConfigurationLoadError::InvalidExpiration(h)) if h == hours
                ),
                "expected rejection of {} hours",
                hours
            );
        }

        config.jwt.expiration_hours = MAX_EXPIRATION_HOURS;
        assert!(config.auth_config().is_ok());
    }

    #[test]
    fn test_auth_config_argon2_ignores_cost() {
        let config = config("test-secret", PasswordAlgorithm::Argon2, 0);

        let auth_config = config.auth_config().expect("valid configuration");
        assert_eq!(auth_config.hash_algorithm, HashAlgorithm::Argon2);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = config("super-secret-value", PasswordAlgorithm::Bcrypt, 12);

        assert!(!format!("{:?}", config).contains("super-secret-value"));
    }
}
