//! Ledger configuration with validation
//!
//! Values come from the environment (after `.env` is loaded) or from a TOML
//! file. Missing values fall back to the defaults below.

use std::{env, path::Path, path::PathBuf, str::FromStr, time::Duration};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub server: ServerConfig,
    pub staking: StakingConfig,
    pub session: SessionConfig,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    /// How long each operation waits before it applies
    #[serde(with = "humantime_serde")]
    pub simulated_latency: Duration,
    pub estimated_gas_fee: Decimal,
    pub transaction_history_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub storage_path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            staking: StakingConfig::default(),
            session: SessionConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8081,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            simulated_latency: Duration::from_millis(1000),
            estimated_gas_fee: Decimal::new(250, 2),
            transaction_history_limit: 100,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("zentara_user.json"),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = LedgerConfig::default();

        let config = LedgerConfig {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT")?.unwrap_or(defaults.server.port),
                cors_origins: env::var("CORS_ORIGINS")
                    .map(|origins| {
                        origins
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.server.cors_origins),
            },
            staking: StakingConfig {
                simulated_latency: parse_var::<u64>("STAKE_LATENCY_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.staking.simulated_latency),
                estimated_gas_fee: parse_var("STAKE_GAS_FEE")?
                    .unwrap_or(defaults.staking.estimated_gas_fee),
                transaction_history_limit: parse_var("STAKE_HISTORY_LIMIT")?
                    .unwrap_or(defaults.staking.transaction_history_limit),
            },
            session: SessionConfig {
                storage_path: env::var("SESSION_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.session.storage_path),
            },
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.port".to_string(),
                reason: "port must be non-zero".to_string(),
            });
        }

        if self.staking.estimated_gas_fee < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                key: "staking.estimated_gas_fee".to_string(),
                reason: "gas fee must not be negative".to_string(),
            });
        }

        if self.staking.transaction_history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "staking.transaction_history_limit".to_string(),
                reason: "history limit must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                reason: format!("cannot parse {:?}", raw),
            }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to read configuration file: {0}")]
    Io(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}
