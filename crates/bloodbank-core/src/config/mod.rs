use std::env;
use std::fmt;
use std::num::ParseIntError;

use crate::matching::{AlertPolicy, EXPIRY_WARNING_DAYS, LOW_STOCK_THRESHOLD};

pub const DEFAULT_COMMIT_MAX_ATTEMPTS: u32 = 3;

/// Distinguishes runtime behavior for different deployment stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub inventory: InventoryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let low_stock_threshold = number_var("APP_LOW_STOCK_THRESHOLD", LOW_STOCK_THRESHOLD)?;
        let expiry_warning_days = number_var("APP_EXPIRY_WARNING_DAYS", EXPIRY_WARNING_DAYS)?;
        let commit_max_attempts =
            number_var("APP_COMMIT_MAX_ATTEMPTS", DEFAULT_COMMIT_MAX_ATTEMPTS)?;
        if commit_max_attempts == 0 {
            return Err(ConfigError::ZeroCommitAttempts);
        }

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            inventory: InventoryConfig {
                low_stock_threshold,
                expiry_warning_days,
                commit_max_attempts,
            },
        })
    }
}

fn number_var(var: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|source| ConfigError::InvalidNumber { var, value, source }),
        Err(_) => Ok(default),
    }
}

/// Stock warning thresholds and the commit retry bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryConfig {
    pub low_stock_threshold: u32,
    pub expiry_warning_days: u32,
    pub commit_max_attempts: u32,
}

impl InventoryConfig {
    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            low_stock_threshold: self.low_stock_threshold,
            expiry_warning_days: self.expiry_warning_days,
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            expiry_warning_days: EXPIRY_WARNING_DAYS,
            commit_max_attempts: DEFAULT_COMMIT_MAX_ATTEMPTS,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber {
        var: &'static str,
        value: String,
        source: ParseIntError,
    },
    ZeroCommitAttempts,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { var, value, .. } => {
                write!(f, "{var} must be a non-negative integer (found '{value}')")
            }
            ConfigError::ZeroCommitAttempts => {
                write!(f, "APP_COMMIT_MAX_ATTEMPTS must be at least 1")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidNumber { source, .. } => Some(source),
            ConfigError::ZeroCommitAttempts => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_LOW_STOCK_THRESHOLD");
        env::remove_var("APP_EXPIRY_WARNING_DAYS");
        env::remove_var("APP_COMMIT_MAX_ATTEMPTS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.inventory, InventoryConfig::default());
        assert_eq!(config.inventory.alert_policy(), AlertPolicy::default());
    }

    #[test]
    fn reads_thresholds_and_environment() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        env::set_var("APP_LOW_STOCK_THRESHOLD", "10");
        env::set_var("APP_EXPIRY_WARNING_DAYS", " 3 ");
        env::set_var("APP_COMMIT_MAX_ATTEMPTS", "5");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.inventory.low_stock_threshold, 10);
        assert_eq!(config.inventory.expiry_warning_days, 3);
        assert_eq!(config.inventory.commit_max_attempts, 5);
    }

    #[test]
    fn rejects_malformed_threshold() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_LOW_STOCK_THRESHOLD", "five");
        let result = AppConfig::load();
        reset_env();

        match result {
            Err(ConfigError::InvalidNumber { var, value, .. }) => {
                assert_eq!(var, "APP_LOW_STOCK_THRESHOLD");
                assert_eq!(value, "five");
            }
            other => panic!("expected invalid number error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_commit_attempts() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_COMMIT_MAX_ATTEMPTS", "0");
        let result = AppConfig::load();
        reset_env();

        assert!(matches!(result, Err(ConfigError::ZeroCommitAttempts)));
    }
}
