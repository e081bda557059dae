use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Port used when `SERVER_PORT` is not set.
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Configuration was installed twice in the same process.
    #[error("Configuration already initialized")]
    AlreadyInitialized,
}

/// Runtime configuration for the Rusty Videos server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// TCP port the HTTP server binds to.
    pub server_port: u16,
    /// Start the store with the sample fixture record.
    pub seed_fixture: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            seed_fixture: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();
        Ok(Self {
            server_port: optional("SERVER_PORT")
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?
                .unwrap_or(defaults.server_port),
            seed_fixture: optional("VIDEOS_SEED_FIXTURE")
                .map(|value| {
                    parse_flag(&value)
                        .ok_or_else(|| ConfigError::InvalidValue("VIDEOS_SEED_FIXTURE".into()))
                })
                .transpose()?
                .unwrap_or(defaults.seed_fixture),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, or the defaults when initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

/// Load configuration from `.env` and the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        server_port = config.server_port,
        seed_fixture = config.seed_fixture,
        "Loaded configuration"
    );
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    Ok(get_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(load(&[]).expect("config"), Config::default());
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = load(&[("SERVER_PORT", "  "), ("VIDEOS_SEED_FIXTURE", "")]).expect("config");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_port_and_seed_flag() {
        let config =
            load(&[("SERVER_PORT", "8080"), ("VIDEOS_SEED_FIXTURE", "TRUE")]).expect("config");
        assert_eq!(config.server_port, 8080);
        assert!(config.seed_fixture);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = load(&[("SERVER_PORT", "70000")]).expect_err("port out of range");
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "SERVER_PORT"));

        let err = load(&[("VIDEOS_SEED_FIXTURE", "maybe")]).expect_err("bad flag");
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "VIDEOS_SEED_FIXTURE"));
    }
}
