//! Gate configuration.
//!
//! Every setting has a default and can be overridden from a
//! `HOMEGUARD_*` environment variable or with a `with_*` setter.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::auth::hasher::{MAX_COST, MIN_COST};

pub const ENV_LISTEN_ADDR: &str = "HOMEGUARD_LISTEN_ADDR";
pub const ENV_DATA_DIR: &str = "HOMEGUARD_DATA_DIR";
pub const ENV_PUBLIC_URL: &str = "HOMEGUARD_PUBLIC_URL";
pub const ENV_ALARM_URL: &str = "HOMEGUARD_ALARM_URL";
pub const ENV_ARM_WEBHOOK: &str = "HOMEGUARD_ARM_WEBHOOK";
pub const ENV_DISARM_WEBHOOK: &str = "HOMEGUARD_DISARM_WEBHOOK";
pub const ENV_SWEEP_INTERVAL_SECS: &str = "HOMEGUARD_SWEEP_INTERVAL_SECS";
pub const ENV_NOTIFY_TIMEOUT_MS: &str = "HOMEGUARD_NOTIFY_TIMEOUT_MS";
pub const ENV_HASH_COST: &str = "HOMEGUARD_HASH_COST";

/// Errors in the gate configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    #[error("{0}")]
    Invalid(String),
}

/// Configuration of the gate service.
///
/// # Example
///
/// ```ignore
/// use homeguard::startup::GateConfig;
///
/// let config = GateConfig::from_env()?
///     .with_data_dir("/var/lib/homeguard");
/// config.validate()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
    /// Directory holding `credentials.json` and `artifacts/`
    pub data_dir: PathBuf,
    /// Authentication URL prefix embedded in rendered artifacts
    pub public_base_url: String,
    /// Base URL of the alarm system
    pub alarm_base_url: String,
    /// Webhook id that arms the alarm
    pub arm_signal_id: String,
    /// Webhook id that disarms the alarm
    pub disarm_signal_id: String,
    /// Interval between scheduled sweeps
    pub sweep_interval: Duration,
    /// Upper bound on one alarm signal delivery
    pub notify_timeout: Duration,
    /// bcrypt cost factor
    pub hash_cost: u32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            data_dir: default_data_dir(),
            public_base_url: "http://localhost:8080/api/authenticate".to_string(),
            alarm_base_url: "http://homeassistant.local:8123".to_string(),
            arm_signal_id: "no_one_at_home".to_string(),
            disarm_signal_id: "someone_at_home".to_string(),
            sweep_interval: Duration::from_secs(60 * 60),
            notify_timeout: Duration::from_millis(3000),
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// `<platform data dir>/homeguard`, or `./data` if there is none.
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("homeguard"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Read and parse `var`, or `None` if it is unset.
fn env_value<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnv {
            var,
            value: "<non-unicode>".to_string(),
        }),
    }
}

impl GateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by any `HOMEGUARD_*` variables that are set.
    ///
    /// # Errors
    /// `InvalidEnv` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = env_value(ENV_LISTEN_ADDR)? {
            config.listen_addr = addr;
        }
        if let Some(dir) = env_value::<PathBuf>(ENV_DATA_DIR)? {
            config.data_dir = dir;
        }
        if let Some(url) = env_value(ENV_PUBLIC_URL)? {
            config.public_base_url = url;
        }
        if let Some(url) = env_value(ENV_ALARM_URL)? {
            config.alarm_base_url = url;
        }
        if let Some(id) = env_value(ENV_ARM_WEBHOOK)? {
            config.arm_signal_id = id;
        }
        if let Some(id) = env_value(ENV_DISARM_WEBHOOK)? {
            config.disarm_signal_id = id;
        }
        if let Some(secs) = env_value(ENV_SWEEP_INTERVAL_SECS)? {
            config.sweep_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = env_value(ENV_NOTIFY_TIMEOUT_MS)? {
            config.notify_timeout = Duration::from_millis(ms);
        }
        if let Some(cost) = env_value(ENV_HASH_COST)? {
            config.hash_cost = cost;
        }

        Ok(config)
    }

    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into();
        self
    }

    pub fn with_alarm_base_url(mut self, url: impl Into<String>) -> Self {
        self.alarm_base_url = url.into();
        self
    }

    /// Set both webhook ids.
    pub fn with_signal_ids(mut self, arm: impl Into<String>, disarm: impl Into<String>) -> Self {
        self.arm_signal_id = arm.into();
        self.disarm_signal_id = disarm.into();
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Check the settings that cannot be checked by parsing alone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arm_signal_id.trim().is_empty() || self.disarm_signal_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "arm and disarm webhook ids must not be empty".to_string(),
            ));
        }
        if self.arm_signal_id == self.disarm_signal_id {
            return Err(ConfigError::Invalid(
                "arm and disarm webhook ids must differ".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::Invalid("sweep interval must be positive".to_string()));
        }
        if self.notify_timeout.is_zero() {
            return Err(ConfigError::Invalid("notify timeout must be positive".to_string()));
        }
        if !(MIN_COST..=MAX_COST).contains(&self.hash_cost) {
            return Err(ConfigError::Invalid(format!(
                "hash cost must be between {} and {}, got {}",
                MIN_COST, MAX_COST, self.hash_cost
            )));
        }
        Ok(())
    }
}
