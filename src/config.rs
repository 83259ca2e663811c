//! Configuration management for inputs.

use crate::{Codec, InputError, InputResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration for an input
///
/// # Structure
/// - **Mandatory fields**: `key`, `data_type`
/// - **Optional fields** (defaults match a local queue server): `host`, `port`, `db`,
///   `timeout`, `password`, `retries`, plus runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Hostname of the queue server
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to connect on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logical database number
    #[serde(default)]
    pub db: u32,

    /// Initial connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Password to authenticate with, no authentication when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Password>,

    /// Name of the list or channel to read from
    ///
    /// May contain placeholders; those are resolved before the config reaches the input.
    pub key: String,

    /// Whether `key` names a list (blocking pop) or a channel (subscribe)
    #[serde(alias = "dataType")]
    pub data_type: DataType,

    /// Maximum number of consecutive transport failures before giving up
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Input name used to label metrics
    #[serde(default = "default_name")]
    pub name: String,

    /// Payload format
    #[serde(default)]
    pub format: Codec,

    /// Pause between reconnect attempts in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    6379
}
fn default_timeout() -> u64 {
    5
}
fn default_retries() -> u32 {
    5
}
fn default_name() -> String {
    "queue-input".to_string()
}
fn default_retry_backoff_ms() -> u64 {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl InputConfig {
    /// Create a configuration for `key` with every optional setting at its default
    pub fn new(key: impl Into<String>, data_type: DataType) -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db: 0,
            timeout: default_timeout(),
            password: None,
            key: key.into(),
            data_type,
            retries: default_retries(),
            name: default_name(),
            format: Codec::default(),
            retry_backoff_ms: default_retry_backoff_ms(),
            log_level: default_log_level(),
        }
    }

    /// Load mandatory configuration from environment variables
    ///
    /// Reads:
    /// - `QUEUE_INPUT_KEY`: list or channel name (required)
    /// - `QUEUE_INPUT_DATA_TYPE`: `list` or `channel` (required)
    ///
    /// Connection settings then go through [`InputConfig::apply_env_overrides`].
    pub fn from_env() -> InputResult<Self> {
        let key = env::var("QUEUE_INPUT_KEY")
            .map_err(|_| InputError::config("QUEUE_INPUT_KEY is required"))?;

        let data_type = env::var("QUEUE_INPUT_DATA_TYPE")
            .map_err(|_| InputError::config("QUEUE_INPUT_DATA_TYPE is required"))?
            .parse()?;

        let mut config = Self::new(key, data_type);
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> InputResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InputError::config(format!("Failed to read config file {}: {}", path, e))
        })?;

        Self::from_toml(&content)
            .map_err(|e| InputError::config(format!("Failed to parse config file {}: {}", path, e)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> InputResult<Self> {
        toml::from_str(content).map_err(|e| InputError::config(e.to_string()))
    }

    /// Apply environment variable overrides to the connection settings
    ///
    /// Honors `QUEUE_INPUT_HOST`, `QUEUE_INPUT_PORT`, `QUEUE_INPUT_DB` and
    /// `QUEUE_INPUT_PASSWORD`.
    pub fn apply_env_overrides(&mut self) -> InputResult<()> {
        if let Ok(val) = env::var("QUEUE_INPUT_HOST") {
            self.host = val;
        }
        if let Ok(val) = env::var("QUEUE_INPUT_PORT") {
            self.port = val
                .parse()
                .map_err(|_| InputError::config(format!("Invalid QUEUE_INPUT_PORT: {}", val)))?;
        }
        if let Ok(val) = env::var("QUEUE_INPUT_DB") {
            self.db = val
                .parse()
                .map_err(|_| InputError::config(format!("Invalid QUEUE_INPUT_DB: {}", val)))?;
        }
        if let Ok(val) = env::var("QUEUE_INPUT_PASSWORD") {
            self.password = Some(Password::new(val));
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> InputResult<()> {
        if self.key.is_empty() {
            return Err(InputError::config("key cannot be empty"));
        }

        if self.host.is_empty() {
            return Err(InputError::config("host cannot be empty"));
        }

        if self.port == 0 {
            return Err(InputError::config("port must be > 0"));
        }

        if self.timeout == 0 {
            return Err(InputError::config("timeout must be > 0"));
        }

        if self.retries > 100 {
            return Err(InputError::config("retries too high (max 100)"));
        }

        Ok(())
    }

    /// Connection settings handed to the transport
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            host: self.host.clone(),
            port: self.port,
            db: self.db,
            timeout: Duration::from_secs(self.timeout),
            password: self.password.clone(),
        }
    }

    /// A string identifying this input in log messages (never includes the password)
    pub fn identity(&self) -> String {
        format!(
            "{}:{}/{} {}:{}",
            self.host, self.port, self.db, self.data_type, self.key
        )
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// How messages are pulled from `key`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Blocking pop from a list
    List,
    /// Subscribe to a publish/subscribe channel
    Channel,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::List => write!(f, "list"),
            DataType::Channel => write!(f, "channel"),
        }
    }
}

impl FromStr for DataType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(DataType::List),
            "channel" => Ok(DataType::Channel),
            other => Err(InputError::config(format!(
                "data_type must be 'list' or 'channel', got '{}'",
                other
            ))),
        }
    }
}

/// Secret credential, redacted from debug output
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The secret value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Everything a transport needs to open a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub db: u32,
    pub timeout: Duration,
    pub password: Option<Password>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = InputConfig::new("logstash", DataType::List);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 6379);
        assert_eq!(config.db, 0);
        assert_eq!(config.timeout, 5);
        assert!(config.password.is_none());
        assert_eq!(config.retries, 5);
        assert_eq!(config.format, Codec::Json);
        assert_eq!(config.retry_backoff(), Duration::from_secs(1));
    }

    #[test]
    fn test_config_validation() {
        let mut config = InputConfig::new("logstash", DataType::Channel);
        assert!(config.validate().is_ok());

        config.key = "".to_string();
        assert!(config.validate().is_err());

        config.key = "logstash".to_string();
        config.retries = 101;
        assert!(config.validate().is_err());

        config.retries = 0;
        config.timeout = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_data_type_parsing() {
        assert_eq!("list".parse::<DataType>().unwrap(), DataType::List);
        assert_eq!(" Channel ".parse::<DataType>().unwrap(), DataType::Channel);
        assert!("stream".parse::<DataType>().is_err());
    }

    #[test]
    fn test_identity_hides_password() {
        let mut config = InputConfig::new("events", DataType::List);
        config.password = Some(Password::new("hunter2"));

        assert_eq!(config.identity(), "127.0.0.1:6379/0 list:events");
        assert!(!format!("{:?}", config).contains("hunter2"));
        assert_eq!(config.connect_options().password.unwrap().expose(), "hunter2");
    }

    #[test]
    fn test_from_toml_requires_key_and_data_type() {
        assert!(InputConfig::from_toml("host = \"10.0.0.1\"").is_err());

        let config = InputConfig::from_toml("key = \"jobs\"\ndataType = \"channel\"").unwrap();
        assert_eq!(config.key, "jobs");
        assert_eq!(config.data_type, DataType::Channel);
        assert_eq!(config.port, 6379);
    }
}
