//! Connection parameters and connector configuration

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::channel::ConnectionTarget;
use crate::error::{ConnectorError, Result};
use crate::users::format_database_user;

/// Parameters handed to the database driver at connect time.
///
/// `user` and `database` are mandatory; `password` is absent when using pure
/// certificate/IAM auth. `options` carries driver-specific extras forwarded
/// verbatim to the driver integration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionParams {
    /// Database username
    pub user: String,
    /// Database name
    pub database: String,
    /// Password (optional; absent for certificate/IAM auth)
    #[serde(default)]
    pub password: Option<String>,
    /// Additional driver-specific options
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl ConnectionParams {
    /// Parameters with the two mandatory fields.
    pub fn new(user: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            database: database.into(),
            password: None,
            options: HashMap::new(),
        }
    }

    /// Set a password (for non-IAM auth modes).
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Add a driver-specific option, forwarded verbatim.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Check the mandatory fields. Drivers call this before opening any
    /// socket so missing parameters fail fast as configuration errors.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.user.is_empty() {
            return Err("connection parameter `user` is required".to_string());
        }
        if self.database.is_empty() {
            return Err("connection parameter `database` is required".to_string());
        }
        Ok(())
    }
}

/// Root configuration structure
///
/// # Example YAML
///
/// ```yaml
/// instance:
///   host: "10.1.2.3"
///   addressing: ip
///   database_version: POSTGRES_14
///
/// connection:
///   user: "svc@project.gserviceaccount.com"
///   database: appdb
///
/// credentials_dir: /var/run/dbproxy
/// connect_timeout_secs: 10
/// ```
#[derive(Debug, Deserialize)]
pub struct ConnectorConfig {
    /// Target instance
    pub instance: InstanceConfig,

    /// Driver connection parameters
    pub connection: ConnectionParams,

    /// Directory for materialized credential files (drivers that need
    /// file-based TLS material)
    #[serde(default)]
    pub credentials_dir: Option<PathBuf>,

    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl ConnectorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.instance.host.is_empty() {
            return Err("instance host must not be empty".to_string());
        }
        self.connection.validate()
    }

    /// The configured username, normalized for the instance's dialect.
    pub fn iam_user(&self) -> String {
        format_database_user(&self.instance.database_version, &self.connection.user)
    }
}

/// Target instance configuration
#[derive(Debug, Deserialize)]
pub struct InstanceConfig {
    /// Instance IP address or hostname
    pub host: String,
    /// Whether `host` is an IP or a resolvable hostname
    #[serde(default)]
    pub addressing: Addressing,
    /// Database version tag (e.g. POSTGRES_14, MYSQL_8_0), used for
    /// username normalization
    pub database_version: String,
}

impl InstanceConfig {
    /// The connection target for the channel establisher.
    pub fn target(&self) -> ConnectionTarget {
        match self.addressing {
            Addressing::Ip => ConnectionTarget::ip(&self.host),
            Addressing::Hostname => ConnectionTarget::hostname(&self.host),
        }
    }
}

/// How the instance host was resolved
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Addressing {
    /// `host` is a bare IP address
    #[default]
    Ip,
    /// `host` is a resolvable hostname
    Hostname,
}

fn default_connect_timeout() -> u64 {
    30
}

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<ConnectorConfig> {
    let contents = std::fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load configuration from a YAML string (useful for testing)
pub fn load_config_from_str(yaml: &str) -> Result<ConnectorConfig> {
    let mut config: ConnectorConfig = serde_yaml::from_str(yaml)?;
    resolve_config_env_vars(&mut config);
    config.validate().map_err(ConnectorError::Config)?;
    Ok(config)
}

/// Resolve environment variables in a string value
///
/// Supports two syntaxes:
/// - `${VAR_NAME}` - curly brace syntax
/// - `$VAR_NAME` - simple syntax (for single variable values)
///
/// If the environment variable is not set, the original value is preserved.
fn resolve_env_var(value: &str) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        return match std::env::var(var_name) {
            Ok(env_value) => env_value,
            Err(_) => {
                warn!("Env var {} not set, keeping original value", var_name);
                value.to_string()
            }
        };
    }

    if value.starts_with('$') && !value.contains(' ') && value.len() > 1 {
        let var_name = &value[1..];
        return match std::env::var(var_name) {
            Ok(env_value) => env_value,
            Err(_) => {
                warn!("Env var {} not set, keeping original value", var_name);
                value.to_string()
            }
        };
    }

    value.to_string()
}

fn resolve_config_env_vars(config: &mut ConnectorConfig) {
    config.connection.user = resolve_env_var(&config.connection.user);
    if let Some(ref password) = config.connection.password {
        config.connection.password = Some(resolve_env_var(password));
    }
    config.instance.host = resolve_env_var(&config.instance.host);
}
