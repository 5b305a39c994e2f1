//! Error types for dbproxy-connector

use thiserror::Error;

use crate::tls::TlsError;

/// Main error type for the connector
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// I/O error (network, file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (missing/invalid parameters)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Keypair generation failure
    #[error("Keypair generation failed: {0}")]
    Keypair(String),

    /// TCP-level connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// TLS/SSL error
    #[error("TLS error: {0}")]
    Tls(#[from] TlsError),

    /// Requested driver was not compiled into this build
    #[error("Driver not available: {driver} (enable the `{feature}` cargo feature)")]
    DriverUnavailable {
        /// Driver name
        driver: &'static str,
        /// Cargo feature that provides it
        feature: &'static str,
    },

    /// Error raised by the external database driver, passed through unmodified
    #[error("Driver error: {0}")]
    Driver(String),
}

/// Result type alias for ConnectorError
pub type Result<T> = std::result::Result<T, ConnectorError>;

impl From<serde_yaml::Error> for ConnectorError {
    fn from(err: serde_yaml::Error) -> Self {
        ConnectorError::Config(err.to_string())
    }
}
