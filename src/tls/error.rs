//! TLS-specific error types

use std::path::PathBuf;
use thiserror::Error;

/// TLS-specific errors
///
/// These errors capture specific failure modes for TLS operations,
/// with detailed context for debugging.
#[derive(Error, Debug)]
pub enum TlsError {
    /// Failed to load certificate from file
    #[error("Failed to load certificate from {path}: {reason}")]
    CertificateLoad {
        /// Path to the certificate file
        path: PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// Failed to load private key from file
    #[error("Failed to load private key from {path}: {reason}")]
    PrivateKeyLoad {
        /// Path to the key file
        path: PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// Failed to parse in-memory certificate PEM
    #[error("Failed to parse certificate: {0}")]
    CertificateParse(String),

    /// Failed to parse in-memory private key PEM
    #[error("Failed to parse private key: {0}")]
    PrivateKeyParse(String),

    /// TLS handshake failed (untrusted CA, hostname mismatch, expired cert)
    #[error("TLS handshake failed: {0}")]
    Handshake(String),

    /// Target is not a valid TLS server name
    #[error("Invalid server name: {0}")]
    InvalidServerName(String),

    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    Config(String),

    /// I/O error during TLS operation
    #[error("TLS I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TlsError {
    /// Create a certificate load error
    pub fn cert_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        TlsError::CertificateLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a private key load error
    pub fn key_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        TlsError::PrivateKeyLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a handshake error
    pub fn handshake(reason: impl Into<String>) -> Self {
        TlsError::Handshake(reason.into())
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        TlsError::Config(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_load_error_display() {
        let err = TlsError::cert_load("/path/to/cert.pem", "file not found");
        let msg = err.to_string();
        assert!(msg.contains("/path/to/cert.pem"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_handshake_error_display() {
        let err = TlsError::handshake("hostname mismatch");
        assert_eq!(err.to_string(), "TLS handshake failed: hostname mismatch");
    }

    #[test]
    fn test_invalid_server_name_display() {
        let err = TlsError::InvalidServerName("bad:name".to_string());
        assert_eq!(err.to_string(), "Invalid server name: bad:name");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let tls_err: TlsError = io_err.into();
        assert!(tls_err.to_string().contains("file not found"));
    }
}
