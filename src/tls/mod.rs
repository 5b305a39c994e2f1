//! TLS client identity for the proxy channel
//!
//! The connector always speaks mutual TLS to the proxy: the server is
//! verified against the issuing CA (and only that CA), and the ephemeral
//! client certificate authenticates the caller. This module turns the
//! credential material into a rustls [`ClientConfig`]-backed [`TlsIdentity`]
//! that the channel establisher and driver integrations consume.
//!
//! Credential material can come from memory ([`TlsIdentity::from_bundle`],
//! the usual ephemeral flow) or from files previously materialized with
//! [`crate::credentials::write_to_file`] ([`TlsIdentity::from_files`]).
//!
//! # Security
//!
//! - Uses rustls (pure Rust TLS implementation) for the handshake
//! - TLS 1.2 minimum, TLS 1.3 preferred
//! - Trust is pinned to the supplied CA; system roots are never consulted

mod error;
mod identity;

pub use error::TlsError;
pub use identity::TlsIdentity;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Parse all certificates from in-memory PEM bytes.
pub(crate) fn parse_certificates(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let mut reader = pem;

    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TlsError::CertificateParse(e.to_string()))?;

    Ok(certs)
}

/// Parse a private key from in-memory PEM bytes. Supports RSA, PKCS8, and EC keys.
pub(crate) fn parse_private_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>, TlsError> {
    let mut reader = pem;

    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| TlsError::PrivateKeyParse(e.to_string()))?
        .ok_or_else(|| TlsError::PrivateKeyParse("no private key found".to_string()))
}

/// Load certificates from a PEM file
///
/// Reads all certificates from a PEM-encoded file and returns them as
/// a vector of `CertificateDer`. This supports certificate chains.
pub(crate) fn load_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let file = File::open(path).map_err(|e| TlsError::cert_load(path, e.to_string()))?;

    let mut reader = BufReader::new(file);

    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TlsError::cert_load(path, e.to_string()))?;

    Ok(certs)
}

/// Load a private key from a PEM file
///
/// Reads a private key from a PEM-encoded file. Supports RSA, PKCS8, and EC keys.
pub(crate) fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let file = File::open(path).map_err(|e| TlsError::key_load(path, e.to_string()))?;

    let mut reader = BufReader::new(file);

    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| TlsError::key_load(path, e.to_string()))?
        .ok_or_else(|| TlsError::key_load(path, "no private key found in file"))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_certificates_from_memory() {
        let ca = testutil::test_ca();
        let certs = parse_certificates(ca.cert.pem().as_bytes()).unwrap();
        assert_eq!(certs.len(), 1);
    }

    #[test]
    fn test_parse_certificates_garbage_is_empty() {
        // Non-PEM input yields no certificates rather than an error
        let certs = parse_certificates(b"not pem at all").unwrap();
        assert!(certs.is_empty());
    }

    #[test]
    fn test_parse_private_key_from_memory() {
        let key = rcgen::KeyPair::generate().unwrap();
        let parsed = parse_private_key(key.serialize_pem().as_bytes());
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_parse_private_key_missing() {
        let err = parse_private_key(b"no key here").unwrap_err();
        assert!(err.to_string().contains("no private key"));
    }

    #[test]
    fn test_load_certificates_nonexistent_file() {
        let err = load_certificates(std::path::Path::new("/nonexistent/ca.pem")).unwrap_err();
        assert!(matches!(err, TlsError::CertificateLoad { .. }));
    }

    #[test]
    fn test_load_private_key_nonexistent_file() {
        let err = load_private_key(std::path::Path::new("/nonexistent/priv.pem")).unwrap_err();
        assert!(matches!(err, TlsError::PrivateKeyLoad { .. }));
    }
}
