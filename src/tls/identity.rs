//! TLS client identity construction

use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore};

use crate::credentials::{CertificateBundle, FileTriple};

use super::{load_certificates, load_private_key, parse_certificates, parse_private_key, TlsError};

/// CA trust anchor + ephemeral client certificate + private key, loaded into
/// a rustls client configuration ready for a mutually-verified handshake.
///
/// Certificate contents are not inspected here; anything wrong with the
/// material (untrusted chain, expired cert, key mismatch) surfaces during the
/// handshake itself.
#[derive(Clone, Debug)]
pub struct TlsIdentity {
    client_config: Arc<ClientConfig>,
}

impl TlsIdentity {
    /// Build an identity from in-memory credential material.
    ///
    /// # Errors
    ///
    /// Returns an error if either PEM blob contains no certificate, the
    /// private key cannot be parsed, or the rustls configuration is rejected.
    pub fn from_bundle(bundle: &CertificateBundle) -> Result<Self, TlsError> {
        let ca_certs = parse_certificates(bundle.ca_cert.as_bytes())?;
        let client_certs = parse_certificates(bundle.client_cert.as_bytes())?;
        let key = parse_private_key(&bundle.private_key)?;
        Self::build(ca_certs, client_certs, key)
    }

    /// Build an identity from files previously written with
    /// [`crate::credentials::write_to_file`].
    ///
    /// All three files must exist and be readable.
    pub fn from_files(files: &FileTriple) -> Result<Self, TlsError> {
        let ca_certs = load_certificates(&files.ca_path)?;
        let client_certs = load_certificates(&files.cert_path)?;
        let key = load_private_key(&files.key_path)?;
        Self::build(ca_certs, client_certs, key)
    }

    fn build(
        ca_certs: Vec<CertificateDer<'static>>,
        client_certs: Vec<CertificateDer<'static>>,
        key: PrivateKeyDer<'static>,
    ) -> Result<Self, TlsError> {
        if ca_certs.is_empty() {
            return Err(TlsError::CertificateParse(
                "no CA certificate found".to_string(),
            ));
        }
        if client_certs.is_empty() {
            return Err(TlsError::CertificateParse(
                "no client certificate found".to_string(),
            ));
        }

        // Trust exactly the issuing CA, never system roots
        let mut root_store = RootCertStore::empty();
        for cert in ca_certs {
            root_store
                .add(cert)
                .map_err(|e| TlsError::CertificateParse(e.to_string()))?;
        }

        let provider = rustls::crypto::ring::default_provider();

        let client_config = ClientConfig::builder_with_provider(Arc::new(provider))
            .with_safe_default_protocol_versions()
            .map_err(|e| TlsError::config(format!("Failed to set protocol versions: {}", e)))?
            .with_root_certificates(root_store)
            .with_client_auth_cert(client_certs, key)
            .map_err(|e| TlsError::config(format!("Failed to build client TLS config: {}", e)))?;

        Ok(Self {
            client_config: Arc::new(client_config),
        })
    }

    /// The underlying rustls configuration, shared with channel and drivers.
    pub(crate) fn client_config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.client_config)
    }
}
