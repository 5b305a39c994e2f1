//! Credential materialization
//!
//! Some drivers only accept TLS material as files on disk. This module writes
//! a [`CertificateBundle`] into a caller-supplied directory using fixed
//! filenames, producing the [`FileTriple`] hand-off artifact those drivers
//! consume.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Fixed filename for the CA certificate.
pub const CA_FILENAME: &str = "ca.pem";
/// Fixed filename for the ephemeral client certificate.
pub const CERT_FILENAME: &str = "cert.pem";
/// Fixed filename for the private key.
pub const KEY_FILENAME: &str = "priv.pem";

/// The credential material for one connection attempt or rotation interval.
///
/// The client certificate is ephemeral: it is issued externally with a
/// time-bounded validity and replaced when it expires. Expiry enforcement is
/// the issuer's responsibility, not this crate's.
#[derive(Clone)]
pub struct CertificateBundle {
    /// CA certificate, PEM text
    pub ca_cert: String,
    /// Ephemeral client certificate, PEM text
    pub client_cert: String,
    /// Private key bytes (PKCS#1 PEM, see [`crate::keys::Keypair`])
    pub private_key: Vec<u8>,
}

/// Paths to the three materialized credential files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTriple {
    /// `{dir}/ca.pem`
    pub ca_path: PathBuf,
    /// `{dir}/cert.pem`
    pub cert_path: PathBuf,
    /// `{dir}/priv.pem`
    pub key_path: PathBuf,
}

impl FileTriple {
    /// The fixed file layout under `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            ca_path: dir.join(CA_FILENAME),
            cert_path: dir.join(CERT_FILENAME),
            key_path: dir.join(KEY_FILENAME),
        }
    }
}

/// Write the bundle to `ca.pem`, `cert.pem`, and `priv.pem` inside `dir`.
///
/// Existing files of the same name are overwritten (truncate-and-create).
/// The three writes proceed concurrently since they touch disjoint files;
/// the operation completes once all three are written or the first error is
/// observed.
///
/// # Errors
///
/// Any I/O error (permission, disk full, missing directory) propagates.
/// There is no all-or-nothing rollback: on failure, 0, 1, or 2 of the files
/// may already exist on disk.
pub async fn write_to_file(dir: &Path, bundle: &CertificateBundle) -> Result<FileTriple> {
    let paths = FileTriple::in_dir(dir);

    tokio::try_join!(
        tokio::fs::write(&paths.ca_path, bundle.ca_cert.as_bytes()),
        tokio::fs::write(&paths.cert_path, bundle.client_cert.as_bytes()),
        tokio::fs::write(&paths.key_path, &bundle.private_key),
    )?;

    debug!("Materialized credentials under {}", dir.display());
    Ok(paths)
}
