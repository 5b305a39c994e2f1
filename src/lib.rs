//! dbproxy-connector - Ephemeral-certificate database connector
//!
//! This library establishes authenticated, encrypted connections to managed
//! databases fronted by a TLS auth proxy:
//! - Generates a fresh RSA keypair per connection-setup cycle
//! - Materializes CA cert, ephemeral client cert, and private key into a
//!   mutual-TLS client identity (in memory or as PEM files for drivers that
//!   need file-based material)
//! - Opens a TCP connection to the fixed proxy port (3307) and upgrades it to
//!   TLS with server-hostname verification pinned to the target instance
//! - Normalizes database usernames for IAM-based authentication
//! - Hands the authenticated channel to an optional driver integration via
//!   the [`drivers`] module

#[macro_use]
mod logging;

pub mod channel;
pub mod config;
pub mod credentials;
pub mod drivers;
pub mod error;
pub mod keys;
pub mod tls;
pub mod users;

pub use channel::{ConnectionTarget, ProxyChannel, SERVER_PROXY_PORT};
pub use config::{ConnectionParams, ConnectorConfig, InstanceConfig};
pub use credentials::{write_to_file, CertificateBundle, FileTriple};
pub use drivers::DatabaseFamily;
pub use error::{ConnectorError, Result};
pub use keys::{generate_keys, Keypair};
pub use tls::{TlsError, TlsIdentity};
pub use users::format_database_user;
