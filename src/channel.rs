//! Secure channel establishment
//!
//! Opens a TCP connection to the fixed proxy port and upgrades it to mutual
//! TLS, with server-hostname verification pinned to the connection target.
//! The authenticated stream is what gets handed to a database driver.

use std::fmt;
use std::time::Duration;

use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::client::TlsStream;

use crate::error::{ConnectorError, Result};
use crate::tls::{TlsError, TlsIdentity};

/// TCP port the database-access proxy listens on. Hard constant of the proxy
/// protocol, not configurable.
pub const SERVER_PROXY_PORT: u16 = 3307;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the target instance was resolved by the caller.
///
/// Both variants dial and verify the same value: the hostname used for TLS
/// verification always equals the connection target, never a separate SNI
/// value, so the ephemeral certificate issuance must bind the server
/// certificate's subject/SAN to that exact address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// A bare IP address (e.g. `10.1.2.3`)
    Ip(String),
    /// A resolvable hostname (e.g. `db.internal.example.com`)
    Hostname(String),
}

impl ConnectionTarget {
    /// Target identified by IP address.
    pub fn ip(addr: impl Into<String>) -> Self {
        ConnectionTarget::Ip(addr.into())
    }

    /// Target identified by hostname.
    pub fn hostname(name: impl Into<String>) -> Self {
        ConnectionTarget::Hostname(name.into())
    }

    /// The address dialed over TCP and pinned during TLS verification.
    pub fn host(&self) -> &str {
        match self {
            ConnectionTarget::Ip(addr) => addr,
            ConnectionTarget::Hostname(name) => name,
        }
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host(), SERVER_PROXY_PORT)
    }
}

/// Establishes authenticated channels to the proxy.
///
/// Wraps `tokio_rustls::TlsConnector` around a [`TlsIdentity`]. Each
/// [`establish`](Self::establish) call constructs its own connection from
/// scratch; no socket, buffer, or session state is shared across calls, so
/// any number of establishments may run concurrently.
#[derive(Clone)]
pub struct ProxyChannel {
    connector: tokio_rustls::TlsConnector,
    connect_timeout: Duration,
}

impl ProxyChannel {
    /// Create a channel establisher from a prepared TLS identity.
    pub fn new(identity: &TlsIdentity) -> Self {
        Self {
            connector: tokio_rustls::TlsConnector::from(identity.client_config()),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Override the TCP connect timeout (default 30s).
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Open a TCP connection to `(target, 3307)` and perform the TLS
    /// handshake with server-hostname verification set to the target.
    ///
    /// No retries happen at this layer; a failed or hung attempt surfaces to
    /// the caller, and the socket is released on every failure path.
    ///
    /// # Errors
    ///
    /// - [`ConnectorError::Tls`] with [`TlsError::InvalidServerName`] if the
    ///   target is not a valid TLS server name (raised before any socket is
    ///   opened)
    /// - [`ConnectorError::Timeout`] / [`ConnectorError::Connection`] for
    ///   TCP-level failures
    /// - [`ConnectorError::Tls`] with [`TlsError::Handshake`] for untrusted
    ///   CA, hostname mismatch, or an expired/invalid certificate; there is
    ///   no downgrade to an unverified connection
    pub async fn establish(&self, target: &ConnectionTarget) -> Result<TlsStream<TcpStream>> {
        self.establish_on_port(target, SERVER_PROXY_PORT).await
    }

    // Port is a parameter only so tests can stand up a local proxy endpoint;
    // the public surface always dials SERVER_PROXY_PORT.
    pub(crate) async fn establish_on_port(
        &self,
        target: &ConnectionTarget,
        port: u16,
    ) -> Result<TlsStream<TcpStream>> {
        // Validate the target before touching the network
        let server_name = ServerName::try_from(target.host().to_string())
            .map_err(|_| TlsError::InvalidServerName(target.host().to_string()))?;

        let addr = format!("{}:{}", target.host(), port);
        debug!("Connecting to proxy at {}", addr);

        let stream = timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ConnectorError::Timeout(format!("Connecting to {}", addr)))?
            .map_err(|e| {
                ConnectorError::Connection(format!("Failed to connect to {}: {}", addr, e))
            })?;

        let tls_stream = self
            .connector
            .connect(server_name, stream)
            .await
            .map_err(|e| TlsError::handshake(e.to_string()))?;

        debug!("TLS channel established with {}", target.host());
        Ok(tls_stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::testutil::{client_bundle, issue_cert, test_ca, TestCa};
    use std::net::SocketAddr;
    use std::sync::Arc;

    use rustls::pki_types::PrivateKeyDer;
    use tokio::net::TcpListener;

    /// Spawn a one-shot TLS server presenting a certificate for
    /// `server_names`, signed by `ca`. Returns the bound address.
    async fn spawn_tls_server(ca: &TestCa, server_names: &[&str]) -> SocketAddr {
        let (cert, key) = issue_cert(ca, server_names);

        let provider = rustls::crypto::ring::default_provider();
        let server_config = rustls::ServerConfig::builder_with_provider(Arc::new(provider))
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(
                vec![cert.der().clone()],
                PrivateKeyDer::try_from(key.serialize_der()).unwrap(),
            )
            .unwrap();
        let acceptor = tokio_rustls::TlsAcceptor::from(Arc::new(server_config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((stream, _)) = listener.accept().await {
                // Handshake outcome is asserted on the client side
                let _ = acceptor.accept(stream).await;
            }
        });

        addr
    }

    fn test_channel(ca: &TestCa) -> ProxyChannel {
        let identity = crate::tls::TlsIdentity::from_bundle(&client_bundle(ca)).unwrap();
        ProxyChannel::new(&identity).with_connect_timeout(Duration::from_secs(5))
    }

    #[test]
    fn test_proxy_port_is_fixed() {
        assert_eq!(SERVER_PROXY_PORT, 3307);
        let target = ConnectionTarget::ip("10.0.0.1");
        assert_eq!(target.to_string(), "10.0.0.1:3307");
    }

    #[tokio::test]
    async fn test_establish_matching_hostname() {
        let ca = test_ca();
        let addr = spawn_tls_server(&ca, &["localhost"]).await;

        let channel = test_channel(&ca);
        let target = ConnectionTarget::hostname("localhost");
        let stream = channel.establish_on_port(&target, addr.port()).await;
        assert!(stream.is_ok());
    }

    #[tokio::test]
    async fn test_establish_by_ip() {
        let ca = test_ca();
        let addr = spawn_tls_server(&ca, &["127.0.0.1"]).await;

        let channel = test_channel(&ca);
        let target = ConnectionTarget::ip("127.0.0.1");
        let stream = channel.establish_on_port(&target, addr.port()).await;
        assert!(stream.is_ok());
    }

    #[tokio::test]
    async fn test_establish_hostname_mismatch_fails_handshake() {
        let ca = test_ca();
        // Server certificate bound to a different name than the target
        let addr = spawn_tls_server(&ca, &["other.internal"]).await;

        let channel = test_channel(&ca);
        let target = ConnectionTarget::hostname("localhost");
        let err = channel
            .establish_on_port(&target, addr.port())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConnectorError::Tls(TlsError::Handshake(_))
        ));
    }

    #[tokio::test]
    async fn test_establish_untrusted_ca_fails_handshake() {
        let server_ca = test_ca();
        let addr = spawn_tls_server(&server_ca, &["localhost"]).await;

        // Client trusts a different CA than the one that signed the server cert
        let client_ca = test_ca();
        let channel = test_channel(&client_ca);
        let target = ConnectionTarget::hostname("localhost");
        let err = channel
            .establish_on_port(&target, addr.port())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConnectorError::Tls(TlsError::Handshake(_))
        ));
    }

    #[tokio::test]
    async fn test_establish_connection_refused() {
        let ca = test_ca();
        let channel = test_channel(&ca);

        // Bind then drop a listener to find a port nothing is listening on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let target = ConnectionTarget::ip("127.0.0.1");
        let err = channel
            .establish_on_port(&target, port)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::Connection(_)));
    }

    /// End-to-end ephemeral flow: fresh RSA keypair, client certificate
    /// issued against it, mutual TLS against a server that requires client
    /// auth from the same CA.
    #[tokio::test]
    async fn test_establish_mutual_tls_with_generated_rsa_keypair() {
        use crate::credentials::CertificateBundle;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let ca = test_ca();

        // Issue a client certificate for a freshly generated RSA keypair,
        // the way the remote issuer would against the public key
        let keypair = crate::keys::generate_keys().await.unwrap();
        let rsa = openssl::rsa::Rsa::private_key_from_pem(&keypair.private_key).unwrap();
        let pkcs8 = openssl::pkey::PKey::from_rsa(rsa)
            .unwrap()
            .private_key_to_pkcs8()
            .unwrap();
        let signing_key = rcgen::KeyPair::try_from(pkcs8.as_slice()).unwrap();
        let client_cert = rcgen::CertificateParams::new(vec!["connector-client".to_string()])
            .unwrap()
            .signed_by(&signing_key, &ca.cert, &ca.key)
            .unwrap();

        let bundle = CertificateBundle {
            ca_cert: ca.cert.pem(),
            client_cert: client_cert.pem(),
            private_key: keypair.private_key.clone(),
        };
        let identity = crate::tls::TlsIdentity::from_bundle(&bundle).unwrap();
        let channel = ProxyChannel::new(&identity).with_connect_timeout(Duration::from_secs(5));

        // Server requires a client certificate chained to the same CA
        let (server_cert, server_key) = issue_cert(&ca, &["localhost"]);
        let mut roots = rustls::RootCertStore::empty();
        roots.add(ca.cert.der().clone()).unwrap();
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let verifier = rustls::server::WebPkiClientVerifier::builder_with_provider(
            Arc::new(roots),
            Arc::clone(&provider),
        )
        .build()
        .unwrap();
        let server_config = rustls::ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_client_cert_verifier(verifier)
            .with_single_cert(
                vec![server_cert.der().clone()],
                PrivateKeyDer::try_from(server_key.serialize_der()).unwrap(),
            )
            .unwrap();
        let acceptor = tokio_rustls::TlsAcceptor::from(Arc::new(server_config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((stream, _)) = listener.accept().await {
                if let Ok(mut tls) = acceptor.accept(stream).await {
                    let _ = tls.write_all(b"k").await;
                    let _ = tls.shutdown().await;
                }
            }
        });

        let target = ConnectionTarget::hostname("localhost");
        let mut stream = channel
            .establish_on_port(&target, addr.port())
            .await
            .unwrap();

        // Reading past the handshake proves the server accepted the client cert
        let mut buf = [0u8; 1];
        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"k");
    }

    #[tokio::test]
    async fn test_establish_invalid_server_name_fails_before_connect() {
        let ca = test_ca();
        let channel = test_channel(&ca);

        // Colon-separated instance strings are not valid TLS server names
        let target = ConnectionTarget::hostname("project:region:instance");
        let err = channel.establish(&target).await.unwrap_err();
        assert!(matches!(
            err,
            ConnectorError::Tls(TlsError::InvalidServerName(_))
        ));
    }
}
