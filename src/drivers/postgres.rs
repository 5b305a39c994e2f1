//! PostgreSQL driver integration
//!
//! `tokio-postgres` accepts an externally-established stream through
//! `Config::connect_raw`, so this integration hands it the authenticated TLS
//! channel directly: no file-based credential material is needed.

use tokio::task::JoinHandle;

use crate::channel::{ConnectionTarget, ProxyChannel, SERVER_PROXY_PORT};
use crate::config::ConnectionParams;
use crate::error::{ConnectorError, Result};

/// A live PostgreSQL session over the proxy channel.
///
/// The background task driving the wire protocol is tied to this handle and
/// aborted when it is dropped.
#[derive(Debug)]
pub struct PostgresConnection {
    /// The tokio-postgres client for issuing queries
    pub client: tokio_postgres::Client,
    driver: JoinHandle<()>,
}

impl Drop for PostgresConnection {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Establish the secure channel to `target` and open a PostgreSQL session
/// over it.
///
/// Required parameters are validated first, so a missing `user` or
/// `database` fails as a configuration error before any socket is opened.
/// Extra options are forwarded as `-c key=value` startup parameters.
///
/// # Errors
///
/// Channel errors propagate per [`ProxyChannel::establish`]; failures from
/// the driver's own connection phase (bad credentials, unknown database)
/// pass through as [`ConnectorError::Driver`], unmodified.
pub async fn connect(
    channel: &ProxyChannel,
    target: &ConnectionTarget,
    params: &ConnectionParams,
) -> Result<PostgresConnection> {
    params.validate().map_err(ConnectorError::Config)?;

    let stream = channel.establish(target).await?;

    let mut pg_config = tokio_postgres::Config::new();
    pg_config
        .user(&params.user)
        .dbname(&params.database)
        .host(target.host())
        .port(SERVER_PROXY_PORT)
        // The channel is already TLS; the driver must not negotiate a second
        // layer inside it.
        .ssl_mode(tokio_postgres::config::SslMode::Disable);
    if let Some(ref password) = params.password {
        pg_config.password(password);
    }
    if !params.options.is_empty() {
        let options = params
            .options
            .iter()
            .map(|(k, v)| format!("-c {}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        pg_config.options(&options);
    }

    let (client, connection) = pg_config
        .connect_raw(stream, tokio_postgres::NoTls)
        .await
        .map_err(|e| ConnectorError::Driver(e.to_string()))?;

    info!("PostgreSQL session established with {}", target);

    let driver = tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!("PostgreSQL connection task ended: {}", e);
        }
    });

    Ok(PostgresConnection { client, driver })
}
