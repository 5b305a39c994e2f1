//! MySQL driver integration
//!
//! `mysql_async` manages its own socket and loads TLS material from disk, so
//! this integration consumes the [`FileTriple`] produced by
//! [`crate::credentials::write_to_file`] instead of a pre-established stream.
//! The driver dials `(target, 3307)` itself and performs the mutual-TLS
//! handshake with hostname verification left enabled, so the server
//! certificate must match the target address exactly.

use mysql_async::{ClientIdentity, Conn, OptsBuilder, SslOpts};

use crate::channel::{ConnectionTarget, SERVER_PROXY_PORT};
use crate::config::ConnectionParams;
use crate::credentials::FileTriple;
use crate::error::{ConnectorError, Result};

/// Open a MySQL session to `target` through the proxy port.
///
/// All three files in `files` must exist and be readable. Required
/// parameters are validated first, so a missing `user` or `database` fails
/// as a configuration error before any socket is opened.
///
/// # Errors
///
/// I/O-level failures surface as [`ConnectorError::Connection`]; everything
/// the driver reports itself (TLS rejection, bad credentials, unknown
/// database) passes through as [`ConnectorError::Driver`].
pub async fn connect(
    target: &ConnectionTarget,
    files: &FileTriple,
    params: &ConnectionParams,
) -> Result<Conn> {
    params.validate().map_err(ConnectorError::Config)?;

    if !params.options.is_empty() {
        warn!(
            "Ignoring {} driver option(s) not supported by the MySQL integration",
            params.options.len()
        );
    }

    let ssl_opts = SslOpts::default()
        .with_root_certs(vec![files.ca_path.clone().into()])
        .with_client_identity(Some(ClientIdentity::new(
            files.cert_path.clone().into(),
            files.key_path.clone().into(),
        )));

    let opts = OptsBuilder::default()
        .ip_or_hostname(target.host().to_string())
        .tcp_port(SERVER_PROXY_PORT)
        .user(Some(params.user.clone()))
        .db_name(Some(params.database.clone()))
        .pass(params.password.clone())
        .ssl_opts(Some(ssl_opts));

    let conn = Conn::new(opts).await.map_err(|e| match e {
        mysql_async::Error::Io(io) => ConnectorError::Connection(io.to_string()),
        other => ConnectorError::Driver(other.to_string()),
    })?;

    info!("MySQL session established with {}", target);
    Ok(conn)
}
