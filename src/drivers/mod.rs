//! Database driver integrations
//!
//! The connector is not a database driver: once the secure channel exists,
//! an external driver crate speaks the wire protocol. Each integration is an
//! optional cargo feature, and [`probe`] is the explicit capability check a
//! caller runs before connecting — a missing driver is a configuration
//! error, raised before any network activity, distinct from connectivity or
//! driver-phase failures.
//!
//! - [`postgres`] (feature `postgres`): `tokio-postgres`, handed the
//!   already-authenticated TLS stream
//! - [`mysql`] (feature `mysql`): `mysql_async`, which manages its own socket
//!   and consumes file-based TLS material

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;

use crate::error::{ConnectorError, Result};

/// The SQL dialect family of the target instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseFamily {
    /// PostgreSQL-family instances
    Postgres,
    /// MySQL-family instances
    MySql,
}

impl DatabaseFamily {
    /// The driver crate backing this family.
    pub fn driver_name(&self) -> &'static str {
        match self {
            DatabaseFamily::Postgres => "tokio-postgres",
            DatabaseFamily::MySql => "mysql_async",
        }
    }

    fn feature(&self) -> &'static str {
        match self {
            DatabaseFamily::Postgres => "postgres",
            DatabaseFamily::MySql => "mysql",
        }
    }
}

/// Check that the driver for `family` was compiled into this build.
///
/// # Errors
///
/// Returns [`ConnectorError::DriverUnavailable`] naming the driver and the
/// cargo feature that provides it.
pub fn probe(family: DatabaseFamily) -> Result<()> {
    let available = match family {
        DatabaseFamily::Postgres => cfg!(feature = "postgres"),
        DatabaseFamily::MySql => cfg!(feature = "mysql"),
    };

    if available {
        Ok(())
    } else {
        Err(ConnectorError::DriverUnavailable {
            driver: family.driver_name(),
            feature: family.feature(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "postgres")]
    #[test]
    fn test_probe_postgres_available() {
        assert!(probe(DatabaseFamily::Postgres).is_ok());
    }

    #[cfg(feature = "mysql")]
    #[test]
    fn test_probe_mysql_available() {
        assert!(probe(DatabaseFamily::MySql).is_ok());
    }

    #[cfg(not(feature = "postgres"))]
    #[test]
    fn test_probe_postgres_unavailable() {
        let err = probe(DatabaseFamily::Postgres).unwrap_err();
        assert!(matches!(err, ConnectorError::DriverUnavailable { .. }));
    }

    #[test]
    fn test_driver_unavailable_message_names_feature() {
        let err = ConnectorError::DriverUnavailable {
            driver: DatabaseFamily::MySql.driver_name(),
            feature: DatabaseFamily::MySql.feature(),
        };
        let msg = err.to_string();
        assert!(msg.contains("mysql_async"));
        assert!(msg.contains("`mysql`"));
    }
}
