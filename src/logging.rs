//! Logging macros that set target to "dbproxy_connector" for all log calls.
//!
//! Without an explicit target, tracing uses the full module path
//! (e.g., "dbproxy_connector::drivers::postgres"), creating overly verbose
//! logger names for embedders that map targets to their own logger hierarchy.
//! These macros ensure all logs from this crate use a single
//! "dbproxy_connector" target.

macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!(target: "dbproxy_connector", $($arg)*) };
}

macro_rules! info {
    ($($arg:tt)*) => { ::tracing::info!(target: "dbproxy_connector", $($arg)*) };
}

macro_rules! warn {
    ($($arg:tt)*) => { ::tracing::warn!(target: "dbproxy_connector", $($arg)*) };
}
