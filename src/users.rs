//! Database username normalization for IAM-based authentication
//!
//! IAM principals and database account names differ per dialect: Postgres
//! drops the service-account domain suffix, MySQL truncates at the first `@`.

/// Suffix stripped from Postgres service-account principals.
const SERVICE_ACCOUNT_SUFFIX: &str = ".gserviceaccount.com";

/// Map a raw IAM principal to the account name the target dialect's automatic
/// IAM authentication expects.
///
/// `database_version` is a version tag recognized by prefix (`POSTGRES*`,
/// `MYSQL*`, e.g. `POSTGRES_14`, `MYSQL_8_0`). Unrecognized tags pass the
/// user through unchanged rather than failing.
pub fn format_database_user(database_version: &str, user: &str) -> String {
    if database_version.starts_with("POSTGRES") {
        return user
            .strip_suffix(SERVICE_ACCOUNT_SUFFIX)
            .unwrap_or(user)
            .to_string();
    }

    if database_version.starts_with("MYSQL") {
        if let Some((name, _)) = user.split_once('@') {
            return name.to_string();
        }
    }

    user.to_string()
}
