//! Configuration for the Pheme server
//!
//! Resolves the database location and listen address from CLI arguments,
//! environment variables, and platform defaults. The storage handle built
//! from this configuration is constructed explicitly in `main` and passed
//! to the API layer; there is no hidden global database state.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the database path
pub const DB_PATH_ENV: &str = "PHEME_DB_PATH";

/// Get the default database path using the platform data directory
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pheme")
        .join("pheme.db")
}

/// Get the database path from CLI arg, env var, or default
///
/// Resolution order: `--db-path` > `PHEME_DB_PATH` > platform default.
pub fn resolve_db_path(cli_path: Option<String>) -> PathBuf {
    cli_path
        .map(PathBuf::from)
        .or_else(|| std::env::var(DB_PATH_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub addr: SocketAddr,
    /// Per-request timeout applied by the timeout middleware
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 5000).into(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_path_takes_precedence() {
        let path = resolve_db_path(Some("/tmp/custom.db".to_string()));
        assert_eq!(path, PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn test_default_path_ends_with_db_file() {
        let path = default_db_path();
        assert!(path.ends_with("pheme/pheme.db"));
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.port(), 5000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
