//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`), with defaults that run out of the
//! box: port 4000 and a local SQLite file.

use std::net::SocketAddr;

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`ChatConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// SQLite connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,
}

impl ChatConfig {
    /// Loads configuration from environment variables.
    ///
    /// `PORT` (default 4000) selects the listening port; the server binds
    /// all interfaces. Calls `dotenvy::dotenv().ok()` to optionally load a
    /// `.env` file.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let port: u16 = parse_env("PORT", 4000);
        let listen_addr = SocketAddr::from(([0, 0, 0, 0], port));

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:parley.db".to_string());

        let database_max_connections = parse_env("DATABASE_MAX_CONNECTIONS", 5);
        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", 1_000);

        Self {
            listen_addr,
            database_url,
            database_max_connections,
            event_bus_capacity,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
