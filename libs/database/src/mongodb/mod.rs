//! DocumentDB connector and utilities
//!
//! Provides configuration resolution, connection management and a health check.

mod config;
mod connector;
mod health;
mod session;

#[cfg(feature = "config")]
pub use config::resolve;
pub use config::{
    ConfigSource, ConnectionConfig, Credentials, DEFAULT_DATABASE, DEFAULT_TIMEOUT_SECS,
    LOCAL_GATEWAY_URL, TlsMode, redact_url,
};
pub use connector::{client_options, connect_from_config};
pub use health::{HealthStatus, check_health, check_health_detailed};
pub use session::Session;

// Re-export driver types for convenience
pub use mongodb::{Client, Collection, Database, bson};
