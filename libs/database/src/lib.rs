//! Database library providing the DocumentDB (MongoDB wire protocol) connector
//!
//! This library resolves connection settings, opens a verified connection and
//! hands out an explicit [`Session`](crate::mongodb::Session) that every store operation borrows.
//! There is no process-wide client: whoever connects owns the session.
//!
//! # Features
//!
//! - `mongodb` (default) - DocumentDB / MongoDB support
//! - `config` - Configuration support with `core_config::FromEnv`
//! - `all` - All features
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{self, ConnectionConfig, TlsMode};
//!
//! // Local gateway with literal demo credentials
//! let config = ConnectionConfig::local().with_tls(TlsMode::TrustAll);
//! let session = mongodb::connect_from_config(&config).await?;
//! let products = session.collection("products");
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
