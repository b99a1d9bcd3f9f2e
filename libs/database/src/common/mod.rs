//! Common utilities shared across the connector

pub mod error;

pub use error::{DatabaseError, DatabaseResult};
