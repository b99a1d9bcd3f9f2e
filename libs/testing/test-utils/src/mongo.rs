//! MongoDB test infrastructure
//!
//! Provides a `TestMongo` helper that creates a plain MongoDB container. It
//! speaks the same wire protocol as the DocumentDB gateway, so everything except
//! `cosmosSearch` and DiskANN indexes can be exercised against it.

use database::mongodb::{ConnectionConfig, Session, connect_from_config};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

/// Test MongoDB wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestMongo;
///
/// # async fn example() {
/// let mongo = TestMongo::new().await;
/// let session = mongo.session("demo_db").await;
/// let products = session.collection("products");
/// # }
/// ```
pub struct TestMongo {
    #[allow(dead_code)]
    container: ContainerAsync<Mongo>,
    pub connection_string: String,
}

impl TestMongo {
    /// Create a new test MongoDB instance (MongoDB 7)
    pub async fn new() -> Self {
        let container = Mongo::default()
            .with_tag("7")
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let connection_string = format!("mongodb://127.0.0.1:{}/?directConnection=true", host_port);

        tracing::info!(port = host_port, "Test MongoDB ready (mongo:7)");

        Self {
            container,
            connection_string,
        }
    }

    /// Connection settings pointing at this container
    pub fn config(&self, database: &str) -> ConnectionConfig {
        ConnectionConfig::new(self.connection_string.clone())
            .with_database(database)
            .with_timeout_secs(10)
    }

    /// Open a verified session on `database`
    pub async fn session(&self, database: &str) -> Session {
        connect_from_config(&self.config(database))
            .await
            .expect("Failed to connect to test MongoDB")
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

impl Drop for TestMongo {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test MongoDB container");
    }
}
