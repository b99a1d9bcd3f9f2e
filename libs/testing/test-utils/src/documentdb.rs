//! DocumentDB local gateway test infrastructure
//!
//! `TestDocumentDb` runs the DocumentDB local image, which serves a TLS gateway
//! with a self-signed certificate on port 10260 and supports `cosmosSearch`.

use std::time::Duration;

use database::mongodb::{
    ConnectionConfig, Credentials, Session, TlsMode, connect_from_config,
};
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

const IMAGE: &str = "ghcr.io/microsoft/documentdb/documentdb-local";
const TAG: &str = "latest";
const GATEWAY_PORT: u16 = 10260;

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Test DocumentDB wrapper that ensures proper cleanup
///
/// # Example
///
/// ```no_run
/// use test_utils::TestDocumentDb;
///
/// # async fn example() {
/// let documentdb = TestDocumentDb::new().await;
/// let session = documentdb.session("vector_db").await;
/// # }
/// ```
pub struct TestDocumentDb {
    #[allow(dead_code)]
    container: ContainerAsync<GenericImage>,
    pub connection_string: String,
}

impl TestDocumentDb {
    pub async fn new() -> Self {
        let container = GenericImage::new(IMAGE, TAG)
            .with_exposed_port(GATEWAY_PORT.tcp())
            .with_wait_for(WaitFor::seconds(15))
            .with_cmd(["--username", TEST_USERNAME, "--password", TEST_PASSWORD])
            .with_startup_timeout(Duration::from_secs(180))
            .start()
            .await
            .expect("Failed to start DocumentDB container");

        let host_port = container
            .get_host_port_ipv4(GATEWAY_PORT)
            .await
            .expect("Failed to get DocumentDB gateway port");

        let connection_string = format!("mongodb://127.0.0.1:{}/?tls=true", host_port);

        tracing::info!(port = host_port, "Test DocumentDB gateway ready");

        Self {
            container,
            connection_string,
        }
    }

    /// Gateway settings; the self-signed certificate needs trust-all TLS
    pub fn config(&self, database: &str) -> ConnectionConfig {
        ConnectionConfig::new(self.connection_string.clone())
            .with_credentials(Credentials::new(TEST_USERNAME, TEST_PASSWORD))
            .with_tls(TlsMode::TrustAll)
            .with_database(database)
            .with_timeout_secs(30)
    }

    pub async fn session(&self, database: &str) -> Session {
        connect_from_config(&self.config(database))
            .await
            .expect("Failed to connect to test DocumentDB")
    }
}

impl Drop for TestDocumentDb {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test DocumentDB container");
    }
}
