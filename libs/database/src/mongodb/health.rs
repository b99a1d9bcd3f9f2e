use mongodb::bson::doc;
use std::time::Instant;

use super::Session;

/// Health check status for a DocumentDB session
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the gateway answered the ping
    pub healthy: bool,
    /// Optional message (e.g., error details)
    pub message: Option<String>,
    /// Round-trip time in milliseconds
    pub response_time_ms: u64,
}

/// Check gateway health with a `ping` command
///
/// # Example
/// ```ignore
/// use database::mongodb::{connect_from_config, check_health, ConnectionConfig};
///
/// let session = connect_from_config(&ConnectionConfig::local()).await?;
/// let healthy = check_health(&session).await;
/// ```
pub async fn check_health(session: &Session) -> bool {
    check_health_detailed(session).await.healthy
}

/// Check gateway health with timing and error details
pub async fn check_health_detailed(session: &Session) -> HealthStatus {
    let start = Instant::now();
    let result = session
        .client()
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthStatus {
            healthy: true,
            message: None,
            response_time_ms,
        },
        Err(e) => HealthStatus {
            healthy: false,
            message: Some(e.to_string()),
            response_time_ms,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mongodb::{ConnectionConfig, TlsMode, connect_from_config};

    #[tokio::test]
    #[ignore] // Requires a running DocumentDB gateway
    async fn test_check_health_detailed() {
        let config = ConnectionConfig::local().with_tls(TlsMode::TrustAll);
        let session = connect_from_config(&config).await.unwrap();
        let status = check_health_detailed(&session).await;
        assert!(status.healthy);
        assert!(status.message.is_none());
    }
}
