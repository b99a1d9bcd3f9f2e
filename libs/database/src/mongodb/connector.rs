use mongodb::{
    Client,
    bson::doc,
    options::{ClientOptions, Credential, Tls, TlsOptions},
};
use tracing::{info, instrument, warn};

use super::{ConnectionConfig, Session, TlsMode};
use crate::common::{DatabaseError, DatabaseResult};

/// Build driver options from a resolved config
///
/// Parsing a plain `mongodb://` string does no network I/O; `mongodb+srv://`
/// strings resolve DNS here.
pub async fn client_options(config: &ConnectionConfig) -> DatabaseResult<ClientOptions> {
    let mut options = ClientOptions::parse(config.url())
        .await
        .map_err(|e| DatabaseError::InvalidConnectionString(e.to_string()))?;

    options.server_selection_timeout = Some(config.timeout());
    options.connect_timeout = Some(config.timeout());

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    if let Some(ref credentials) = config.credentials {
        options.credential = Some(
            Credential::builder()
                .username(credentials.username.clone())
                .password(credentials.password.clone())
                .build(),
        );
    }

    apply_tls(&mut options, config.tls);

    Ok(options)
}

fn apply_tls(options: &mut ClientOptions, mode: TlsMode) {
    if mode.allows_invalid_certificates() {
        warn!("TLS certificate validation is disabled (trust-all mode)");
        options.tls = Some(Tls::Enabled(
            TlsOptions::builder()
                .allow_invalid_certificates(true)
                .build(),
        ));
    }
}

/// Connect using a ConnectionConfig and return a live [`Session`]
///
/// The connection is verified with a `ping` against `admin`, so an unreachable
/// endpoint or rejected credentials fail here rather than on first use. Failures
/// are not retried.
///
/// # Example
/// ```ignore
/// use database::mongodb::{ConnectionConfig, connect_from_config};
///
/// let config = ConnectionConfig::local();
/// let session = connect_from_config(&config).await?;
/// let products = session.collection("products");
/// ```
#[instrument(skip(config), fields(endpoint = %config.redacted_url(), database = %config.database))]
pub async fn connect_from_config(config: &ConnectionConfig) -> DatabaseResult<Session> {
    info!("Connecting to DocumentDB");

    let options = client_options(config).await?;
    let client = Client::with_options(options).map_err(|e| DatabaseError::ConnectionFailed {
        endpoint: config.redacted_url(),
        details: e.to_string(),
    })?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| DatabaseError::ConnectionFailed {
            endpoint: config.redacted_url(),
            details: e.to_string(),
        })?;

    info!("Successfully connected to DocumentDB");
    Ok(Session::new(client, config.database()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mongodb::Credentials;
    use std::time::Duration;

    #[tokio::test]
    async fn test_client_options_apply_timeout_and_app_name() {
        let config = ConnectionConfig::new("mongodb://localhost:27017")
            .with_timeout_secs(120)
            .with_app_name("documentdb-demo");

        let options = client_options(&config).await.unwrap();
        assert_eq!(
            options.server_selection_timeout,
            Some(Duration::from_secs(120))
        );
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(120)));
        assert_eq!(options.app_name.as_deref(), Some("documentdb-demo"));
    }

    #[tokio::test]
    async fn test_client_options_verify_keeps_uri_tls() {
        let config = ConnectionConfig::new("mongodb://localhost:27017");
        let options = client_options(&config).await.unwrap();
        assert!(options.tls.is_none());
    }

    #[tokio::test]
    async fn test_client_options_local_gateway_verifies_tls() {
        let options = client_options(&ConnectionConfig::local()).await.unwrap();

        match options.tls {
            Some(Tls::Enabled(ref tls)) => {
                assert_ne!(tls.allow_invalid_certificates, Some(true));
            }
            other => panic!("expected TLS enabled, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_options_trust_all_allows_invalid_certificates() {
        let config = ConnectionConfig::new("mongodb://localhost:10260").with_tls(TlsMode::TrustAll);
        let options = client_options(&config).await.unwrap();

        match options.tls {
            Some(Tls::Enabled(ref tls)) => {
                assert_eq!(tls.allow_invalid_certificates, Some(true));
            }
            other => panic!("expected TLS enabled, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_options_literal_credentials() {
        let config = ConnectionConfig::new("mongodb://localhost:10260")
            .with_credentials(Credentials::new("admin", "secret"));
        let options = client_options(&config).await.unwrap();

        let credential = options.credential.expect("credential set");
        assert_eq!(credential.username.as_deref(), Some("admin"));
        assert_eq!(credential.password.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn test_client_options_invalid_url() {
        let config = ConnectionConfig::new("http://not-mongo");
        let err = client_options(&config).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidConnectionString(_)));
    }

    #[tokio::test]
    #[ignore] // Requires a running DocumentDB gateway
    async fn test_connect_local_gateway() {
        let config = ConnectionConfig::local().with_tls(TlsMode::TrustAll);
        let session = connect_from_config(&config).await;
        assert!(session.is_ok());
    }

    #[tokio::test]
    async fn test_connect_unreachable_fails_fast() {
        let config = ConnectionConfig::new("mongodb://127.0.0.1:1").with_timeout_secs(1);
        let err = connect_from_config(&config).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ConnectionFailed { .. }));
    }
}
