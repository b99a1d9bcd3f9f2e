use database::mongodb::{ConnectionConfig, TlsMode, resolve};
use domain_documents::IndexExistsPolicy;

use crate::cli::Cli;

pub const APP_NAME: &str = "documentdb-demo";

/// Settings for one demo run
///
/// Resolved once, before any remote call, and read-only afterwards.
#[derive(Clone, Debug)]
pub struct DemoConfig {
    pub connection: ConnectionConfig,
    pub collection: String,
    pub index_policy: IndexExistsPolicy,
    pub reset: bool,
}

impl DemoConfig {
    /// Resolve connection settings for the chosen source and apply CLI overrides
    pub fn from_cli(cli: &Cli) -> eyre::Result<Self> {
        let mut connection = resolve(cli.source.into())?;

        let database = cli
            .database
            .clone()
            .unwrap_or_else(|| cli.command.default_database().to_string());
        connection = connection.with_database(database);

        if connection.app_name.is_none() {
            connection = connection.with_app_name(APP_NAME);
        }
        if cli.tls_allow_invalid_certificates {
            connection = connection.with_tls(TlsMode::TrustAll);
        }
        if let Some(timeout_secs) = cli.timeout_secs {
            connection = connection.with_timeout_secs(timeout_secs);
        }

        let collection = cli
            .collection
            .clone()
            .unwrap_or_else(|| cli.command.default_collection().to_string());

        Ok(Self {
            connection,
            collection,
            index_policy: cli.index_exists.into(),
            reset: cli.reset,
        })
    }
}
