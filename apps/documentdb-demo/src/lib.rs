//! DocumentDB demos
//!
//! Each subcommand runs one end-to-end demo against a DocumentDB gateway:
//! resolve settings, connect once, run every step in order, disconnect.

pub mod cli;
pub mod config;
pub mod demos;
pub mod output;
pub mod samples;

use std::io::Write;

use database::mongodb::{Session, connect_from_config};
use domain_documents::{DocumentService, MongoDocumentStore};
use domain_embedding::OpenAIProvider;
use eyre::{WrapErr, eyre};
use tracing::info;

use cli::{Cli, Command};
use config::DemoConfig;
use demos::Target;

/// Run the selected demo, writing its console output to `out`
///
/// All configuration (including `OPENAI_API_KEY` for the semantic demo) is
/// resolved before the first remote call.
pub async fn run(cli: Cli, out: &mut impl Write) -> eyre::Result<()> {
    let config = DemoConfig::from_cli(&cli).wrap_err("Configuration error")?;

    let embedder = if cli.command.needs_embeddings() {
        Some(OpenAIProvider::from_env().wrap_err("Embedding provider configuration error")?)
    } else {
        None
    };

    let session = connect_from_config(&config.connection)
        .await
        .wrap_err_with(|| {
            format!(
                "Failed to connect to DocumentDB at {}",
                config.connection.redacted_url()
            )
        })?;

    let target = Target::new(config.connection.database(), &config.collection);
    info!(namespace = %target.namespace(), command = ?cli.command, "Connected");

    let result = dispatch(
        &cli.command,
        &config,
        &session,
        embedder.as_ref(),
        &target,
        out,
    )
    .await;

    session.shutdown().await;
    info!("Disconnected");
    result
}

async fn dispatch(
    command: &Command,
    config: &DemoConfig,
    session: &Session,
    embedder: Option<&OpenAIProvider>,
    target: &Target,
    out: &mut impl Write,
) -> eyre::Result<()> {
    let service = DocumentService::new(MongoDocumentStore::new(session.clone()))
        .with_index_policy(config.index_policy);

    if config.reset && *command != Command::Ping {
        service
            .drop_collection(&target.collection)
            .await
            .wrap_err("Reset (drop collection) failed")?;
        writeln!(out, "Dropped {}", target.namespace())?;
    }

    match command {
        Command::Ping => demos::ping::run(session, out).await,
        Command::Crud => demos::crud::run(&service, target, out).await,
        Command::Query => demos::query::run(&service, target, out).await,
        Command::Vector => demos::vector::run(&service, target, out).await,
        Command::Semantic { query, k } => {
            let embedder =
                embedder.ok_or_else(|| eyre!("Embedding provider was not configured"))?;
            demos::semantic::run(&service, embedder, target, query, *k, out).await
        }
    }
}
