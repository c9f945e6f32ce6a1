//! Operator binary for the crowd-sourced map service.
//!
//! Loads configuration, connects the configured ledger backend, loads the
//! base map, and runs one command against the service.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration from `crowdmap-config.yaml`
//! 3. Initialize structured logging (tracing)
//! 4. Connect the ledger backend (`PostgreSQL`, or memory for read-only
//!    commands)
//! 5. Load the base map
//! 6. Run the command and print its result

mod cli;
mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crowdmap_core::config::StorageBackend;
use crowdmap_core::{BaseMap, BaseMapSource, CrowdmapConfig, CrowdmapService};
use crowdmap_db::{PostgresConfig, PostgresPool};
use crowdmap_ledger::{Ledger, LedgerStore, MemoryLedgerStore};
use crowdmap_types::{ChangeKind, ChangeSubmission};
use crowdmap_world::JsonMapCodec;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::EngineError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the command fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = CrowdmapConfig::load_or_default(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        backend = ?config.storage.backend,
        base_source = ?config.base_map.source,
        map_file = %config.base_map.map_file.display(),
        "crowdmap-engine starting"
    );

    match config.storage.backend {
        StorageBackend::Memory => {
            cli.command.check_backend(StorageBackend::Memory)?;
            warn!(
                command = cli.command.name(),
                "Using the in-memory ledger: no pending changes are visible"
            );
            run(Ledger::new(MemoryLedgerStore::new()), &config, cli.command).await?;
        }
        StorageBackend::Postgres => {
            let pg_config = PostgresConfig::new(config.storage.postgres_url.as_str()).with_pool_limits(
                config.storage.max_connections,
                Duration::from_secs(config.storage.connect_timeout_secs),
            );
            let pool = PostgresPool::connect(&pg_config).await?;
            pool.run_migrations().await?;
            let result = run(Ledger::new(pool.ledger_store()), &config, cli.command).await;
            pool.close().await;
            result?;
        }
    }

    Ok(())
}

/// Build the service over `ledger` and execute one command.
async fn run<S: LedgerStore>(
    ledger: Ledger<S>,
    config: &CrowdmapConfig,
    command: Command,
) -> Result<(), EngineError> {
    let source = BaseMapSource::from_config(&config.base_map)?;
    let base = BaseMap::load(source, Arc::new(JsonMapCodec::new())).await?;
    let service = CrowdmapService::new(ledger, base, config.service.render_dir.clone());
    let default_times_seen = config.service.default_times_seen;

    match command {
        Command::Submit {
            change,
            file,
            reporter,
        } => {
            let payload = match (change, file) {
                (Some(json), _) => json,
                (None, Some(path)) => read_text(&path).await?,
                (None, None) => return Err(EngineError::MissingPayload),
            };
            let kind: ChangeKind = serde_json::from_str(&payload)?;
            let outcome = service
                .submit(ChangeSubmission::new(kind, reporter))
                .await?;
            println!("{}", outcome.change_id());
        }
        Command::Changes { times_seen, filter } => {
            let listing = service
                .query(
                    times_seen.unwrap_or(default_times_seen),
                    &filter.include,
                    &filter.exclude,
                )
                .await?;
            let body = serde_json::json!({
                "version": listing.version,
                "rawVersion": listing.raw_version,
                "changes": listing.changes,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::Version { times_seen, raw } => {
            let version = if raw {
                service.raw_version().await?
            } else {
                service
                    .version(times_seen.unwrap_or(default_times_seen))
                    .await?
            };
            println!("{version}");
        }
        Command::Materialize {
            times_seen,
            format,
            out,
            filter,
        } => {
            let rendered = service
                .render(
                    times_seen.unwrap_or(default_times_seen),
                    format.into(),
                    &filter.include,
                    &filter.exclude,
                )
                .await?;
            tokio::fs::write(&out, &rendered.bytes)
                .await
                .map_err(|source| EngineError::File {
                    path: out.clone(),
                    source,
                })?;
            info!(
                path = %out.display(),
                bytes = rendered.bytes.len(),
                version = %rendered.version,
                "Map written"
            );
            println!("{}", rendered.version);
        }
        Command::Commit {
            client_version,
            ids,
        } => {
            // The operator running this binary holds commit rights.
            let outcome = service.commit(true, &client_version, &ids).await?;
            println!("{}", outcome.new_version);
        }
        Command::Refresh => {
            let snapshot = service.refresh().await?;
            println!("{}", snapshot.marker);
        }
    }

    Ok(())
}

async fn read_text(path: &Path) -> Result<String, EngineError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| EngineError::File {
            path: path.to_path_buf(),
            source,
        })
}
