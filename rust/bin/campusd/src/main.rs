//! `campusd`: the campus academics server binary.
//!
//! Usage:
//!   campusd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/campus/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use academics::AcademicsModule;
use academics::service::audit::{AuditSink, SqlAuditSink, TracingAuditSink};
use campus_core::{GatewayHeaders, Module};

use config::{AuditTarget, ServerConfig};

/// Campus academics server.
#[derive(Parser, Debug)]
#[command(name = "campusd", about = "Campus academics server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides `[server] listen`).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    let listen = cli
        .listen
        .clone()
        .unwrap_or_else(|| server_config.server.listen.clone());
    bootstrap::verify_config(&server_config, &listen)?;

    // Initialize storage.
    let data_dir = PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = campus_core::ServiceConfig {
        data_dir: Some(data_dir),
        ..Default::default()
    };

    let kv: Arc<dyn campus_kv::KVStore> = Arc::new(
        campus_kv::RedbStore::open(&core_config.resolve_db_path())
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?,
    );
    let sql: Arc<dyn campus_sql::SQLStore> = Arc::new(
        campus_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    let audit: Arc<dyn AuditSink> = match server_config.audit.sink {
        AuditTarget::Sql => Arc::new(
            SqlAuditSink::new(Arc::clone(&sql))
                .map_err(|e| anyhow::anyhow!("failed to open audit log: {}", e))?,
        ),
        AuditTarget::Log => Arc::new(TracingAuditSink),
    };

    let academics_module = AcademicsModule::new(
        Arc::clone(&sql),
        Arc::clone(&kv),
        audit,
        Arc::new(GatewayHeaders),
    )?;
    info!("Academics module initialized (audit: {:?})", server_config.audit.sink);

    if let Some(ref seed_file) = server_config.directory.seed_file {
        bootstrap::seed_directory(academics_module.directory(), Path::new(seed_file))?;
    }

    let module_routes = vec![(
        academics_module.name().to_string(),
        academics_module.routes(),
    )];
    let app = routes::build_router(module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("campusd listening on {}", listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("campusd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
