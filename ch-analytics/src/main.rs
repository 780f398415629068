//! ch-analytics - annotation analytics dashboard
//!
//! Serves statistics and browse pages over the annotation tool database and
//! the action datastore, and exports the majority-vote dataset.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ch_analytics::{build_router, db, AppState};
use ch_common::api::auth::hash_password;
use ch_common::config::{load_config, Overrides};
use clap::Parser;
use tracing::{error, info, warn};

/// Command-line arguments for ch-analytics
#[derive(Parser, Debug)]
#[command(name = "ch-analytics")]
#[command(about = "Annotation analytics dashboard and dataset export")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = "CH_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "CH_PORT")]
    port: Option<u16>,

    /// Annotation tool database
    #[arg(long, env = "CH_ANNOTATIONS_DB")]
    annotations_db: Option<PathBuf>,

    /// Action log datastore
    #[arg(long, env = "CH_DATASTORE_DB")]
    datastore_db: Option<PathBuf>,

    /// Username whose annotations exclude a document from the export
    #[arg(long, env = "CH_EXPERT")]
    expert: Option<String>,

    /// Print the SHA-256 digest of a password for the config file and exit
    #[arg(long, value_name = "PASSWORD")]
    hash_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let args = Args::parse();

    if let Some(password) = args.hash_password.as_deref() {
        println!("{}", hash_password(password));
        return Ok(());
    }

    info!(
        "Starting ch-analytics v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let overrides = Overrides {
        annotations_db: args.annotations_db,
        datastore_db: args.datastore_db,
        port: args.port,
        expert_username: args.expert,
    };
    let config =
        load_config(args.config.as_deref(), overrides).context("Failed to load configuration")?;

    info!("Annotation database: {}", config.annotations_db.display());
    info!("Datastore: {}", config.datastore_db.display());
    match &config.expert_username {
        Some(expert) => info!("Expert annotator excluded from export: {}", expert),
        None => info!("No expert annotator configured"),
    }
    if config.auth_enabled() {
        info!("Basic authentication enabled for {} user(s)", config.users.len());
    } else {
        warn!("No users configured - authentication disabled");
    }

    let annotations = match db::connect_readonly(&config.annotations_db).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to annotation database: {:#}", e);
            return Err(e);
        }
    };
    let datastore = match db::connect_readonly(&config.datastore_db).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to datastore: {:#}", e);
            return Err(e);
        }
    };
    info!("✓ Connected to databases (read-only)");

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let state = AppState::new(annotations, datastore, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("ch-analytics listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
