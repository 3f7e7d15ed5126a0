//! Runs the taskboard HTTP server.
//!
//! Usage:
//!
//! ```text
//! taskboard-server --tokens tokens.json [--database-url postgres://...]
//! ```
//!
//! Without `--database-url` tasks are kept in memory and lost on exit. The
//! token file is a JSON object mapping bearer tokens to user UUIDs.

use clap::{Parser, ValueEnum};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use taskboard::api::{AppState, router};
use taskboard::config::ServiceConfig;
use taskboard::identity::{IdentityError, StaticTokenProvider};
use taskboard::task::adapters::{memory::InMemoryTaskRepository, postgres::PostgresTaskRepository};
use taskboard::task::domain::{StatusChangePolicy, UnresolvedIdPolicy};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "taskboard-server", about = "Task tracking backend")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "TASKBOARD_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// `PostgreSQL` connection URL; tasks are kept in memory when absent.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "TASKBOARD_POOL_SIZE", default_value_t = 8)]
    pool_size: u32,

    /// JSON file mapping bearer tokens to user UUIDs.
    #[arg(long, env = "TASKBOARD_TOKENS")]
    tokens: Option<PathBuf>,

    /// Position handling when a task changes status.
    #[arg(
        long,
        env = "TASKBOARD_STATUS_CHANGE",
        value_enum,
        default_value_t = StatusChangeArg::AppendToColumn
    )]
    status_change: StatusChangeArg,

    /// Handling of reorder ids that do not belong to the caller.
    #[arg(
        long,
        env = "TASKBOARD_UNRESOLVED_IDS",
        value_enum,
        default_value_t = UnresolvedIdsArg::Skip
    )]
    unresolved_ids: UnresolvedIdsArg,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, env = "TASKBOARD_LOG", default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusChangeArg {
    KeepPosition,
    AppendToColumn,
}

impl From<StatusChangeArg> for StatusChangePolicy {
    fn from(arg: StatusChangeArg) -> Self {
        match arg {
            StatusChangeArg::KeepPosition => Self::KeepPosition,
            StatusChangeArg::AppendToColumn => Self::AppendToColumn,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnresolvedIdsArg {
    Skip,
    Reject,
}

impl From<UnresolvedIdsArg> for UnresolvedIdPolicy {
    fn from(arg: UnresolvedIdsArg) -> Self {
        match arg {
            UnresolvedIdsArg::Skip => Self::Skip,
            UnresolvedIdsArg::Reject => Self::Reject,
        }
    }
}

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("failed to build database pool: {0}")]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ServerError> {
    let identity = match &args.tokens {
        Some(path) => StaticTokenProvider::from_json_file(path)?,
        None => StaticTokenProvider::default(),
    };
    if identity.is_empty() {
        warn!("no bearer tokens configured; every authenticated route will answer 401");
    }
    let identity = Arc::new(identity);

    let config = ServiceConfig::default()
        .with_status_change(args.status_change.into())
        .with_unresolved_ids(args.unresolved_ids.into());

    let app = if let Some(url) = &args.database_url {
        let pool = Pool::builder()
            .max_size(args.pool_size)
            .build(ConnectionManager::<PgConnection>::new(url))?;
        info!(pool_size = args.pool_size, "using PostgreSQL storage");
        router(AppState::new(
            Arc::new(PostgresTaskRepository::new(pool)),
            identity,
            config,
        ))
    } else {
        info!("using in-memory storage");
        router(AppState::new(
            Arc::new(InMemoryTaskRepository::new()),
            identity,
            config,
        ))
    };

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(address = %args.bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
