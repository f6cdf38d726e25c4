//! Launchpad project registry server binary.
//!
//! Wires the project service, notification fan-out, and bus query
//! handlers over in-memory backends. Production deployments swap in the
//! external store and bus behind the same traits.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults
//! launchpad-server
//!
//! # Start with a config file, forcing JSON logs
//! launchpad-server --config /etc/launchpad/server.toml --log-format json
//!
//! # Environment variables mirror the flags
//! LAUNCHPAD__LOG_FORMAT=json launchpad-server
//! ```

mod config;
mod shutdown;

use std::io::IsTerminal;
use std::sync::Arc;

use clap::Parser;
use launchpad_bus::MemoryBus;
use launchpad_registry::{ChangeNotifier, ProjectRepository, ProjectService, QueryHandlers};
use launchpad_store::MemoryBucket;
use snafu::{ResultExt, Snafu};
use tokio::sync::{mpsc, oneshot};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use config::{Cli, Config, LogFormat};

/// Top-level error type for the server binary.
#[derive(Debug, Snafu)]
enum ServerError {
    #[snafu(display("configuration error: {source}"))]
    Config { source: config::ConfigError },

    #[snafu(display("startup error: {source}"))]
    Startup { source: launchpad_registry::RegistryError },
}

/// One query received over the bus: subject, request payload, and the
/// reply channel.
struct QueryRequest {
    subject: String,
    payload: Vec<u8>,
    reply: oneshot::Sender<Vec<u8>>,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let cli = Cli::parse();
    let config = cli.load_config().context(ConfigSnafu)?;

    init_logging(&config);

    let repo = ProjectRepository::new(
        Arc::new(MemoryBucket::new()),
        Arc::new(MemoryBucket::new()),
    );
    let bus = Arc::new(MemoryBus::new());
    let service = ProjectService::new(repo.clone())
        .with_notifier(ChangeNotifier::new(bus))
        .with_limits(config.limits.clone());
    let handlers = QueryHandlers::new(repo);

    let projects = service.list_projects().await.context(StartupSnafu)?;
    tracing::info!(projects = projects.len(), "registry server started");

    // Stand-in for the bus subscription: queries arrive on a channel and
    // are answered by the shared handlers.
    let (query_tx, query_rx) = mpsc::channel::<QueryRequest>(64);
    let query_loop = tokio::spawn(serve_queries(handlers, query_rx));

    shutdown::shutdown_signal().await;

    // Dropping the sender drains the loop.
    drop(query_tx);
    if let Err(e) = query_loop.await {
        tracing::warn!(error = %e, "query loop did not stop cleanly");
    }
    tracing::info!("registry server stopped");
    Ok(())
}

/// Answers queries until the request channel closes.
async fn serve_queries(
    handlers: QueryHandlers<MemoryBucket>,
    mut requests: mpsc::Receiver<QueryRequest>,
) {
    while let Some(request) = requests.recv().await {
        let reply = handlers.handle_request(&request.subject, &request.payload).await;
        if request.reply.send(reply).is_err() {
            tracing::debug!(subject = %request.subject, "query requester went away");
        }
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = match config.log_format {
        LogFormat::Json => true,
        LogFormat::Text => false,
        LogFormat::Auto => !std::io::stdout().is_terminal(),
    };

    if use_json {
        // JSON format for production / log aggregation
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .init();
    } else {
        // Human-readable text format for development
        tracing_subscriber::registry().with(env_filter).with(fmt::layer()).init();
    }
}
