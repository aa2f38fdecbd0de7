use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use clap::Parser;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

mod closure;
mod config;
mod db;
pub mod events;
mod jobs;
mod middleware;
mod models;
pub mod observability;
mod routes;
pub mod services;

#[cfg(test)]
mod tests;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::AtriumConfig>,
    pub db: Arc<db::DbPool>,
    pub services: services::Services,
    /// Owns the registered closure checkers; the reaper jobs reuse its
    /// checker list so /cron and the API agree on the registration order.
    pub orchestrator: Arc<closure::ClosureOrchestrator>,
    pub storage: Arc<dyn services::FileStorage>,
    pub notifier: Arc<dyn services::Notifier>,
    pub event_bus: Arc<events::EventBus>,
    /// Task tracker for background tasks, drained during graceful shutdown.
    pub task_tracker: TaskTracker,
}

impl AppState {
    pub async fn new(config: config::AtriumConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let event_bus = Arc::new(events::EventBus::new());

        let pool = db::DbPool::from_config(&config.database).await?;
        pool.run_migrations().await?;
        let db = Arc::new(pool);

        let storage: Arc<dyn services::FileStorage> = Arc::new(
            services::FilesystemFileStorage::new(config.storage.files_root.clone()),
        );
        tracing::info!(
            backend = storage.backend_name(),
            root = %config.storage.files_root.display(),
            "File storage backend initialized"
        );

        let plans = services::PlanResolver::new(config.retention.clone());
        let service_container = services::Services::new(db.clone(), plans.clone());

        let checkers = closure::checkers::default_checkers(db.clone(), storage.clone());
        let orchestrator = Arc::new(closure::ClosureOrchestrator::new(
            db.clone(),
            checkers,
            plans,
            event_bus.clone(),
            config.closure.checker_timeout(),
        ));

        let notifier: Arc<dyn services::Notifier> =
            Arc::new(services::EventBusNotifier::new(event_bus.clone()));

        Ok(Self {
            config: Arc::new(config),
            db,
            services: service_container,
            orchestrator,
            storage,
            notifier,
            event_bus,
            task_tracker: TaskTracker::new(),
        })
    }
}

pub fn build_app(config: &config::AtriumConfig, state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/health/live", get(routes::health::liveness))
        .route("/health/ready", get(routes::health::readiness))
        .nest("/api/v1", routes::api_routes())
        .nest("/cron", routes::cron_routes(state.clone()))
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .with_state(state)
}

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(version, about = "Atrium: organization closure and data-retention engine", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the config file (defaults to ./atrium.toml when present,
    /// otherwise built-in defaults).
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the server (default).
    Serve,
    /// Run database migrations and exit.
    ///
    /// Useful for init containers or CI/CD pipelines.
    Migrate,
    /// Write a default configuration file.
    Init {
        /// Path to create the config file.
        #[arg(short, long, default_value = "atrium.toml")]
        output: String,
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Migrate) => run_migrate(args.config.as_deref()).await,
        Some(Command::Init { output, force }) => run_init(&output, force),
        Some(Command::Serve) | None => run_server(args.config.as_deref()).await,
    }
}

/// Load configuration: an explicit path must exist; otherwise ./atrium.toml
/// is used when present, falling back to built-in defaults.
fn load_config(explicit_path: Option<&str>) -> config::AtriumConfig {
    let path = match explicit_path {
        Some(path) => {
            let path = PathBuf::from(path);
            if !path.exists() {
                eprintln!("Config file not found: {}", path.display());
                std::process::exit(1);
            }
            Some(path)
        }
        None => {
            let cwd_config = PathBuf::from("atrium.toml");
            cwd_config.exists().then_some(cwd_config)
        }
    };

    match path {
        Some(path) => match config::AtriumConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config from {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => config::AtriumConfig::default(),
    }
}

fn run_init(output: &str, force: bool) {
    let output_path = PathBuf::from(output);
    if output_path.exists() && !force {
        eprintln!(
            "Config file already exists: {}\nUse --force to overwrite.",
            output_path.display()
        );
        std::process::exit(1);
    }

    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        eprintln!("Failed to create directory {}: {}", parent.display(), e);
        std::process::exit(1);
    }

    if let Err(e) = std::fs::write(&output_path, config::default_config_toml()) {
        eprintln!("Failed to write config file: {}", e);
        std::process::exit(1);
    }

    println!("Created config file: {}", output_path.display());
    println!();
    println!("To start the server, run:");
    println!("  atrium serve --config {}", output_path.display());
}

async fn run_migrate(explicit_config_path: Option<&str>) {
    let config = load_config(explicit_config_path);
    observability::init_tracing(&config.observability);

    let pool = match db::DbPool::from_config(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pool.run_migrations().await {
        eprintln!("Migration failed: {}", e);
        std::process::exit(1);
    }
}

async fn run_server(explicit_config_path: Option<&str>) {
    let config = load_config(explicit_config_path);
    observability::init_tracing(&config.observability);

    tracing::info!(
        environment = ?config.server.environment,
        "Starting Atrium"
    );
    if !config.server.environment.is_production() {
        tracing::warn!(
            "Non-production environment: cron endpoints are reachable via GET without the secret"
        );
    }

    let state = AppState::new(config.clone())
        .await
        .expect("Failed to initialize application state");

    // The reaper loops stop at the next pass boundary on shutdown; an
    // interrupted deployment loses nothing because every pass leaves
    // durable, resumable state behind.
    let shutdown = CancellationToken::new();
    if config.workers.enabled {
        state.task_tracker.spawn(jobs::start_expiry_notifier_worker(
            state.db.clone(),
            state.notifier.clone(),
            state.services.plans.clone(),
            config.workers.clone(),
            shutdown.clone(),
        ));
        state.task_tracker.spawn(jobs::start_archive_cleanup_worker(
            state.db.clone(),
            state.orchestrator.checkers().to_vec(),
            state.event_bus.clone(),
            config.workers.clone(),
            shutdown.clone(),
        ));
        state.task_tracker.spawn(jobs::start_file_trash_cleanup_worker(
            state.db.clone(),
            state.storage.clone(),
            state.event_bus.clone(),
            config.workers.clone(),
            shutdown.clone(),
        ));
    } else {
        tracing::info!("In-process workers disabled; relying on the external scheduler");
    }

    let task_tracker = state.task_tracker.clone();
    let app = build_app(&config, state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(task_tracker, shutdown))
        .await
        .unwrap();
}

async fn shutdown_signal(task_tracker: TaskTracker, shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, waiting for background tasks to complete...");

    shutdown.cancel();
    task_tracker.close();
    let wait_result =
        tokio::time::timeout(std::time::Duration::from_secs(30), task_tracker.wait()).await;

    match wait_result {
        Ok(()) => tracing::info!("All background tasks completed"),
        Err(_) => {
            tracing::warn!("Timeout waiting for background tasks, some may not have completed")
        }
    }

    tracing::info!("Shutdown complete");
}
