//! Salon booking service
//!
//! REST API for slot queries and appointment booking.
//! Reads configuration from a TOML file (~/.config/salon-booking/config.toml).

use std::sync::Arc;

use tracing::{error, info, warn};

use salon_booking::application::{AppointmentScheduler, AvailabilityService, LoggingStockHook};
use salon_booking::config::LoggingConfig;
use salon_booking::domain::RepositoryProvider;
use salon_booking::shared::{listen_for_shutdown_signals, RetryConfig, ShutdownSignal};
use salon_booking::{
    create_api_router, default_config_path, init_database, run_migrations, ApiState, AppConfig,
    InMemoryRepositoryProvider, SeaOrmRepositoryProvider,
};

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("SALON_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg.logging);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            init_tracing(&LoggingConfig::default());
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting salon booking service...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder not installed, /metrics disabled: {}", e);
            None
        }
    };

    // ── Storage ────────────────────────────────────────────────
    let (repos, db) = if app_cfg.database.in_memory {
        warn!("Using in-memory storage, data is lost on shutdown");
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        (repos, None)
    } else {
        let db = match init_database(&app_cfg.database.connection()).await {
            Ok(db) => db,
            Err(e) => {
                error!("Failed to connect to database: {}", e);
                return Err(e.into());
            }
        };
        if let Err(e) = run_migrations(&db).await {
            error!("Failed to run migrations: {}", e);
            return Err(e.into());
        }
        let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        (repos, Some(db))
    };

    seed_calendar(repos.as_ref(), &app_cfg).await?;

    // ── Use cases ──────────────────────────────────────────────
    let availability = Arc::new(AvailabilityService::new(repos.clone()));
    let scheduler = Arc::new(
        AppointmentScheduler::new(repos.clone(), Arc::new(LoggingStockHook))
            .with_retry(RetryConfig::with_attempts(app_cfg.booking.retry_attempts)),
    );

    let state = ApiState::new(repos, availability, scheduler, db.clone());
    let api_router = create_api_router(state, prometheus_handle);

    // ── HTTP server with graceful shutdown ─────────────────────
    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));

    let api_addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown.clone();
    let served = axum::serve(
        listener,
        api_router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        api_shutdown.wait().await;
        info!("REST API server received shutdown signal");
    })
    .await;

    if let Err(e) = &served {
        error!("REST API server error: {}", e);
    }

    if let Some(db) = db {
        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
    }

    info!("Salon booking service shutdown complete");
    served.map_err(Into::into)
}

/// Store the configured calendar when none exists yet. An existing calendar
/// is never overwritten.
async fn seed_calendar(
    repos: &dyn RepositoryProvider,
    app_cfg: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(calendar) = app_cfg.business.seed_calendar()? else {
        return Ok(());
    };

    if repos.calendar().find().await?.is_some() {
        info!("Business calendar already configured, seed ignored");
        return Ok(());
    }

    repos.calendar().save(calendar).await?;
    info!("Business calendar seeded from configuration");
    Ok(())
}
