//! Films API
//!
//! Entry point for the movie catalogue service. Loads configuration,
//! migrates and optionally seeds the database, then serves the HTTP API.

use films_api::auth::TokenService;
use films_api::config::Config;
use films_api::observability::metrics::init_metrics_recorder;
use films_api::repositories::{PgFavouriteRepository, PgMovieRepository, PgUserRepository};
use films_api::routes::{self, AppState};
use films_api::services::seed;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "films_api=debug,films=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Films API");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        bcrypt_cost = config.bcrypt_cost,
        seed_database = config.seed_database,
        "Configuration loaded successfully"
    );

    info!("Connecting to database...");
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    sqlx::migrate!("../../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            e
        })?;

    info!("Database connection established");

    let users = Arc::new(PgUserRepository::new(db_pool.clone()));
    let movies = Arc::new(PgMovieRepository::new(db_pool.clone()));
    let favourites = Arc::new(PgFavouriteRepository::new(db_pool));

    if config.seed_database {
        seed::seed_database(users.as_ref(), movies.as_ref(), config.bcrypt_cost)
            .await
            .map_err(|e| {
                error!("Failed to seed database: {}", e);
                e
            })?;
    }

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics: {}", e);
        e
    })?;

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    let state = Arc::new(AppState {
        tokens: Arc::new(TokenService::new(&config.jwt_secret)),
        config,
        users,
        movies,
        favourites,
    });

    let app = routes::with_serving_layers(routes::build_routes(state, metrics_handle));

    info!("Films API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Films API shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
