//! HTTP routes for the Films API.
//!
//! Defines the Axum router, application state and the request pipeline.

use crate::auth::TokenService;
use crate::config::Config;
use crate::handlers;
use crate::middleware::{
    authenticate, log_request, log_response, recover_panic, require_authentication, AuthState,
};
use crate::repositories::{FavouriteRepository, MovieRepository, UserRepository};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

/// Per-request timeout applied by the serving layer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Token issue and verification with the process-wide secret.
    pub tokens: Arc<TokenService>,

    pub users: Arc<dyn UserRepository>,
    pub movies: Arc<dyn MovieRepository>,
    pub favourites: Arc<dyn FavouriteRepository>,
}

impl AppState {
    fn auth_state(&self) -> AuthState {
        AuthState {
            tokens: self.tokens.clone(),
            users: self.users.clone(),
        }
    }
}

/// Build the application routes wrapped in the full request pipeline.
///
/// Public:
/// - `/health`, `/metrics`
/// - `POST /user/signup`, `POST /user/login`
///
/// Protected (authentication guard):
/// - `GET /movies`, `POST /movie`, `GET|PUT|DELETE /movie/:id`
/// - `POST /favourite`, `GET /favourites`, `DELETE /favourites/:id`
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/user/signup", post(handlers::signup))
        .route("/user/login", post(handlers::login))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/movies", get(handlers::list_movies))
        .route("/movie", post(handlers::create_movie))
        .route(
            "/movie/:id",
            get(handlers::get_movie)
                .put(handlers::update_movie)
                .delete(handlers::delete_movie),
        )
        .route("/favourite", post(handlers::add_favourite))
        .route("/favourites", get(handlers::list_favourites))
        .route("/favourites/:id", axum::routing::delete(handlers::remove_favourite))
        .route_layer(middleware::from_fn(require_authentication))
        .with_state(state.clone());

    let router = public_routes.merge(metrics_routes).merge(protected_routes);

    with_pipeline(router, &state)
}

/// Wrap a fully built application in serving-layer policy.
///
/// The request timeout lives here, outside the pipeline, so handlers and
/// middleware never observe it. A request exceeding it gets 408.
pub fn with_serving_layers(app: Router) -> Router {
    app.layer(TimeoutLayer::new(REQUEST_TIMEOUT))
}

/// Wrap a router in the request pipeline.
///
/// Execution order, outermost first:
/// 1. `recover_panic` - sees faults from every layer below
/// 2. `log_request` - logs every request, including ones auth rejects
/// 3. `authenticate` - attaches the `AuthContext`
/// 4. `log_response` - measures the response actually produced by the router
/// 5. router, with `require_authentication` on protected routes
pub fn with_pipeline(router: Router, state: &AppState) -> Router {
    // `.layer` wraps everything added before it, so the last call is outermost.
    router
        .layer(middleware::from_fn(log_response))
        .layer(middleware::from_fn_with_state(
            state.auth_state(),
            authenticate,
        ))
        .layer(middleware::from_fn(log_request))
        .layer(middleware::from_fn(recover_panic))
}
