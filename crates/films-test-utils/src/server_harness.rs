//! Test server harness for E2E testing
//!
//! Provides TestFilmsServer for spawning real Films API instances in tests.
//! Storage is an [`InMemoryStore`] so no database is required.

use films_api::auth::TokenService;
use films_api::config::{Config, MIN_BCRYPT_COST};
use films_api::models::{MovieId, NewMovie, UserId};
use films_api::observability::metrics::init_metrics_recorder;
use films_api::repositories::memory::InMemoryStore;
use films_api::repositories::MovieRepository;
use films_api::routes::{self, AppState};
use films_api::services::{seed, user_service};
use secrecy::SecretString;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Signing secret used by every test server.
pub const TEST_JWT_SECRET: &str = "films-test-secret-0123456789abcdef";

/// Test harness for spawning the Films API in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_list_movies_e2e() -> Result<()> {
///     let server = TestFilmsServer::spawn_seeded().await?;
///     let token = server.login("test1", SEED_PASSWORD).await?;
///
///     let response = reqwest::Client::new()
///         .get(format!("{}/movies", server.url()))
///         .bearer_auth(&token)
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestFilmsServer {
    addr: SocketAddr,
    store: Arc<InMemoryStore>,
    state: Arc<AppState>,
    handle: JoinHandle<()>,
}

impl TestFilmsServer {
    /// Spawn a server with empty storage
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Hash passwords at the lowest accepted bcrypt cost
    /// - Start the HTTP server in the background
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_store(Arc::new(InMemoryStore::new())).await
    }

    /// Spawn a server whose storage holds the reference users and movies.
    pub async fn spawn_seeded() -> Result<Self, anyhow::Error> {
        let store = Arc::new(InMemoryStore::new());
        seed::seed_database(store.as_ref(), store.as_ref(), MIN_BCRYPT_COST)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed test store: {}", e))?;
        Self::spawn_with_store(store).await
    }

    async fn spawn_with_store(store: Arc<InMemoryStore>) -> Result<Self, anyhow::Error> {
        let jwt_secret = SecretString::from(TEST_JWT_SECRET.to_string());
        let config = Config {
            database_url: String::new(), // Not used with in-memory storage
            bind_address: "127.0.0.1:0".to_string(),
            jwt_secret: jwt_secret.clone(),
            bcrypt_cost: MIN_BCRYPT_COST,
            seed_database: false,
        };

        let state = Arc::new(AppState {
            config,
            tokens: Arc::new(TokenService::new(&jwt_secret)),
            users: store.clone(),
            movies: store.clone(),
            favourites: store.clone(),
        });

        // The global recorder can only be installed once per test process.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::with_serving_layers(routes::build_routes(state.clone(), metrics_handle));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            store,
            state,
            handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Storage shared with the running server.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Token service holding the server's signing secret.
    pub fn tokens(&self) -> &TokenService {
        &self.state.tokens
    }

    /// Register a user directly in storage, bypassing signup validation.
    pub async fn create_user(&self, name: &str, password: &str) -> Result<UserId, anyhow::Error> {
        user_service::register_user(self.store.as_ref(), name, password, MIN_BCRYPT_COST)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create user {}: {}", name, e))
    }

    /// Issue a valid token for `user_id` without going through login.
    pub fn token_for(&self, user_id: UserId) -> Result<String, anyhow::Error> {
        self.tokens()
            .issue_token(user_id)
            .map_err(|e| anyhow::anyhow!("Failed to issue token: {}", e))
    }

    /// Log in over HTTP and return the bearer token from the response header.
    pub async fn login(&self, name: &str, password: &str) -> Result<String, anyhow::Error> {
        let response = reqwest::Client::new()
            .post(format!("{}/user/login", self.url()))
            .json(&json!({ "name": name, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Login for {} failed with {}", name, response.status());
        }

        let header = response
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .ok_or_else(|| anyhow::anyhow!("Login response has no Authorization header"))?
            .to_str()?;

        header
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Unexpected Authorization header: {}", header))
    }

    /// Insert a movie owned by `owner` directly in storage.
    pub async fn create_movie(&self, owner: UserId, title: &str) -> Result<MovieId, anyhow::Error> {
        let movie = NewMovie {
            title: title.to_string(),
            director: "Test Director".to_string(),
            release_date: chrono::NaiveDate::from_ymd_opt(2001, 9, 14)
                .ok_or_else(|| anyhow::anyhow!("Invalid fixture date"))?,
            cast: vec!["Test Actor".to_string()],
            genre: "Drama".to_string(),
            synopsis: "A movie created by the test harness.".to_string(),
        };
        MovieRepository::insert(self.store.as_ref(), &movie, owner)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create movie {}: {}", title, e))
    }
}

impl Drop for TestFilmsServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
