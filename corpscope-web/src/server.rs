//! Server wiring for the Corpscope API.
//!
//! Builds the application state from configuration, assembles the axum
//! router and runs the listener. Credential-gated upstream clients are
//! selected here: a missing API key wires in the disabled variant instead
//! of the network client, so the server always starts.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use corpscope_core::{CorpscopeConfig, RegistryIndex};
use corpscope_upstream::{
    DisabledGenerator, DisclosureService, GeminiClient, HttpTransport, NewsFetcher, NewsProvider,
    TextGenerator,
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use crate::handlers::{
    api_company, api_finance, api_generate_analysis, api_news_summary, api_search, home_page,
    not_found,
};

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Read-only company registry, loaded once at startup
    pub registry: Arc<RegistryIndex>,
    /// Disclosure API operations
    pub disclosure: DisclosureService,
    /// Generative-AI backend
    pub generator: Arc<dyn TextGenerator>,
    /// News feed backend
    pub news: Arc<dyn NewsProvider>,
    /// Path of the front-end page served at `/`
    pub index_page: PathBuf,
    /// Directory of static assets served under `/static`
    pub static_dir: PathBuf,
}

impl AppState {
    /// Builds production state from configuration.
    ///
    /// Loads the registry dataset and selects real or disabled upstream
    /// clients depending on which API keys are configured.
    pub fn from_config(config: &CorpscopeConfig) -> Self {
        let transport = HttpTransport::new(config.retry.clone());

        let registry = Arc::new(RegistryIndex::load(&config.registry.dataset_path));

        let disclosure = DisclosureService::from_config(&config.disclosure, transport.clone());

        let generator: Arc<dyn TextGenerator> = match config.generative.api_key.clone() {
            Some(key) => Arc::new(GeminiClient::new(&config.generative, key, transport.clone())),
            None => {
                info!("generative API key not configured, AI features degraded");
                Arc::new(DisabledGenerator)
            }
        };

        let news: Arc<dyn NewsProvider> =
            Arc::new(NewsFetcher::new(config.news.clone(), transport));

        Self {
            registry,
            disclosure,
            generator,
            news,
            index_page: config.server.index_page.clone(),
            static_dir: config.server.static_dir.clone(),
        }
    }
}

/// Assembles the router: page, API endpoints, static assets, fallback.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.static_dir.clone();

    Router::new()
        // Front-end page
        .route("/", get(home_page))
        // JSON API endpoints
        .route("/api/search", get(api_search))
        .route("/api/company", get(api_company))
        .route("/api/finance", get(api_finance))
        .route("/api/generate-analysis", post(api_generate_analysis))
        .route("/api/news-summary", post(api_news_summary))
        // Static assets
        .nest_service("/static", ServeDir::new(static_dir))
        // Unmatched routes get the JSON 404 envelope
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/// Runs the API server until the listener fails.
///
/// # Errors
/// - `Box<dyn std::error::Error>` - Binding or serving the listener failed
pub async fn run_server(config: CorpscopeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.bind_addr, config.server.port);
    let state = AppState::from_config(&config);
    let app = build_router(state);

    info!("corpscope API server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Generic 500 envelope for panicking handlers.
fn panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "500 Server Error",
            "message": "서버 내부 오류가 발생했습니다."
        })),
    )
        .into_response()
}
