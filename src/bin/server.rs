use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster_engine::cache::respond_from_cache;
use roster_engine::describe::ollama::{DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_MODEL};
use roster_engine::providers::baseball::DEFAULT_SOURCE_URL;
use roster_engine::{
    BaseballApiSource, OllamaClient, PlayerData, PlayerPage, ResponseCache, RosterEngine,
    RosterError, SqliteStore, DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS,
};

#[derive(Clone)]
struct AppState {
    engine: Arc<RosterEngine>,
}

#[derive(Debug, Deserialize)]
struct PageParams {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct DescriptionResponse {
    description: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster_server=debug,roster_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| "roster.db".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);
    let source_url =
        std::env::var("PLAYER_SOURCE_URL").unwrap_or_else(|_| DEFAULT_SOURCE_URL.to_string());
    let ollama_host =
        std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_OLLAMA_HOST.to_string());
    let ollama_model =
        std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string());

    tracing::info!("🚀 Starting Roster Engine Server");
    tracing::info!("📦 Database: {}", db_path);
    tracing::info!("🔌 Port: {}", port);
    tracing::info!("🧠 Ollama: {} ({})", ollama_host, ollama_model);

    let store = Arc::new(SqliteStore::new(&db_path).await?);
    let source = Arc::new(BaseballApiSource::new(source_url));
    let describer = Arc::new(OllamaClient::new(ollama_host, ollama_model));
    let engine = RosterEngine::new(store, source, describer);

    let state = AppState {
        engine: Arc::new(engine),
    };
    let cache = Arc::new(ResponseCache::new(DEFAULT_TTL_SECS, DEFAULT_MAX_ENTRIES));

    // Build router; the cache middleware sits inside CORS so cached
    // responses still pick up CORS headers on the way out.
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/players", get(players_handler))
        .route("/players/:id", put(update_player_handler))
        .route("/player/:id/description", get(describe_player_handler))
        .layer(middleware::from_fn_with_state(cache, respond_from_cache))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("⚾ Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello World from Backend".to_string(),
    })
}

async fn players_handler(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PlayerPage>, AppError> {
    tracing::info!(
        "Received request for players - Page: {}, Page Size: {}",
        params.page,
        params.page_size
    );

    if params.page < 1 {
        return Err(AppError::bad_request("page must be >= 1"));
    }
    if !(1..=100).contains(&params.page_size) {
        return Err(AppError::bad_request("page_size must be between 1 and 100"));
    }

    let page = state
        .engine
        .players_page(params.page, params.page_size)
        .await?;
    Ok(Json(page))
}

async fn update_player_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PlayerData>,
) -> Result<Json<MessageResponse>, AppError> {
    tracing::info!("Received update request for player ID: {}", id);

    state.engine.update_player(id, payload).await?;
    Ok(Json(MessageResponse {
        message: format!("Player ID {} updated successfully", id),
    }))
}

async fn describe_player_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DescriptionResponse>, AppError> {
    tracing::info!("Generating description for player ID: {}", id);

    let description = state.engine.describe_player(id).await?;
    Ok(Json(DescriptionResponse { description }))
}

// Error handling
enum AppError {
    BadRequest(String),
    Engine(RosterError),
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Engine(RosterError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Player not found".to_string())
            }
            AppError::Engine(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        if status.is_server_error() {
            tracing::error!("❌ Error: {} - {}", status, message);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<RosterError>,
{
    fn from(err: E) -> Self {
        Self::Engine(err.into())
    }
}
