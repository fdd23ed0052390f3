//! Geowolf API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use geowolf_api::config::AppConfig;
use geowolf_api::error::AppError;
use geowolf_api::routes;
use geowolf_api::state::AppState;
use geowolf_core::clock::SystemClock;
use geowolf_core::model::Mission;
use geowolf_core::rng::ThreadRng;
use geowolf_game::clock::GameClock;
use geowolf_game::config::GameConfig;
use geowolf_game::GameSession;
use geowolf_store::SessionStore;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Geowolf API server");

    let config = AppConfig::from_env()?;

    // Open the store; failure here is fatal before accepting connections.
    let store = SessionStore::connect(&config.database_url).await?;

    let catalog = load_catalog(&config.missions_path)?;
    tracing::info!(missions = catalog.len(), path = %config.missions_path, "mission catalog loaded");

    let session = GameSession::new(
        store,
        catalog,
        Arc::new(SystemClock),
        Box::new(ThreadRng::default()),
        GameConfig::default(),
    );
    GameClock::new(&session).spawn();

    let app_state = AppState::new(session, config.player_threshold);

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::app_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Read and parse the mission catalog JSON file.
fn load_catalog(path: &str) -> Result<Vec<Mission>, AppError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Catalog(format!("cannot read {path}: {e}")))?;
    serde_json::from_str(&raw).map_err(|e| AppError::Catalog(format!("cannot parse {path}: {e}")))
}
