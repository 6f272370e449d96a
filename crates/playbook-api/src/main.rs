//! PlayBook API server entry point.

use std::sync::Arc;

use chrono::TimeDelta;
use playbook_core::clock::SystemClock;
use playbook_core::repository::EventRepository;
use playbook_event_store::in_memory::InMemoryEventRepository;
use playbook_event_store::pg_event_repository::PgEventRepository;
use playbook_narrative::application::perspective_engine::PerspectiveEngine;
use playbook_narrative::domain::rule_engine::RuleBasedGenerator;
use playbook_session::application::session_manager::{SessionManager, spawn_reaper};
use playbook_story::application::loader;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use playbook_api::config::AppConfig;
use playbook_api::error::AppError;
use playbook_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting PlayBook API server");

    let config = AppConfig::from_env()?;

    // Story content is loaded once and never mutated afterwards.
    let graph = Arc::new(match &config.story_path {
        Some(path) => loader::load_story(path)?,
        None => loader::builtin_story()?,
    });

    let event_repository: Arc<dyn EventRepository> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await?;
            let repository = PgEventRepository::new(pool);
            repository
                .migrate()
                .await
                .map_err(|e| AppError::EventStore(e.to_string()))?;
            tracing::info!("Using PostgreSQL event store");
            Arc::new(repository)
        }
        None => {
            tracing::info!("Using in-memory event store");
            Arc::new(InMemoryEventRepository::new())
        }
    };

    let session_ttl = TimeDelta::from_std(config.session_ttl)
        .map_err(|e| AppError::Config(format!("SESSION_TTL_SECS out of range: {e}")))?;
    let sessions = Arc::new(SessionManager::new(
        Arc::clone(&graph),
        event_repository,
        Arc::new(SystemClock),
        session_ttl,
    ));
    let engine = Arc::new(PerspectiveEngine::new(
        graph,
        Arc::new(RuleBasedGenerator),
        config.generation_timeout,
    ));
    let _reaper = spawn_reaper(Arc::clone(&sessions), config.reaper_interval);

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins once the
    // terminal front end has a fixed host.
    let app = playbook_api::build_router(AppState::new(sessions, engine, config.typing_delay))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server.
    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
