//! PlayBook API: HTTP control surface and presentation adapter.

pub mod command;
pub mod config;
pub mod error;
pub mod presenter;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the application router with every route mounted. Middleware layers
/// are added by the binary.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/game", routes::game::router())
        .nest("/api/v1/story", routes::story::router())
        .with_state(state)
}
