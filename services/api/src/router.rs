//! Axum Router Configuration
//!
//! Routing is intentionally small: a health probe, the persona registry for
//! the client picker, and the WebSocket endpoint that hosts the game.

use crate::{handlers, state::AppState, ws::ws_handler};
use axum::{Router, routing::get};
use std::sync::Arc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/personas", get(handlers::list_personas))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}
