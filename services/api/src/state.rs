//! Shared Application State
//!
//! This module defines the `AppState` struct holding the resources shared by
//! all connections. Game sessions themselves are not in here: each session
//! is owned by its WebSocket task and dies with the connection.

use crate::config::Config;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}
