//! Mindreader API Library Crate
//!
//! This library contains the web service for the Mindreader guess-the-character
//! game: configuration, routing, the WebSocket session controller, and the
//! Gemini Live collaborator client. The `bin/api.rs` binary is a thin wrapper
//! around this library; the game rules themselves live in `mindreader-core`.

pub mod audio;
pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
pub mod ws;
