//! WebSocket Session Management
//!
//! This module hosts the live game session over a WebSocket. It is
//! structured into submodules for clarity:
//!
//! - `protocol`: the JSON-based message format for client-server communication.
//! - `session`: the connection lifecycle, from the `start_game` handshake to termination.
//! - `game`: per-turn orchestration of the collaborator's streamed output.
//! - `collaborator`: the connection to the Gemini Live backend.

mod collaborator;
mod game;
pub mod protocol;
pub mod session;

pub use session::ws_handler;
