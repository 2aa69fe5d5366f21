//! Core game logic for the Mindreader guess-the-character service.
//!
//! Everything in this crate is pure: the session state machine, the turn
//! classifier, the persona registry, and the prompt templates. All transport
//! and collaborator I/O lives in the `mindreader-api` service crate, which
//! drives these types from its WebSocket loop.

pub mod classifier;
pub mod persona;
pub mod prompts;
pub mod session;
