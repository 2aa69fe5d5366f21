//! Per-turn orchestration against the collaborator stream.
//!
//! One call of [`drive_turn`] is one collaborator round-trip: send the
//! prompt, relay every partial fragment to the client as it arrives, and on
//! the turn-complete marker classify the accumulated transcript and advance
//! the state machine. The caller never issues a new prompt until this
//! returns, which is what keeps a single turn in flight per session.

use super::{
    collaborator::{Collaborator, TurnEvent},
    protocol::ServerMessage,
    session::send_msg,
};
use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use mindreader_core::{
    classifier,
    session::{GameSession, TurnSummary},
};
use std::time::Duration;
use tracing::debug;

/// Drives one full collaborator turn and emits its `turn_complete` summary.
///
/// A collaborator that goes silent past `turn_timeout`, or whose event
/// stream ends before the turn-complete marker, is a collaborator failure:
/// the error propagates and the session is torn down (no mid-turn retry).
pub(super) async fn drive_turn(
    session: &mut GameSession,
    collaborator: &mut Collaborator,
    socket_tx: &mut SplitSink<WebSocket, Message>,
    prompt: String,
    turn_timeout: Duration,
) -> Result<TurnSummary> {
    collaborator.send_prompt(prompt).await?;

    let mut transcript = String::new();
    loop {
        let event = tokio::time::timeout(turn_timeout, collaborator.next_event())
            .await
            .context("collaborator turn timed out")?
            .context("collaborator stream ended mid-turn")?;
        match event {
            TurnEvent::Text(fragment) => {
                transcript.push_str(&fragment);
                send_msg(socket_tx, ServerMessage::Text { fragment }).await?;
            }
            TurnEvent::Audio(fragment) => {
                send_msg(socket_tx, ServerMessage::Audio { fragment }).await?;
            }
            TurnEvent::TurnComplete => break,
        }
    }

    let kind = classifier::classify(&transcript, session.phase());
    debug!(?kind, transcript_len = transcript.len(), "agent turn complete");
    let summary = session.record_turn(kind);
    send_msg(socket_tx, ServerMessage::from(summary.clone())).await?;
    Ok(summary)
}
