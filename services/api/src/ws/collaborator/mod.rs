//! Boundary to the generative-AI collaborator.
//!
//! The collaborator is a black box that accepts one turn prompt at a time
//! and streams back partial events until a turn-complete marker. The session
//! layer talks to it exclusively through [`Collaborator`], so the backend
//! can be swapped without touching the state machine.

pub mod gemini;

use crate::state::AppState;
use anyhow::{Result, anyhow};
use mindreader_core::persona::Persona;
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::error;

/// One partial event of a collaborator turn.
#[derive(Debug, PartialEq)]
pub enum TurnEvent {
    /// A fragment of the agent's reply text.
    Text(String),
    /// A fragment of the agent's voice, base64 PCM16 at the frontend rate.
    Audio(String),
    /// The turn is over; the next prompt may be sent.
    TurnComplete,
}

/// Handle to the collaborator task for one session.
///
/// Exactly one turn is in flight at a time: the session sends a prompt,
/// then drains events until [`TurnEvent::TurnComplete`] before prompting
/// again. The session layer enforces this alternation.
pub struct Collaborator {
    prompt_tx: mpsc::Sender<String>,
    event_rx: mpsc::Receiver<TurnEvent>,
    task: JoinHandle<()>,
}

impl Collaborator {
    /// Spawns the relay task for the configured Gemini Live backend.
    ///
    /// Connection errors surface on the event stream: a failed task drops
    /// its sender, and the session sees the stream end mid-turn.
    pub async fn connect(
        state: Arc<AppState>,
        persona: &'static Persona,
        system_prompt: String,
    ) -> Result<Self> {
        let (prompt_tx, prompt_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(128);
        let task = tokio::spawn(async move {
            if let Err(e) =
                gemini::run(state, persona.voice, system_prompt, prompt_rx, event_tx).await
            {
                error!(error = ?e, "Gemini collaborator task failed");
            }
        });
        Ok(Self {
            prompt_tx,
            event_rx,
            task,
        })
    }

    /// Sends the next turn prompt.
    pub async fn send_prompt(&self, text: String) -> Result<()> {
        self.prompt_tx
            .send(text)
            .await
            .map_err(|_| anyhow!("collaborator task has shut down"))
    }

    /// Receives the next partial event of the in-flight turn. `None` means
    /// the collaborator failed or went away.
    pub async fn next_event(&mut self) -> Option<TurnEvent> {
        self.event_rx.recv().await
    }

    /// Tears the relay task down. Called when the session ends.
    pub fn abort(&self) {
        self.task.abort();
    }
}
