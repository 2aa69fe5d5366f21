//! Manages the WebSocket connection lifecycle for one game session.

use super::{
    collaborator::Collaborator,
    game::drive_turn,
    protocol::{ClientMessage, ServerMessage},
};
use crate::state::AppState;
use anyhow::{Context, Result, anyhow};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use mindreader_core::{
    persona::{self, Persona},
    prompts,
    session::{GameSession, Phase, PlayerAnswer},
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
///
/// Performs the `start_game` handshake, connects the collaborator, and runs
/// the game loop. Each connection owns its session outright; nothing is
/// shared across connections and nothing survives the socket.
#[instrument(name = "ws_session", skip_all, fields(session_id, persona))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let temp_id: u32 = rand::random();
    tracing::Span::current().record("session_id", &temp_id.to_string());
    info!("New WebSocket connection. Awaiting start_game...");

    let (mut socket_tx, mut socket_rx) = socket.split();

    // The first message from the client must be `start_game`.
    let first_text = match socket_rx.next().await {
        Some(Ok(Message::Text(text))) => text,
        Some(_) => {
            let _ = send_msg(
                &mut socket_tx,
                ServerMessage::Error {
                    message: "first message must be start_game".to_string(),
                },
            )
            .await;
            return;
        }
        None => {
            info!("Client disconnected before start_game.");
            return;
        }
    };

    let (session, persona) = match initialize_session(&first_text, &state) {
        Ok(pair) => pair,
        Err(e) => {
            error!("Session initialization failed: {:?}", e);
            let _ = send_msg(
                &mut socket_tx,
                ServerMessage::Error {
                    message: e.to_string(),
                },
            )
            .await;
            return;
        }
    };

    let session_id = Uuid::new_v4();
    tracing::Span::current().record("session_id", &session_id.to_string());
    tracing::Span::current().record("persona", persona.id);
    info!(
        player = session.player_name(),
        question_limit = session.question_limit(),
        "Game session initialized."
    );

    let system_prompt = prompts::system_prompt(persona, session.player_name());
    let mut collaborator =
        match Collaborator::connect(state.clone(), persona, system_prompt).await {
            Ok(collaborator) => collaborator,
            Err(e) => {
                error!(error = ?e, "Failed to start the collaborator.");
                let _ = send_msg(
                    &mut socket_tx,
                    ServerMessage::Error {
                        message: "could not reach the game master".to_string(),
                    },
                )
                .await;
                return;
            }
        };

    if let Err(e) = run_game(
        &state,
        session,
        persona,
        &mut collaborator,
        &mut socket_tx,
        &mut socket_rx,
    )
    .await
    {
        if is_client_gone(&e) {
            // A failed send means the client hung up mid-turn. That is a
            // normal way for a session to end, not a service fault.
            info!("Client disconnected mid-turn; closing session.");
        } else {
            // Collaborator failures land here; the session is not resumable.
            error!(error = ?e, "Game session terminated with error.");
            let _ = send_msg(
                &mut socket_tx,
                ServerMessage::Error {
                    message: "the game master has vanished; please start a new game".to_string(),
                },
            )
            .await;
        }
    }

    collaborator.abort();
    info!("WebSocket connection closed and game session terminated.");
}

/// Parses the `start_game` handshake into a fresh session.
fn initialize_session(
    text: &str,
    state: &Arc<AppState>,
) -> Result<(GameSession, &'static Persona)> {
    let msg: ClientMessage =
        serde_json::from_str(text).context("malformed start_game message")?;
    let ClientMessage::StartGame {
        persona_id,
        player_name,
        question_limit,
    } = msg
    else {
        return Err(anyhow!("first message must be start_game"));
    };

    // Unknown persona ids fall back to the default rather than failing.
    let persona = persona::lookup(&persona_id);
    let limit = question_limit
        .filter(|&n| n >= 1)
        .unwrap_or(state.config.default_question_limit);
    Ok((GameSession::new(&player_name, limit), persona))
}

/// The main loop for an active game session.
///
/// Strict alternation: each client message produces at most one collaborator
/// turn, which is fully drained before the next client message is read.
async fn run_game(
    state: &Arc<AppState>,
    mut session: GameSession,
    persona: &'static Persona,
    collaborator: &mut Collaborator,
    socket_tx: &mut SplitSink<WebSocket, Message>,
    socket_rx: &mut SplitStream<WebSocket>,
) -> Result<()> {
    let turn_timeout = Duration::from_secs(state.config.turn_timeout_secs);

    send_msg(socket_tx, game_started(persona)).await?;
    let greeting = prompts::greeting(session.player_name());
    drive_turn(&mut session, collaborator, socket_tx, greeting, turn_timeout).await?;

    while let Some(msg_result) = socket_rx.next().await {
        let ws_msg = match msg_result {
            Ok(msg) => msg,
            Err(e) => {
                info!(error = ?e, "Error receiving from client WebSocket; closing session.");
                break;
            }
        };
        match ws_msg {
            Message::Text(text) => {
                let Ok(msg) = serde_json::from_str::<ClientMessage>(&text) else {
                    warn!("Ignoring malformed client message.");
                    continue;
                };
                match msg {
                    ClientMessage::Answer {
                        message,
                        question_number,
                    } => match session.answer(&message, question_number) {
                        PlayerAnswer::Resync { question_count } => {
                            send_msg(socket_tx, ServerMessage::Resync { question_count })
                                .await?;
                        }
                        PlayerAnswer::Rejected => {
                            warn!("Ignoring out-of-phase answer.");
                        }
                        PlayerAnswer::NotReady => {
                            info!("Ready answer was ambiguous; still waiting.");
                        }
                        PlayerAnswer::Declined => {
                            info!("Player declined to play.");
                            break;
                        }
                        PlayerAnswer::Ready => {
                            drive_turn(
                                &mut session,
                                collaborator,
                                socket_tx,
                                prompts::first_question(),
                                turn_timeout,
                            )
                            .await?;
                        }
                        PlayerAnswer::Continue {
                            sentiment,
                            must_guess,
                        } => {
                            let prompt = prompts::answer_turn(
                                &message,
                                sentiment,
                                must_guess,
                                session.question_limit(),
                            );
                            drive_turn(
                                &mut session,
                                collaborator,
                                socket_tx,
                                prompt,
                                turn_timeout,
                            )
                            .await?;
                        }
                        PlayerAnswer::AgentWon => {
                            drive_turn(
                                &mut session,
                                collaborator,
                                socket_tx,
                                prompts::victory(),
                                turn_timeout,
                            )
                            .await?;
                        }
                        PlayerAnswer::PlayerWon => {
                            drive_turn(
                                &mut session,
                                collaborator,
                                socket_tx,
                                prompts::defeat(),
                                turn_timeout,
                            )
                            .await?;
                        }
                    },
                    ClientMessage::Reveal { character_name } => {
                        if session.can_reveal() {
                            drive_turn(
                                &mut session,
                                collaborator,
                                socket_tx,
                                prompts::reveal(&character_name),
                                turn_timeout,
                            )
                            .await?;
                        } else {
                            warn!("Ignoring reveal outside the play-again phase.");
                        }
                    }
                    ClientMessage::Restart => {
                        if session.restart() {
                            info!("Restarting round on the same connection.");
                            send_msg(socket_tx, game_started(persona)).await?;
                            let greeting = prompts::greeting(session.player_name());
                            drive_turn(
                                &mut session,
                                collaborator,
                                socket_tx,
                                greeting,
                                turn_timeout,
                            )
                            .await?;
                        }
                    }
                    ClientMessage::Ping => {
                        send_msg(socket_tx, ServerMessage::Pong).await?;
                    }
                    ClientMessage::StartGame { .. } => {
                        warn!("Ignoring start_game after the handshake.");
                    }
                }
            }
            Message::Close(_) => {
                info!("Client sent close frame. Shutting down session.");
                break;
            }
            Message::Binary(_) => {
                warn!("Ignoring unexpected binary frame from client.");
            }
            Message::Ping(_) | Message::Pong(_) => {}
        }
        if session.phase() == Phase::Closed {
            break;
        }
    }

    session.close();
    info!("Game session finished.");
    Ok(())
}

fn game_started(persona: &Persona) -> ServerMessage {
    ServerMessage::GameStarted {
        persona_id: persona.id.to_string(),
        persona_name: persona.display_name.to_string(),
        avatar: persona.avatar.to_string(),
        question_count: 0,
    }
}

/// A helper function to serialize and send a `ServerMessage` to the client.
pub(crate) async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}

/// True when the error chain bottoms out in a failed send on the client
/// socket. Those happen whenever the browser hangs up mid-turn and are
/// handled as a normal disconnect rather than a service fault.
fn is_client_gone(error: &anyhow::Error) -> bool {
    error.downcast_ref::<axum::Error>().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_send_failures_read_as_client_disconnects() {
        let send_failure = anyhow::Error::new(axum::Error::new("connection reset"));
        assert!(is_client_gone(&send_failure));
        // Context added along the way must not mask the socket error.
        let wrapped = send_failure.context("relaying text fragment");
        assert!(is_client_gone(&wrapped));
    }

    #[test]
    fn collaborator_failures_are_not_client_disconnects() {
        assert!(!is_client_gone(&anyhow!("collaborator turn timed out")));
        let chained = anyhow!("stream ended").context("collaborator stream ended mid-turn");
        assert!(!is_client_gone(&chained));
    }
}
