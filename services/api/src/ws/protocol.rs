//! Defines the WebSocket message protocol between the browser client and the game server.

use mindreader_core::session::TurnSummary;
use serde::{Deserialize, Serialize};

/// Messages sent from the client (browser) to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Starts a game. This must be the first message on the connection.
    StartGame {
        persona_id: String,
        player_name: String,
        /// Question budget for this session; the server default applies
        /// when absent or zero.
        question_limit: Option<u32>,
    },
    /// The player's answer to the current question (or to the greeting /
    /// final guess). Carries the question number it is answering so the
    /// server can detect stale or replayed answers.
    Answer { message: String, question_number: u32 },
    /// The player names their character after winning.
    Reveal { character_name: String },
    /// Resets the round for another game on the same connection.
    Restart,
    /// Keepalive.
    Ping,
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms the game has started and identifies the persona in play.
    GameStarted {
        persona_id: String,
        persona_name: String,
        avatar: String,
        question_count: u32,
    },
    /// A streamed fragment of the agent's reply text.
    Text { fragment: String },
    /// A streamed fragment of the agent's voice (base64 PCM16 at the
    /// frontend player rate).
    Audio { fragment: String },
    /// Emitted once per completed agent turn with the authoritative state.
    TurnComplete {
        question_count: u32,
        player_won: bool,
        is_final_guess: bool,
        awaiting_play_again: bool,
        awaiting_ready: bool,
        is_emotional_response: bool,
    },
    /// The client answered with a stale question number; re-submit with
    /// this one.
    Resync { question_count: u32 },
    /// Keepalive reply.
    Pong,
    /// Reports a fatal error to the client.
    Error { message: String },
}

impl From<TurnSummary> for ServerMessage {
    fn from(summary: TurnSummary) -> Self {
        ServerMessage::TurnComplete {
            question_count: summary.question_count,
            player_won: summary.player_won,
            is_final_guess: summary.is_final_guess,
            awaiting_play_again: summary.awaiting_play_again,
            awaiting_ready: summary.awaiting_ready,
            is_emotional_response: summary.is_emotional_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_start_game() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"start_game","persona_id":"genie","player_name":"Ada","question_limit":20}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::StartGame {
                persona_id,
                player_name,
                question_limit,
            } => {
                assert_eq!(persona_id, "genie");
                assert_eq!(player_name, "Ada");
                assert_eq!(question_limit, Some(20));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn question_limit_is_optional() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"start_game","persona_id":"demon","player_name":"Bo"}"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::StartGame {
                question_limit: None,
                ..
            }
        ));
    }

    #[test]
    fn parses_answer_and_unit_variants() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"answer","message":"no","question_number":3}"#)
                .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Answer {
                question_number: 3,
                ..
            }
        ));

        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"restart"}"#).unwrap(),
            ClientMessage::Restart
        ));
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"ping"}"#).unwrap(),
            ClientMessage::Ping
        ));
    }

    #[test]
    fn rejects_unknown_message_type() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"cheat"}"#).is_err());
    }

    #[test]
    fn serializes_turn_complete_with_snake_case_tag() {
        let msg = ServerMessage::TurnComplete {
            question_count: 4,
            player_won: false,
            is_final_guess: true,
            awaiting_play_again: false,
            awaiting_ready: false,
            is_emotional_response: false,
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "turn_complete");
        assert_eq!(json["question_count"], 4);
        assert_eq!(json["is_final_guess"], true);
    }

    #[test]
    fn serializes_resync_with_authoritative_count() {
        let json = serde_json::to_string(&ServerMessage::Resync { question_count: 7 }).unwrap();
        assert!(json.contains(r#""type":"resync""#));
        assert!(json.contains(r#""question_count":7"#));
    }
}
