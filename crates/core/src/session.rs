//! Session Controller state machine.
//!
//! `GameSession` is the single source of truth for one game's phase and
//! counters. It is deliberately pure: no transport, no collaborator I/O,
//! no conversation transcript (the collaborator owns history). The service
//! layer feeds it player events and completed-turn classifications and acts
//! on the enumerated outcomes.
//!
//! Question numbering follows the client's view: question N is answered
//! with `question_number == N`, zero-based, and the counter advances when
//! that answer is accepted. A `turn_complete` summary therefore reports the
//! count *before* the just-asked question is answered (the first question
//! arrives with `question_count: 0`).

use crate::classifier::TurnKind;
use serde::Serialize;
use tracing::debug;

/// The lifecycle phase of a game session.
///
/// Transitions follow a strict order except for the play-again loop-back
/// and the terminal `Closed` state, which is reachable from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The greeting has been (or is being) delivered; waiting for the
    /// player's ready/decline signal.
    AwaitingReady,
    /// The normal question/answer loop.
    InQuestioning,
    /// The agent has committed to a guess; the player's next answer is the
    /// verdict.
    AwaitingFinalAnswer,
    /// The round is over; waiting for a reveal or a restart.
    AwaitingPlayAgain,
    /// Terminal. No further collaborator calls are permitted.
    Closed,
}

/// Tone of a player's answer, derived from a fixed word mapping and passed
/// to the collaborator as an acting hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Outcome of submitting one player `answer` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAnswer {
    /// The reported question number disagrees with the authoritative count.
    /// Nothing was mutated; the client must re-submit with this count.
    Resync { question_count: u32 },
    /// The answer arrived in a phase that does not accept answers. Ignored.
    Rejected,
    /// The player explicitly declined to play. The session is now `Closed`.
    Declined,
    /// The ready answer was neither affirmative nor negative; still waiting.
    NotReady,
    /// The player is ready; send the first-question prompt.
    Ready,
    /// Regular answer; compose a turn prompt with this tone hint. When
    /// `must_guess` is set the prompt must carry the mandatory-guess
    /// instruction (set at most once per round).
    Continue { sentiment: Sentiment, must_guess: bool },
    /// The player confirmed the final guess; send the victory prompt.
    AgentWon,
    /// The player rejected the final guess; send the defeat prompt.
    PlayerWon,
}

/// Snapshot emitted to the client after every completed agent turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnSummary {
    /// Questions answered so far. The just-completed turn's question, if
    /// any, is not yet included: it is what the client answers next.
    pub question_count: u32,
    pub player_won: bool,
    pub is_final_guess: bool,
    pub awaiting_play_again: bool,
    pub awaiting_ready: bool,
    pub is_emotional_response: bool,
}

/// One game session. Owned by exactly one connection; never shared.
#[derive(Debug)]
pub struct GameSession {
    player_name: String,
    question_limit: u32,
    question_count: u32,
    phase: Phase,
    player_won: bool,
    must_guess_sent: bool,
    /// Set when an ordinary question completes; consumed (incrementing the
    /// counter) when the player's answer to it is accepted.
    counted_turn_pending: bool,
}

impl GameSession {
    /// Creates a session in `AwaitingReady`. The player name is sanitized
    /// and the question limit clamped to at least 1.
    pub fn new(player_name: &str, question_limit: u32) -> Self {
        Self {
            player_name: crate::prompts::sanitize_player_name(player_name),
            question_limit: question_limit.max(1),
            question_count: 0,
            phase: Phase::AwaitingReady,
            player_won: false,
            must_guess_sent: false,
            counted_turn_pending: false,
        }
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn question_limit(&self) -> u32 {
        self.question_limit
    }

    /// Number of answered questions; also the number the client must put
    /// on its next `answer` event.
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player_won(&self) -> bool {
        self.player_won
    }

    /// Maps an answer to the tonal hint embedded in the next prompt.
    pub fn sentiment_of(answer: &str) -> Sentiment {
        match answer.trim().to_lowercase().as_str() {
            "yes" | "probably" => Sentiment::Positive,
            "no" | "probably not" | "don't know" | "dont know" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    /// Submits one player `answer` event carrying the question number it
    /// answers. A number mismatch yields `Resync` and mutates nothing; and
    /// because accepting an answer advances the count, re-sending the same
    /// correctly-numbered answer resyncs instead of double-counting.
    pub fn answer(&mut self, message: &str, question_number: u32) -> PlayerAnswer {
        match self.phase {
            Phase::Closed | Phase::AwaitingPlayAgain => PlayerAnswer::Rejected,
            _ if question_number != self.question_count => {
                debug!(
                    reported = question_number,
                    authoritative = self.question_count,
                    "question number mismatch; requesting resync"
                );
                PlayerAnswer::Resync {
                    question_count: self.question_count,
                }
            }
            Phase::AwaitingReady => match Self::sentiment_of(message) {
                Sentiment::Positive => {
                    self.phase = Phase::InQuestioning;
                    PlayerAnswer::Ready
                }
                Sentiment::Negative => {
                    self.phase = Phase::Closed;
                    PlayerAnswer::Declined
                }
                // Free-form text like "sure" or "ready" is not in the
                // answer table; keep waiting rather than hanging up.
                Sentiment::Neutral => PlayerAnswer::NotReady,
            },
            Phase::AwaitingFinalAnswer => {
                // The verdict answer is not itself counted as a question.
                self.phase = Phase::AwaitingPlayAgain;
                if Self::sentiment_of(message) == Sentiment::Positive {
                    PlayerAnswer::AgentWon
                } else {
                    self.player_won = true;
                    PlayerAnswer::PlayerWon
                }
            }
            Phase::InQuestioning => {
                if self.counted_turn_pending {
                    self.question_count += 1;
                    self.counted_turn_pending = false;
                }
                let sentiment = Self::sentiment_of(message);
                let must_guess =
                    self.question_count >= self.question_limit && !self.must_guess_sent;
                if must_guess {
                    self.must_guess_sent = true;
                }
                PlayerAnswer::Continue {
                    sentiment,
                    must_guess,
                }
            }
        }
    }

    /// Records one completed, classified agent turn and returns the summary
    /// to relay to the client.
    ///
    /// Only turns produced from the questioning loop affect the budget; the
    /// greeting and the play-again wrap-up turns never touch it, even if
    /// their flavor text happens to contain a question mark. An ordinary
    /// question arms the counter, which advances when its answer arrives.
    /// Once the mandatory-guess prompt has gone out, any completed turn
    /// moves to final-guess resolution so the game terminates even when the
    /// agent's reply is not recognizable as a guess.
    pub fn record_turn(&mut self, kind: TurnKind) -> TurnSummary {
        if self.phase == Phase::InQuestioning {
            if kind == TurnKind::FinalGuess || self.must_guess_sent {
                self.phase = Phase::AwaitingFinalAnswer;
            } else if kind == TurnKind::OrdinaryQuestion {
                self.counted_turn_pending = true;
            }
        }
        debug!(?kind, phase = ?self.phase, count = self.question_count, "turn recorded");
        TurnSummary {
            question_count: self.question_count,
            player_won: self.player_won,
            is_final_guess: self.phase == Phase::AwaitingFinalAnswer,
            awaiting_play_again: self.phase == Phase::AwaitingPlayAgain,
            awaiting_ready: self.phase == Phase::AwaitingReady,
            is_emotional_response: kind == TurnKind::EmotionalOnly
                && self.phase == Phase::InQuestioning,
        }
    }

    /// Whether a `reveal` event is acceptable right now.
    pub fn can_reveal(&self) -> bool {
        self.phase == Phase::AwaitingPlayAgain
    }

    /// Resets the round for another game on the same connection. Returns
    /// false once the session is closed.
    pub fn restart(&mut self) -> bool {
        if self.phase == Phase::Closed {
            return false;
        }
        self.question_count = 0;
        self.player_won = false;
        self.must_guess_sent = false;
        self.counted_turn_pending = false;
        self.phase = Phase::AwaitingReady;
        true
    }

    /// Marks the session terminal.
    pub fn close(&mut self) {
        self.phase = Phase::Closed;
    }
}
