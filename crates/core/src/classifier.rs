//! Turn Classifier
//!
//! Classifies the fully-accumulated text of one completed agent turn so the
//! session state machine can decide whether the turn spends a question slot.
//! The agent's output is free-form natural language, so this is a heuristic:
//! misclassification is expected and absorbed as an `EmotionalOnly` turn (the
//! client asks the agent to continue), never treated as an error.

use crate::session::Phase;

/// The kind of a completed agent turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// The opening greeting; never counted against the question budget.
    Greeting,
    /// A regular yes/no question. Counted.
    OrdinaryQuestion,
    /// A reaction to the previous answer without a new question. Not counted;
    /// the client must ask the agent to continue before answering again.
    EmotionalOnly,
    /// The agent committed to a guess of the player's character. Counted.
    FinalGuess,
}

impl TurnKind {
    /// Counted turns spend one slot of the question budget.
    pub fn is_counted(self) -> bool {
        matches!(self, TurnKind::OrdinaryQuestion | TurnKind::FinalGuess)
    }
}

/// Lead-in phrases that mark a turn as a final guess. The system prompt
/// instructs the agent to guess as "I think of... [Name]. Am I correct?",
/// but agents paraphrase, so a few variants are accepted.
const GUESS_MARKERS: &[&str] = &["i think of", "i think it is", "i think it's", "my guess is"];

/// Classifies one completed agent turn.
///
/// While the session is `AwaitingReady` the turn is always the greeting,
/// whatever its text looks like. Otherwise a guess marker wins over a
/// question mark, and a turn with neither is an emotional interlude.
pub fn classify(turn_text: &str, phase: Phase) -> TurnKind {
    if phase == Phase::AwaitingReady {
        return TurnKind::Greeting;
    }
    let lowered = turn_text.to_lowercase();
    if GUESS_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        TurnKind::FinalGuess
    } else if lowered.contains('?') {
        TurnKind::OrdinaryQuestion
    } else {
        TurnKind::EmotionalOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_while_awaiting_ready_regardless_of_text() {
        let kind = classify(
            "Are you ready to challenge me, mortal?",
            Phase::AwaitingReady,
        );
        assert_eq!(kind, TurnKind::Greeting);
        assert!(!kind.is_counted());
    }

    #[test]
    fn question_mark_makes_an_ordinary_question() {
        let kind = classify("Is your character a real person?", Phase::InQuestioning);
        assert_eq!(kind, TurnKind::OrdinaryQuestion);
        assert!(kind.is_counted());
    }

    #[test]
    fn guess_marker_wins_over_question_mark() {
        let kind = classify(
            "I think of... Batman. Am I correct?",
            Phase::InQuestioning,
        );
        assert_eq!(kind, TurnKind::FinalGuess);
        assert!(kind.is_counted());
    }

    #[test]
    fn guess_marker_is_case_insensitive() {
        assert_eq!(
            classify("I THINK IT IS Sherlock Holmes!", Phase::InQuestioning),
            TurnKind::FinalGuess
        );
        assert_eq!(
            classify("my GUESS is Cleopatra.", Phase::InQuestioning),
            TurnKind::FinalGuess
        );
    }

    #[test]
    fn no_question_and_no_marker_is_emotional_only() {
        let kind = classify(
            "Ah, interesting! The plot thickens.",
            Phase::InQuestioning,
        );
        assert_eq!(kind, TurnKind::EmotionalOnly);
        assert!(!kind.is_counted());
    }

    #[test]
    fn empty_turn_is_emotional_only() {
        assert_eq!(classify("", Phase::InQuestioning), TurnKind::EmotionalOnly);
    }
}
