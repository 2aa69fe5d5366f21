//! Prompt templates sent to the generative-AI collaborator.
//!
//! The session controller never forwards raw client text alone; every turn
//! prompt is a scripted instruction embedding the player's answer plus a
//! tonal hint, so the agent stays in character and keeps to the game rules.

use crate::persona::Persona;
use crate::session::Sentiment;

/// Name substituted when sanitization strips the player's name entirely.
pub const FALLBACK_PLAYER_NAME: &str = "Player";

const MAX_PLAYER_NAME_LEN: usize = 24;

/// The game rules appended to every persona's system prompt.
const BASE_RULES: &str = "\
The player is thinking of a character (real or fictional).
Your goal is to guess who it is by asking yes/no questions.

Rules:
1. Ask only ONE question at a time.
2. The questions must be answerable by \"Yes\", \"No\", \"Don't Know\", \"Probably\", or \"Probably Not\".
3. Try to narrow down the possibilities efficiently.
4. When you are reasonably confident (around 80% sure), make a guess.
5. Format your guess as: \"I think of... [Character Name]. Am I correct?\"
6. Keep your responses short and conversational.";

/// Builds the full system prompt for one session.
pub fn system_prompt(persona: &Persona, player_name: &str) -> String {
    format!(
        "{}\nSpeak in a {}.\nThe player's name is {}.\n\n{}",
        persona.system_prompt, persona.style, player_name, BASE_RULES
    )
}

/// Opening instruction: greet the player and ask whether they are ready.
pub fn greeting(player_name: &str) -> String {
    format!(
        "Start the game. Greet {} in your persona and ask if they are ready to play. \
         Do not ask your first question yet.",
        player_name
    )
}

/// Sent once the player signals they are ready.
pub fn first_question() -> String {
    "The player is ready. Ask your first yes/no question about their character.".to_string()
}

/// Regular turn prompt: the player's answer, a tonal hint, and either a
/// request for the next question or the mandatory-guess instruction once
/// the budget is spent.
pub fn answer_turn(answer: &str, sentiment: Sentiment, must_guess: bool, limit: u32) -> String {
    if must_guess {
        return format!(
            "The player answered: \"{}\". You have now used all {} of your questions. \
             You MUST commit to your final guess immediately, using the exact format: \
             \"I think of... [Character Name]. Am I correct?\" Do not ask any other question.",
            answer, limit
        );
    }
    format!(
        "The player answered: \"{}\". {} Then ask your next yes/no question.",
        answer,
        sentiment_hint(sentiment)
    )
}

fn sentiment_hint(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "Their answer works in your favor; react with a flash of triumph.",
        Sentiment::Negative => "Their answer rules something out; react with brief frustration.",
        Sentiment::Neutral => "Their answer is ambiguous; stay intrigued.",
    }
}

/// The player confirmed the agent's guess.
pub fn victory() -> String {
    "The player confirmed your guess was CORRECT. Celebrate the win in your persona, \
     briefly gloat, and ask if they want to play again."
        .to_string()
}

/// The agent's guess was wrong and the budget is gone: the player wins.
pub fn defeat() -> String {
    "Your guess was WRONG and you have no questions left: the player has won. \
     Concede in your persona and ask the player to reveal who their character was."
        .to_string()
}

/// Wrap-up commentary after the player reveals their character.
pub fn reveal(character_name: &str) -> String {
    format!(
        "The player was thinking of: {}. Review the game. If you should have guessed it, \
         explain why you missed it. If it was a clever choice, congratulate the player. \
         Keep it in character, then ask if they want to play again.",
        character_name
    )
}

/// Reduces a client-supplied display name to letters only, bounded length.
/// An empty result yields [`FALLBACK_PLAYER_NAME`].
pub fn sanitize_player_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphabetic())
        .take(MAX_PLAYER_NAME_LEN)
        .collect();
    if cleaned.is_empty() {
        FALLBACK_PLAYER_NAME.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona;

    #[test]
    fn system_prompt_carries_persona_and_rules() {
        let persona = persona::lookup("wizard");
        let prompt = system_prompt(persona, "Ada");
        assert!(prompt.contains("Wizard"));
        assert!(prompt.contains("Ada"));
        assert!(prompt.contains("I think of..."));
        assert!(prompt.contains("ONE question at a time"));
    }

    #[test]
    fn must_guess_prompt_forbids_further_questions() {
        let prompt = answer_turn("no", Sentiment::Negative, true, 20);
        assert!(prompt.contains("MUST commit to your final guess"));
        assert!(prompt.contains("all 20 of your questions"));
        assert!(!prompt.contains("ask your next"));
    }

    #[test]
    fn regular_prompt_embeds_answer_and_hint() {
        let prompt = answer_turn("probably", Sentiment::Positive, false, 20);
        assert!(prompt.contains("\"probably\""));
        assert!(prompt.contains("triumph"));
        assert!(prompt.contains("next yes/no question"));
    }

    #[test]
    fn reveal_prompt_names_the_character() {
        assert!(reveal("Batman").contains("Batman"));
    }

    #[test]
    fn player_names_are_letters_only_and_bounded() {
        assert_eq!(sanitize_player_name("Ada Lovelace 42!"), "AdaLovelace");
        assert_eq!(sanitize_player_name("<script>123</script>"), "scriptscript");
        assert_eq!(
            sanitize_player_name(&"x".repeat(100)).len(),
            MAX_PLAYER_NAME_LEN
        );
    }

    #[test]
    fn empty_or_symbolic_names_fall_back() {
        assert_eq!(sanitize_player_name(""), FALLBACK_PLAYER_NAME);
        assert_eq!(sanitize_player_name("12345 !!"), FALLBACK_PLAYER_NAME);
    }
}
