//! Static persona registry.
//!
//! Each persona bundles the display name, the prebuilt voice used by the
//! speech backend, a voice-style description, the persona-specific system
//! prompt, and the avatar shown by the client. The registry is fixed at
//! compile time; unknown ids fall back to the default persona.

/// A selectable game-master persona.
#[derive(Debug, Clone, Copy)]
pub struct Persona {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Prebuilt voice name understood by the speech backend.
    pub voice: &'static str,
    /// Short description of the voice character, folded into prompts.
    pub style: &'static str,
    /// Persona flavor prepended to the base game rules.
    pub system_prompt: &'static str,
    /// Avatar path served to the client.
    pub avatar: &'static str,
}

/// Persona used when the client asks for an unknown id.
pub const DEFAULT_PERSONA_ID: &str = "genie";

const PERSONAS: &[Persona] = &[
    Persona {
        id: "demon",
        display_name: "The Demon",
        voice: "Fenrir",
        style: "dark, menacing, and growling voice",
        system_prompt: "You are a dark Demon trying to guess the player's character. \
                        Be menacing and arrogant. Talk faster.",
        avatar: "/static/images/characters/faces/outlined/demon.png",
    },
    Persona {
        id: "genie",
        display_name: "The Genie",
        voice: "Enceladus",
        style: "mysterious and mystical voice",
        system_prompt: "You are Akinator, the famous genie. Be polite, mysterious, \
                        and engaging. Talk faster.",
        avatar: "/static/images/characters/faces/outlined/genie.png",
    },
    Persona {
        id: "wizard",
        display_name: "The Wizard",
        voice: "Orus",
        style: "wise, scholarly, and ancient voice",
        system_prompt: "You are a wise and powerful Wizard. Speak with wisdom and \
                        arcane knowledge. Talk faster.",
        avatar: "/static/images/characters/faces/outlined/wizard.png",
    },
    Persona {
        id: "fortune_teller",
        display_name: "The Fortune Teller",
        voice: "Aoede",
        style: "mystical, enigmatic, female voice",
        system_prompt: "You are a mystical Gypsy Fortune Teller. Be enigmatic, \
                        spiritual, and all-knowing. Talk faster.",
        avatar: "/static/images/characters/faces/outlined/fortune-teller.png",
    },
    Persona {
        id: "monster",
        display_name: "The Monster",
        voice: "Algenib",
        style: "deep and monstrous voice",
        system_prompt: "You are a scary Monster. Speak dumb and use simple, heavy \
                        words. Talk faster.",
        avatar: "/static/images/characters/faces/outlined/monster.png",
    },
];

/// Returns every registered persona, in registry order.
pub fn all() -> &'static [Persona] {
    PERSONAS
}

/// Looks up a persona by id, falling back to [`DEFAULT_PERSONA_ID`].
pub fn lookup(id: &str) -> &'static Persona {
    PERSONAS
        .iter()
        .find(|p| p.id == id)
        .or_else(|| PERSONAS.iter().find(|p| p.id == DEFAULT_PERSONA_ID))
        .expect("default persona must exist in the registry")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_registered_personas() {
        assert_eq!(lookup("demon").display_name, "The Demon");
        assert_eq!(lookup("monster").voice, "Algenib");
    }

    #[test]
    fn unknown_id_falls_back_to_default() {
        let persona = lookup("time-traveling-accountant");
        assert_eq!(persona.id, DEFAULT_PERSONA_ID);
    }

    #[test]
    fn registry_ids_are_unique() {
        let mut ids: Vec<_> = all().iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }
}
