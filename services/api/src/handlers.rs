//! HTTP handlers for the small non-WebSocket surface.
//!
//! The game itself runs entirely over `/ws`; these endpoints exist so the
//! client can health-check the service and render the persona picker.

use axum::response::Json;
use mindreader_core::persona;
use serde::Serialize;

/// Liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}

/// Persona metadata exposed to the client picker.
#[derive(Serialize, Debug)]
pub struct PersonaInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub avatar: &'static str,
}

/// Lists the selectable personas.
pub async fn list_personas() -> Json<Vec<PersonaInfo>> {
    let personas = persona::all()
        .iter()
        .map(|p| PersonaInfo {
            id: p.id,
            name: p.display_name,
            avatar: p.avatar,
        })
        .collect();
    Json(personas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn personas_list_contains_the_default() {
        let Json(personas) = list_personas().await;
        assert!(personas.iter().any(|p| p.id == persona::DEFAULT_PERSONA_ID));
        assert!(personas.iter().all(|p| !p.avatar.is_empty()));
    }
}
