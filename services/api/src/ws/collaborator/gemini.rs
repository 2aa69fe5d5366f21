//! Gemini Live (BidiGenerateContent) client for the game collaborator.
//!
//! One connection per session. The setup message pins the persona voice and
//! the full system prompt; afterwards each game prompt goes out as a closed
//! user turn and the streamed reply (transcription text + PCM16 audio) is
//! translated into [`TurnEvent`]s for the session loop.

use super::TurnEvent;
use crate::{audio, state::AppState};
use anyhow::{Context, Result, bail};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as WsMessage};
use tracing::{error, info, warn};

// --- Gemini Live wire types ---
mod wire {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) enum ClientMessage {
        Setup(BidiGenerateContentSetup),
        ClientContent(BidiGenerateContentClientContent),
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct BidiGenerateContentSetup {
        pub model: String,
        pub generation_config: GenerationConfig,
        pub system_instruction: Content,
        /// Requests a text transcript of the generated speech alongside the
        /// audio, which is what the turn classifier runs on.
        pub output_audio_transcription: AudioTranscriptionConfig,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct BidiGenerateContentClientContent {
        pub turns: Vec<Content>,
        pub turn_complete: bool,
    }
    #[derive(Serialize)]
    pub(super) struct Content {
        pub role: String,
        pub parts: Vec<Part>,
    }
    #[derive(Serialize)]
    pub(super) struct Part {
        pub text: String,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct GenerationConfig {
        pub response_modalities: Vec<ResponseModality>,
        pub speech_config: SpeechConfig,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub(super) enum ResponseModality {
        Audio,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct SpeechConfig {
        pub voice_config: VoiceConfig,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct VoiceConfig {
        pub prebuilt_voice_config: PrebuiltVoiceConfig,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct PrebuiltVoiceConfig {
        pub voice_name: String,
    }
    #[derive(Serialize)]
    pub(super) struct AudioTranscriptionConfig {}

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct ServerMessage {
        pub setup_complete: Option<serde_json::Value>,
        pub server_content: Option<LiveServerContent>,
    }
    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct LiveServerContent {
        pub model_turn: Option<ServerContentTurn>,
        pub output_transcription: Option<ServerTranscription>,
        pub turn_complete: Option<bool>,
    }
    #[derive(Deserialize, Debug)]
    pub(super) struct ServerContentTurn {
        pub parts: Vec<ServerPart>,
    }
    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct ServerPart {
        pub text: Option<String>,
        pub inline_data: Option<ServerBlob>,
    }
    #[derive(Deserialize, Debug)]
    pub(super) struct ServerBlob {
        pub data: String,
    }
    #[derive(Deserialize, Debug)]
    pub(super) struct ServerTranscription {
        pub text: String,
    }
}

/// Runs the relay loop for one Gemini Live connection.
///
/// Returns when the session drops its prompt sender (normal teardown) or
/// with an error on any connection or protocol failure; either way the
/// event sender is dropped, ending the session's event stream.
pub(super) async fn run(
    state: Arc<AppState>,
    voice: &'static str,
    system_prompt: String,
    mut prompt_rx: mpsc::Receiver<String>,
    event_tx: mpsc::Sender<TurnEvent>,
) -> Result<()> {
    let url = format!(
        "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent?key={}",
        state.config.gemini_api_key
    );

    let (ws_stream, _) = connect_async(url)
        .await
        .context("failed to connect to Gemini Live")?;
    info!("Connected to Gemini Live WebSocket.");
    let (mut gemini_tx, mut gemini_rx) = ws_stream.split();

    // Gemini emits 24 kHz PCM16; the frontend player runs at 48 kHz.
    let mut output_resampler = audio::create_resampler(
        audio::GEMINI_LIVE_API_PCM16_SAMPLE_RATE,
        audio::FRONTEND_AUDIO_PLAYER_SAMPLE_RATE,
        512,
    )?;

    let setup_msg = wire::ClientMessage::Setup(wire::BidiGenerateContentSetup {
        model: state.config.live_model.clone(),
        generation_config: wire::GenerationConfig {
            response_modalities: vec![wire::ResponseModality::Audio],
            speech_config: wire::SpeechConfig {
                voice_config: wire::VoiceConfig {
                    prebuilt_voice_config: wire::PrebuiltVoiceConfig {
                        voice_name: voice.to_string(),
                    },
                },
            },
        },
        system_instruction: wire::Content {
            role: "system".to_string(),
            parts: vec![wire::Part {
                text: system_prompt,
            }],
        },
        output_audio_transcription: wire::AudioTranscriptionConfig {},
    });
    gemini_tx
        .send(WsMessage::Text(serde_json::to_string(&setup_msg)?.into()))
        .await?;

    // The first prompt is queued by the session as soon as we spawn, so the
    // setup handshake must finish before entering the relay loop.
    loop {
        let frame = gemini_rx
            .next()
            .await
            .context("Gemini closed during setup")?
            .context("error reading from Gemini during setup")?;
        match frame {
            WsMessage::Text(text) => match serde_json::from_str::<wire::ServerMessage>(&text) {
                Ok(msg) if msg.setup_complete.is_some() => {
                    info!("Gemini Live setup complete. Ready for turn prompts.");
                    break;
                }
                Ok(msg) => warn!(?msg, "unexpected message during Gemini setup"),
                Err(_) => error!("failed to parse Gemini setup reply: {}", text),
            },
            WsMessage::Close(frame) => bail!("Gemini closed during setup: {:?}", frame),
            _ => {}
        }
    }

    loop {
        tokio::select! {
            // Turn prompts from the session controller.
            prompt = prompt_rx.recv() => {
                let Some(text) = prompt else {
                    info!("Session released the collaborator. Closing Gemini connection.");
                    break;
                };
                let turn = wire::ClientMessage::ClientContent(
                    wire::BidiGenerateContentClientContent {
                        turns: vec![wire::Content {
                            role: "user".to_string(),
                            parts: vec![wire::Part { text }],
                        }],
                        turn_complete: true,
                    },
                );
                gemini_tx
                    .send(WsMessage::Text(serde_json::to_string(&turn)?.into()))
                    .await?;
            }
            // Streamed partial output from Gemini.
            frame = gemini_rx.next() => {
                let frame = frame
                    .context("Gemini stream ended unexpectedly")?
                    .context("error reading from Gemini WebSocket")?;
                match frame {
                    WsMessage::Text(text) => {
                        let Ok(msg) = serde_json::from_str::<wire::ServerMessage>(&text) else {
                            warn!("skipping unparseable Gemini frame");
                            continue;
                        };
                        let Some(content) = msg.server_content else { continue };
                        if let Some(transcription) = content.output_transcription {
                            if event_tx.send(TurnEvent::Text(transcription.text)).await.is_err() {
                                return Ok(());
                            }
                        }
                        if let Some(model_turn) = content.model_turn {
                            for part in model_turn.parts {
                                if let Some(text) = part.text {
                                    if event_tx.send(TurnEvent::Text(text)).await.is_err() {
                                        return Ok(());
                                    }
                                }
                                if let Some(blob) = part.inline_data {
                                    let pcm = audio::decode_f32_from_base64_i16(&blob.data);
                                    let resampled =
                                        audio::resample_chunks(&mut output_resampler, &pcm);
                                    let fragment = audio::encode_f32_to_base64_i16(&resampled);
                                    if event_tx.send(TurnEvent::Audio(fragment)).await.is_err() {
                                        return Ok(());
                                    }
                                }
                            }
                        }
                        if content.turn_complete == Some(true)
                            && event_tx.send(TurnEvent::TurnComplete).await.is_err()
                        {
                            return Ok(());
                        }
                    }
                    WsMessage::Close(frame) => {
                        bail!("Gemini closed the connection: {:?}", frame);
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(())
}
