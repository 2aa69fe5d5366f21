//! PCM16/base64 audio helpers for the collaborator relay.
//!
//! The Gemini Live API emits base64-encoded mono PCM16 at 24 kHz; browser
//! audio pipelines run at 48 kHz, so fragments are resampled before relay.
//! The session layer treats the resulting fragments as opaque bytes.

use base64::Engine;
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

pub const GEMINI_LIVE_API_PCM16_SAMPLE_RATE: f64 = 24000.0;
pub const FRONTEND_AUDIO_PLAYER_SAMPLE_RATE: f64 = 48000.0;

/// Creates a resampler to convert between audio sample rates.
pub fn create_resampler(
    in_sampling_rate: f64,
    out_sampling_rate: f64,
    chunk_size: usize,
) -> anyhow::Result<FastFixedIn<f32>> {
    let resampler = FastFixedIn::<f32>::new(
        out_sampling_rate / in_sampling_rate,
        1.0,
        PolynomialDegree::Cubic,
        chunk_size,
        1, // mono
    )?;
    Ok(resampler)
}

/// Decodes a base64 string of little-endian PCM16 into normalized f32 samples.
pub fn decode_f32_from_base64_i16(base64_fragment: &str) -> Vec<f32> {
    if let Ok(pcm16_bytes) = base64::engine::general_purpose::STANDARD.decode(base64_fragment) {
        pcm16_bytes
            .chunks_exact(2)
            .map(|chunk| {
                let v = i16::from_le_bytes([chunk[0], chunk[1]]);
                (v as f32 / 32768.0).clamp(-1.0, 1.0)
            })
            .collect()
    } else {
        tracing::error!("Failed to decode base64 fragment to f32");
        Vec::new()
    }
}

/// Encodes f32 samples into a base64 string of little-endian PCM16.
pub fn encode_f32_to_base64_i16(pcm32: &[f32]) -> String {
    let pcm16: Vec<u8> = pcm32
        .iter()
        .flat_map(|&sample| {
            let v = (sample * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            v.to_le_bytes().to_vec()
        })
        .collect();
    base64::engine::general_purpose::STANDARD.encode(&pcm16)
}

/// Runs samples through a resampler in its fixed chunk size, dropping any
/// trailing partial chunk (inaudible at these fragment sizes).
pub fn resample_chunks(resampler: &mut FastFixedIn<f32>, samples: &[f32]) -> Vec<f32> {
    let chunk_size = resampler.input_frames_next();
    let mut resampled = Vec::new();
    for chunk in samples.chunks(chunk_size) {
        if let Ok(res) = resampler.process(&[chunk.to_vec()], None) {
            resampled.extend_from_slice(&res[0]);
        }
    }
    resampled
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn decodes_known_pcm16_bytes() {
        // i16::MAX, 0, i16::MIN as little-endian bytes.
        let bytes: Vec<u8> = [i16::MAX, 0, i16::MIN]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);

        let samples = decode_f32_from_base64_i16(&encoded);
        assert_eq!(samples.len(), 3);
        assert_relative_eq!(samples[0], 32767.0 / 32768.0, epsilon = 1e-6);
        assert_relative_eq!(samples[1], 0.0, epsilon = 1e-6);
        assert_relative_eq!(samples[2], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn invalid_base64_yields_empty() {
        assert!(decode_f32_from_base64_i16("not base64 !!!").is_empty());
    }

    #[test]
    fn encode_clamps_out_of_range_samples() {
        let encoded = encode_f32_to_base64_i16(&[2.0, -2.0]);
        let decoded = decode_f32_from_base64_i16(&encoded);
        assert_relative_eq!(decoded[0], 32767.0 / 32768.0, epsilon = 1e-6);
        assert_relative_eq!(decoded[1], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn upsampling_doubles_the_frame_count() {
        let mut resampler = create_resampler(
            GEMINI_LIVE_API_PCM16_SAMPLE_RATE,
            FRONTEND_AUDIO_PLAYER_SAMPLE_RATE,
            512,
        )
        .unwrap();
        let input = vec![0.25_f32; 1024];
        let output = resample_chunks(&mut resampler, &input);
        // 24k -> 48k doubles the sample count (within resampler rounding).
        assert!(
            (2040..=2056).contains(&output.len()),
            "unexpected output length {}",
            output.len()
        );
    }
}
