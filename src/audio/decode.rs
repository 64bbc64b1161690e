// Audio decoding via the ffmpeg CLI
//
// Uploads arrive in whatever container the client recorded. One ffmpeg pass
// turns them into raw PCM so the rest of the pipeline only ever sees
// 16 kHz mono f32 samples.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Result};
use log::{debug, info};

/// Sample rate Whisper and pyannote expect.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Locate the ffmpeg binary on PATH.
pub fn find_ffmpeg() -> Option<PathBuf> {
    which::which("ffmpeg").ok()
}

/// Decode an audio file to mono 16 kHz f32 samples.
///
/// Returns the samples and their sample rate.
pub fn decode_audio_file(audio_path: &Path) -> Result<(Vec<f32>, u32)> {
    if !audio_path.exists() {
        return Err(anyhow!(
            "audio file does not exist: {}",
            audio_path.display()
        ));
    }

    let ffmpeg = find_ffmpeg()
        .ok_or_else(|| anyhow!("ffmpeg not found on PATH; install it to accept uploads"))?;
    debug!("Decoding {} with {:?}", audio_path.display(), ffmpeg);

    // Command::output drains stdout and stderr together, so a chatty decode
    // (codec warnings on an odd container) cannot stall on a full pipe.
    let output = Command::new(&ffmpeg)
        .arg("-i")
        .arg(audio_path)
        .args(["-f", "f32le", "-acodec", "pcm_f32le"])
        .args(["-ar", "16000", "-ac", "1"])
        .arg("pipe:1")
        .output()
        .map_err(|e| anyhow!("could not run {:?}: {}", ffmpeg, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // ffmpeg prints its banner and stream info first; the failure reason
        // is the tail of stderr.
        let reason = stderr.lines().last().unwrap_or("unknown error");
        return Err(anyhow!(
            "ffmpeg rejected {}: {}",
            audio_path.display(),
            reason
        ));
    }

    let samples = pcm_f32le_to_samples(&output.stdout)?;
    if samples.is_empty() {
        return Err(anyhow!(
            "no audio stream decoded from {}",
            audio_path.display()
        ));
    }

    info!(
        "Decoded {}: {} samples ({:.2}s)",
        audio_path.display(),
        samples.len(),
        samples.len() as f64 / TARGET_SAMPLE_RATE as f64
    );

    Ok((samples, TARGET_SAMPLE_RATE))
}

/// Reinterpret a raw little-endian f32 PCM stream as samples.
fn pcm_f32le_to_samples(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(anyhow!(
            "PCM stream truncated mid-sample ({} bytes)",
            bytes.len()
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_error() {
        let result = decode_audio_file(Path::new("/nonexistent/audio.wav"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_pcm_conversion_reads_little_endian_floats() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&(-0.5f32).to_le_bytes());

        let samples = pcm_f32le_to_samples(&bytes).unwrap();
        assert_eq!(samples, vec![1.0, -0.5]);
    }

    #[test]
    fn test_truncated_pcm_stream_is_an_error() {
        let result = pcm_f32le_to_samples(&[0u8; 6]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_pcm_stream_yields_no_samples() {
        assert!(pcm_f32le_to_samples(&[]).unwrap().is_empty());
    }
}
