use std::path::{Path, PathBuf};

use crate::encode::sink::AudioTrack;
use crate::foundation::error::{StudioError, StudioResult};

/// Metadata of a decoded audio source.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioInfo {
    /// Source file.
    pub path: PathBuf,
    /// Length in seconds.
    pub duration_seconds: f64,
}

impl AudioInfo {
    /// Track description handed to an encoder sink.
    pub fn to_track(&self) -> AudioTrack {
        AudioTrack {
            path: self.path.clone(),
            duration_secs: self.duration_seconds,
        }
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe `path` through `ffprobe` and return its audio duration.
pub fn probe_audio(path: &Path) -> StudioResult<AudioInfo> {
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| StudioError::capability_missing(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(StudioError::missing_audio(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let duration_seconds = parse_probe_duration(&out.stdout)?;
    tracing::debug!(path = %path.display(), duration_seconds, "probed audio");
    Ok(AudioInfo {
        path: path.to_path_buf(),
        duration_seconds,
    })
}

/// Duration of the first audio stream, falling back to the container duration.
pub(crate) fn parse_probe_duration(json: &[u8]) -> StudioResult<f64> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| StudioError::missing_audio(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .ok_or_else(|| StudioError::missing_audio("no audio stream found"))?;

    let raw = stream
        .duration
        .as_deref()
        .or_else(|| parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .ok_or_else(|| StudioError::missing_audio("ffprobe reported no duration"))?;
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| StudioError::missing_audio(format!("unparseable duration '{raw}'")))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(StudioError::missing_audio(format!(
            "audio duration must be positive, got {secs}"
        )));
    }
    Ok(secs)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/audio.rs"]
mod tests;
