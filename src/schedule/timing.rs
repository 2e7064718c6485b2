use std::time::Duration;

use crate::foundation::core::Fps;
use crate::foundation::error::{StudioError, StudioResult};

/// Output length and cadence of one generation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    /// Configured output length in seconds. Ignored when fitting to audio.
    pub duration_seconds: f64,
    /// Output frame rate.
    pub fps: Fps,
    /// Use the audio duration instead of `duration_seconds`.
    #[serde(default)]
    pub fit_to_audio: bool,
    /// Decoded audio length, filled in once audio is loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_duration_seconds: Option<f64>,
}

impl TimingConfig {
    /// Fixed-length timing without audio fitting.
    pub fn fixed(duration_seconds: f64, fps: Fps) -> Self {
        Self {
            duration_seconds,
            fps,
            fit_to_audio: false,
            audio_duration_seconds: None,
        }
    }

    /// Check every field that decides the output length. Fitting to audio
    /// without a usable audio duration is [`StudioError::MissingAudio`]; the
    /// configured duration is only checked when not fitting.
    pub fn validate(&self) -> StudioResult<()> {
        if self.fit_to_audio {
            return match self.audio_duration_seconds {
                Some(d) if d.is_finite() && d > 0.0 => Ok(()),
                Some(d) => Err(StudioError::missing_audio(format!(
                    "fit-to-audio requested but audio duration is {d}"
                ))),
                None => Err(StudioError::missing_audio(
                    "fit-to-audio requested but no audio is loaded",
                )),
            };
        }
        if !self.duration_seconds.is_finite() || self.duration_seconds <= 0.0 {
            return Err(StudioError::invalid_config(format!(
                "duration must be a positive number of seconds, got {}",
                self.duration_seconds
            )));
        }
        Ok(())
    }

    /// Audio duration when fitting to audio, the configured duration otherwise.
    pub fn effective_duration_secs(&self) -> StudioResult<f64> {
        self.validate()?;
        Ok(match (self.fit_to_audio, self.audio_duration_seconds) {
            (true, Some(d)) => d,
            _ => self.duration_seconds,
        })
    }

    /// `floor(effective_duration * fps)`. Zero frames is rejected.
    pub fn total_frames(&self) -> StudioResult<u64> {
        let secs = self.effective_duration_secs()?;
        let frames = self.fps.secs_to_frames_floor(secs);
        if frames == 0 {
            return Err(StudioError::invalid_config(format!(
                "{secs}s at {} fps yields no frames",
                self.fps.get()
            )));
        }
        Ok(frames)
    }

    /// Wall-clock watchdog budget: effective duration plus `buffer`.
    pub fn watchdog_budget(&self, buffer: Duration) -> StudioResult<Duration> {
        let secs = self.effective_duration_secs()?;
        Ok(Duration::from_secs_f64(secs) + buffer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/timing.rs"]
mod tests;
