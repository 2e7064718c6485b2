use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::filter::kind::FilterKind;
use crate::foundation::error::{StudioError, StudioResult};
use crate::schedule::timing::TimingConfig;
use crate::sequence::effect_sequence::EffectSequence;
use crate::text::style::TextStyle;

fn default_output() -> PathBuf {
    PathBuf::from("out.mp4")
}

/// On-disk description of one video job.
///
/// Relative paths are resolved against the directory holding the project file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Base still image.
    pub image: PathBuf,
    /// Optional audio track, required when fitting to audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<PathBuf>,
    /// Length and cadence.
    pub timing: TimingConfig,
    /// Filter used for every frame when `effects` is empty.
    #[serde(default)]
    pub filter: FilterKind,
    /// Effect timeline.
    #[serde(default)]
    pub effects: EffectSequence,
    /// Caption.
    #[serde(default)]
    pub text: TextStyle,
    /// Output MP4 path.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Extra directories scanned for fonts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub font_dirs: Vec<PathBuf>,
}

impl Project {
    /// Minimal project rendering `image` with the given timing.
    pub fn new(image: impl Into<PathBuf>, timing: TimingConfig) -> Self {
        Self {
            image: image.into(),
            audio: None,
            timing,
            filter: FilterKind::None,
            effects: EffectSequence::new(),
            text: TextStyle::default(),
            output: default_output(),
            font_dirs: Vec::new(),
        }
    }

    /// Parse and validate a project from JSON. Paths are left as written.
    pub fn from_json_str(s: &str) -> StudioResult<Self> {
        let project: Project = serde_json::from_str(s)
            .map_err(|e| StudioError::invalid_config(format!("project json: {e}")))?;
        project.validate()?;
        Ok(project)
    }

    /// Read, parse, and validate a project file, resolving relative paths against its directory.
    pub fn load(path: &Path) -> StudioResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read project '{}'", path.display()))?;
        let mut project = Self::from_json_str(&text)?;
        if let Some(base) = path.parent() {
            project.resolve_paths(base);
        }
        Ok(project)
    }

    /// Pretty JSON form.
    pub fn to_json_pretty(&self) -> StudioResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| StudioError::Other(anyhow::Error::new(e).context("serialize project")))
    }

    /// Join every relative path onto `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.image);
        join(&mut self.output);
        if let Some(audio) = self.audio.as_mut() {
            join(audio);
        }
        for dir in &mut self.font_dirs {
            join(dir);
        }
    }

    /// Checks that do not need the filesystem.
    ///
    /// Fitting to audio without an audio path is [`StudioError::MissingAudio`]. The audio
    /// duration itself is checked once the file is probed.
    pub fn validate(&self) -> StudioResult<()> {
        if self.timing.fit_to_audio {
            if self.audio.is_none() {
                return Err(StudioError::missing_audio(
                    "timing.fit_to_audio is set but the project has no audio",
                ));
            }
        } else {
            self.timing.validate()?;
        }
        self.text.validate()?;
        if self.image.as_os_str().is_empty() {
            return Err(StudioError::invalid_config("project image path is empty"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(StudioError::invalid_config("project output path is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/model.rs"]
mod tests;
