use crate::assets::audio::{AudioInfo, probe_audio};
use crate::assets::still::load_image;
use crate::encode::sink::{AudioTrack, EncoderSink};
use crate::filter::engine;
use crate::filter::kind::FilterKind;
use crate::foundation::buffer::ImageBuffer;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{StudioError, StudioResult};
use crate::project::model::Project;
use crate::schedule::scheduler::{CancelToken, FrameScheduler, GenerationInput, GenerationReport};
use crate::schedule::timing::TimingConfig;
use crate::sequence::effect_sequence::EffectSequence;
use crate::text::compositor::TextCompositor;
use crate::text::style::TextStyle;

/// Everything the surrounding application holds between generations: the loaded image, the
/// decoded audio, the effect timeline, the caption, and the timing.
#[derive(Clone, Debug)]
pub struct Session {
    image: ImageBuffer,
    audio: Option<AudioTrack>,
    timing: TimingConfig,
    sequence: EffectSequence,
    text: TextStyle,
}

impl Session {
    /// Session over an already decoded image.
    pub fn new(image: ImageBuffer, timing: TimingConfig) -> Self {
        Self {
            image,
            audio: None,
            timing,
            sequence: EffectSequence::new(),
            text: TextStyle::default(),
        }
    }

    /// Load the project's image and probe its audio.
    pub fn from_project(project: &Project) -> StudioResult<Self> {
        project.validate()?;
        let image = load_image(&project.image)?;
        let mut session = Self::new(image, project.timing.clone());
        session.sequence = project.effects.snapshot().with_global_filter(project.filter);
        session.text = project.text.clone();
        if let Some(path) = project.audio.as_deref() {
            session.set_audio(Some(probe_audio(path)?));
        }
        Ok(session)
    }

    /// Base image.
    pub fn image(&self) -> &ImageBuffer {
        &self.image
    }

    /// Replace the base image.
    pub fn set_image(&mut self, image: ImageBuffer) {
        self.image = image;
    }

    /// Loaded audio, if any.
    pub fn audio(&self) -> Option<&AudioTrack> {
        self.audio.as_ref()
    }

    /// Attach or detach audio, keeping the timing's audio duration in sync.
    pub fn set_audio(&mut self, audio: Option<AudioInfo>) {
        self.timing.audio_duration_seconds = audio.as_ref().map(|a| a.duration_seconds);
        self.audio = audio.map(|a| a.to_track());
    }

    /// Timing configuration.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Mutable timing. The audio duration is overwritten by [`Session::set_audio`].
    pub fn timing_mut(&mut self) -> &mut TimingConfig {
        &mut self.timing
    }

    /// Effect timeline.
    pub fn sequence(&self) -> &EffectSequence {
        &self.sequence
    }

    /// Mutable effect timeline, for append/remove/clear.
    pub fn sequence_mut(&mut self) -> &mut EffectSequence {
        &mut self.sequence
    }

    /// Caption style.
    pub fn text(&self) -> &TextStyle {
        &self.text
    }

    /// Replace the caption style.
    pub fn set_text(&mut self, text: TextStyle) {
        self.text = text;
    }

    /// Borrowed view handed to the scheduler.
    pub fn input(&self) -> GenerationInput<'_> {
        GenerationInput {
            image: &self.image,
            timing: &self.timing,
            sequence: &self.sequence,
            text: &self.text,
            audio: self.audio.as_ref(),
        }
    }

    /// Planned frame count.
    pub fn total_frames(&self) -> StudioResult<u64> {
        self.timing.total_frames()
    }

    /// Filter of every output frame, in order.
    pub fn timeline(&self) -> StudioResult<Vec<FilterKind>> {
        let total = self.total_frames()?;
        Ok(self.sequence.resolve_all(total, self.timing.fit_to_audio))
    }

    /// Render a single output frame without touching an encoder.
    pub fn render_still(
        &self,
        frame: FrameIndex,
        compositor: &mut TextCompositor,
    ) -> StudioResult<ImageBuffer> {
        let total = self.total_frames()?;
        if frame.0 >= total {
            return Err(StudioError::invalid_config(format!(
                "frame {} is outside the {total}-frame output",
                frame.0
            )));
        }
        let kind = self
            .sequence
            .resolve_filter(frame, total, self.timing.fit_to_audio);
        let mut out = engine::apply(self.image.clone(), kind)?;
        compositor.composite(&mut out, &self.text)?;
        Ok(out)
    }

    /// Run a full generation into `sink`.
    pub fn generate(
        &self,
        scheduler: &mut FrameScheduler,
        sink: &mut dyn EncoderSink,
        cancel: &CancelToken,
    ) -> StudioResult<GenerationReport> {
        scheduler.generate(self.input(), sink, cancel)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/session.rs"]
mod tests;
