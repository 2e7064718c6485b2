//! reelcast turns a still image into a filtered, captioned video.
//!
//! - Describe the job in a [`Project`] (or build a [`Session`] directly)
//! - Arrange per-segment filters in an [`EffectSequence`]
//! - Run a [`FrameScheduler`] into an [`EncoderSink`] such as [`FfmpegSink`]
#![forbid(unsafe_code)]

mod assets;
mod encode;
mod filter;
mod foundation;
mod project;
mod schedule;
mod sequence;
mod text;

pub use crate::assets::audio::{AudioInfo, probe_audio};
pub use crate::assets::still::{decode_image, load_image, save_png};
pub use crate::encode::ffmpeg::{
    FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path, is_ffprobe_on_path,
};
pub use crate::encode::sink::{AudioTrack, EncoderSink, InMemorySink, SinkConfig, SinkSummary};
pub use crate::filter::dispatcher::{DispatchEvent, FilterDispatcher, JobId, JobOutcome};
pub use crate::filter::engine::{
    POSTERIZE_LEVELS, SOLARIZE_THRESHOLD, apply, apply_in_place, apply_to_slice,
    apply_with_progress,
};
pub use crate::filter::kind::FilterKind;
pub use crate::foundation::buffer::ImageBuffer;
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgba8};
pub use crate::foundation::error::{StudioError, StudioResult};
pub use crate::project::model::Project;
pub use crate::project::session::Session;
pub use crate::schedule::scheduler::{
    CancelToken, DEFAULT_WATCHDOG_BUFFER, FilterMode, FramePacing, FrameScheduler,
    GenerationInput, GenerationReport, GenerationState, SchedulerOpts, StatusEvent,
    StatusReporter, Warning,
};
pub use crate::schedule::timing::TimingConfig;
pub use crate::sequence::effect_sequence::{EffectSegment, EffectSequence};
pub use crate::text::compositor::TextCompositor;
pub use crate::text::fonts::{FontBook, ResolvedFont, TextBrush};
pub use crate::text::layout::{
    BACKGROUND_PADDING_PX, TEXT_MARGIN_PX, TextLayout, TextMetrics, anchor_point, compute_layout,
};
pub use crate::text::style::{AnchorPosition, TextAlign, TextBaseline, TextStyle};
