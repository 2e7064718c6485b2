use crate::filter::kind::FilterKind;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{StudioError, StudioResult};

/// One timeline segment: `frame_count` consecutive frames rendered with `kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawSegment")]
pub struct EffectSegment {
    /// Filter applied for the whole segment.
    pub kind: FilterKind,
    /// Number of frames, always > 0.
    pub frame_count: u64,
}

impl EffectSegment {
    /// Build a segment, rejecting an empty frame count.
    pub fn new(kind: FilterKind, frame_count: u64) -> StudioResult<Self> {
        if frame_count == 0 {
            return Err(StudioError::invalid_config(
                "effect segment frame_count must be > 0",
            ));
        }
        Ok(Self { kind, frame_count })
    }

    /// Parse a user-entered frame count (e.g. from a text field) and build a segment.
    pub fn parse(kind: FilterKind, frame_count: &str) -> StudioResult<Self> {
        let n: i64 = frame_count.trim().parse().map_err(|_| {
            StudioError::invalid_config(format!(
                "effect segment frame_count '{frame_count}' is not an integer"
            ))
        })?;
        if n <= 0 {
            return Err(StudioError::invalid_config(
                "effect segment frame_count must be > 0",
            ));
        }
        Self::new(kind, n as u64)
    }
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSegment {
    kind: FilterKind,
    frame_count: u64,
}

impl TryFrom<RawSegment> for EffectSegment {
    type Error = StudioError;

    fn try_from(raw: RawSegment) -> StudioResult<Self> {
        Self::new(raw.kind, raw.frame_count)
    }
}

/// Ordered, user-authored list of [`EffectSegment`]s.
///
/// Insertion order is the playback order. An empty sequence means "use the global filter for
/// every frame".
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EffectSequence {
    segments: Vec<EffectSegment>,
    #[serde(skip)]
    global: FilterKind,
}

impl EffectSequence {
    /// Empty sequence falling back to [`FilterKind::None`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from segments, validating each frame count.
    pub fn from_segments(segments: Vec<EffectSegment>) -> StudioResult<Self> {
        for (i, seg) in segments.iter().enumerate() {
            if seg.frame_count == 0 {
                return Err(StudioError::invalid_config(format!(
                    "effect segment {i} has frame_count 0"
                )));
            }
        }
        Ok(Self {
            segments,
            global: FilterKind::None,
        })
    }

    /// Set the filter returned for every frame while the sequence is empty.
    pub fn with_global_filter(mut self, global: FilterKind) -> Self {
        self.global = global;
        self
    }

    /// Filter used while the sequence is empty.
    pub fn global_filter(&self) -> FilterKind {
        self.global
    }

    /// Change the fallback filter.
    pub fn set_global_filter(&mut self, global: FilterKind) {
        self.global = global;
    }

    /// Append `{kind, frame_count}` at the end.
    pub fn push(&mut self, kind: FilterKind, frame_count: u64) -> StudioResult<()> {
        self.segments.push(EffectSegment::new(kind, frame_count)?);
        Ok(())
    }

    /// Remove the segment at `position`.
    pub fn remove(&mut self, position: usize) -> StudioResult<EffectSegment> {
        if position >= self.segments.len() {
            return Err(StudioError::invalid_config(format!(
                "no effect segment at position {position} (sequence has {})",
                self.segments.len()
            )));
        }
        Ok(self.segments.remove(position))
    }

    /// Drop every segment.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Borrow the segments in playback order.
    pub fn segments(&self) -> &[EffectSegment] {
        &self.segments
    }

    /// `true` when there are no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of all segment frame counts.
    pub fn total_frames(&self) -> u64 {
        self.segments
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.frame_count))
    }

    /// Immutable copy taken when generation starts.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Filter active at `frame`.
    ///
    /// When `loop_if_fit_to_audio` is set and `total_requested_frames` exceeds the sequence
    /// length, the sequence wraps around. Otherwise frames past the end hold the last segment.
    pub fn resolve_filter(
        &self,
        frame: FrameIndex,
        total_requested_frames: u64,
        loop_if_fit_to_audio: bool,
    ) -> FilterKind {
        let total = self.total_frames();
        let Some(last) = self.segments.last() else {
            return self.global;
        };

        let mut idx = frame.0;
        if loop_if_fit_to_audio && total_requested_frames > total {
            idx %= total;
        }

        let mut cum = 0u64;
        for seg in &self.segments {
            let end = cum.saturating_add(seg.frame_count);
            if idx < end {
                return seg.kind;
            }
            cum = end;
        }
        last.kind
    }

    /// Resolved filter for every frame in `[0, total_requested_frames)`.
    pub fn resolve_all(
        &self,
        total_requested_frames: u64,
        loop_if_fit_to_audio: bool,
    ) -> Vec<FilterKind> {
        (0..total_requested_frames)
            .map(|f| {
                self.resolve_filter(FrameIndex(f), total_requested_frames, loop_if_fit_to_audio)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/effect_sequence.rs"]
mod tests;
