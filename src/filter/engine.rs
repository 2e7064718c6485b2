//! Pure per-pixel transforms over straight-alpha RGBA8 buffers.
//!
//! Rounding rule for the float-based filters (sepia, posterize): round half away from zero
//! (`f32::round`), then clamp to 255. Alpha is never touched.

use crate::filter::kind::FilterKind;
use crate::foundation::buffer::ImageBuffer;
use crate::foundation::error::{StudioError, StudioResult};

/// Number of quantization levels used by [`FilterKind::Posterize`].
pub const POSTERIZE_LEVELS: u32 = 4;

/// Channels strictly above this value are inverted by [`FilterKind::Solarize`].
pub const SOLARIZE_THRESHOLD: u8 = 128;

/// Upper bound on intermediate progress reports per invocation.
const MAX_PROGRESS_REPORTS: u32 = 64;

/// How a filter run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RunOutcome {
    Finished,
    Cancelled,
}

/// Apply `kind` to `buffer` and return the transformed buffer.
pub fn apply(buffer: ImageBuffer, kind: FilterKind) -> StudioResult<ImageBuffer> {
    apply_with_progress(buffer, kind, &mut |_| {})
}

/// Apply `kind`, reporting progress fractions in `[0, 1]`.
///
/// Intermediate fractions are reported at bounded row intervals; `1.0` is reported exactly once,
/// last.
pub fn apply_with_progress(
    mut buffer: ImageBuffer,
    kind: FilterKind,
    progress: &mut dyn FnMut(f32),
) -> StudioResult<ImageBuffer> {
    apply_in_place(&mut buffer, kind, progress)?;
    Ok(buffer)
}

/// In-place variant of [`apply_with_progress`].
pub fn apply_in_place(
    buffer: &mut ImageBuffer,
    kind: FilterKind,
    progress: &mut dyn FnMut(f32),
) -> StudioResult<()> {
    run_rows(buffer, kind, progress, &|| false).map(|_| ())
}

/// Transform a raw RGBA8 slice with no dimension information.
///
/// Fails with [`StudioError::InvalidBuffer`] when the length is not a multiple of 4.
pub fn apply_to_slice(rgba: &mut [u8], kind: FilterKind) -> StudioResult<()> {
    if rgba.len() % 4 != 0 {
        return Err(StudioError::invalid_buffer(format!(
            "rgba slice length {} is not a multiple of 4",
            rgba.len()
        )));
    }
    let f = pixel_fn(kind);
    for px in rgba.chunks_exact_mut(4) {
        f(px);
    }
    Ok(())
}

/// Row-batched driver shared with the dispatcher worker. `cancelled` is polled between batches.
pub(crate) fn run_rows(
    buffer: &mut ImageBuffer,
    kind: FilterKind,
    progress: &mut dyn FnMut(f32),
    cancelled: &dyn Fn() -> bool,
) -> StudioResult<RunOutcome> {
    buffer.validate()?;

    let height = buffer.height();
    let row_bytes = buffer.width() as usize * 4;
    if row_bytes == 0 || height == 0 {
        progress(1.0);
        return Ok(RunOutcome::Finished);
    }

    let rows_per_batch = height.div_ceil(MAX_PROGRESS_REPORTS).max(1) as usize;
    let f = pixel_fn(kind);
    let mut rows_done = 0usize;

    for batch in buffer.data_mut().chunks_mut(row_bytes * rows_per_batch) {
        if cancelled() {
            return Ok(RunOutcome::Cancelled);
        }
        if !kind.is_identity() {
            for px in batch.chunks_exact_mut(4) {
                f(px);
            }
        }
        rows_done += batch.len() / row_bytes;
        if rows_done < height as usize {
            progress(rows_done as f32 / height as f32);
        }
    }

    progress(1.0);
    Ok(RunOutcome::Finished)
}

fn pixel_fn(kind: FilterKind) -> fn(&mut [u8]) {
    match kind {
        FilterKind::None => |_| {},
        FilterKind::Invert => invert_px,
        FilterKind::Sepia => sepia_px,
        FilterKind::RemoveRed => |px| px[0] = 0,
        FilterKind::RemoveGreen => |px| px[1] = 0,
        FilterKind::RemoveBlue => |px| px[2] = 0,
        FilterKind::PermuteRgbGrb => |px| px.swap(0, 1),
        FilterKind::PermuteRgbBrg => |px| px.swap(0, 2),
        FilterKind::Posterize => posterize_px,
        FilterKind::Solarize => solarize_px,
    }
}

fn invert_px(px: &mut [u8]) {
    px[0] = 255 - px[0];
    px[1] = 255 - px[1];
    px[2] = 255 - px[2];
}

fn sepia_px(px: &mut [u8]) {
    let r = f32::from(px[0]);
    let g = f32::from(px[1]);
    let b = f32::from(px[2]);
    px[0] = round_clamp(0.393 * r + 0.769 * g + 0.189 * b);
    px[1] = round_clamp(0.349 * r + 0.686 * g + 0.168 * b);
    px[2] = round_clamp(0.272 * r + 0.534 * g + 0.131 * b);
}

fn posterize_px(px: &mut [u8]) {
    let step = 255.0 / (POSTERIZE_LEVELS - 1) as f32;
    for c in &mut px[..3] {
        let level = (f32::from(*c) / step).round();
        *c = round_clamp(level * step);
    }
}

fn solarize_px(px: &mut [u8]) {
    for c in &mut px[..3] {
        if *c > SOLARIZE_THRESHOLD {
            *c = 255 - *c;
        }
    }
}

fn round_clamp(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/filter/engine.rs"]
mod tests;
