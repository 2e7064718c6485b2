use std::path::Path;

use anyhow::Context;

use crate::foundation::buffer::ImageBuffer;
use crate::foundation::error::StudioResult;

/// Decode any still format the `image` crate understands into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> StudioResult<ImageBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    ImageBuffer::from_raw(width, height, rgba.into_raw())
}

/// Load a still image from disk.
pub fn load_image(path: &Path) -> StudioResult<ImageBuffer> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let buffer = decode_image(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        width = buffer.width(),
        height = buffer.height(),
        "loaded image"
    );
    Ok(buffer)
}

/// Write `buffer` as a PNG, creating parent directories as needed.
pub fn save_png(buffer: &ImageBuffer, path: &Path) -> StudioResult<()> {
    crate::encode::ffmpeg::ensure_parent_dir(path)?;
    let img = image::RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.data().to_vec())
        .context("image buffer does not match its dimensions")?;
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/still.rs"]
mod tests;
