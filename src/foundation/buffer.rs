use crate::foundation::core::Canvas;
use crate::foundation::error::{StudioError, StudioResult};

/// Straight-alpha RGBA8 pixels, row-major, 4 bytes per pixel.
///
/// The buffer is handed from stage to stage by value; no two stages hold it at once.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl ImageBuffer {
    /// Wrap raw pixel bytes, checking `data.len() == width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> StudioResult<Self> {
        let expected = expected_len(width, height)?;
        if data.len() % 4 != 0 {
            return Err(StudioError::invalid_buffer(format!(
                "pixel data length {} is not a multiple of 4",
                data.len()
            )));
        }
        if data.len() != expected {
            return Err(StudioError::invalid_buffer(format!(
                "pixel data length {} does not match {width}x{height}x4 = {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer filled with a single straight-alpha color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> StudioResult<Self> {
        let len = expected_len(width, height)?;
        let mut data = vec![0u8; len];
        for px in data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a [`Canvas`].
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Borrow the pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutably borrow the pixel bytes. Length cannot change through this slice.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Give up ownership of the pixel bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Read a single pixel. Returns `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Re-check the length invariant. Buffers built through this type always pass.
    pub fn validate(&self) -> StudioResult<()> {
        if self.data.len() % 4 != 0 || self.data.len() != expected_len(self.width, self.height)? {
            return Err(StudioError::invalid_buffer(
                "pixel data length does not match width*height*4",
            ));
        }
        Ok(())
    }
}

fn expected_len(width: u32, height: u32) -> StudioResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| StudioError::invalid_buffer("image buffer size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/buffer.rs"]
mod tests;
