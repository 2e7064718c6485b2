use std::time::Duration;

use crate::foundation::error::{StudioError, StudioResult};

/// Zero-based index of an output frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Integer output frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Fps(u32);

impl Fps {
    /// Validate and wrap a frames-per-second value.
    pub fn new(fps: u32) -> StudioResult<Self> {
        if fps == 0 {
            return Err(StudioError::invalid_config("fps must be > 0"));
        }
        Ok(Self(fps))
    }

    /// Raw frames-per-second value.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Frames-per-second as `f64`.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// Wall-clock length of a single frame.
    pub fn frame_duration(self) -> Duration {
        Duration::from_secs_f64(1.0 / self.as_f64())
    }

    /// Seconds covered by `frames` frames.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) / self.as_f64()
    }

    /// `floor(secs * fps)`, clamped at zero.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

impl TryFrom<u32> for Fps {
    type Error = StudioError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Fps> for u32 {
    fn from(value: Fps) -> Self {
        value.0
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Parse `#rgb`, `#rrggbb`, or `#rrggbbaa` (leading `#` optional).
    pub fn parse_hex(s: &str) -> StudioResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let nibble = |c: u8| -> StudioResult<u8> {
            (c as char)
                .to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| StudioError::invalid_config(format!("invalid hex color '{s}'")))
        };
        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => {
                let r = nibble(bytes[0])?;
                let g = nibble(bytes[1])?;
                let b = nibble(bytes[2])?;
                Ok(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 | 8 => {
                let mut ch = [255u8; 4];
                for (i, pair) in bytes.chunks_exact(2).enumerate() {
                    ch[i] = nibble(pair[0])? * 16 + nibble(pair[1])?;
                }
                Ok(Self {
                    r: ch[0],
                    g: ch[1],
                    b: ch[2],
                    a: ch[3],
                })
            }
            _ => Err(StudioError::invalid_config(format!(
                "invalid hex color '{s}' (expected #rgb, #rrggbb or #rrggbbaa)"
            ))),
        }
    }

    /// Format as `#rrggbb` (opaque) or `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
