use std::str::FromStr;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{StudioError, StudioResult};

/// One of nine overlay placements (row × column).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPosition {
    /// Top row, left column.
    TopLeft,
    /// Top row, centered.
    TopCenter,
    /// Top row, right column.
    TopRight,
    /// Middle row, left column.
    CenterLeft,
    /// Canvas center.
    Center,
    /// Middle row, right column.
    CenterRight,
    /// Bottom row, left column.
    BottomLeft,
    /// Bottom row, centered.
    #[default]
    BottomCenter,
    /// Bottom row, right column.
    BottomRight,
}

impl AnchorPosition {
    /// All anchors, row-major from the top-left.
    pub const ALL: [AnchorPosition; 9] = [
        AnchorPosition::TopLeft,
        AnchorPosition::TopCenter,
        AnchorPosition::TopRight,
        AnchorPosition::CenterLeft,
        AnchorPosition::Center,
        AnchorPosition::CenterRight,
        AnchorPosition::BottomLeft,
        AnchorPosition::BottomCenter,
        AnchorPosition::BottomRight,
    ];
}

impl FromStr for AnchorPosition {
    type Err = StudioError;

    fn from_str(s: &str) -> StudioResult<Self> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "top_left" => Ok(Self::TopLeft),
            "top_center" | "top" => Ok(Self::TopCenter),
            "top_right" => Ok(Self::TopRight),
            "center_left" | "middle_left" | "left" => Ok(Self::CenterLeft),
            "center" | "middle" | "center_center" => Ok(Self::Center),
            "center_right" | "middle_right" | "right" => Ok(Self::CenterRight),
            "bottom_left" => Ok(Self::BottomLeft),
            "bottom_center" | "bottom" => Ok(Self::BottomCenter),
            "bottom_right" => Ok(Self::BottomRight),
            _ => Err(StudioError::invalid_config(format!(
                "unknown anchor position '{s}'"
            ))),
        }
    }
}

/// Horizontal alignment of the text relative to the anchor x.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    /// Text starts at x.
    Left,
    /// Text is centered on x.
    Center,
    /// Text ends at x.
    Right,
}

/// Vertical placement of the text relative to the anchor y.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBaseline {
    /// Top of the text box sits on y.
    Top,
    /// Text box is vertically centered on y.
    Middle,
    /// Bottom of the text box sits on y.
    Bottom,
}

/// Caption appearance, read once per rendered frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TextStyle {
    /// Caption text. Empty disables the overlay.
    pub content: String,
    /// Font size in pixels.
    pub font_size_px: f32,
    /// Family name or generic family (`sans-serif`, `serif`, `monospace`).
    pub font_family: String,
    /// Glyph color.
    pub color: Rgba8,
    /// Draw a box behind the text.
    pub background_enabled: bool,
    /// Box color.
    pub background_color: Rgba8,
    /// Placement on the canvas.
    pub anchor: AnchorPosition,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_size_px: 32.0,
            font_family: "sans-serif".to_string(),
            color: Rgba8::WHITE,
            background_enabled: false,
            background_color: Rgba8 {
                r: 0,
                g: 0,
                b: 0,
                a: 160,
            },
            anchor: AnchorPosition::default(),
        }
    }
}

impl TextStyle {
    /// `true` when there is something to draw.
    pub fn is_visible(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// Reject non-finite or non-positive font sizes.
    pub fn validate(&self) -> StudioResult<()> {
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(StudioError::invalid_config(
                "text font_size_px must be finite and > 0",
            ));
        }
        Ok(())
    }
}
