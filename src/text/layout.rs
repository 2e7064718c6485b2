//! Anchor geometry for the caption overlay.

use kurbo::Rect;

use crate::text::style::{AnchorPosition, TextAlign, TextBaseline, TextStyle};

/// Distance between the text and the canvas edge for edge anchors.
pub const TEXT_MARGIN_PX: f64 = 20.0;

/// Padding between the text box and its background box.
pub const BACKGROUND_PADDING_PX: f64 = 10.0;

/// Measured size of the text box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    /// Advance width.
    pub width: f64,
    /// Line height.
    pub height: f64,
}

impl TextMetrics {
    /// Fallback used when the font cannot be measured:
    /// `height = size * 1.2`, `width = chars * (height / 1.5)`.
    pub fn estimate(content: &str, font_size_px: f32) -> Self {
        let height = f64::from(font_size_px) * 1.2;
        let width = content.chars().count() as f64 * (height / 1.5);
        Self { width, height }
    }

    fn is_usable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height > 0.0
    }
}

/// Resolved placement for one caption.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextLayout {
    /// Anchor x in canvas pixels.
    pub x: f64,
    /// Anchor y in canvas pixels.
    pub y: f64,
    /// Horizontal alignment around `x`.
    pub align: TextAlign,
    /// Vertical alignment around `y`.
    pub baseline: TextBaseline,
    /// Text box (top-left origin) implied by the metrics and alignment.
    pub text_box: Rect,
    /// Text box expanded by [`BACKGROUND_PADDING_PX`], when the background is enabled.
    pub background_box: Option<Rect>,
}

/// Anchor point and alignment for `anchor` on a `width × height` canvas.
pub fn anchor_point(
    anchor: AnchorPosition,
    width: f64,
    height: f64,
) -> (f64, f64, TextAlign, TextBaseline) {
    let m = TEXT_MARGIN_PX;
    let (x, align) = match anchor {
        AnchorPosition::TopLeft | AnchorPosition::CenterLeft | AnchorPosition::BottomLeft => {
            (m, TextAlign::Left)
        }
        AnchorPosition::TopCenter | AnchorPosition::Center | AnchorPosition::BottomCenter => {
            (width / 2.0, TextAlign::Center)
        }
        AnchorPosition::TopRight | AnchorPosition::CenterRight | AnchorPosition::BottomRight => {
            (width - m, TextAlign::Right)
        }
    };
    let (y, baseline) = match anchor {
        AnchorPosition::TopLeft | AnchorPosition::TopCenter | AnchorPosition::TopRight => {
            (m, TextBaseline::Top)
        }
        AnchorPosition::CenterLeft | AnchorPosition::Center | AnchorPosition::CenterRight => {
            (height / 2.0, TextBaseline::Middle)
        }
        AnchorPosition::BottomLeft | AnchorPosition::BottomCenter | AnchorPosition::BottomRight => {
            (height - m, TextBaseline::Bottom)
        }
    };
    (x, y, align, baseline)
}

/// Compute caption placement.
///
/// `metrics` comes from the font measurer; when it is `None` or non-finite the size is
/// estimated from the font size and character count.
pub fn compute_layout(
    canvas_width: f64,
    canvas_height: f64,
    style: &TextStyle,
    metrics: Option<TextMetrics>,
) -> TextLayout {
    let (x, y, align, baseline) = anchor_point(style.anchor, canvas_width, canvas_height);

    let metrics = metrics
        .filter(|m| m.is_usable())
        .unwrap_or_else(|| TextMetrics::estimate(&style.content, style.font_size_px));

    let left = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - metrics.width / 2.0,
        TextAlign::Right => x - metrics.width,
    };
    let top = match baseline {
        TextBaseline::Top => y,
        TextBaseline::Middle => y - metrics.height / 2.0,
        TextBaseline::Bottom => y - metrics.height,
    };
    let text_box = Rect::new(left, top, left + metrics.width, top + metrics.height);
    let background_box = style
        .background_enabled
        .then(|| text_box.inflate(BACKGROUND_PADDING_PX, BACKGROUND_PADDING_PX));

    TextLayout {
        x,
        y,
        align,
        baseline,
        text_box,
        background_box,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
