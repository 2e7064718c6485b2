use crate::foundation::buffer::ImageBuffer;
use crate::foundation::error::{StudioError, StudioResult};
use crate::text::blend::over_premul_onto_straight;
use crate::text::fonts::{FontBook, TextBrush};
use crate::text::layout::{TextLayout, compute_layout};
use crate::text::style::TextStyle;

/// Draws the caption (background box plus glyphs) onto frames.
pub struct TextCompositor {
    fonts: FontBook,
}

impl Default for TextCompositor {
    fn default() -> Self {
        Self::new(FontBook::system())
    }
}

impl TextCompositor {
    /// Compositor using the given font book.
    pub fn new(fonts: FontBook) -> Self {
        Self { fonts }
    }

    /// Mutable access to the font book (e.g. to load extra font directories).
    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Placement of `style` on a `width × height` canvas, measuring with the font book.
    pub fn layout(&mut self, width: u32, height: u32, style: &TextStyle) -> TextLayout {
        let metrics = self
            .fonts
            .measure(&style.content, &style.font_family, style.font_size_px);
        compute_layout(f64::from(width), f64::from(height), style, metrics)
    }

    /// Composite `style` onto `frame` in place. Invisible styles are a no-op.
    ///
    /// When no font can be resolved only the background box is drawn.
    pub fn composite(&mut self, frame: &mut ImageBuffer, style: &TextStyle) -> StudioResult<()> {
        if !style.is_visible() {
            return Ok(());
        }
        style.validate()?;

        let (w, h) = (frame.width(), frame.height());
        if w == 0 || h == 0 {
            return Ok(());
        }
        let (w16, h16) = canvas_u16(w, h)?;
        let layout = self.layout(w, h, style);

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);

        if let Some(bg) = layout.background_box {
            let c = style.background_color;
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(bg.x0, bg.y0, bg.x1, bg.y1));
        }

        match self.fonts.resolve(&style.font_family) {
            Some(font) => {
                let text = self.fonts.layout_line(
                    &style.content,
                    &font,
                    style.font_size_px,
                    TextBrush::from(style.color),
                )?;
                let font_data = vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
                    font.index,
                );
                let origin = layout.text_box.origin();
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));

                for line in text.lines() {
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let brush = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            brush.r, brush.g, brush.b, brush.a,
                        ));
                        let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(&font_data)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
            }
            None => {
                tracing::warn!(
                    family = %style.font_family,
                    "no font resolved; drawing caption background only"
                );
            }
        }

        let mut overlay = vello_cpu::Pixmap::new(w16, h16);
        ctx.flush();
        ctx.render_to_pixmap(&mut overlay);
        over_premul_onto_straight(frame.data_mut(), overlay.data_as_u8_slice())
    }
}

fn canvas_u16(width: u32, height: u32) -> StudioResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StudioError::invalid_buffer("frame width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StudioError::invalid_buffer("frame height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/text/compositor.rs"]
mod tests;
