use super::*;
use crate::foundation::core::Rgba8;
use crate::text::style::AnchorPosition;

fn red_box_style() -> TextStyle {
    TextStyle {
        content: "hello".to_string(),
        font_size_px: 20.0,
        font_family: "sans-serif".to_string(),
        color: Rgba8::WHITE,
        background_enabled: true,
        background_color: Rgba8::rgb(255, 0, 0),
        anchor: AnchorPosition::TopLeft,
    }
}

#[test]
fn background_box_is_drawn_without_fonts() {
    let mut comp = TextCompositor::new(FontBook::empty());
    let mut frame = ImageBuffer::filled(200, 100, [0, 0, 255, 255]).unwrap();
    comp.composite(&mut frame, &red_box_style()).unwrap();

    // Estimated text box is (20,20)-(100,44); background adds 10px of padding.
    assert_eq!(frame.pixel(50, 30), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(12, 12), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(150, 80), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(5, 5), Some([0, 0, 255, 255]));
}

#[test]
fn empty_caption_is_a_no_op() {
    let mut comp = TextCompositor::new(FontBook::empty());
    let mut frame = ImageBuffer::filled(32, 32, [1, 2, 3, 255]).unwrap();
    let before = frame.clone();
    let style = TextStyle {
        content: "   ".to_string(),
        ..red_box_style()
    };
    comp.composite(&mut frame, &style).unwrap();
    assert_eq!(frame, before);
}

#[test]
fn invalid_font_size_is_rejected() {
    let mut comp = TextCompositor::new(FontBook::empty());
    let mut frame = ImageBuffer::filled(8, 8, [0, 0, 0, 255]).unwrap();
    let style = TextStyle {
        font_size_px: f32::NAN,
        ..red_box_style()
    };
    assert!(matches!(
        comp.composite(&mut frame, &style),
        Err(StudioError::InvalidConfig(_))
    ));
}

#[test]
fn glyphs_change_pixels_when_fonts_exist() {
    let mut comp = TextCompositor::default();
    if comp.fonts_mut().face_count() == 0 {
        eprintln!("no system fonts installed; skipping");
        return;
    }
    let mut frame = ImageBuffer::filled(200, 100, [0, 0, 0, 255]).unwrap();
    let before = frame.clone();
    let style = TextStyle {
        content: "WWWW".to_string(),
        font_size_px: 40.0,
        background_enabled: false,
        anchor: AnchorPosition::Center,
        ..red_box_style()
    };
    comp.composite(&mut frame, &style).unwrap();
    assert_ne!(frame, before);
}
