use super::*;

fn style(anchor: AnchorPosition) -> TextStyle {
    TextStyle {
        content: "hello".to_string(),
        font_size_px: 20.0,
        anchor,
        ..TextStyle::default()
    }
}

#[test]
fn top_right_on_200x100() {
    let l = compute_layout(200.0, 100.0, &style(AnchorPosition::TopRight), None);
    assert_eq!((l.x, l.y), (180.0, 20.0));
    assert_eq!(l.align, TextAlign::Right);
    assert_eq!(l.baseline, TextBaseline::Top);
}

#[test]
fn anchor_table_matches_rows_and_columns() {
    let expect = [
        (AnchorPosition::TopLeft, 20.0, 20.0, TextAlign::Left, TextBaseline::Top),
        (AnchorPosition::TopCenter, 100.0, 20.0, TextAlign::Center, TextBaseline::Top),
        (AnchorPosition::TopRight, 180.0, 20.0, TextAlign::Right, TextBaseline::Top),
        (AnchorPosition::CenterLeft, 20.0, 50.0, TextAlign::Left, TextBaseline::Middle),
        (AnchorPosition::Center, 100.0, 50.0, TextAlign::Center, TextBaseline::Middle),
        (AnchorPosition::CenterRight, 180.0, 50.0, TextAlign::Right, TextBaseline::Middle),
        (AnchorPosition::BottomLeft, 20.0, 80.0, TextAlign::Left, TextBaseline::Bottom),
        (AnchorPosition::BottomCenter, 100.0, 80.0, TextAlign::Center, TextBaseline::Bottom),
        (AnchorPosition::BottomRight, 180.0, 80.0, TextAlign::Right, TextBaseline::Bottom),
    ];
    for (anchor, x, y, align, baseline) in expect {
        assert_eq!(anchor_point(anchor, 200.0, 100.0), (x, y, align, baseline), "{anchor:?}");
    }
}

#[test]
fn missing_metrics_fall_back_to_estimate() {
    let m = TextMetrics::estimate("hello", 20.0);
    assert!((m.height - 24.0).abs() < 1e-9);
    assert!((m.width - 80.0).abs() < 1e-9);

    let nan = TextMetrics {
        width: f64::NAN,
        height: 10.0,
    };
    let a = compute_layout(200.0, 100.0, &style(AnchorPosition::TopLeft), Some(nan));
    let b = compute_layout(200.0, 100.0, &style(AnchorPosition::TopLeft), None);
    assert_eq!(a, b);
    assert!((b.text_box.width() - 80.0).abs() < 1e-9);
}

#[test]
fn background_box_encloses_text_with_padding() {
    let mut s = style(AnchorPosition::BottomRight);
    s.background_enabled = true;
    let metrics = TextMetrics {
        width: 50.0,
        height: 16.0,
    };
    let l = compute_layout(200.0, 100.0, &s, Some(metrics));
    assert_eq!(l.text_box, Rect::new(130.0, 64.0, 180.0, 80.0));
    assert_eq!(l.background_box, Some(Rect::new(120.0, 54.0, 190.0, 90.0)));

    for anchor in AnchorPosition::ALL {
        s.anchor = anchor;
        let l = compute_layout(200.0, 100.0, &s, Some(metrics));
        let bg = l.background_box.unwrap();
        assert!(bg.contains(l.text_box.origin()));
        assert!(bg.x1 >= l.text_box.x1 && bg.y1 >= l.text_box.y1);
    }
}

#[test]
fn background_disabled_has_no_box() {
    let l = compute_layout(200.0, 100.0, &style(AnchorPosition::Center), None);
    assert!(l.background_box.is_none());
    // Centered box straddles the anchor.
    assert!((l.text_box.center().x - 100.0).abs() < 1e-9);
    assert!((l.text_box.center().y - 50.0).abs() < 1e-9);
}

#[test]
fn anchor_names_parse() {
    assert_eq!(
        "top-right".parse::<AnchorPosition>().unwrap(),
        AnchorPosition::TopRight
    );
    assert_eq!(
        "Middle".parse::<AnchorPosition>().unwrap(),
        AnchorPosition::Center
    );
    assert!("nowhere".parse::<AnchorPosition>().is_err());
}
