use super::*;

fn invert_then_sepia() -> EffectSequence {
    let mut seq = EffectSequence::new();
    seq.push(FilterKind::Invert, 10).unwrap();
    seq.push(FilterKind::Sepia, 5).unwrap();
    seq
}

#[test]
fn looping_wraps_when_requested_frames_exceed_sequence() {
    let seq = invert_then_sepia();
    assert_eq!(seq.total_frames(), 15);
    assert_eq!(seq.resolve_filter(FrameIndex(12), 30, true), FilterKind::Sepia);
    assert_eq!(seq.resolve_filter(FrameIndex(16), 30, true), FilterKind::Invert);
    assert_eq!(seq.resolve_filter(FrameIndex(29), 30, true), FilterKind::Sepia);
}

#[test]
fn segment_boundaries_are_half_open() {
    let seq = invert_then_sepia();
    assert_eq!(seq.resolve_filter(FrameIndex(0), 15, false), FilterKind::Invert);
    assert_eq!(seq.resolve_filter(FrameIndex(9), 15, false), FilterKind::Invert);
    assert_eq!(seq.resolve_filter(FrameIndex(10), 15, false), FilterKind::Sepia);
    assert_eq!(seq.resolve_filter(FrameIndex(14), 15, false), FilterKind::Sepia);
}

#[test]
fn non_looping_holds_last_segment() {
    let mut seq = EffectSequence::new();
    seq.push(FilterKind::Sepia, 3).unwrap();
    seq.push(FilterKind::Posterize, 2).unwrap();
    for f in 5..40 {
        assert_eq!(
            seq.resolve_filter(FrameIndex(f), 40, false),
            FilterKind::Posterize
        );
    }
}

#[test]
fn looping_flag_without_overflow_does_not_wrap() {
    let seq = invert_then_sepia();
    // Requested frames fit inside the sequence: no modulo is applied.
    assert_eq!(seq.resolve_filter(FrameIndex(11), 15, true), FilterKind::Sepia);
}

#[test]
fn empty_sequence_returns_global_filter() {
    let seq = EffectSequence::new().with_global_filter(FilterKind::Solarize);
    for f in [0u64, 1, 99, 10_000] {
        assert_eq!(seq.resolve_filter(FrameIndex(f), 100, true), FilterKind::Solarize);
        assert_eq!(seq.resolve_filter(FrameIndex(f), 100, false), FilterKind::Solarize);
    }
    assert_eq!(
        EffectSequence::new().resolve_filter(FrameIndex(3), 10, false),
        FilterKind::None
    );
}

#[test]
fn every_requested_frame_resolves() {
    let seq = invert_then_sepia();
    let all = seq.resolve_all(47, true);
    assert_eq!(all.len(), 47);
    assert_eq!(all[15], FilterKind::Invert);
    assert_eq!(all[25], FilterKind::Sepia);
}

#[test]
fn editing_rejects_bad_counts_and_positions() {
    let mut seq = invert_then_sepia();
    assert!(matches!(
        seq.push(FilterKind::Invert, 0),
        Err(StudioError::InvalidConfig(_))
    ));
    assert!(EffectSegment::parse(FilterKind::Invert, "-3").is_err());
    assert!(EffectSegment::parse(FilterKind::Invert, "abc").is_err());
    assert_eq!(
        EffectSegment::parse(FilterKind::Invert, " 7 ").unwrap().frame_count,
        7
    );

    assert!(seq.remove(5).is_err());
    let removed = seq.remove(0).unwrap();
    assert_eq!(removed.kind, FilterKind::Invert);
    assert_eq!(seq.segments().len(), 1);
    seq.clear();
    assert!(seq.is_empty());
}

#[test]
fn snapshot_is_unaffected_by_later_edits() {
    let mut seq = invert_then_sepia();
    let snap = seq.snapshot();
    seq.clear();
    assert_eq!(snap.total_frames(), 15);
}

#[test]
fn serde_is_a_plain_segment_list() {
    let seq = invert_then_sepia();
    let json = serde_json::to_value(&seq).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            { "kind": "invert", "frame_count": 10 },
            { "kind": "sepia", "frame_count": 5 }
        ])
    );
    let back: EffectSequence = serde_json::from_value(json).unwrap();
    assert_eq!(back, seq);

    let bad = serde_json::json!([{ "kind": "invert", "frame_count": 0 }]);
    assert!(serde_json::from_value::<EffectSequence>(bad).is_err());
}
