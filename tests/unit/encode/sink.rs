use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 4,
        height: 2,
        fps: Fps::new(30).unwrap(),
        total_frames: 45,
        audio: None,
    }
}

#[test]
fn duration_follows_frames_and_fps() {
    assert!((cfg().duration_secs() - 1.5).abs() < 1e-9);
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let frame = ImageBuffer::filled(4, 2, [9, 9, 9, 255]).unwrap();
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    sink.push_frame(FrameIndex(1), &frame).unwrap();
    let summary = sink.end().unwrap();
    assert_eq!(summary.frames_written, 2);
    assert!(sink.is_finished());
    assert_eq!(sink.config().map(|c| c.total_frames), Some(45));
}

#[test]
fn in_memory_sink_rejects_out_of_order_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let frame = ImageBuffer::filled(4, 2, [0, 0, 0, 255]).unwrap();
    sink.push_frame(FrameIndex(3), &frame).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &frame).is_err());
    assert!(sink.push_frame(FrameIndex(1), &frame).is_err());
}
