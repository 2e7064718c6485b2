use super::*;

#[test]
fn stream_duration_wins() {
    let json = br#"{
        "streams": [
            {"codec_type": "video", "duration": "9.0"},
            {"codec_type": "audio", "duration": "3.500000"}
        ],
        "format": {"duration": "10.0"}
    }"#;
    assert_eq!(parse_probe_duration(json).unwrap(), 3.5);
}

#[test]
fn falls_back_to_container_duration() {
    let json = br#"{
        "streams": [{"codec_type": "audio"}],
        "format": {"duration": "12.25"}
    }"#;
    assert_eq!(parse_probe_duration(json).unwrap(), 12.25);
}

#[test]
fn no_audio_stream_is_missing_audio() {
    let json = br#"{"streams": [{"codec_type": "video", "duration": "1.0"}]}"#;
    assert!(matches!(
        parse_probe_duration(json),
        Err(StudioError::MissingAudio(_))
    ));
}

#[test]
fn zero_or_garbage_durations_are_rejected() {
    for d in ["0.0", "N/A", "-1"] {
        let json = format!(r#"{{"streams": [{{"codec_type": "audio", "duration": "{d}"}}]}}"#);
        assert!(parse_probe_duration(json.as_bytes()).is_err(), "{d}");
    }
}

#[test]
fn info_converts_to_sink_track() {
    let info = AudioInfo {
        path: PathBuf::from("a.wav"),
        duration_seconds: 2.0,
    };
    let track = info.to_track();
    assert_eq!(track.path, PathBuf::from("a.wav"));
    assert_eq!(track.duration_secs, 2.0);
}

#[test]
fn probing_a_missing_file_fails() {
    if !crate::encode::ffmpeg::is_ffprobe_on_path() {
        eprintln!("ffprobe not on PATH; skipping");
        return;
    }
    assert!(probe_audio(Path::new("/definitely/not/here.wav")).is_err());
}
