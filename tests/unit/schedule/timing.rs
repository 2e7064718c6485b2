use super::*;

fn fps(n: u32) -> Fps {
    Fps::new(n).unwrap()
}

#[test]
fn two_seconds_at_ten_fps_is_twenty_frames() {
    assert_eq!(TimingConfig::fixed(2.0, fps(10)).total_frames().unwrap(), 20);
}

#[test]
fn fit_to_audio_overrides_configured_duration() {
    let t = TimingConfig {
        duration_seconds: 2.0,
        fps: fps(10),
        fit_to_audio: true,
        audio_duration_seconds: Some(3.5),
    };
    assert_eq!(t.total_frames().unwrap(), 35);
    assert_eq!(t.effective_duration_secs().unwrap(), 3.5);
}

#[test]
fn fit_to_audio_ignores_unusable_configured_duration() {
    for d in [0.0, -1.0, f64::NAN] {
        let t = TimingConfig {
            duration_seconds: d,
            fps: fps(10),
            fit_to_audio: true,
            audio_duration_seconds: Some(3.5),
        };
        assert!(t.validate().is_ok(), "{d}");
        assert_eq!(t.total_frames().unwrap(), 35, "{d}");
    }

    let no_audio = TimingConfig {
        fit_to_audio: true,
        ..TimingConfig::fixed(0.0, fps(10))
    };
    assert!(matches!(no_audio.validate(), Err(StudioError::MissingAudio(_))));
}

#[test]
fn audio_duration_is_ignored_without_fitting() {
    let t = TimingConfig {
        audio_duration_seconds: Some(9.0),
        ..TimingConfig::fixed(1.0, fps(24))
    };
    assert_eq!(t.total_frames().unwrap(), 24);
}

#[test]
fn fit_to_audio_without_audio_is_missing_audio() {
    let t = TimingConfig {
        fit_to_audio: true,
        ..TimingConfig::fixed(2.0, fps(10))
    };
    assert!(matches!(t.validate(), Err(StudioError::MissingAudio(_))));

    let zero = TimingConfig {
        audio_duration_seconds: Some(0.0),
        ..t
    };
    assert!(matches!(zero.total_frames(), Err(StudioError::MissingAudio(_))));
}

#[test]
fn bad_durations_are_invalid_config() {
    for d in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let t = TimingConfig::fixed(d, fps(10));
        assert!(matches!(t.validate(), Err(StudioError::InvalidConfig(_))), "{d}");
    }
}

#[test]
fn sub_frame_duration_yields_no_frames() {
    let t = TimingConfig::fixed(0.05, fps(10));
    assert!(matches!(t.total_frames(), Err(StudioError::InvalidConfig(_))));
}

#[test]
fn watchdog_adds_buffer() {
    let t = TimingConfig::fixed(1.5, fps(10));
    assert_eq!(
        t.watchdog_budget(Duration::from_millis(2000)).unwrap(),
        Duration::from_millis(3500)
    );
}

#[test]
fn deserializes_from_json() {
    let t: TimingConfig =
        serde_json::from_str(r#"{"duration_seconds": 4.0, "fps": 25}"#).unwrap();
    assert_eq!(t, TimingConfig::fixed(4.0, fps(25)));
    assert!(serde_json::from_str::<TimingConfig>(r#"{"duration_seconds": 4.0, "fps": 0}"#).is_err());
    assert!(
        serde_json::from_str::<TimingConfig>(r#"{"duration_seconds": 4.0, "fps": 5, "x": 1}"#)
            .is_err()
    );
}
