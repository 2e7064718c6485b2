use super::*;
use crate::foundation::core::{Fps, Rgba8};
use crate::text::style::AnchorPosition;

const FULL: &str = r##"{
    "image": "photo.png",
    "audio": "music.mp3",
    "timing": {"duration_seconds": 4.0, "fps": 24, "fit_to_audio": true},
    "filter": "sepia",
    "effects": [
        {"kind": "invert", "frame_count": 10},
        {"kind": "posterize", "frame_count": 5}
    ],
    "text": {
        "content": "Hello",
        "font_size_px": 48,
        "color": "#ff0",
        "background_enabled": true,
        "anchor": "top_right"
    },
    "output": "renders/out.mp4"
}"##;

#[test]
fn parses_a_full_project() {
    let p = Project::from_json_str(FULL).unwrap();
    assert_eq!(p.image, PathBuf::from("photo.png"));
    assert_eq!(p.audio, Some(PathBuf::from("music.mp3")));
    assert_eq!(p.timing.fps, Fps::new(24).unwrap());
    assert!(p.timing.fit_to_audio);
    assert_eq!(p.filter, FilterKind::Sepia);
    assert_eq!(p.effects.total_frames(), 15);
    assert_eq!(p.text.color, Rgba8::rgb(255, 255, 0));
    assert_eq!(p.text.anchor, AnchorPosition::TopRight);
    assert_eq!(p.text.font_family, "sans-serif");
}

#[test]
fn minimal_project_uses_defaults() {
    let p = Project::from_json_str(
        r#"{"image": "a.png", "timing": {"duration_seconds": 1, "fps": 10}}"#,
    )
    .unwrap();
    assert_eq!(p, Project::new("a.png", TimingConfig::fixed(1.0, Fps::new(10).unwrap())));
}

#[test]
fn unknown_fields_are_rejected() {
    let err = Project::from_json_str(
        r#"{"image": "a.png", "timing": {"duration_seconds": 1, "fps": 10}, "colour": 1}"#,
    )
    .unwrap_err();
    assert!(matches!(err, StudioError::InvalidConfig(_)));
}

#[test]
fn zero_frame_segments_are_rejected() {
    let err = Project::from_json_str(
        r#"{"image": "a.png", "timing": {"duration_seconds": 1, "fps": 10},
            "effects": [{"kind": "invert", "frame_count": 0}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, StudioError::InvalidConfig(_)));
}

#[test]
fn fit_to_audio_without_audio_is_missing_audio() {
    let err = Project::from_json_str(
        r#"{"image": "a.png", "timing": {"duration_seconds": 1, "fps": 10, "fit_to_audio": true}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, StudioError::MissingAudio(_)));
}

#[test]
fn fit_to_audio_project_skips_the_configured_duration() {
    let p = Project::from_json_str(
        r#"{"image": "a.png", "audio": "a.mp3",
            "timing": {"duration_seconds": 0, "fps": 10, "fit_to_audio": true}}"#,
    )
    .unwrap();
    assert!(p.timing.fit_to_audio);

    let err = Project::from_json_str(
        r#"{"image": "a.png", "timing": {"duration_seconds": 0, "fps": 10, "fit_to_audio": true}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, StudioError::MissingAudio(_)));
}

#[test]
fn bad_duration_is_invalid_config() {
    let err = Project::from_json_str(
        r#"{"image": "a.png", "timing": {"duration_seconds": 0, "fps": 10}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, StudioError::InvalidConfig(_)));
}

#[test]
fn relative_paths_resolve_against_the_project_dir() {
    let mut p = Project::from_json_str(FULL).unwrap();
    p.font_dirs.push(PathBuf::from("/abs/fonts"));
    p.resolve_paths(Path::new("/work/job"));
    assert_eq!(p.image, PathBuf::from("/work/job/photo.png"));
    assert_eq!(p.audio, Some(PathBuf::from("/work/job/music.mp3")));
    assert_eq!(p.output, PathBuf::from("/work/job/renders/out.mp4"));
    assert_eq!(p.font_dirs, vec![PathBuf::from("/abs/fonts")]);
}

#[test]
fn serialized_project_parses_back() {
    let p = Project::from_json_str(FULL).unwrap();
    let again = Project::from_json_str(&p.to_json_pretty().unwrap()).unwrap();
    assert_eq!(again, p);
}
