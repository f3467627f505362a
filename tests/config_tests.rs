use std::path::PathBuf;
use std::time::Duration;

use slidekiosk::config::{AdvancePolicy, Configuration};

#[test]
fn minimal_config_uses_documented_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.manifest_path, PathBuf::from("images.json"));
    assert_eq!(cfg.media_dir, PathBuf::from("assets"));
    assert_eq!(cfg.display_duration, Duration::from_secs(10));
    assert_eq!(cfg.transition_duration, Duration::from_secs(1));
    assert_eq!(cfg.grace_delay, Duration::from_millis(1200));
    assert_eq!(cfg.advance, AdvancePolicy::MediaPaced);
    assert!(cfg.sound_unlock);
    assert!(cfg.player.is_none());
}

#[test]
fn parse_kebab_case_config_with_humantime_durations() {
    let yaml = r#"
manifest-path: "media/images.json"
media-dir: "media"
display-duration: 7s
transition-duration: 500ms
grace-delay: 800ms
advance: fixed-interval
sound-unlock: false
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.manifest_path, PathBuf::from("media/images.json"));
    assert_eq!(cfg.media_dir, PathBuf::from("media"));
    assert_eq!(cfg.display_duration, Duration::from_secs(7));
    assert_eq!(cfg.transition_duration, Duration::from_millis(500));
    assert_eq!(cfg.grace_delay, Duration::from_millis(800));
    assert_eq!(cfg.advance, AdvancePolicy::FixedInterval);
    assert!(!cfg.sound_unlock);
}

#[test]
fn parse_player_options() {
    let yaml = r#"
player:
  command: [mpv, --fullscreen]
  mute-flags: [--mute=yes]
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let player = cfg.player.expect("expected player options");
    assert_eq!(player.command, vec!["mpv", "--fullscreen"]);
    assert_eq!(player.mute_flags, vec!["--mute=yes"]);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = serde_yaml::from_str::<Configuration>("displayduration: 10s").unwrap_err();
    assert!(err.to_string().contains("unknown field"));
}

#[test]
fn validated_requires_grace_to_cover_the_transition() {
    let cfg = Configuration {
        transition_duration: Duration::from_secs(2),
        grace_delay: Duration::from_secs(1),
        ..Default::default()
    };
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("grace-delay"));
}

#[test]
fn validated_rejects_grace_beyond_the_dwell() {
    let cfg = Configuration {
        display_duration: Duration::from_secs(1),
        transition_duration: Duration::from_millis(500),
        grace_delay: Duration::from_secs(2),
        ..Default::default()
    };
    assert!(cfg.validated().is_err());
}

#[test]
fn validated_rejects_zero_display_duration() {
    let cfg = Configuration {
        display_duration: Duration::ZERO,
        transition_duration: Duration::ZERO,
        grace_delay: Duration::ZERO,
        ..Default::default()
    };
    assert!(cfg.validated().is_err());
}

#[test]
fn validated_rejects_an_empty_player_command() {
    let yaml = r#"
player:
  command: []
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("player.command"));
}

#[test]
fn sane_defaults_pass_validation() {
    assert!(Configuration::default().validated().is_ok());
}
