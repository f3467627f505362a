use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Which trigger advances the show. The two modes are deliberately
/// distinct: `media-paced` lets videos run to completion, `fixed-interval`
/// advances on the clock no matter what is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvancePolicy {
    #[default]
    MediaPaced,
    FixedInterval,
}

/// External video player. Exit of the child process is the
/// playback-completion event; `mute-flags` are appended while audio is
/// still locked.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PlayerOptions {
    pub command: Vec<String>,
    #[serde(default)]
    pub mute_flags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    /// JSON manifest resource, fetched once at startup.
    #[serde(default = "Configuration::default_manifest_path")]
    pub manifest_path: PathBuf,

    /// Directory joined with each manifest filename.
    #[serde(default = "Configuration::default_media_dir")]
    pub media_dir: PathBuf,

    /// Image dwell time, and the interval under `fixed-interval`.
    #[serde(
        with = "humantime_serde",
        default = "Configuration::default_display_duration"
    )]
    pub display_duration: Duration,

    /// Declared duration of the stylesheet's enter/exit effects. The
    /// controller never animates; it only validates the grace delay
    /// against this.
    #[serde(
        with = "humantime_serde",
        default = "Configuration::default_transition_duration"
    )]
    pub transition_duration: Duration,

    /// Wait before a retired slide leaves the container. Must cover the
    /// exit effect to avoid visible popping.
    #[serde(
        with = "humantime_serde",
        default = "Configuration::default_grace_delay"
    )]
    pub grace_delay: Duration,

    #[serde(default)]
    pub advance: AdvancePolicy,

    /// Wire up the one-way unmute latch (first keypress / SIGUSR1).
    #[serde(default = "Configuration::default_sound_unlock")]
    pub sound_unlock: bool,

    #[serde(default)]
    pub player: Option<PlayerOptions>,
}

impl Configuration {
    fn default_manifest_path() -> PathBuf {
        PathBuf::from("images.json")
    }

    fn default_media_dir() -> PathBuf {
        PathBuf::from("assets")
    }

    fn default_display_duration() -> Duration {
        Duration::from_secs(10)
    }

    fn default_transition_duration() -> Duration {
        Duration::from_secs(1)
    }

    fn default_grace_delay() -> Duration {
        // Exit transition plus a buffer.
        Duration::from_millis(1200)
    }

    fn default_sound_unlock() -> bool {
        true
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Reject value combinations the scheduler cannot honor.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.display_duration.is_zero(),
            "display-duration must be greater than zero"
        );
        ensure!(
            self.grace_delay >= self.transition_duration,
            "grace-delay ({}) must cover transition-duration ({})",
            humantime::format_duration(self.grace_delay),
            humantime::format_duration(self.transition_duration),
        );
        ensure!(
            self.grace_delay <= self.display_duration,
            "grace-delay ({}) must not exceed display-duration ({}) or retired slides outlive the next advance",
            humantime::format_duration(self.grace_delay),
            humantime::format_duration(self.display_duration),
        );
        if let Some(player) = &self.player {
            ensure!(
                !player.command.is_empty(),
                "player.command must name an executable"
            );
        }
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            manifest_path: Self::default_manifest_path(),
            media_dir: Self::default_media_dir(),
            display_duration: Self::default_display_duration(),
            transition_duration: Self::default_transition_duration(),
            grace_delay: Self::default_grace_delay(),
            advance: AdvancePolicy::default(),
            sound_unlock: Self::default_sound_unlock(),
            player: None,
        }
    }
}
