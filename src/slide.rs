use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::manifest::Manifest;

/// Style class shared by every slide node; the visual-effect contract keys
/// its transitions off this plus the per-phase classes.
pub const BASE_CLASS: &str = "slide";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Kind is inferred purely from the filename suffix: `.mp4` (any case)
    /// means video, everything else is treated as an image.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(OsStr::to_str)
            .map(|ext| ext.to_ascii_lowercase())
        {
            Some(ref ext) if ext == "mp4" => Self::Video,
            _ => Self::Image,
        }
    }
}

/// Autoplay-compliance attributes carried by video elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoAttrs {
    /// Muted until the user unlocks audio; autoplay requires it.
    pub muted: bool,
    pub autoplay: bool,
    pub looped: bool,
    pub plays_inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Image,
    Video(VideoAttrs),
}

/// A media element ready for the stage, not yet attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideElement {
    /// Manifest position this element was built from.
    pub index: usize,
    /// Media directory joined with the manifest filename.
    pub src: PathBuf,
    pub kind: ElementKind,
    pub class: &'static str,
}

impl SlideElement {
    /// Pure factory: (index, manifest, media dir, unlock latch) in, element
    /// out. Insertion into the container is the stage's job, not ours.
    pub fn build(
        index: usize,
        manifest: &Manifest,
        media_dir: &Path,
        audio_unlocked: bool,
    ) -> Self {
        let src = media_dir.join(manifest.file_name(index));
        let kind = match MediaKind::from_path(&src) {
            MediaKind::Image => ElementKind::Image,
            MediaKind::Video => ElementKind::Video(VideoAttrs {
                muted: !audio_unlocked,
                autoplay: true,
                looped: false,
                plays_inline: true,
            }),
        };
        Self {
            index,
            src,
            kind,
            class: BASE_CLASS,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self.kind, ElementKind::Video(_))
    }
}
