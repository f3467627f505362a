use crate::slide::SlideElement;
use crate::transition::Transition;

/// Identity of a node attached to the stage container.
pub type SlideId = u64;

/// Stage mutations, mirrored from the controller to the renderer in the
/// exact order they were applied to the container.
#[derive(Debug, Clone)]
pub enum StageCommand {
    /// A new element entered the container. `start` is `None` for the first
    /// slide, which appears directly in its active state.
    Insert {
        id: SlideId,
        element: SlideElement,
        start: Option<Transition>,
    },
    /// The element swapped its start class for `active`.
    Activate { id: SlideId },
    /// Begin playback of a video element.
    Play { id: SlideId, muted: bool },
    /// The previous slide took its exit class.
    Retire { id: SlideId },
    /// The retired slide left the container.
    Remove { id: SlideId },
}

/// Emitted by the renderer when a video finishes playing.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackEnded(pub SlideId);

#[derive(Debug, Clone, Copy)]
pub enum ControlCommand {
    /// One-way latch: the user interacted, unmuted playback is allowed.
    UnlockAudio,
}
