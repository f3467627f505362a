//! Rendering-surface stand-in.
//!
//! Consumes the controller's stage commands in order, reporting each
//! container mutation through structured logs (the stylesheet owns what
//! the classes look like; we only narrate them). Videos are handed to the
//! configured external player; the child process exiting is the
//! playback-completion event. No player configured means the video slide
//! sits on stage without playback guarantees, which the scheduler accepts.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use tokio::process::Command;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::PlayerOptions;
use crate::events::{PlaybackEnded, SlideId, StageCommand};
use crate::slide::SlideElement;
use crate::transition::ACTIVE_CLASS;

pub async fn run(
    mut commands: Receiver<StageCommand>,
    media_tx: Sender<PlaybackEnded>,
    cancel: CancellationToken,
    player: Option<PlayerOptions>,
) -> Result<()> {
    // Mirror of the container, kept only to resolve Play commands to a
    // source path.
    let mut attached: HashMap<SlideId, SlideElement> = HashMap::new();

    loop {
        select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting renderer task");
                break;
            }

            maybe_cmd = commands.recv() => match maybe_cmd {
                Some(cmd) => apply(cmd, &mut attached, &media_tx, player.as_ref(), &cancel),
                None => {
                    debug!("stage stream closed; exiting renderer task");
                    break;
                }
            }
        }
    }

    Ok(())
}

fn apply(
    cmd: StageCommand,
    attached: &mut HashMap<SlideId, SlideElement>,
    media_tx: &Sender<PlaybackEnded>,
    player: Option<&PlayerOptions>,
    cancel: &CancellationToken,
) {
    match cmd {
        StageCommand::Insert { id, element, start } => {
            match start {
                Some(transition) => info!(
                    id,
                    index = element.index,
                    src = %element.src.display(),
                    class = transition.start_class(),
                    "slide attached in start state"
                ),
                None => info!(
                    id,
                    index = element.index,
                    src = %element.src.display(),
                    class = ACTIVE_CLASS,
                    "slide attached directly active"
                ),
            }
            attached.insert(id, element);
        }
        StageCommand::Activate { id } => {
            info!(id, class = ACTIVE_CLASS, "slide activated");
        }
        StageCommand::Play { id, muted } => match attached.get(&id) {
            Some(element) => spawn_playback(
                id,
                element.src.clone(),
                muted,
                player,
                media_tx.clone(),
                cancel.clone(),
            ),
            None => warn!(id, "play requested for a slide that is not attached"),
        },
        StageCommand::Retire { id } => {
            info!(id, "slide retiring");
        }
        StageCommand::Remove { id } => {
            attached.remove(&id);
            info!(id, "slide removed");
        }
    }
}

fn spawn_playback(
    id: SlideId,
    src: PathBuf,
    muted: bool,
    player: Option<&PlayerOptions>,
    media_tx: Sender<PlaybackEnded>,
    cancel: CancellationToken,
) {
    let Some(player) = player else {
        warn!(
            id,
            src = %src.display(),
            "no player configured; video will not report completion"
        );
        return;
    };
    let Some((bin, args)) = player.command.split_first() else {
        // validated() rejects empty commands; belt and braces.
        warn!(id, "player command is empty; skipping playback");
        return;
    };

    let mut cmd = Command::new(bin);
    cmd.args(args);
    if muted {
        cmd.args(&player.mute_flags);
    }
    cmd.arg(&src);

    tokio::spawn(async move {
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                // Non-fatal: the slide stays on stage without playback
                // guarantees and the scheduler carries on.
                error!(id, src = %src.display(), "video play failed: {err}");
                return;
            }
        };
        debug!(id, src = %src.display(), muted, "playback started");

        select! {
            _ = cancel.cancelled() => {
                let _ = child.start_kill();
            }
            status = child.wait() => {
                match status {
                    Ok(status) if status.success() => {
                        debug!(id, "playback finished");
                    }
                    Ok(status) => {
                        warn!(id, %status, "player exited with failure status");
                    }
                    Err(err) => {
                        error!(id, "waiting on player failed: {err}");
                    }
                }
                // Completion fires either way; whether to advance on it is
                // the scheduler's call.
                let _ = media_tx.send(PlaybackEnded(id)).await;
            }
        }
    });
}
