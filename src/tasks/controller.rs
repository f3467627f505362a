//! Advance scheduler.
//!
//! Owns the stage and the index cursor, decides when to advance, and
//! mirrors every container mutation to the renderer. Advances are strictly
//! sequential: the next trigger is only armed after the new element is
//! attached and the cursor has moved. The retiring slide is garbage
//! collected once the grace delay elapses, never earlier.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{AdvancePolicy, Configuration};
use crate::events::{ControlCommand, PlaybackEnded, SlideId, StageCommand};
use crate::manifest::Manifest;
use crate::slide::{ElementKind, SlideElement};
use crate::stage::{Activation, Stage};
use crate::transition::Transition;

pub async fn run(
    manifest: Manifest,
    cfg: Configuration,
    to_renderer: Sender<StageCommand>,
    mut media_rx: Receiver<PlaybackEnded>,
    mut control_rx: Receiver<ControlCommand>,
    cancel: CancellationToken,
    seed_override: Option<u64>,
) -> Result<()> {
    let rng = match seed_override {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut ctl = Controller {
        manifest,
        cfg,
        stage: Stage::new(),
        rng,
        to_renderer,
        index: 0,
        active: 0,
        audio_unlocked: false,
        advance_at: None,
        retiring: None,
    };

    // First slide: no transition machinery, same trigger registration as
    // every later slide.
    ctl.show_first().await?;

    let mut media_open = true;
    let mut control_open = true;

    loop {
        select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting controller task");
                break;
            }

            // Dwell timer (images, or every slide under fixed-interval).
            _ = sleep_until(ctl.advance_at.unwrap_or_else(Instant::now)),
                if ctl.advance_at.is_some() =>
            {
                ctl.advance("timer").await?;
            }

            // Grace delay elapsed for the retiring slide.
            _ = sleep_until(ctl.retiring.map(|r| r.remove_at).unwrap_or_else(Instant::now)),
                if ctl.retiring.is_some() =>
            {
                if let Some(retired) = ctl.retiring.take() {
                    ctl.drop_retired(retired.id).await?;
                }
            }

            // Playback completions (from renderer)
            maybe_ended = media_rx.recv(), if media_open => {
                match maybe_ended {
                    Some(PlaybackEnded(id)) => ctl.on_playback_ended(id).await?,
                    None => {
                        // Renderer side closed; timers keep the show alive.
                        media_open = false;
                    }
                }
            }

            // Unlock gesture (from signal watchers)
            maybe_cmd = control_rx.recv(), if control_open => {
                match maybe_cmd {
                    Some(ControlCommand::UnlockAudio) => ctl.unlock_audio(),
                    None => {
                        control_open = false;
                    }
                }
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct RetiringSlide {
    id: SlideId,
    remove_at: Instant,
}

struct Controller {
    manifest: Manifest,
    cfg: Configuration,
    stage: Stage,
    rng: StdRng,
    to_renderer: Sender<StageCommand>,
    /// Manifest cursor of the active slide.
    index: usize,
    /// Stage id of the active slide. Single-writer: only the advance path
    /// moves this, and it moves immediately, not after the grace delay.
    active: SlideId,
    /// One-way latch; affects elements built from then on, not the one
    /// already playing.
    audio_unlocked: bool,
    advance_at: Option<Instant>,
    retiring: Option<RetiringSlide>,
}

impl Controller {
    async fn show_first(&mut self) -> Result<()> {
        let element =
            SlideElement::build(0, &self.manifest, &self.cfg.media_dir, self.audio_unlocked);
        let id = self.stage.insert(element.clone(), None);
        info!(file = %element.src.display(), "showing first slide");
        self.mirror(StageCommand::Insert {
            id,
            element: element.clone(),
            start: None,
        })
        .await?;
        self.index = 0;
        self.active = id;
        self.arm_trigger(id, &element).await
    }

    async fn advance(&mut self, trigger: &str) -> Result<()> {
        self.advance_at = None;

        // A retiring slide still pending removal would become a third node
        // once the current active retires; detach it now.
        if let Some(stale) = self.retiring.take() {
            self.drop_retired(stale.id).await?;
        }

        let next = self.manifest.next_index(self.index);
        let element =
            SlideElement::build(next, &self.manifest, &self.cfg.media_dir, self.audio_unlocked);
        let transition = Transition::pick(&mut self.rng);
        debug!(
            index = next,
            file = %element.src.display(),
            %transition,
            trigger,
            "advancing"
        );

        let id = self.stage.insert(element.clone(), Some(transition));
        self.mirror(StageCommand::Insert {
            id,
            element: element.clone(),
            start: Some(transition),
        })
        .await?;

        // The start state must be committed before the active mutation or
        // the enter effect collapses into an instant cut.
        self.stage.flush_layout();
        if self.stage.activate(id) == Some(Activation::InstantCut) {
            warn!(id, "start state was not committed; slide entered without transition");
        }
        self.mirror(StageCommand::Activate { id }).await?;

        let prev = self.active;
        self.stage.retire(prev);
        self.mirror(StageCommand::Retire { id: prev }).await?;
        self.retiring = Some(RetiringSlide {
            id: prev,
            remove_at: Instant::now() + self.cfg.grace_delay,
        });

        // Cursor and active reference move with the advance, so the next
        // trigger always operates on the new slide.
        self.index = next;
        self.active = id;

        self.arm_trigger(id, &element).await
    }

    /// Start playback for videos and register the next advance trigger:
    /// the dwell timer for images (and for everything under
    /// fixed-interval), the playback-completion event for videos under
    /// media-paced.
    async fn arm_trigger(&mut self, id: SlideId, element: &SlideElement) -> Result<()> {
        if let ElementKind::Video(attrs) = &element.kind {
            self.mirror(StageCommand::Play {
                id,
                muted: attrs.muted,
            })
            .await?;
        }

        self.advance_at = match (self.cfg.advance, element.is_video()) {
            (AdvancePolicy::MediaPaced, true) => None,
            _ => Some(Instant::now() + self.cfg.display_duration),
        };
        Ok(())
    }

    async fn on_playback_ended(&mut self, id: SlideId) -> Result<()> {
        if id != self.active {
            debug!(id, "ignoring playback completion from a retired slide");
            return Ok(());
        }
        match self.cfg.advance {
            AdvancePolicy::MediaPaced => self.advance("playback-ended").await,
            AdvancePolicy::FixedInterval => {
                debug!(id, "fixed-interval mode ignores playback completion");
                Ok(())
            }
        }
    }

    async fn drop_retired(&mut self, id: SlideId) -> Result<()> {
        if self.stage.remove(id) {
            self.mirror(StageCommand::Remove { id }).await?;
        } else {
            debug!(id, "retired slide already detached; removal is a no-op");
        }
        Ok(())
    }

    fn unlock_audio(&mut self) {
        if self.audio_unlocked {
            debug!("audio already unlocked");
        } else {
            info!("user gesture received; audio unlocked for subsequent slides");
            self.audio_unlocked = true;
        }
    }

    async fn mirror(&self, cmd: StageCommand) -> Result<()> {
        self.to_renderer
            .send(cmd)
            .await
            .context("renderer channel closed")
    }
}

/// A slide the planner would show: manifest position, filename and the
/// enter effect (none for the first slide).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSlide {
    pub index: usize,
    pub file_name: String,
    pub transition: Option<Transition>,
}

/// Pure rehearsal of the advance sequence, without timers or channels.
/// Drives the `--plan` flag and the cycling tests.
pub fn plan(manifest: &Manifest, iterations: usize, seed: Option<u64>) -> Vec<PlannedSlide> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut out = Vec::with_capacity(iterations);
    let mut index = 0;
    for step in 0..iterations {
        let transition = if step == 0 {
            None
        } else {
            index = manifest.next_index(index);
            Some(Transition::pick(&mut rng))
        };
        out.push(PlannedSlide {
            index,
            file_name: manifest.file_name(index).to_string(),
            transition,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(n: usize) -> Manifest {
        let entries = (0..n).map(|i| format!("img-{i}.jpg")).collect();
        Manifest::from_entries(entries).expect("non-empty")
    }

    #[test]
    fn plan_cycles_indices_in_modulo_order() {
        let plan = plan(&manifest(3), 8, Some(1));
        let indices: Vec<usize> = plan.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 0, 1, 2, 0, 1]);
    }

    #[test]
    fn plan_handles_a_single_slide_manifest() {
        let plan = plan(&manifest(1), 4, Some(1));
        assert!(plan.iter().all(|p| p.index == 0));
        assert!(plan.iter().all(|p| p.file_name == "img-0.jpg"));
    }

    #[test]
    fn only_the_first_slide_skips_the_transition() {
        let plan = plan(&manifest(3), 10, Some(9));
        assert_eq!(plan[0].transition, None);
        for slide in &plan[1..] {
            let t = slide.transition.expect("later slides carry a transition");
            assert!(Transition::ALL.contains(&t));
        }
    }

    #[test]
    fn seeded_plans_are_reproducible() {
        assert_eq!(plan(&manifest(5), 20, Some(77)), plan(&manifest(5), 20, Some(77)));
    }
}
