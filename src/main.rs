//! Binary entrypoint for slidekiosk.
//!
//! Wires the manifest, configuration, channels and tasks together;
//! everything else lives in the library crate.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use slidekiosk::config::Configuration;
use slidekiosk::events::{ControlCommand, PlaybackEnded, StageCommand};
use slidekiosk::manifest::Manifest;
use slidekiosk::tasks::{controller, renderer};

#[derive(Debug, Parser)]
#[command(
    name = "slidekiosk",
    version,
    about = "manifest-driven slideshow controller"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Print the first N planned advances without starting the show
    #[arg(long = "plan", value_name = "ITERATIONS")]
    plan: Option<usize>,
    /// Deterministic RNG seed for transition selection
    #[arg(long = "seed", value_name = "SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // init tracing (RUST_LOG controls level, default = info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let Args { config, plan, seed } = Args::parse();

    let cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    info!("loaded configuration from {}:\n{:#?}", config.display(), cfg);

    // Manifest failures are fatal to startup: no retry, no partial state.
    let manifest = match Manifest::load(&cfg.manifest_path) {
        Ok(manifest) => manifest,
        Err(err) => {
            error!("startup aborted: {err}");
            return Err(err.into());
        }
    };
    info!(slides = manifest.len(), "manifest loaded");

    if let Some(iterations) = plan {
        print_plan(&manifest, iterations, seed);
        return Ok(());
    }

    // Channels (small/bounded)
    let (stage_tx, stage_rx) = mpsc::channel::<StageCommand>(64); // Controller -> Renderer
    let (media_tx, media_rx) = mpsc::channel::<PlaybackEnded>(16); // Renderer -> Controller
    let (control_tx, control_rx) = mpsc::channel::<ControlCommand>(8); // Watchers -> Controller

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    if cfg.sound_unlock {
        spawn_unlock_watchers(control_tx, cancel.clone());
    } else {
        drop(control_tx);
    }

    let mut tasks = JoinSet::new();

    tasks.spawn({
        let media_tx = media_tx.clone();
        let cancel = cancel.clone();
        let player = cfg.player.clone();
        async move {
            renderer::run(stage_rx, media_tx, cancel, player)
                .await
                .context("renderer task failed")
        }
    });

    tasks.spawn({
        let cancel = cancel.clone();
        let cfg = cfg.clone();
        async move {
            controller::run(manifest, cfg, stage_tx, media_rx, control_rx, cancel, seed)
                .await
                .context("controller task failed")
        }
    });
    drop(media_tx);

    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!("task error: {err:?}");
                cancel.cancel();
            }
            Err(err) => {
                error!("join error: {err}");
                cancel.cancel();
            }
        }
    }

    Ok(())
}

/// The browser variant unlocks audio on the first pointer interaction; a
/// daemon settles for the first keypress on an attached terminal, or
/// SIGUSR1 when running detached. Both feed the same one-way latch.
fn spawn_unlock_watchers(control: mpsc::Sender<ControlCommand>, cancel: CancellationToken) {
    if std::io::stdin().is_terminal() {
        let control = control.clone();
        tokio::task::spawn_blocking(move || {
            let mut byte = [0u8; 1];
            match std::io::Read::read(&mut std::io::stdin(), &mut byte) {
                Ok(n) if n > 0 => {
                    let _ = control.blocking_send(ControlCommand::UnlockAudio);
                }
                Ok(_) => info!("stdin closed before any keypress"),
                Err(err) => warn!("stdin watcher failed: {err}"),
            }
        });
    }

    #[cfg(unix)]
    tokio::spawn(async move {
        match signal(SignalKind::user_defined1()) {
            Ok(mut sigusr1) => {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    received = sigusr1.recv() => {
                        if received.is_some() {
                            info!("SIGUSR1 received; unlocking audio");
                            let _ = control.send(ControlCommand::UnlockAudio).await;
                        }
                    }
                }
            }
            Err(err) => warn!("failed to register SIGUSR1 handler: {err}"),
        }
    });

    #[cfg(not(unix))]
    drop((control, cancel));
}

fn print_plan(manifest: &Manifest, iterations: usize, seed: Option<u64>) {
    println!(
        "# advance plan\n# slides: {}\n# iterations: {}\n# seed: {}\n",
        manifest.len(),
        iterations,
        seed.map_or_else(|| "(random)".to_string(), |s| s.to_string())
    );

    for (step, slide) in controller::plan(manifest, iterations, seed)
        .iter()
        .enumerate()
    {
        match slide.transition {
            Some(transition) => println!(
                "  {:>4}: [{}] {} ({})",
                step + 1,
                slide.index,
                slide.file_name,
                transition
            ),
            None => println!(
                "  {:>4}: [{}] {} (shown directly, no transition)",
                step + 1,
                slide.index,
                slide.file_name
            ),
        }
    }
}
