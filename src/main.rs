//! Binary entrypoint for the photo slideshow.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use photo_slideshow::config::Configuration;
use photo_slideshow::events::ShowCommand;
use photo_slideshow::pool::PhotoRef;
use photo_slideshow::presentation::{ChannelSink, LogSink, PresentationEvent};
use photo_slideshow::probe::ImageProbe;
use photo_slideshow::scan;
use photo_slideshow::session::{SessionOptions, Slideshow};
use photo_slideshow::tasks;
use photo_slideshow::timer::TimerQueue;

#[derive(Debug, Parser)]
#[command(name = "photo-slideshow", version, about = "Perpetual photo slideshow")]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Simulate this many photo intervals on a virtual clock and print the show
    #[arg(long = "dry-run", value_name = "TICKS")]
    dry_run: Option<usize>,
    /// Deterministic seed for photo order and random appearance modes
    #[arg(long = "seed", value_name = "SEED")]
    seed: Option<u64>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let directive: Directive = format!("photo_slideshow={level}")
        .parse()
        .context("invalid log directive")?;
    let filter = EnvFilter::from_default_env().add_directive(directive);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        dry_run,
        seed,
        verbose,
    } = Args::parse();
    init_tracing(verbose)?;

    let mut cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    if seed.is_some() {
        cfg.shuffle_seed = seed;
    }
    tracing::debug!("Loaded configuration from {}:\n{:#?}", config.display(), cfg);

    let photos = scan::discover(&cfg).context("failed to discover photos")?;
    let mut rng = match cfg.shuffle_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let options = SessionOptions::from_config(&cfg, &mut rng);
    let probe = ImageProbe::new(cfg.probe_decode);

    if let Some(ticks) = dry_run {
        run_dry_run(&cfg, photos, options, probe, ticks);
        return Ok(());
    }

    let (command_tx, command_rx) = mpsc::channel::<ShowCommand>(16);
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    #[cfg(unix)]
    {
        let cancel = cancel.clone();
        let control = command_tx.clone();
        tokio::spawn(async move {
            match signal(SignalKind::user_defined1()) {
                Ok(mut sigusr1) => loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        received = sigusr1.recv() => {
                            if received.is_none() {
                                break;
                            }
                            tracing::info!("SIGUSR1 received; toggling pause");
                            if let Err(err) = control.send(ShowCommand::TogglePause).await {
                                tracing::warn!("failed to forward pause toggle: {err}");
                                break;
                            }
                        }
                    }
                },
                Err(err) => tracing::warn!("failed to register SIGUSR1 handler: {err}"),
            }
        });
    }
    // Keep the channel open for the lifetime of the show.
    let _command_tx = command_tx;

    let session = Slideshow::new(photos, options, probe, LogSink);
    tokio::spawn(tasks::show::run(
        session,
        command_rx,
        cancel.clone(),
        cfg.stop_when_exhausted,
    ))
    .await
    .context("slideshow task panicked")?
    .context("slideshow task failed")?;
    Ok(())
}

fn run_dry_run(
    cfg: &Configuration,
    photos: Vec<PhotoRef>,
    options: SessionOptions,
    probe: ImageProbe,
    ticks: usize,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let start_delay = options.start_delay;
    let mut session = Slideshow::new(photos, options, probe, ChannelSink::new(tx));
    let mut queue = TimerQueue::new();
    session.launch(&mut queue);

    for tick in 0..ticks {
        let wait = if tick == 0 {
            start_delay
        } else {
            session.runner().state().wait_time()
        };
        session.advance(&mut queue, wait);
        if cfg.stop_when_exhausted {
            session.declare_no_photos_if_exhausted(&mut queue);
        }
        while let Ok(event) = rx.try_recv() {
            print_event(queue.now(), &event);
        }
        if session.runner().state().has_no_photos() {
            break;
        }
    }
    session.teardown(&mut queue);
}

fn print_event(at: Duration, event: &PresentationEvent) {
    let at = humantime::format_duration(at).to_string();
    match event {
        PresentationEvent::Configured(setup) => println!(
            "{at:>8}  configured sizing={:?} transition={}",
            setup.sizing, setup.transition
        ),
        PresentationEvent::Render { slot, photo } => {
            println!("{at:>8}  show slot {slot:>3}  {photo}")
        }
        PresentationEvent::TimeLabel(label) if !label.is_empty() => {
            println!("{at:>8}  clock {label}")
        }
        PresentationEvent::TimeLabel(_) => {}
        PresentationEvent::Paused(paused) => println!("{at:>8}  paused={paused}"),
        PresentationEvent::NoPhotos => println!("{at:>8}  no photos available"),
    }
}
