//! Binary entrypoint for the album viewer.
//!
//! Runs a headless viewer over an album file or an image directory and reads
//! control lines from stdin.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::time::Duration;

use album_model::AlbumDescriptor;
use album_viewer::config::Configuration;
use album_viewer::control::ControlLine;
use album_viewer::events::{LoadComplete, LoadRequest, ViewerCommand, ViewerNotification};
use album_viewer::hooks::ChannelHooks;
use album_viewer::scan::{self, ScanOptions};
use album_viewer::surface::SlotElements;
use album_viewer::surface::headless::HeadlessSurface;
use album_viewer::{AlbumViewer, tasks};
use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Parser};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "album-viewer", about = "Cross-fading image album viewer")]
#[command(group(ArgGroup::new("source").required(true).args(["album", "dir"])))]
struct Cli {
    /// Path to YAML config file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Album descriptor (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    album: Option<PathBuf>,

    /// Build the album from the images in this directory
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Start the slideshow right away
    #[arg(long)]
    slideshow: bool,

    /// Run the slideshow in random order
    #[arg(long, requires = "slideshow")]
    random: bool,

    /// Index to show first (negative values count as out of range)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    start_at: Option<isize>,

    /// Seed for random navigation, overriding the config
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Exit after this long, e.g. `30s`
    #[arg(long, value_name = "DURATION")]
    run_for: Option<humantime::Duration>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive(format!("album_viewer={level}").parse()?)
        .add_directive(format!("album_model={level}").parse()?);
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = Configuration::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(seed) = cli.seed {
        cfg.random_seed = Some(seed);
    }
    let cfg = cfg.validated().context("validating configuration")?;

    let (descriptor, root) = album_source(&cli)?;

    let (load_tx, load_rx) = mpsc::channel::<LoadRequest>(16); // Surface -> Loader
    let (complete_tx, complete_rx) = mpsc::channel::<LoadComplete>(16); // Loader -> Controller
    let (command_tx, command_rx) = mpsc::channel::<ViewerCommand>(16); // Stdin -> Controller
    let (note_tx, note_rx) = mpsc::channel::<ViewerNotification>(64); // Hooks -> Logger

    let surface = HeadlessSurface::new(load_tx).with_elements(known_elements(&cfg));
    let max_in_flight = cfg.loader_max_concurrent_loads;
    let mut viewer = AlbumViewer::with_hooks(cfg, surface, ChannelHooks::new(note_tx))
        .context("building album viewer")?;
    viewer.load_album(descriptor).context("loading album")?;
    info!(instance = viewer.instance_id(), "viewer ready");

    let first = if cli.slideshow {
        ViewerCommand::SlideshowStart {
            randomly: cli.random,
            start_at: cli.start_at,
        }
    } else {
        ViewerCommand::SwitchTo(cli.start_at.unwrap_or(0))
    };
    command_tx
        .send(first)
        .await
        .context("queueing initial command")?;

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

    if let Some(run_for) = cli.run_for {
        let cancel = cancel.clone();
        let run_for: Duration = run_for.into();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(run_for) => {
                    info!(?run_for, "run time elapsed; initiating shutdown");
                    cancel.cancel();
                }
            }
        });
    }

    spawn_stdin_reader(command_tx, cancel.clone());

    let mut tasks = JoinSet::new();

    // Loader
    tasks.spawn({
        let cancel = cancel.clone();
        async move {
            tasks::loader::run(load_rx, complete_tx, root, cancel, max_in_flight)
                .await
                .context("loader task failed")
        }
    });

    // Notification log
    tasks.spawn(log_notifications(note_rx, cancel.clone()));

    // The controller owns the viewer; it returns once cancelled
    let viewer = tasks::controller::run(viewer, command_rx, complete_rx, cancel.clone())
        .await
        .context("controller task failed")?;
    info!(
        selected = ?viewer.selected_index(),
        history = viewer.history().len(),
        "viewer stopped"
    );
    drop(viewer);
    cancel.cancel();

    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task error: {e:?}"),
            Err(e) => tracing::error!("join error: {e}"),
        }
    }

    Ok(())
}

/// Album descriptor plus the directory its sources are resolved against.
fn album_source(cli: &Cli) -> Result<(AlbumDescriptor, PathBuf)> {
    if let Some(dir) = &cli.dir {
        let descriptor = scan::album_from_dir(dir, &ScanOptions::default())
            .with_context(|| format!("scanning {}", dir.display()))?;
        return Ok((descriptor, PathBuf::from(".")));
    }
    let file = cli.album.as_deref().context("either --album or --dir is required")?;
    let descriptor = scan::album_from_file(file)
        .with_context(|| format!("reading album {}", file.display()))?;
    let root = file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok((descriptor, root))
}

/// Elements the headless surface pretends already exist.
fn known_elements(cfg: &Configuration) -> Vec<String> {
    let mut known: Vec<String> = cfg.container.iter().cloned().collect();
    if let Some(ids) = &cfg.elements {
        known.extend(SlotElements::from_ids(ids).ids().map(str::to_string));
    }
    known
}

async fn log_notifications(
    mut notes: mpsc::Receiver<ViewerNotification>,
    cancel: CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            note = notes.recv() => match note {
                Some(ViewerNotification::Switched(index)) => info!(index, "switched"),
                Some(ViewerNotification::LoadingStarted) => info!("loading..."),
                Some(ViewerNotification::LoadingComplete) => info!("loading complete"),
                Some(ViewerNotification::Displayed(index)) => info!(index, "displayed"),
                None => break,
            },
        }
    }
    Ok(())
}

/// Forwards stdin control lines on a plain thread so a blocked read never
/// holds up runtime shutdown.
fn spawn_stdin_reader(commands: mpsc::Sender<ViewerCommand>, cancel: CancellationToken) {
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            let control = match line.parse::<ControlLine>() {
                Ok(control) => control,
                Err(err) => {
                    warn!("{err:#}");
                    continue;
                }
            };
            let delivered = match control {
                ControlLine::Quit => {
                    info!("quit requested; initiating shutdown");
                    cancel.cancel();
                    break;
                }
                ControlLine::State => print_snapshot(&commands),
                ControlLine::Find(name) => print_find(&commands, name),
                other => match other.into_command() {
                    Some(command) => commands.blocking_send(command).is_ok(),
                    None => true,
                },
            };
            if !delivered {
                debug!("viewer gone; stdin reader exiting");
                break;
            }
        }
        debug!("stdin closed");
    });
}

/// Returns `false` once the controller is gone.
fn print_snapshot(commands: &mpsc::Sender<ViewerCommand>) -> bool {
    let (reply, rx) = oneshot::channel();
    if commands.blocking_send(ViewerCommand::Snapshot { reply }).is_err() {
        return false;
    }
    let Ok(snapshot) = rx.blocking_recv() else {
        return false;
    };
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(err) => warn!("failed to encode snapshot: {err}"),
    }
    true
}

fn print_find(commands: &mpsc::Sender<ViewerCommand>, name: String) -> bool {
    let (reply, rx) = oneshot::channel();
    let command = ViewerCommand::FindImage {
        name: name.clone(),
        reply,
    };
    if commands.blocking_send(command).is_err() {
        return false;
    }
    let Ok(found) = rx.blocking_recv() else {
        return false;
    };
    match found {
        Some(index) => println!("{name}: {index}"),
        None => println!("{name}: not found"),
    }
    true
}
