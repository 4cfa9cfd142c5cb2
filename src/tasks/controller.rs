use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio::time::{Instant as TokioInstant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::events::{LoadComplete, ViewerCommand};
use crate::hooks::ViewerHooks;
use crate::surface::Surface;
use crate::viewer::AlbumViewer;

// Sleep target while no deadline is armed; the branch is disabled anyway.
const IDLE_WAKE: Duration = Duration::from_secs(86_400);

/// Owns the viewer: applies commands, feeds load completions back and fires
/// deadlines as they come due.
///
/// Returns the viewer (shut down) once cancelled, or once both input channels
/// are closed and no deadline is left.
pub async fn run<S: Surface, H: ViewerHooks>(
    mut viewer: AlbumViewer<S, H>,
    mut commands: Receiver<ViewerCommand>,
    mut completions: Receiver<LoadComplete>,
    cancel: CancellationToken,
) -> Result<AlbumViewer<S, H>> {
    let mut commands_open = true;
    let mut completions_open = true;

    loop {
        let deadline = viewer.next_deadline();
        let wake = deadline.map_or_else(|| TokioInstant::now() + IDLE_WAKE, TokioInstant::from_std);

        select! {
            biased;

            _ = cancel.cancelled() => break,

            command = commands.recv(), if commands_open => match command {
                Some(command) => apply_command(&mut viewer, command, now()),
                None => {
                    debug!("command channel closed");
                    commands_open = false;
                }
            },

            complete = completions.recv(), if completions_open => match complete {
                Some(complete) => {
                    viewer.on_load_complete(complete, now());
                }
                None => {
                    debug!("completion channel closed");
                    completions_open = false;
                }
            },

            _ = sleep_until(wake), if deadline.is_some() => viewer.on_tick(now()),
        }

        if !commands_open && !completions_open && viewer.next_deadline().is_none() {
            break;
        }
    }

    viewer.shutdown();
    Ok(viewer)
}

/// Applies a single command at `now`.
pub fn apply_command<S: Surface, H: ViewerHooks>(
    viewer: &mut AlbumViewer<S, H>,
    command: ViewerCommand,
    now: Instant,
) {
    match command {
        ViewerCommand::LoadAlbum(descriptor) => {
            if let Err(err) = viewer.load_album(descriptor) {
                warn!("album rejected: {err}");
            }
        }
        ViewerCommand::SwitchTo(requested) => {
            viewer.switch_to(requested, now);
        }
        ViewerCommand::Next => {
            viewer.image_next(now);
        }
        ViewerCommand::Previous => {
            viewer.image_previous(now);
        }
        ViewerCommand::Random => {
            viewer.image_random(now);
        }
        ViewerCommand::SlideshowStart { randomly, start_at } => {
            viewer.slideshow_start(randomly, start_at, now);
        }
        ViewerCommand::SlideshowStop => viewer.slideshow_stop(),
        ViewerCommand::SlideshowToggle => {
            viewer.slideshow_toggle(now);
        }
        ViewerCommand::SetEndless(endless) => viewer.set_endless_album(endless),
        ViewerCommand::FindImage { name, reply } => {
            let _ = reply.send(viewer.find_image_id(&name));
        }
        ViewerCommand::Snapshot { reply } => {
            let _ = reply.send(viewer.snapshot());
        }
    }
}

// Tokio's clock, so paused test runtimes drive the viewer's deadlines too.
fn now() -> Instant {
    TokioInstant::now().into_std()
}
