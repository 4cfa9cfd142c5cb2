use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::events::{LoadComplete, LoadPurpose, LoadRequest};

/// Reads just enough of the file to know it is a decodable image.
fn probe_image(path: &Path) -> Result<(u32, u32)> {
    let dimensions = image::ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(dimensions)
}

/// Local path for a load source; remote sources are not supported.
fn resolve_source(root: &Path, source: &str) -> Result<PathBuf> {
    if source.contains("://") {
        bail!("unsupported remote source {source}");
    }
    Ok(root.join(source))
}

/// Image loader:
/// - resolves each request's source against `root` and probes it off the runtime;
/// - reports success as a [`LoadComplete`];
/// - logs failures and reports nothing, leaving the slot waiting.
pub async fn run(
    mut requests: Receiver<LoadRequest>,
    completions: Sender<LoadComplete>,
    root: PathBuf,
    cancel: CancellationToken,
    max_in_flight: usize,
) -> Result<()> {
    let mut tasks: JoinSet<(LoadRequest, Result<(u32, u32)>)> = JoinSet::new();

    loop {
        select! {
            _ = cancel.cancelled() => break,

            // Accept new requests while under the limit
            Some(request) = requests.recv(), if tasks.len() < max_in_flight => {
                let path = match resolve_source(&root, &request.source) {
                    Ok(path) => path,
                    Err(err) => {
                        warn!(slot = %request.slot, index = request.index, "load failed: {err}");
                        continue;
                    }
                };
                tasks.spawn(async move {
                    let res = tokio::task::spawn_blocking(move || probe_image(&path)).await;
                    let res = res.unwrap_or_else(|err| Err(err.into()));
                    (request, res)
                });
            }

            Some(joined) = tasks.join_next() => {
                let Ok((request, res)) = joined else {
                    continue;
                };
                match res {
                    Ok((width, height)) => {
                        debug!(
                            slot = %request.slot,
                            index = request.index,
                            source = %request.source,
                            width,
                            height,
                            prefetch = request.purpose == LoadPurpose::Prefetch,
                            "image loaded"
                        );
                        if completions.send(LoadComplete::from(&request)).await.is_err() {
                            debug!("completion receiver dropped; loader exiting");
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(
                            slot = %request.slot,
                            index = request.index,
                            source = %request.source,
                            "load failed: {err:#}"
                        );
                    }
                }
            }

            else => break,
        }
    }
    Ok(())
}
