//! Overridable extension points invoked by the viewer.

use album_model::Album;
use tokio::sync::mpsc::Sender;
use tracing::warn;

use crate::events::ViewerNotification;

/// Hooks with default bodies; override any subset.
///
/// `get_*` hooks are only called with indices of defined album entries.
pub trait ViewerHooks {
    /// The selected image changed; fires before its load completes.
    fn on_switch_to(&mut self, _index: usize) {}

    /// A load has been outstanding longer than the loading grace period.
    fn loading_started(&mut self) {}

    /// Neither slot has an outstanding load any more.
    fn loading_complete(&mut self) {}

    /// A transition settled with `index` fully visible.
    fn on_displayed(&mut self, _index: usize) {}

    /// Source the surface loads for `index`.
    fn get_src(&self, album: &Album, index: usize) -> String {
        default_source(album, index)
    }

    /// Alternative text for `index`.
    fn get_alt(&self, album: &Album, index: usize) -> String {
        let name = album.file_name(index).unwrap_or_default();
        match name.rfind('/') {
            Some(pos) => name[pos + 1..].to_string(),
            None => name.to_string(),
        }
    }

    /// Link target for `index`.
    fn get_link(&self, album: &Album, index: usize) -> String {
        default_source(album, index)
    }
}

/// File name of `index` prefixed by the album location, if any.
pub fn default_source(album: &Album, index: usize) -> String {
    let name = album.file_name(index).unwrap_or_default();
    match album.location() {
        Some(location) => format!("{location}{name}"),
        None => name.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl ViewerHooks for DefaultHooks {}

/// Forwards every signal as a [`ViewerNotification`].
#[derive(Debug, Clone)]
pub struct ChannelHooks {
    tx: Sender<ViewerNotification>,
}

impl ChannelHooks {
    pub fn new(tx: Sender<ViewerNotification>) -> Self {
        Self { tx }
    }

    fn notify(&self, notification: ViewerNotification) {
        if let Err(err) = self.tx.try_send(notification) {
            warn!(?notification, "dropping viewer notification: {err}");
        }
    }
}

impl ViewerHooks for ChannelHooks {
    fn on_switch_to(&mut self, index: usize) {
        self.notify(ViewerNotification::Switched(index));
    }

    fn loading_started(&mut self) {
        self.notify(ViewerNotification::LoadingStarted);
    }

    fn loading_complete(&mut self) {
        self.notify(ViewerNotification::LoadingComplete);
    }

    fn on_displayed(&mut self, index: usize) {
        self.notify(ViewerNotification::Displayed(index));
    }
}
