use std::fmt;

use album_model::AlbumDescriptor;
use serde::Serialize;
use tokio::sync::oneshot;

use crate::viewer::ViewerSnapshot;

/// One of the two alternating display slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotId {
    First,
    Second,
}

impl SlotId {
    pub const BOTH: [SlotId; 2] = [SlotId::First, SlotId::Second];

    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// 1-based number used in element ids.
    pub fn number(self) -> usize {
        self.index() + 1
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.number())
    }
}

/// Identifies a single load request; completions carrying a stale ticket are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LoadTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPurpose {
    /// The viewer waits for this load before fading.
    Display,
    /// Speculative load of the image after the one on screen.
    Prefetch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub slot: SlotId,
    pub ticket: LoadTicket,
    pub index: usize,
    pub source: String,
    pub alt: String,
    pub link: Option<String>,
    pub purpose: LoadPurpose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadComplete {
    pub slot: SlotId,
    pub ticket: LoadTicket,
}

impl From<&LoadRequest> for LoadComplete {
    fn from(request: &LoadRequest) -> Self {
        Self {
            slot: request.slot,
            ticket: request.ticket,
        }
    }
}

/// Signals raised by the viewer through its hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerNotification {
    Switched(usize),
    LoadingStarted,
    LoadingComplete,
    Displayed(usize),
}

#[derive(Debug)]
pub enum ViewerCommand {
    LoadAlbum(AlbumDescriptor),
    SwitchTo(isize),
    Next,
    Previous,
    Random,
    SlideshowStart {
        randomly: bool,
        start_at: Option<isize>,
    },
    SlideshowStop,
    SlideshowToggle,
    SetEndless(bool),
    FindImage {
        name: String,
        reply: oneshot::Sender<Option<usize>>,
    },
    Snapshot {
        reply: oneshot::Sender<ViewerSnapshot>,
    },
}
