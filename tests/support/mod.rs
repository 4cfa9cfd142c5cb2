#![allow(dead_code)]

use std::collections::HashSet;
use std::time::{Duration, Instant};

use album_model::AlbumDescriptor;
use album_viewer::AlbumViewer;
use album_viewer::config::Configuration;
use album_viewer::events::{LoadComplete, LoadPurpose, LoadRequest, SlotId};
use album_viewer::hooks::ViewerHooks;
use album_viewer::surface::{SlotElements, Surface};

pub const CONTAINER: &str = "stage";

/// Surface that remembers everything the viewer asked of it.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub elements: HashSet<String>,
    pub transparency: [u8; 2],
    pub rendered: [bool; 2],
    pub loads: Vec<LoadRequest>,
}

impl RecordingSurface {
    pub fn with_elements<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            elements: ids.into_iter().map(str::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn display_loads(&self) -> Vec<&LoadRequest> {
        self.loads
            .iter()
            .filter(|request| request.purpose == LoadPurpose::Display)
            .collect()
    }

    pub fn last_display_load(&self) -> &LoadRequest {
        self.display_loads()
            .pop()
            .expect("no display load was requested")
    }

    pub fn transparency(&self, slot: SlotId) -> u8 {
        self.transparency[slot.index()]
    }

    pub fn rendered(&self, slot: SlotId) -> bool {
        self.rendered[slot.index()]
    }
}

impl Surface for RecordingSurface {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains(id)
    }

    fn build_scaffold(&mut self, container: &str, elements: &SlotElements, _blank: &str) -> bool {
        if !self.has_element(container) {
            return false;
        }
        self.elements.extend(elements.ids().map(str::to_string));
        true
    }

    fn set_transparency(&mut self, slot: SlotId, transparency: u8) {
        self.transparency[slot.index()] = transparency;
    }

    fn set_rendered(&mut self, slot: SlotId, rendered: bool) {
        self.rendered[slot.index()] = rendered;
    }

    fn begin_load(&mut self, request: LoadRequest) {
        self.loads.push(request);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Switched(usize),
    LoadingStarted,
    LoadingComplete,
    Displayed(usize),
}

#[derive(Debug, Default)]
pub struct RecordingHooks {
    pub signals: Vec<Signal>,
}

impl ViewerHooks for RecordingHooks {
    fn on_switch_to(&mut self, index: usize) {
        self.signals.push(Signal::Switched(index));
    }

    fn loading_started(&mut self) {
        self.signals.push(Signal::LoadingStarted);
    }

    fn loading_complete(&mut self) {
        self.signals.push(Signal::LoadingComplete);
    }

    fn on_displayed(&mut self, index: usize) {
        self.signals.push(Signal::Displayed(index));
    }
}

pub type TestViewer = AlbumViewer<RecordingSurface, RecordingHooks>;

pub fn config() -> Configuration {
    Configuration {
        container: Some(CONTAINER.to_string()),
        random_seed: Some(7),
        ..Configuration::default()
    }
}

pub fn album(len: usize) -> AlbumDescriptor {
    let names: Vec<String> = (0..len).map(|i| format!("img{i}.jpg")).collect();
    AlbumDescriptor::new("test", names)
}

pub fn viewer_with(cfg: Configuration, descriptor: AlbumDescriptor) -> TestViewer {
    let surface = RecordingSurface::with_elements([CONTAINER]);
    let mut viewer =
        AlbumViewer::with_hooks(cfg, surface, RecordingHooks::default()).expect("viewer");
    viewer.load_album(descriptor).expect("album");
    viewer
}

pub fn viewer(len: usize) -> TestViewer {
    viewer_with(config(), album(len))
}

/// Completes the most recent display load at `now`.
pub fn complete_latest(viewer: &mut TestViewer, now: Instant) -> bool {
    let complete = LoadComplete::from(viewer.surface().last_display_load());
    viewer.on_load_complete(complete, now)
}

/// Fires fade deadlines until the transition settles; returns the settle instant.
pub fn finish_fade(viewer: &mut TestViewer, mut now: Instant) -> Instant {
    while viewer.is_fading() {
        now = viewer.next_deadline().expect("fade deadline armed");
        viewer.on_tick(now);
    }
    now
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
