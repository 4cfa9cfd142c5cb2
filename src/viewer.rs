//! Album viewer core: navigation, the two-slot cross-fade and the slideshow.
//!
//! The viewer is a single-threaded state machine. Every entry point takes the
//! current instant; timers are deadlines the owner polls through
//! [`AlbumViewer::next_deadline`] and fires with [`AlbumViewer::on_tick`].
//! Image loads are started through the [`Surface`] and reported back with
//! [`AlbumViewer::on_load_complete`].

mod slideshow;
mod slots;
mod timers;
mod transition;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use album_model::{Album, AlbumDescriptor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

pub use slots::{OPAQUE, SlotLoad, SlotPair, SlotState, TRANSPARENT};
pub use transition::{FadeProgress, Transition, step as fade_step};

use crate::config::Configuration;
use crate::error::Error;
use crate::events::{LoadComplete, LoadPurpose, LoadRequest, LoadTicket, SlotId};
use crate::hooks::{DefaultHooks, ViewerHooks};
use crate::surface::{SlotElements, Surface};
use slideshow::Slideshow;
use timers::{Timers, take_if_due};

static INSTANCES: AtomicU64 = AtomicU64::new(0);

fn next_instance_id() -> u64 {
    INSTANCES.fetch_add(1, Ordering::Relaxed) + 1
}

#[derive(Debug, Clone, Copy, Default)]
struct LoadingSignal {
    active: bool,
    started_signalled: bool,
}

#[derive(Debug, Clone, Copy)]
struct Switch {
    index: usize,
    changed: bool,
}

pub struct AlbumViewer<S: Surface, H: ViewerHooks = DefaultHooks> {
    instance: u64,
    cfg: Configuration,
    elements: SlotElements,
    surface: S,
    hooks: H,
    album: Option<Album>,
    selected: Option<usize>,
    selected_source: Option<String>,
    history: VecDeque<usize>,
    slots: SlotPair,
    transition: Transition,
    slideshow: Slideshow,
    timers: Timers,
    loading: LoadingSignal,
    next_ticket: u64,
    rng: StdRng,
}

impl<S: Surface> AlbumViewer<S, DefaultHooks> {
    pub fn new(cfg: Configuration, surface: S) -> Result<Self, Error> {
        Self::with_hooks(cfg, surface, DefaultHooks)
    }
}

impl<S: Surface, H: ViewerHooks> AlbumViewer<S, H> {
    /// Binds a viewer to its slot elements.
    ///
    /// When `cfg.container` names a known element the default scaffold is
    /// built inside it; otherwise the pre-built `cfg.elements` are used. Fails
    /// with [`Error::MissingElements`] when any required element is absent.
    pub fn with_hooks(cfg: Configuration, mut surface: S, hooks: H) -> Result<Self, Error> {
        let instance = next_instance_id();

        let scaffold = match cfg.container.as_deref() {
            Some(container) if surface.has_element(container) => {
                let elements = SlotElements::scaffold(instance, cfg.enable_links);
                surface
                    .build_scaffold(container, &elements, &cfg.blank_image)
                    .then_some(elements)
            }
            _ => None,
        };
        let elements = scaffold
            .or_else(|| cfg.elements.as_ref().map(SlotElements::from_ids))
            .ok_or_else(|| {
                Error::MissingElements(vec![
                    cfg.container.clone().unwrap_or_else(|| "container".to_string()),
                ])
            })?;
        let missing = elements.missing(&surface, cfg.enable_links);
        if !missing.is_empty() {
            return Err(Error::MissingElements(missing));
        }

        let rng = match cfg.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let slideshow = Slideshow {
            running: false,
            random: cfg.slideshow_random,
        };

        let mut viewer = Self {
            instance,
            cfg,
            elements,
            surface,
            hooks,
            album: None,
            selected: None,
            selected_source: None,
            history: VecDeque::new(),
            slots: SlotPair::new(),
            transition: Transition::Idle,
            slideshow,
            timers: Timers::default(),
            loading: LoadingSignal::default(),
            next_ticket: 0,
            rng,
        };
        viewer.apply_slots();
        debug!(instance, "album viewer constructed");
        Ok(viewer)
    }

    /// Replaces the album and resets the viewer to its baseline.
    ///
    /// The descriptor is validated first; on error nothing changes.
    pub fn load_album(&mut self, descriptor: AlbumDescriptor) -> Result<(), Error> {
        let album = Album::from_descriptor(descriptor)?;

        self.slideshow_stop();
        self.timers.clear();
        self.transition = Transition::Idle;
        self.loading = LoadingSignal::default();
        self.selected = None;
        self.selected_source = None;
        self.history.clear();
        self.slots.reset();
        self.apply_slots();

        info!(
            instance = self.instance,
            album = album.name(),
            images = album.len(),
            location = album.location(),
            "album loaded"
        );
        self.album = Some(album);
        Ok(())
    }

    /// Selects `requested` (coerced into range) and starts loading it into
    /// the hidden slot. Returns the resolved index, or `None` without an album.
    pub fn switch_to(&mut self, requested: isize, now: Instant) -> Option<usize> {
        self.switch(requested, now).map(|switch| switch.index)
    }

    pub fn image_next(&mut self, now: Instant) -> Option<usize> {
        self.switch_to(self.current() + 1, now)
    }

    pub fn image_previous(&mut self, now: Instant) -> Option<usize> {
        self.switch_to(self.current() - 1, now)
    }

    /// Switches to a uniformly random index other than the selected one.
    ///
    /// Albums of two images or fewer simply advance to the next image. The
    /// pick is made over raw positions, so in an album with holes a hole can
    /// resolve forward onto the selection and the switch becomes a no-op.
    pub fn image_random(&mut self, now: Instant) -> Option<usize> {
        let len = self.album.as_ref()?.len();
        let target = if len > 2 {
            // unbounded rejection sampling; terminates since len > 2
            loop {
                let pick = self.rng.random_range(0..len);
                if Some(pick) != self.selected {
                    break pick as isize;
                }
            }
        } else {
            self.current() + 1
        };
        self.switch_to(target, now)
    }

    /// Index of the first image named `name`.
    pub fn find_image_id(&self, name: &str) -> Option<usize> {
        self.album.as_ref()?.position(name)
    }

    /// Coerces `requested` into a displayable index.
    pub fn safe_image_id(&self, requested: isize) -> Option<usize> {
        let album = self.album.as_ref()?;
        Some(album.resolve(requested, self.cfg.endless_album))
    }

    /// Reports a finished load. Completions for superseded or unregistered
    /// loads are ignored; returns whether this one was accepted.
    pub fn on_load_complete(&mut self, complete: LoadComplete, now: Instant) -> bool {
        let LoadComplete { slot, ticket } = complete;
        if slot == self.slots.visible() {
            trace!(instance = self.instance, %slot, ticket = ticket.0, "ignoring load into visible slot");
            return false;
        }
        if !self.slots.complete(slot, ticket) {
            trace!(instance = self.instance, %slot, ticket = ticket.0, "ignoring superseded load");
            return false;
        }
        debug!(instance = self.instance, %slot, ticket = ticket.0, "load complete");

        self.timers.fade_step = None;
        self.timers.advance = None;
        self.transition = Transition::Fading {
            target: slot,
            index: self.slots.get(slot).bound_index,
        };
        self.fade_step(now);

        if self.loading.active && !self.slots.get(slot.other()).is_pending() {
            self.loading = LoadingSignal::default();
            self.timers.loading_grace = None;
            self.hooks.loading_complete();
        }
        true
    }

    /// Fires every deadline due at `now`: loading grace, then fade step, then
    /// slideshow advance.
    pub fn on_tick(&mut self, now: Instant) {
        if take_if_due(&mut self.timers.loading_grace, now)
            && self.loading.active
            && !self.loading.started_signalled
        {
            self.loading.started_signalled = true;
            debug!(instance = self.instance, "loading started");
            self.hooks.loading_started();
        }
        if take_if_due(&mut self.timers.fade_step, now) {
            self.fade_step(now);
        }
        if take_if_due(&mut self.timers.advance, now) {
            self.advance(now);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Stops the slideshow and disarms every deadline.
    pub fn shutdown(&mut self) {
        self.slideshow_stop();
        self.timers.clear();
        debug!(instance = self.instance, "album viewer shut down");
    }

    pub fn instance_id(&self) -> u64 {
        self.instance
    }

    pub fn config(&self) -> &Configuration {
        &self.cfg
    }

    pub fn elements(&self) -> &SlotElements {
        &self.elements
    }

    pub fn album(&self) -> Option<&Album> {
        self.album.as_ref()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_source(&self) -> Option<&str> {
        self.selected_source.as_deref()
    }

    /// Previously selected indices, most recent first.
    pub fn history(&self) -> &VecDeque<usize> {
        &self.history
    }

    pub fn slots(&self) -> &SlotPair {
        &self.slots
    }

    pub fn is_fading(&self) -> bool {
        matches!(self.transition, Transition::Fading { .. })
    }

    pub fn endless_album(&self) -> bool {
        self.cfg.endless_album
    }

    pub fn set_endless_album(&mut self, endless: bool) {
        self.cfg.endless_album = endless;
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        let slot = |id: SlotId| {
            let state = self.slots.get(id);
            SlotSnapshot {
                slot: id,
                transparency: state.transparency,
                visible: self.slots.visible() == id,
                pending: state.is_pending(),
                bound_index: state.bound_index,
            }
        };
        ViewerSnapshot {
            instance: self.instance,
            album: self.album.as_ref().map(|album| album.name().to_string()),
            album_len: self.album.as_ref().map_or(0, Album::len),
            selected_index: self.selected,
            selected_source: self.selected_source.clone(),
            history: self.history.iter().copied().collect(),
            slideshow_running: self.slideshow.running,
            slideshow_random: self.slideshow.random,
            endless_album: self.cfg.endless_album,
            fading: self.is_fading(),
            slots: [slot(SlotId::First), slot(SlotId::Second)],
        }
    }

    fn switch(&mut self, requested: isize, now: Instant) -> Option<Switch> {
        let Some(album) = self.album.as_ref() else {
            warn!(instance = self.instance, requested, "switch ignored: no album loaded");
            return None;
        };
        let index = album.resolve(requested, self.cfg.endless_album);
        let random_show = self.slideshow.running && self.slideshow.random;
        if self.selected == Some(index) && !random_show {
            trace!(instance = self.instance, index, "already selected");
            if self.is_fading() && self.timers.fade_step.is_none() {
                // a stop froze the fade; let it finish so the slots settle
                debug!(instance = self.instance, index, "resuming frozen fade");
                self.timers.fade_step = Some(now);
            }
            return Some(Switch {
                index,
                changed: false,
            });
        }
        let source = album.file_name(index).map(str::to_string);

        if let Some(current) = self.selected {
            self.history.push_front(current);
        }
        self.selected = Some(index);
        self.selected_source = source;

        self.loading.active = true;
        if !self.loading.started_signalled && self.timers.loading_grace.is_none() {
            self.timers.loading_grace = Some(now + self.cfg.loading_grace);
        }

        let slot = self.slots.hidden();
        let ticket = self.issue_ticket();
        self.slots.register(slot, ticket, index);
        if let Some(request) = self.load_request(slot, ticket, index, LoadPurpose::Display) {
            self.surface.begin_load(request);
        }
        info!(
            instance = self.instance,
            requested,
            index,
            source = self.selected_source.as_deref(),
            %slot,
            "switching image"
        );
        self.hooks.on_switch_to(index);
        Some(Switch {
            index,
            changed: true,
        })
    }

    /// Selected index, or -1 before the first switch.
    fn current(&self) -> isize {
        self.selected.map_or(-1, |index| index as isize)
    }

    fn issue_ticket(&mut self) -> LoadTicket {
        self.next_ticket += 1;
        LoadTicket(self.next_ticket)
    }

    fn load_request(
        &self,
        slot: SlotId,
        ticket: LoadTicket,
        index: usize,
        purpose: LoadPurpose,
    ) -> Option<LoadRequest> {
        let album = self.album.as_ref()?;
        Some(LoadRequest {
            slot,
            ticket,
            index,
            source: self.hooks.get_src(album, index),
            alt: self.hooks.get_alt(album, index),
            link: self
                .cfg
                .enable_links
                .then(|| self.hooks.get_link(album, index)),
            purpose,
        })
    }

    fn apply_slots(&mut self) {
        for slot in SlotId::BOTH {
            let state = self.slots.get(slot);
            self.surface.set_transparency(slot, state.transparency);
            self.surface.set_rendered(slot, state.is_rendered());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlotSnapshot {
    pub slot: SlotId,
    pub transparency: u8,
    pub visible: bool,
    pub pending: bool,
    pub bound_index: Option<usize>,
}

/// Point-in-time view of a viewer, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ViewerSnapshot {
    pub instance: u64,
    pub album: Option<String>,
    pub album_len: usize,
    pub selected_index: Option<usize>,
    pub selected_source: Option<String>,
    pub history: Vec<usize>,
    pub slideshow_running: bool,
    pub slideshow_random: bool,
    pub endless_album: bool,
    pub fading: bool,
    pub slots: [SlotSnapshot; 2],
}
