use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, trace};

use super::AlbumViewer;
use super::slots::{OPAQUE, SlotLoad, SlotPair, TRANSPARENT};
use crate::events::{LoadPurpose, SlotId};
use crate::hooks::ViewerHooks;
use crate::surface::Surface;

/// At most one fade runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "state")]
pub enum Transition {
    Idle,
    /// `target` is fading in while the visible slot fades out. `index` is the
    /// image whose load started the fade; a later switch may rebind the slot.
    Fading { target: SlotId, index: Option<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeProgress {
    Continue,
    Settled,
}

/// Moves `target` one step toward opaque and the other slot one step toward
/// transparent, both clamped to `0..=100`.
pub fn step(slots: &mut SlotPair, target: SlotId, amount: u8) -> FadeProgress {
    let incoming = slots.get_mut(target);
    incoming.transparency = incoming.transparency.saturating_add(amount).min(OPAQUE);
    let incoming = incoming.transparency;

    let outgoing = slots.get_mut(target.other());
    outgoing.transparency = outgoing.transparency.saturating_sub(amount);
    let outgoing = outgoing.transparency;

    if incoming == OPAQUE && outgoing == TRANSPARENT {
        FadeProgress::Settled
    } else {
        FadeProgress::Continue
    }
}

impl<S: Surface, H: ViewerHooks> AlbumViewer<S, H> {
    /// Runs one fade step and either re-arms the step deadline or settles.
    pub(super) fn fade_step(&mut self, now: Instant) {
        let Transition::Fading { target, .. } = self.transition else {
            return;
        };
        let progress = step(&mut self.slots, target, self.cfg.fade_step);

        let outgoing = target.other();
        if self.cfg.fade_both {
            self.surface
                .set_transparency(outgoing, self.slots.get(outgoing).transparency);
        }
        self.surface
            .set_transparency(target, self.slots.get(target).transparency);
        for slot in SlotId::BOTH {
            self.surface
                .set_rendered(slot, self.slots.get(slot).is_rendered());
        }
        trace!(
            instance = self.instance,
            %target,
            incoming = self.slots.get(target).transparency,
            outgoing = self.slots.get(outgoing).transparency,
            "fade step"
        );

        match progress {
            FadeProgress::Continue => self.timers.fade_step = Some(now + self.cfg.fade_time),
            FadeProgress::Settled => self.settle(now),
        }
    }

    /// Hands visibility to the faded-in slot, prefetches the following image
    /// into the slot that just went dark, and schedules the next slideshow advance.
    fn settle(&mut self, now: Instant) {
        let Transition::Fading { target, index } = self.transition else {
            return;
        };
        self.transition = Transition::Idle;
        self.timers.fade_step = None;
        self.slots.make_visible(target);
        self.slots.detach(target);

        info!(instance = self.instance, slot = %target, index = ?index, "transition settled");
        if let Some(index) = index {
            self.hooks.on_displayed(index);
        }

        let hidden = target.other();
        if self.slots.get(hidden).load == SlotLoad::Idle {
            self.prefetch(hidden);
        }

        if self.slideshow.running {
            let due = now + self.cfg.slideshow_delay;
            debug!(
                instance = self.instance,
                delay_ms = self.cfg.slideshow_delay.as_millis() as u64,
                "slideshow advance scheduled"
            );
            self.timers.advance = Some(due);
        }
    }

    /// Loads the image after the selected one without registering a callback.
    fn prefetch(&mut self, slot: SlotId) {
        let Some(album) = self.album.as_ref() else {
            return;
        };
        let next = album.resolve(self.current() + 1, self.cfg.endless_album);
        let ticket = self.issue_ticket();
        let Some(request) = self.load_request(slot, ticket, next, LoadPurpose::Prefetch) else {
            return;
        };
        self.slots.get_mut(slot).bound_index = Some(next);
        self.surface.begin_load(request);
    }
}
