use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, warn};

use super::AlbumViewer;
use super::transition::Transition;
use crate::hooks::ViewerHooks;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Slideshow {
    pub running: bool,
    pub random: bool,
}

impl<S: Surface, H: ViewerHooks> AlbumViewer<S, H> {
    /// Starts (or restarts) the slideshow.
    ///
    /// Random mode first jumps to a random index below the last one. Otherwise
    /// the show restarts from the first image when the last one is selected,
    /// jumps to `start_at` when given, or advances to the next image.
    pub fn slideshow_start(
        &mut self,
        randomly: bool,
        start_at: Option<isize>,
        now: Instant,
    ) -> Option<usize> {
        let Some(len) = self.album.as_ref().map(|album| album.len()) else {
            warn!(instance = self.instance, "slideshow start ignored: no album loaded");
            return None;
        };
        self.slideshow_stop();
        self.slideshow.running = true;
        if randomly {
            self.slideshow.random = true;
        }
        info!(
            instance = self.instance,
            random = self.slideshow.random,
            start_at,
            "slideshow started"
        );

        let switch = if self.slideshow.random {
            let upper = len.saturating_sub(1).max(1);
            let pick = self.rng.random_range(0..upper);
            self.switch(pick as isize, now)
        } else if self.selected == Some(len - 1) {
            self.switch(0, now)
        } else if let Some(start_at) = start_at {
            self.switch(start_at, now)
        } else {
            self.switch(self.current() + 1, now)
        };

        let switch = switch?;
        if !switch.changed && self.transition == Transition::Idle {
            // nothing to fade to, so no settle will schedule the next advance
            self.timers.advance = Some(now + self.cfg.slideshow_delay);
        }
        Some(switch.index)
    }

    /// Stops the slideshow, cancels every pending deadline and detaches both
    /// slots' load callbacks. In-flight transfers are not aborted; their
    /// completions are ignored.
    pub fn slideshow_stop(&mut self) {
        if self.slideshow.running {
            info!(instance = self.instance, "slideshow stopped");
        }
        self.timers.clear();
        self.slots.detach_all();
        self.slideshow.running = false;
    }

    /// Returns whether the slideshow runs afterwards.
    pub fn slideshow_toggle(&mut self, now: Instant) -> bool {
        if self.slideshow.running {
            self.slideshow_stop();
        } else {
            self.slideshow_start(false, None, now);
        }
        self.slideshow.running
    }

    pub fn slideshow_running(&self) -> bool {
        self.slideshow.running
    }

    pub fn slideshow_random(&self) -> bool {
        self.slideshow.random
    }

    pub fn set_slideshow_random(&mut self, random: bool) {
        self.slideshow.random = random;
    }

    pub(super) fn advance(&mut self, now: Instant) {
        if !self.slideshow.running {
            return;
        }
        debug!(instance = self.instance, random = self.slideshow.random, "slideshow advance");
        if self.slideshow.random {
            self.image_random(now);
        } else {
            self.image_next(now);
        }
    }
}
