use std::time::Instant;

/// Deadlines owned by one viewer instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Timers {
    pub fade_step: Option<Instant>,
    pub advance: Option<Instant>,
    pub loading_grace: Option<Instant>,
}

impl Timers {
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.loading_grace, self.fade_step, self.advance]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Disarms `deadline` and reports `true` when it is due at `now`.
pub(crate) fn take_if_due(deadline: &mut Option<Instant>, now: Instant) -> bool {
    match *deadline {
        Some(at) if at <= now => {
            *deadline = None;
            true
        }
        _ => false,
    }
}
