use serde::Serialize;

use crate::events::{LoadTicket, SlotId};

pub const OPAQUE: u8 = 100;
pub const TRANSPARENT: u8 = 0;

/// Completion callback registered on a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "state", content = "ticket")]
pub enum SlotLoad {
    /// No callback; completions for this slot are ignored.
    Idle,
    /// Waiting for the load carrying this ticket.
    Loading(LoadTicket),
    /// Loaded and fading in; cleared once the transition settles.
    Loaded(LoadTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlotState {
    pub transparency: u8,
    pub load: SlotLoad,
    /// Album index shown in, or being loaded into, this slot.
    pub bound_index: Option<usize>,
}

impl SlotState {
    fn with_transparency(transparency: u8) -> Self {
        Self {
            transparency,
            load: SlotLoad::Idle,
            bound_index: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.load != SlotLoad::Idle
    }

    pub fn is_rendered(&self) -> bool {
        self.transparency > TRANSPARENT
    }
}

/// The two display slots and which of them is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPair {
    slots: [SlotState; 2],
    visible: SlotId,
}

impl Default for SlotPair {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotPair {
    /// Baseline: nothing loaded, the first slot fully visible.
    pub fn new() -> Self {
        Self {
            slots: [
                SlotState::with_transparency(OPAQUE),
                SlotState::with_transparency(TRANSPARENT),
            ],
            visible: SlotId::First,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn visible(&self) -> SlotId {
        self.visible
    }

    pub fn hidden(&self) -> SlotId {
        self.visible.other()
    }

    pub fn get(&self, slot: SlotId) -> &SlotState {
        &self.slots[slot.index()]
    }

    pub(super) fn get_mut(&mut self, slot: SlotId) -> &mut SlotState {
        &mut self.slots[slot.index()]
    }

    /// Registers the callback for `ticket`, replacing any earlier one.
    pub(super) fn register(&mut self, slot: SlotId, ticket: LoadTicket, index: usize) {
        let state = self.get_mut(slot);
        state.load = SlotLoad::Loading(ticket);
        state.bound_index = Some(index);
    }

    /// Marks `ticket` as loaded if it is the callback registered on `slot`.
    pub(super) fn complete(&mut self, slot: SlotId, ticket: LoadTicket) -> bool {
        let state = self.get_mut(slot);
        if state.load != SlotLoad::Loading(ticket) {
            return false;
        }
        state.load = SlotLoad::Loaded(ticket);
        true
    }

    pub(super) fn detach(&mut self, slot: SlotId) {
        self.get_mut(slot).load = SlotLoad::Idle;
    }

    pub(super) fn detach_all(&mut self) {
        for slot in SlotId::BOTH {
            self.detach(slot);
        }
    }

    pub(super) fn make_visible(&mut self, slot: SlotId) {
        self.visible = slot;
    }

    pub fn is_at_rest(&self) -> bool {
        self.get(self.visible).transparency == OPAQUE
            && self.get(self.hidden()).transparency == TRANSPARENT
    }
}
