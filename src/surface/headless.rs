use std::collections::HashSet;

use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace, warn};

use super::{SlotElements, Surface};
use crate::events::{LoadRequest, SlotId};

/// Surface without a display: records slot state, logs it, and hands load
/// requests to the loader task.
#[derive(Debug)]
pub struct HeadlessSurface {
    elements: HashSet<String>,
    transparency: [u8; 2],
    rendered: [bool; 2],
    sources: [Option<String>; 2],
    to_loader: Sender<LoadRequest>,
}

impl HeadlessSurface {
    pub fn new(to_loader: Sender<LoadRequest>) -> Self {
        Self {
            elements: HashSet::new(),
            transparency: [0; 2],
            rendered: [true; 2],
            sources: [None, None],
            to_loader,
        }
    }

    /// Declares pre-existing elements (a container or hand-built slots).
    pub fn with_elements<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn transparency(&self, slot: SlotId) -> u8 {
        self.transparency[slot.index()]
    }

    pub fn is_rendered(&self, slot: SlotId) -> bool {
        self.rendered[slot.index()]
    }

    pub fn source(&self, slot: SlotId) -> Option<&str> {
        self.sources[slot.index()].as_deref()
    }
}

impl Surface for HeadlessSurface {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains(id)
    }

    fn build_scaffold(
        &mut self,
        container: &str,
        elements: &SlotElements,
        blank_image: &str,
    ) -> bool {
        if !self.has_element(container) {
            return false;
        }
        let ids: Vec<String> = elements.ids().map(str::to_string).collect();
        debug!(container, ?ids, blank_image, "built default slot scaffold");
        self.elements.extend(ids);
        self.sources = [Some(blank_image.to_string()), Some(blank_image.to_string())];
        true
    }

    fn set_transparency(&mut self, slot: SlotId, transparency: u8) {
        trace!(%slot, transparency, "slot transparency");
        self.transparency[slot.index()] = transparency;
    }

    fn set_rendered(&mut self, slot: SlotId, rendered: bool) {
        if self.rendered[slot.index()] != rendered {
            trace!(%slot, rendered, "slot visibility");
        }
        self.rendered[slot.index()] = rendered;
    }

    fn begin_load(&mut self, request: LoadRequest) {
        debug!(
            slot = %request.slot,
            ticket = request.ticket.0,
            index = request.index,
            source = %request.source,
            purpose = ?request.purpose,
            "begin load"
        );
        self.sources[request.slot.index()] = Some(request.source.clone());
        match self.to_loader.try_send(request) {
            Ok(()) => {}
            Err(TrySendError::Full(request)) => {
                warn!(source = %request.source, "loader queue full; load dropped");
            }
            Err(TrySendError::Closed(request)) => {
                warn!(source = %request.source, "loader channel closed; load dropped");
            }
        }
    }
}
