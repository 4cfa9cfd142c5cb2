//! Rendering seam between the viewer core and whatever actually shows images.

pub mod headless;

use crate::config::ElementIds;
use crate::events::{LoadRequest, SlotId};

/// Backend the viewer drives. Implementations own the real display elements.
pub trait Surface {
    /// Whether an element with this id exists.
    fn has_element(&self, id: &str) -> bool;

    /// Builds the default two-slot scaffold inside `container`.
    ///
    /// Returns `false` when the container cannot host it.
    fn build_scaffold(
        &mut self,
        container: &str,
        elements: &SlotElements,
        blank_image: &str,
    ) -> bool;

    /// Sets the transparency level of a slot, 0 (invisible) to 100 (opaque).
    fn set_transparency(&mut self, slot: SlotId, transparency: u8);

    /// Hides or shows a slot entirely so lower layers stay clickable.
    fn set_rendered(&mut self, slot: SlotId, rendered: bool);

    /// Starts loading an image into a slot. Success is reported back to the
    /// viewer as a `LoadComplete` carrying the request's ticket.
    fn begin_load(&mut self, request: LoadRequest);
}

/// Element ids addressing a single slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotHandles {
    pub container: String,
    pub image: String,
    pub link: Option<String>,
}

/// Element ids of both slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotElements {
    slots: [SlotHandles; 2],
}

impl SlotElements {
    /// Ids used by the default scaffold of viewer instance `instance`.
    pub fn scaffold(instance: u64, enable_links: bool) -> Self {
        let handles = |n: usize| SlotHandles {
            container: format!("album-viewer-{instance}-t{n}"),
            image: format!("album-viewer-{instance}-i{n}"),
            link: enable_links.then(|| format!("album-viewer-{instance}-l{n}")),
        };
        Self {
            slots: [handles(1), handles(2)],
        }
    }

    pub fn from_ids(ids: &ElementIds) -> Self {
        Self {
            slots: [
                SlotHandles {
                    container: ids.container1.clone(),
                    image: ids.img1.clone(),
                    link: ids.link1.clone(),
                },
                SlotHandles {
                    container: ids.container2.clone(),
                    image: ids.img2.clone(),
                    link: ids.link2.clone(),
                },
            ],
        }
    }

    pub fn slot(&self, slot: SlotId) -> &SlotHandles {
        &self.slots[slot.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().flat_map(|handles| {
            [
                Some(handles.container.as_str()),
                Some(handles.image.as_str()),
                handles.link.as_deref(),
            ]
            .into_iter()
            .flatten()
        })
    }

    /// Ids that are required but unknown to `surface`. Link elements only count
    /// when links are enabled; an unset link id is reported as `linkN`.
    pub fn missing<S: Surface + ?Sized>(&self, surface: &S, enable_links: bool) -> Vec<String> {
        let mut missing = Vec::new();
        for slot in SlotId::BOTH {
            let handles = self.slot(slot);
            for id in [&handles.container, &handles.image] {
                if id.is_empty() || !surface.has_element(id) {
                    missing.push(id.clone());
                }
            }
            if enable_links {
                match &handles.link {
                    Some(link) if surface.has_element(link) => {}
                    Some(link) => missing.push(link.clone()),
                    None => missing.push(format!("link{}", slot.number())),
                }
            }
        }
        missing
    }
}
