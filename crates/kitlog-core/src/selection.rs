// ── Selection controller ──
//
// Tracks the single item whose maintenance history is open. Every
// change bumps a generation counter; a fetch issued for one generation
// may only commit while that generation is still current.

use serde::Serialize;

use crate::model::ItemId;

/// Identifies one maintenance fetch: the item it was issued for and the
/// selection generation at the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTicket {
    pub item_id: ItemId,
    pub generation: u64,
}

/// Which item (if any) is active for the maintenance sub-view.
///
/// `visible` implies `active` is set; both only change together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    active: Option<ItemId>,
    visible: bool,
    #[serde(skip)]
    generation: u64,
}

impl Selection {
    /// Open the maintenance sub-view for `id`.
    pub fn select(&mut self, id: ItemId) -> SelectionTicket {
        self.generation += 1;
        self.active = Some(id.clone());
        self.visible = true;
        SelectionTicket {
            item_id: id,
            generation: self.generation,
        }
    }

    /// Close the sub-view. In-flight fetches become stale.
    pub fn close(&mut self) {
        self.generation += 1;
        self.active = None;
        self.visible = false;
    }

    /// Ticket for the current selection, if there is one.
    pub fn ticket(&self) -> Option<SelectionTicket> {
        self.active.as_ref().map(|id| SelectionTicket {
            item_id: id.clone(),
            generation: self.generation,
        })
    }

    /// Whether a result fetched under `ticket` may still be shown.
    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        self.generation == ticket.generation && self.active.as_ref() == Some(&ticket.item_id)
    }

    pub fn active(&self) -> Option<&ItemId> {
        self.active.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
