//! Single selection and transient stacking.
//!
//! Selecting never touches an item's persisted `zIndex`. Instead the paint
//! order lifts the selected item to the top for the current pass only.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::board::Board;
use crate::geometry::{CanvasItem, ItemId};

/// Holds at most one selected item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<ItemId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    #[must_use]
    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Select `id`, replacing any previous selection. Returns whether the
    /// selection changed.
    pub fn select(&mut self, id: ItemId) -> bool {
        self.replace(Some(id))
    }

    /// Clear the selection. Returns whether anything was selected.
    pub fn clear(&mut self) -> bool {
        self.replace(None)
    }

    fn replace(&mut self, next: Option<ItemId>) -> bool {
        if self.selected == next {
            return false;
        }
        self.selected = next;
        true
    }

    /// The z-index used for `item` in the current paint pass.
    #[must_use]
    pub fn effective_z_index(&self, item: &CanvasItem, selected_z_index: i64) -> i64 {
        if self.is_selected(&item.id) {
            item.z_index().max(selected_z_index)
        } else {
            item.z_index()
        }
    }
}

/// Items in paint order: bottom first.
///
/// Unselected items are ordered by persisted `zIndex` with ties in insertion
/// order; the selected item always comes last.
#[must_use]
pub fn paint_order<'a>(board: &'a Board, selection: &Selection) -> Vec<&'a CanvasItem> {
    let mut items = board.sorted_items();
    if let Some(index) = items.iter().position(|item| selection.is_selected(&item.id)) {
        let selected = items.remove(index);
        items.push(selected);
    }
    items
}
