//! Board store: the ordered item set and board-level presentation.
//!
//! Items keep their insertion order, which is the tie-breaker for paint order
//! when two items share a `zIndex`. The viewport is deliberately absent here;
//! it is per-session view state owned by the engine.
//!
//! Data flows in from the host as JSON (a persisted board or a bare item
//! array) and from the engine as geometry mutations. Records that cannot be
//! read as items at all (no usable id) are skipped with a warning rather than
//! failing the whole board.

#[cfg(test)]
#[path = "board_test.rs"]
mod board_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geometry::{CanvasItem, ItemId};

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("invalid board JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("board must be an object with an `items` array or a bare array of items")]
    UnexpectedShape,
}

/// Sparse update for an item. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    /// Canonical 0.0–1.0 unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// An ordered set of items plus the board background.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    items: Vec<CanvasItem>,
    pub background_color: String,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with a white background.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new(), background_color: "#ffffff".to_owned() }
    }

    /// Read a persisted board.
    ///
    /// Accepts `{ "backgroundColor": .., "items": [..] }` or a bare array of
    /// items. Individual malformed fields are normalized; records without a
    /// readable id are skipped.
    ///
    /// # Errors
    ///
    /// Returns `BoardError` if the input is not JSON or has neither shape.
    pub fn from_json(input: &str) -> Result<Self, BoardError> {
        let value: Value = serde_json::from_str(input)?;
        let mut board = Self::new();

        let records = match value {
            Value::Array(records) => records,
            Value::Object(mut map) => {
                let background = map
                    .remove("backgroundColor")
                    .or_else(|| map.remove("background_color"));
                if let Some(Value::String(bg)) = background {
                    board.background_color = bg;
                }
                match map.remove("items") {
                    Some(Value::Array(records)) => records,
                    Some(_) => return Err(BoardError::UnexpectedShape),
                    None => Vec::new(),
                }
            }
            _ => return Err(BoardError::UnexpectedShape),
        };

        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<CanvasItem>(record) {
                Ok(item) => board.insert(item),
                Err(e) => tracing::warn!(index, error = %e, "skipping unreadable board item"),
            }
        }
        tracing::debug!(count = board.len(), "loaded board");
        Ok(board)
    }

    /// Insert an item, or replace the item with the same id in place so it
    /// keeps its position in insertion order.
    pub fn insert(&mut self, item: CanvasItem) {
        match self.position(&item.id) {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
    }

    /// Remove an item by id, returning it if it was present.
    pub fn remove(&mut self, id: &ItemId) -> Option<CanvasItem> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&CanvasItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    pub fn get_mut(&mut self, id: &ItemId) -> Option<&mut CanvasItem> {
        self.items.iter_mut().find(|item| item.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.position(id).is_some()
    }

    /// Apply a sparse update. Returns false if the item doesn't exist.
    ///
    /// Size fields go through the item's clamping mutator, so a patch can
    /// never shrink an item below the minimum size.
    pub fn apply_patch(&mut self, id: &ItemId, patch: &ItemPatch) -> bool {
        let Some(item) = self.get_mut(id) else {
            return false;
        };
        if patch.x.is_some() || patch.y.is_some() {
            let x = patch.x.unwrap_or(item.x());
            let y = patch.y.unwrap_or(item.y());
            item.set_position(x, y);
        }
        if patch.width.is_some() || patch.height.is_some() {
            let width = patch.width.unwrap_or(item.width());
            let height = patch.height.unwrap_or(item.height());
            item.set_size(width, height);
        }
        if let Some(r) = patch.rotation {
            item.set_rotation(r);
        }
        if let Some(z) = patch.z_index {
            item.set_z_index(z);
        }
        if let Some(o) = patch.opacity {
            item.set_opacity(o);
        }
        if let Some(ref bg) = patch.background_color {
            item.background_color.clone_from(bg);
        }
        if let Some(radius) = patch.border_radius {
            item.border_radius = radius.max(0.0);
        }
        if let Some(ref content) = patch.content {
            item.content.clone_from(content);
        }
        if let Some(ref title) = patch.title {
            item.title = Some(title.clone());
        }
        true
    }

    /// Replace all items with a full snapshot.
    pub fn load_snapshot(&mut self, items: Vec<CanvasItem>) {
        self.items.clear();
        for item in items {
            self.insert(item);
        }
    }

    /// Items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &CanvasItem> {
        self.items.iter()
    }

    /// Items sorted by persisted `zIndex`, ties in insertion order.
    #[must_use]
    pub fn sorted_items(&self) -> Vec<&CanvasItem> {
        let mut items: Vec<&CanvasItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.z_index());
        items
    }

    /// Highest persisted `zIndex`, if any items exist.
    #[must_use]
    pub fn max_z_index(&self) -> Option<i64> {
        self.items.iter().map(CanvasItem::z_index).max()
    }

    /// Lowest persisted `zIndex`, if any items exist.
    #[must_use]
    pub fn min_z_index(&self) -> Option<i64> {
        self.items.iter().map(CanvasItem::z_index).min()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == *id)
    }
}
