//! Render dispatch: maps each item to a content view and hands it to a renderer.
//!
//! The engine never produces pixels. [`plan`] turns the board into a list of
//! [`ItemView`]s in paint order, each carrying its screen-space frame,
//! presentation, and a [`ContentView`] chosen by an exhaustive match on
//! [`ItemKind`]. [`dispatch`] feeds one view to a host-supplied
//! [`ContentRenderer`], which owns the actual image element, media player, PDF
//! preview, and link card.
//!
//! Nothing here fails: a broken asset becomes a fallback view and an
//! unrecognized type becomes a neutral placeholder.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;

use serde::Serialize;

use crate::board::Board;
use crate::geometry::{CanvasItem, ItemId, ItemKind, Rect, TextStyle};
use crate::selection::{Selection, paint_order};
use crate::viewport::Viewport;

/// Load state of an image item's asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Loading,
    Loaded,
    Broken,
}

/// Event reported by the host's image-loading primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEvent {
    Loaded,
    Error,
}

/// Tracks image load results per item, keyed to the URL they were reported for.
///
/// A failed load is never retried for the same URL; changing an item's content
/// to a new URL puts it back into `Loading`.
#[derive(Debug, Default)]
pub struct ImageLoads {
    entries: HashMap<ItemId, (String, ImageStatus)>,
}

impl ImageLoads {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status for `item`'s content URL.
    #[must_use]
    pub fn status(&self, item: &CanvasItem) -> ImageStatus {
        match self.entries.get(&item.id) {
            Some((url, status)) if *url == item.content => *status,
            _ => ImageStatus::Loading,
        }
    }

    /// Record a load event for `url`. Returns whether the visible status changed.
    pub fn report(&mut self, id: ItemId, url: &str, event: ImageEvent) -> bool {
        let status = match event {
            ImageEvent::Loaded => ImageStatus::Loaded,
            ImageEvent::Error => ImageStatus::Broken,
        };
        let previous = self.entries.insert(id, (url.to_owned(), status));
        previous.is_none_or(|(prev_url, prev_status)| prev_url != url || prev_status != status)
    }

    pub fn forget(&mut self, id: &ItemId) {
        self.entries.remove(id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

/// Type-specific content for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ContentView<'a> {
    Image {
        url: &'a str,
        status: ImageStatus,
    },
    /// Delegated to the host's media player.
    Media {
        kind: MediaKind,
        url: &'a str,
        title: String,
    },
    /// Delegated to the host's PDF preview. `open_on_click` adds a click
    /// target over the preview that opens the document.
    Pdf {
        url: &'a str,
        open_on_click: bool,
    },
    Text {
        body: &'a str,
        style: &'a TextStyle,
        /// Font size after the viewport scale is applied.
        font_px: f64,
    },
    /// Delegated to the host's link preview.
    Link {
        url: &'a str,
        interactive: bool,
    },
    Unknown {
        type_name: &'a str,
    },
}

/// Placement and presentation shared by every content type, in screen space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions<'a> {
    pub frame: Rect,
    pub rotation: f64,
    pub opacity: f64,
    pub background_color: &'a str,
    pub border_radius: f64,
    pub selected: bool,
    pub editable: bool,
    /// Whether the content's own elements take pointer events. When false,
    /// every press falls through to the item body and can start a drag.
    pub pointer_events: bool,
}

/// Everything a renderer needs for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView<'a> {
    pub id: ItemId,
    pub options: DisplayOptions<'a>,
    pub content: ContentView<'a>,
}

/// Host-side renderers, one entry point per content type.
pub trait ContentRenderer {
    type Output;

    fn image(&mut self, url: &str, opts: &DisplayOptions<'_>) -> Self::Output;
    fn image_placeholder(&mut self, opts: &DisplayOptions<'_>) -> Self::Output;
    fn broken_image(&mut self, opts: &DisplayOptions<'_>) -> Self::Output;
    fn media(&mut self, kind: MediaKind, url: &str, title: &str, opts: &DisplayOptions<'_>) -> Self::Output;
    fn pdf(&mut self, url: &str, open_on_click: bool, opts: &DisplayOptions<'_>) -> Self::Output;
    fn text(&mut self, body: &str, style: &TextStyle, font_px: f64, opts: &DisplayOptions<'_>) -> Self::Output;
    fn link(&mut self, url: &str, interactive: bool, opts: &DisplayOptions<'_>) -> Self::Output;
    fn unknown(&mut self, type_name: &str, opts: &DisplayOptions<'_>) -> Self::Output;
}

/// Choose the content view for `item`.
#[must_use]
pub fn content_for<'a>(item: &'a CanvasItem, images: &ImageLoads, editable: bool, scale: f64) -> ContentView<'a> {
    let url = item.content.as_str();
    match &item.kind {
        ItemKind::Image => ContentView::Image { url, status: images.status(item) },
        ItemKind::Video => ContentView::Media { kind: MediaKind::Video, url, title: media_title(item) },
        ItemKind::Audio => ContentView::Media { kind: MediaKind::Audio, url, title: media_title(item) },
        ItemKind::Pdf => ContentView::Pdf { url, open_on_click: !editable },
        ItemKind::Text => ContentView::Text { body: url, style: &item.text, font_px: item.text.font_size * scale },
        ItemKind::Link => ContentView::Link { url, interactive: !editable },
        ItemKind::Unknown(tag) => ContentView::Unknown { type_name: tag },
    }
}

/// Build views for every item in paint order.
///
/// `staged` overrides one item's canvas-space frame with a value held by an
/// in-progress gesture that has not been written to the board yet.
#[must_use]
pub fn plan<'a>(
    board: &'a Board,
    viewport: &Viewport,
    selection: &Selection,
    images: &ImageLoads,
    editable: bool,
    staged: Option<(ItemId, Rect)>,
) -> Vec<ItemView<'a>> {
    paint_order(board, selection)
        .into_iter()
        .map(|item| {
            let content = content_for(item, images, editable, viewport.scale);
            let frame = match staged {
                Some((id, frame)) if id == item.id => frame,
                _ => item.frame(),
            };
            let options = DisplayOptions {
                frame: viewport.canvas_rect_to_screen(frame),
                rotation: item.rotation(),
                opacity: item.opacity(),
                background_color: &item.background_color,
                border_radius: item.border_radius * viewport.scale,
                selected: selection.is_selected(&item.id),
                editable,
                pointer_events: captures_pointer(&content),
            };
            ItemView { id: item.id, options, content }
        })
        .collect()
}

/// Hand one view to the renderer.
pub fn dispatch<R: ContentRenderer>(view: &ItemView<'_>, renderer: &mut R) -> R::Output {
    let opts = &view.options;
    match &view.content {
        ContentView::Image { url, status } => match status {
            ImageStatus::Loading => renderer.image_placeholder(opts),
            ImageStatus::Loaded => renderer.image(url, opts),
            ImageStatus::Broken => renderer.broken_image(opts),
        },
        ContentView::Media { kind, url, title } => renderer.media(*kind, url, title, opts),
        ContentView::Pdf { url, open_on_click } => renderer.pdf(url, *open_on_click, opts),
        ContentView::Text { body, style, font_px } => renderer.text(body, style, *font_px, opts),
        ContentView::Link { url, interactive } => renderer.link(url, *interactive, opts),
        ContentView::Unknown { type_name } => renderer.unknown(type_name, opts),
    }
}

/// Dispatch every view in order.
pub fn render_all<R: ContentRenderer>(views: &[ItemView<'_>], renderer: &mut R) -> Vec<R::Output> {
    views.iter().map(|view| dispatch(view, renderer)).collect()
}

fn captures_pointer(content: &ContentView<'_>) -> bool {
    match content {
        // Transport controls must receive their own clicks.
        ContentView::Media { .. } => true,
        ContentView::Pdf { open_on_click, .. } => *open_on_click,
        ContentView::Link { interactive, .. } => *interactive,
        ContentView::Image { .. } | ContentView::Text { .. } | ContentView::Unknown { .. } => false,
    }
}

/// The item's title, or the last path segment of its URL.
fn media_title(item: &CanvasItem) -> String {
    if let Some(title) = item.title.as_deref().filter(|t| !t.trim().is_empty()) {
        return title.to_owned();
    }
    let path = item.content.split(['?', '#']).next().unwrap_or_default();
    match path.trim_end_matches('/').rsplit('/').next() {
        Some(segment) if !segment.is_empty() && !segment.contains(':') => segment.to_owned(),
        _ => "Untitled".to_owned(),
    }
}
