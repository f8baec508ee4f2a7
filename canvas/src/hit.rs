#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::board::Board;
use crate::geometry::{Point, Rect};
use crate::input::PointerTarget;
use crate::selection::{Selection, paint_order};
use crate::viewport::Viewport;

/// Work out what a screen-space pointer-down landed on.
///
/// The selected item's resize hotspot is checked first, then item bodies from
/// the top of the paint order down. Rotation is presentational and is not
/// considered. Content controls are only known to the host, so this never
/// returns [`PointerTarget::Control`].
#[must_use]
pub fn hit_test(
    screen_pt: Point,
    board: &Board,
    viewport: &Viewport,
    selection: &Selection,
    handle_px: f64,
) -> PointerTarget {
    if let Some(item) = selection.selected().and_then(|id| board.get(&id)) {
        let frame = viewport.canvas_rect_to_screen(item.frame());
        if resize_hotspot(frame, handle_px).contains(screen_pt) {
            return PointerTarget::ResizeHandle(item.id);
        }
    }

    let canvas_pt = viewport.screen_to_canvas(screen_pt);
    paint_order(board, selection)
        .iter()
        .rev()
        .find(|item| item.frame().contains(canvas_pt))
        .map_or(PointerTarget::Canvas, |item| PointerTarget::Body(item.id))
}

/// Screen-space square centered on the bottom-right corner of `frame`.
fn resize_hotspot(frame: Rect, handle_px: f64) -> Rect {
    let half = handle_px * 0.5;
    Rect::new(frame.right() - half, frame.bottom() - half, handle_px, handle_px)
}
