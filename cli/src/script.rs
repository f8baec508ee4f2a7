//! Recorded input scripts: one JSON event per line, replayed against a controller.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use moodboard_canvas::engine::{Action, BoardController};
use moodboard_canvas::geometry::{ItemId, Point};
use moodboard_canvas::input::{Key, PointerTarget};
use moodboard_canvas::render::ImageEvent;
use moodboard_canvas::viewport::Size;
use serde::Deserialize;

/// Where a scripted pointer-down landed. Omitted means "hit-test the point".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScriptTarget {
    Canvas,
    Body { id: ItemId },
    ResizeHandle { id: ItemId },
    Control { id: ItemId },
}

impl From<ScriptTarget> for PointerTarget {
    fn from(target: ScriptTarget) -> Self {
        match target {
            ScriptTarget::Canvas => Self::Canvas,
            ScriptTarget::Body { id } => Self::Body(id),
            ScriptTarget::ResizeHandle { id } => Self::ResizeHandle(id),
            ScriptTarget::Control { id } => Self::Control(id),
        }
    }
}

/// One recorded host event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScriptEvent {
    Down {
        x: f64,
        y: f64,
        #[serde(default)]
        target: Option<ScriptTarget>,
    },
    Move { x: f64, y: f64 },
    Up,
    Cancel,
    Key { key: String },
    Select { id: ItemId },
    Edit { id: ItemId },
    Delete { id: ItemId },
    Front { id: ItemId },
    Back { id: ItemId },
    Image { id: ItemId, loaded: bool },
    Fit { width: f64, height: f64 },
    ZoomIn,
    ZoomOut,
}

/// Parse one script line. Blank lines and `#` comments yield `None`.
///
/// # Errors
///
/// Returns the JSON error for a line that is not a known event.
pub fn parse_line(line: &str) -> Result<Option<ScriptEvent>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}

/// Feed one event to the controller.
pub fn apply(ctl: &mut BoardController, event: &ScriptEvent) -> Vec<Action> {
    match event {
        ScriptEvent::Down { x, y, target: Some(target) } => ctl.on_pointer_down(Point::new(*x, *y), (*target).into()),
        ScriptEvent::Down { x, y, target: None } => ctl.on_pointer_down_at(Point::new(*x, *y)),
        ScriptEvent::Move { x, y } => ctl.on_pointer_move(Point::new(*x, *y)),
        ScriptEvent::Up => ctl.on_pointer_up(),
        ScriptEvent::Cancel => ctl.cancel_interaction(),
        ScriptEvent::Key { key } => ctl.on_key_down(&Key::new(key.as_str())),
        ScriptEvent::Select { id } => ctl.select(id),
        ScriptEvent::Edit { id } => ctl.request_edit(id),
        ScriptEvent::Delete { id } => ctl.request_delete(id),
        ScriptEvent::Front { id } => ctl.bring_to_front(id),
        ScriptEvent::Back { id } => ctl.send_to_back(id),
        ScriptEvent::Image { id, loaded } => {
            let event = if *loaded { ImageEvent::Loaded } else { ImageEvent::Error };
            ctl.on_image_event(id, event)
        }
        ScriptEvent::Fit { width, height } => ctl.auto_fit(&Size::new(*width, *height)),
        ScriptEvent::ZoomIn => ctl.zoom_in(),
        ScriptEvent::ZoomOut => ctl.zoom_out(),
    }
}
