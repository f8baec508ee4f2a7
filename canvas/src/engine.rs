//! Board controller: owns the board, viewport, selection, and the active gesture.
//!
//! The host forwards pointer, keyboard, and image-load events here and gets
//! back a list of [`Action`]s to wire into persistence and repaint. Handlers
//! never fail; events that reference unknown items are logged and ignored.
//!
//! Listener scoping is structural: every change of [`InputState`] goes through
//! one transition function that subscribes the [`PointerSource`] when a
//! gesture starts and unsubscribes it the moment the controller is idle again,
//! including on cancel and on drop.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::board::{Board, ItemPatch};
use crate::config::EngineConfig;
use crate::geometry::{CanvasItem, ItemId, ItemKind, Point, Rect, clamp_size};
use crate::hit::hit_test;
use crate::input::{CommitPolicy, DetachedSource, InputState, Key, PointerSource, PointerTarget};
use crate::render::{ImageEvent, ImageLoads, ItemView, plan};
use crate::selection::Selection;
use crate::viewport::{ContainerMeasure, Viewport};

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    /// An item's position was written.
    Moved { id: ItemId, x: f64, y: f64 },
    /// An item's size was written.
    Resized { id: ItemId, width: f64, height: f64 },
    SelectionChanged { id: Option<ItemId> },
    /// The user asked to edit an item's content.
    EditRequested { item: CanvasItem },
    /// The user asked to delete an item. The item stays on the board until
    /// the host confirms with [`BoardController::apply_delete`].
    DeleteRequested { id: ItemId },
    ZIndexChanged { id: ItemId, z_index: i64 },
    ViewportChanged { viewport: Viewport },
    RenderNeeded,
}

/// The board controller.
pub struct BoardController {
    pub board: Board,
    pub viewport: Viewport,
    pub selection: Selection,
    pub images: ImageLoads,
    pub config: EngineConfig,
    /// Edit mode. When false, items cannot be dragged, resized, reordered, or deleted.
    pub editable: bool,
    input: InputState,
    pointer: Box<dyn PointerSource>,
    subscribed: bool,
}

impl Default for BoardController {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Drop for BoardController {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl BoardController {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            board: Board::new(),
            viewport: Viewport::default(),
            selection: Selection::new(),
            images: ImageLoads::new(),
            config,
            editable: true,
            input: InputState::Idle,
            pointer: Box::new(DetachedSource),
            subscribed: false,
        }
    }

    /// Install the host's global pointer listeners. If a gesture is active the
    /// subscription moves to the new source.
    pub fn set_pointer_source(&mut self, source: Box<dyn PointerSource>) {
        if self.subscribed {
            self.pointer.unsubscribe();
        }
        self.pointer = source;
        if self.subscribed {
            self.pointer.subscribe();
        }
    }

    // --- Data inputs ---

    /// Replace the board. Any gesture is cancelled and a selection that no
    /// longer exists is cleared.
    pub fn load_board(&mut self, board: Board) -> Vec<Action> {
        self.teardown();
        self.board = board;
        self.drop_stale_selection()
    }

    /// Replace all items with a snapshot, keeping the board background.
    pub fn load_snapshot(&mut self, items: Vec<CanvasItem>) -> Vec<Action> {
        self.teardown();
        self.board.load_snapshot(items);
        self.drop_stale_selection()
    }

    /// Add or replace an item created elsewhere.
    pub fn apply_create(&mut self, item: CanvasItem) -> Vec<Action> {
        if self.input.active_item() == Some(item.id) {
            self.teardown();
        }
        self.board.insert(item);
        vec![Action::RenderNeeded]
    }

    /// Apply an update made elsewhere (an edit dialog, another tab). A gesture
    /// on the same item is discarded so its staged value cannot overwrite the
    /// update on release.
    pub fn apply_update(&mut self, id: &ItemId, patch: &ItemPatch) -> Vec<Action> {
        if self.input.active_item() == Some(*id) {
            self.teardown();
        }
        if self.board.apply_patch(id, patch) {
            vec![Action::RenderNeeded]
        } else {
            debug!(%id, "update for unknown item ignored");
            Vec::new()
        }
    }

    /// Remove an item. A gesture on it is discarded without committing.
    pub fn apply_delete(&mut self, id: &ItemId) -> Vec<Action> {
        if self.input.active_item() == Some(*id) {
            self.teardown();
        }
        if self.board.remove(id).is_none() {
            return Vec::new();
        }
        self.images.forget(id);
        let mut actions = Vec::new();
        if self.selection.is_selected(id) && self.selection.clear() {
            actions.push(Action::SelectionChanged { id: None });
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Viewport ---

    /// Frame all items inside the measured container.
    pub fn auto_fit<M: ContainerMeasure + ?Sized>(&mut self, container: &M) -> Vec<Action> {
        self.viewport.auto_fit(self.board.items(), container, &self.config.viewport);
        vec![Action::ViewportChanged { viewport: self.viewport }]
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.viewport.zoom_in(&self.config.viewport);
        vec![Action::ViewportChanged { viewport: self.viewport }]
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.viewport.zoom_out(&self.config.viewport);
        vec![Action::ViewportChanged { viewport: self.viewport }]
    }

    // --- Pointer input ---

    /// Pointer-down where the host resolved the target itself.
    pub fn on_pointer_down(&mut self, screen_pt: Point, target: PointerTarget) -> Vec<Action> {
        if !self.input.is_idle() {
            debug!(?target, "pointer-down ignored: gesture already active");
            return Vec::new();
        }
        match target {
            PointerTarget::Canvas => {
                let mut actions = self.clear_selection();
                if self.config.pan_on_empty_drag {
                    self.set_input(InputState::Panning { last_screen: screen_pt });
                }
                actions.push(Action::RenderNeeded);
                actions
            }
            PointerTarget::Control(id) => {
                trace!(%id, "pointer-down on content control; no gesture");
                Vec::new()
            }
            PointerTarget::Body(id) => self.begin_drag(id, screen_pt),
            PointerTarget::ResizeHandle(id) if self.selection.is_selected(&id) => self.begin_resize(id, screen_pt),
            PointerTarget::ResizeHandle(id) => self.begin_drag(id, screen_pt),
        }
    }

    /// Pointer-down resolved by geometric hit-testing.
    pub fn on_pointer_down_at(&mut self, screen_pt: Point) -> Vec<Action> {
        let target = hit_test(
            screen_pt,
            &self.board,
            &self.viewport,
            &self.selection,
            self.config.resize_handle_px,
        );
        self.on_pointer_down(screen_pt, target)
    }

    /// Apply one pointer-move increment to the active gesture.
    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        match self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen } => {
                self.viewport.pan_by(screen_pt - last_screen);
                self.input = InputState::Panning { last_screen: screen_pt };
                vec![Action::ViewportChanged { viewport: self.viewport }]
            }
            InputState::Dragging { id, anchor, origin, staged } => {
                let staged = staged + self.viewport.to_canvas(screen_pt - anchor);
                self.input = InputState::Dragging { id, anchor: screen_pt, origin, staged };
                trace!(%id, x = staged.x, y = staged.y, "drag");
                match self.config.commit_policy {
                    CommitPolicy::Continuous => self.commit_position(id, staged),
                    CommitPolicy::OnRelease => vec![Action::RenderNeeded],
                }
            }
            InputState::Resizing { id, anchor, orig_width, orig_height, staged_width, staged_height } => {
                let delta = self.viewport.to_canvas(screen_pt - anchor);
                let (staged_width, staged_height) = clamp_size(staged_width + delta.x, staged_height + delta.y);
                self.input = InputState::Resizing {
                    id,
                    anchor: screen_pt,
                    orig_width,
                    orig_height,
                    staged_width,
                    staged_height,
                };
                trace!(%id, width = staged_width, height = staged_height, "resize");
                match self.config.commit_policy {
                    CommitPolicy::Continuous => self.commit_size(id, staged_width, staged_height),
                    CommitPolicy::OnRelease => vec![Action::RenderNeeded],
                }
            }
        }
    }

    /// End the active gesture. Under [`CommitPolicy::OnRelease`] the staged
    /// value is written here in one step; a release without movement writes
    /// nothing.
    ///
    /// The release position itself is not applied; hosts deliver it as a
    /// final move first if it differs from the last one.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        let finished = self.input;
        self.set_input(InputState::Idle);
        let on_release = self.config.commit_policy == CommitPolicy::OnRelease;
        match finished {
            InputState::Idle | InputState::Panning { .. } => Vec::new(),
            InputState::Dragging { id, origin, staged, .. } => {
                debug!(%id, "drag finished");
                if on_release && staged != origin { self.commit_position(id, staged) } else { Vec::new() }
            }
            InputState::Resizing { id, orig_width, orig_height, staged_width, staged_height, .. } => {
                debug!(%id, "resize finished");
                let changed = (staged_width, staged_height) != (orig_width, orig_height);
                if on_release && changed { self.commit_size(id, staged_width, staged_height) } else { Vec::new() }
            }
        }
    }

    /// Abandon the active gesture, discarding anything staged.
    pub fn cancel_interaction(&mut self) -> Vec<Action> {
        if self.input.is_idle() {
            return Vec::new();
        }
        debug!(item = ?self.input.active_item(), "gesture cancelled");
        self.set_input(InputState::Idle);
        vec![Action::RenderNeeded]
    }

    /// Drop any gesture and release the pointer source. Called on unmount and by `Drop`.
    pub fn teardown(&mut self) {
        if !self.input.is_idle() {
            debug!(item = ?self.input.active_item(), "teardown during gesture; staged values discarded");
        }
        self.set_input(InputState::Idle);
    }

    // --- Keyboard ---

    /// `Escape` cancels a gesture or clears the selection; `Delete` and
    /// `Backspace` request deletion of the selected item.
    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if key.is_escape() {
            if !self.input.is_idle() {
                return self.cancel_interaction();
            }
            return self.clear_selection();
        }
        if key.is_delete() && self.input.is_idle() {
            if let Some(id) = self.selection.selected() {
                return self.request_delete(&id);
            }
        }
        Vec::new()
    }

    // --- Explicit item actions ---

    /// Select `id` without starting a gesture.
    pub fn select(&mut self, id: &ItemId) -> Vec<Action> {
        if !self.board.contains(id) || !self.selection.select(*id) {
            return Vec::new();
        }
        vec![Action::SelectionChanged { id: Some(*id) }, Action::RenderNeeded]
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        if self.selection.clear() { vec![Action::SelectionChanged { id: None }] } else { Vec::new() }
    }

    pub fn request_edit(&self, id: &ItemId) -> Vec<Action> {
        if !self.editable {
            return Vec::new();
        }
        match self.board.get(id) {
            Some(item) => vec![Action::EditRequested { item: item.clone() }],
            None => Vec::new(),
        }
    }

    pub fn request_delete(&self, id: &ItemId) -> Vec<Action> {
        if !self.editable || !self.board.contains(id) {
            return Vec::new();
        }
        vec![Action::DeleteRequested { id: *id }]
    }

    /// Give `id` a persisted `zIndex` above every other item.
    pub fn bring_to_front(&mut self, id: &ItemId) -> Vec<Action> {
        let others = self.other_z_indices(id);
        let Some(top) = others.iter().max().copied() else {
            return Vec::new();
        };
        self.restack(id, |z| if z > top { None } else { top.checked_add(1) })
    }

    /// Give `id` a persisted `zIndex` below every other item.
    pub fn send_to_back(&mut self, id: &ItemId) -> Vec<Action> {
        let others = self.other_z_indices(id);
        let Some(bottom) = others.iter().min().copied() else {
            return Vec::new();
        };
        self.restack(id, |z| if z < bottom { None } else { bottom.checked_sub(1) })
    }

    // --- Image loading ---

    /// Record an image load result reported by the host.
    pub fn on_image_event(&mut self, id: &ItemId, event: ImageEvent) -> Vec<Action> {
        let Some(item) = self.board.get(id) else {
            debug!(%id, "image event for unknown item ignored");
            return Vec::new();
        };
        if item.kind != ItemKind::Image {
            return Vec::new();
        }
        if event == ImageEvent::Error {
            warn!(%id, url = %item.content, "image failed to load");
        }
        if self.images.report(*id, &item.content, event) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Queries ---

    #[must_use]
    pub fn selected(&self) -> Option<ItemId> {
        self.selection.selected()
    }

    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&CanvasItem> {
        self.board.get(id)
    }

    /// Stacking value used for display: raised for the selected item.
    #[must_use]
    pub fn effective_z_index(&self, id: &ItemId) -> Option<i64> {
        let item = self.board.get(id)?;
        Some(self.selection.effective_z_index(item, self.config.selected_z_index))
    }

    #[must_use]
    pub fn input(&self) -> InputState {
        self.input
    }

    /// Whether the pointer source currently holds a subscription.
    #[must_use]
    pub fn is_pointer_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Canvas-space frame of the active item including staged values.
    #[must_use]
    pub fn staged_frame(&self) -> Option<(ItemId, Rect)> {
        match self.input {
            InputState::Dragging { id, staged, .. } => self
                .board
                .get(&id)
                .map(|item| (id, Rect::new(staged.x, staged.y, item.width(), item.height()))),
            InputState::Resizing { id, staged_width, staged_height, .. } => self
                .board
                .get(&id)
                .map(|item| (id, Rect::new(item.x(), item.y(), staged_width, staged_height))),
            InputState::Idle | InputState::Panning { .. } => None,
        }
    }

    /// Views for every item in paint order, reflecting any staged gesture.
    #[must_use]
    pub fn render_plan(&self) -> Vec<ItemView<'_>> {
        plan(
            &self.board,
            &self.viewport,
            &self.selection,
            &self.images,
            self.editable,
            self.staged_frame(),
        )
    }

    // --- Internals ---

    fn begin_drag(&mut self, id: ItemId, screen_pt: Point) -> Vec<Action> {
        if !self.editable {
            return Vec::new();
        }
        let Some(item) = self.board.get(&id) else {
            debug!(%id, "pointer-down on unknown item ignored");
            return Vec::new();
        };
        let origin = Point::new(item.x(), item.y());
        let mut actions = Vec::new();
        if self.selection.select(id) {
            actions.push(Action::SelectionChanged { id: Some(id) });
        }
        self.set_input(InputState::Dragging { id, anchor: screen_pt, origin, staged: origin });
        debug!(%id, "drag started");
        actions.push(Action::RenderNeeded);
        actions
    }

    fn begin_resize(&mut self, id: ItemId, screen_pt: Point) -> Vec<Action> {
        if !self.editable {
            return Vec::new();
        }
        let Some(item) = self.board.get(&id) else {
            debug!(%id, "resize on unknown item ignored");
            return Vec::new();
        };
        let (width, height) = (item.width(), item.height());
        self.set_input(InputState::Resizing {
            id,
            anchor: screen_pt,
            orig_width: width,
            orig_height: height,
            staged_width: width,
            staged_height: height,
        });
        debug!(%id, "resize started");
        Vec::new()
    }

    fn commit_position(&mut self, id: ItemId, pos: Point) -> Vec<Action> {
        let Some(item) = self.board.get_mut(&id) else {
            self.teardown();
            return Vec::new();
        };
        item.set_position(pos.x, pos.y);
        vec![Action::Moved { id, x: item.x(), y: item.y() }]
    }

    fn commit_size(&mut self, id: ItemId, width: f64, height: f64) -> Vec<Action> {
        let Some(item) = self.board.get_mut(&id) else {
            self.teardown();
            return Vec::new();
        };
        item.set_size(width, height);
        vec![Action::Resized { id, width: item.width(), height: item.height() }]
    }

    fn other_z_indices(&self, id: &ItemId) -> Vec<i64> {
        if !self.editable || !self.board.contains(id) {
            return Vec::new();
        }
        self.board
            .items()
            .filter(|item| item.id != *id)
            .map(CanvasItem::z_index)
            .collect()
    }

    /// Rewrite `id`'s z-index with `next(current)` if it yields a value.
    /// `next` returns `None` when the order would not change or the new
    /// value would overflow `i64`.
    fn restack(&mut self, id: &ItemId, next: impl FnOnce(i64) -> Option<i64>) -> Vec<Action> {
        let Some(item) = self.board.get_mut(id) else {
            return Vec::new();
        };
        let Some(z_index) = next(item.z_index()) else {
            debug!(%id, z_index = item.z_index(), "restack skipped");
            return Vec::new();
        };
        item.set_z_index(z_index);
        vec![Action::ZIndexChanged { id: *id, z_index }, Action::RenderNeeded]
    }

    fn drop_stale_selection(&mut self) -> Vec<Action> {
        let stale = self.selection.selected().is_some_and(|id| !self.board.contains(&id));
        let mut actions = if stale { self.clear_selection() } else { Vec::new() };
        actions.push(Action::RenderNeeded);
        actions
    }

    /// The only place `input` moves between idle and active.
    fn set_input(&mut self, next: InputState) {
        let active = !next.is_idle();
        if active && !self.subscribed {
            self.pointer.subscribe();
            self.subscribed = true;
        } else if !active && self.subscribed {
            self.pointer.unsubscribe();
            self.subscribed = false;
        }
        self.input = next;
    }
}
