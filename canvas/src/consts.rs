//! Shared numeric constants for the canvas crate.

// ── Geometry ────────────────────────────────────────────────────

/// Minimum width and height of any item, in canvas units.
pub const MIN_ITEM_SIZE: f64 = 50.0;

/// Width and height given to items that arrive without a usable size.
pub const DEFAULT_ITEM_SIZE: f64 = 200.0;

/// Layer order given to items that arrive without a `zIndex`.
pub const DEFAULT_Z_INDEX: i64 = 1;

// ── Viewport ────────────────────────────────────────────────────

/// Fraction of each container dimension reserved as padding on both sides by auto-fit.
pub const FIT_PADDING_RATIO: f64 = 0.1;

/// Upper bound on the scale auto-fit may choose.
pub const FIT_MAX_SCALE: f64 = 0.9;

/// Scale used when there is nothing to fit.
pub const EMPTY_FIT_SCALE: f64 = 0.5;

/// Scale change per manual zoom step.
pub const ZOOM_STEP: f64 = 0.1;

/// Lowest scale reachable by manual zoom.
pub const MIN_SCALE: f64 = 0.2;

/// Highest scale reachable by manual zoom.
pub const MAX_SCALE: f64 = 1.5;

// ── Selection & hit-testing ─────────────────────────────────────

/// Effective z-index of the selected item for the current paint pass.
pub const SELECTED_Z_INDEX: i64 = 100;

/// Side of the square resize hotspot at an item's bottom-right corner, in screen pixels.
pub const RESIZE_HANDLE_PX: f64 = 16.0;
