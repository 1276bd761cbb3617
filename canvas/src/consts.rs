//! Shared numeric constants for the canvas crate.

// ── Zoom ────────────────────────────────────────────────────────

/// Smallest zoom reachable through zoom-in/zoom-out controls.
pub const ZOOM_MIN: f64 = 0.1;

/// Largest zoom reachable through zoom-in/zoom-out controls.
pub const ZOOM_MAX: f64 = 2.0;

/// Zoom change applied by one discrete zoom-in or zoom-out action.
pub const ZOOM_STEP: f64 = 0.1;

// ── Node footprint ──────────────────────────────────────────────

/// Width of a rendered node box in canvas units.
pub const NODE_WIDTH: f64 = 200.0;

/// Height of a rendered node box in canvas units.
pub const NODE_HEIGHT: f64 = 100.0;

// ── Fit-to-view ─────────────────────────────────────────────────

/// Padding around the node bounding box when fitting, in canvas units.
pub const FIT_PADDING: f64 = 50.0;

// ── Pointer ─────────────────────────────────────────────────────

/// Screen-space distance a node drag may travel and still count as a click.
pub const DRAG_CLICK_SLOP_PX: f64 = 3.0;
