//! Shared application-wide constants.
//! Centralizes tweakable values used across the data model, routing, and UI.

// Node dimensions
/// Minimum node width in logical units; resize-to-fit never shrinks below this.
pub const MIN_NODE_WIDTH: f64 = 150.0;
/// Minimum node height in logical units.
pub const MIN_NODE_HEIGHT: f64 = 70.0;

// Resize-to-fit text metrics (approximate, headless-friendly)
/// Assumed average character width in logical units.
pub const CHAR_WIDTH: f64 = 8.0;
/// Assumed line height in logical units.
pub const LINE_HEIGHT: f64 = 18.0;
/// Horizontal padding added around text when sizing a node.
pub const TEXT_PADDING_X: f64 = 12.0;
/// Vertical padding added around text when sizing a node.
pub const TEXT_PADDING_Y: f64 = 10.0;

// Zoom
/// Permitted zoom scale factors, in ascending order.
pub const ZOOM_LEVELS: [f64; 7] = [0.5, 0.75, 0.9, 1.0, 1.15, 1.5, 2.0];
/// Index into [`ZOOM_LEVELS`] for the default 1.0 scale.
pub const DEFAULT_ZOOM_INDEX: usize = 3;

// Canvas
/// Logical width of the drawing surface.
pub const CANVAS_WIDTH: f64 = 1800.0;
/// Logical height of the drawing surface.
pub const CANVAS_HEIGHT: f64 = 1200.0;

// Arrows
/// Perpendicular distance (logical units) within which a point hits an arrow segment.
pub const ARROW_HIT_THRESHOLD: f64 = 40.0;
/// Arrow line thickness in logical units.
pub const ARROW_THICKNESS: f32 = 2.0;
/// Length of end-cap glyphs along the final segment direction, logical units.
pub const CAP_LENGTH: f64 = 14.0;
/// Half-width of end-cap glyphs perpendicular to the final segment, logical units.
pub const CAP_HALF_WIDTH: f64 = 7.0;
/// Dash length for dashed arrow strokes, logical units.
pub const DASH_LENGTH: f32 = 6.0;

// Undo/redo
/// Maximum number of history entries to retain; oldest are evicted silently.
pub const HISTORY_LENGTH: usize = 10;

// Defaults
/// Title given to freshly created nodes.
pub const DEFAULT_NODE_TITLE: &str = "Untitled";
