//! Centralized constants for desktop layout, sizing, timing, and colors.
//!
//! Magic numbers used by the registry, the controllers and the renderer live here
//! so that the layout rules have one source of truth.

use eframe::egui::Color32;

// =============================================================================
// ITEM LAYOUT CONSTANTS
// =============================================================================

/// Horizontal distance between consecutive items of the same kind in the initial layout.
pub const ITEM_SPACING_X: f32 = 120.0;

/// Vertical position of every item in the initial layout.
pub const INITIAL_ROW_Y: f32 = 0.0;

/// Width of a single desktop item (icon plus label).
pub const ITEM_WIDTH: f32 = 110.0;

/// Height of a single desktop item (icon plus label).
pub const ITEM_HEIGHT: f32 = 130.0;

/// Z-index of an item that is not being dragged.
pub const Z_RESTING: i32 = 0;

/// Z-index of the item under an active drag gesture.
pub const Z_DRAGGING: i32 = 1;

// =============================================================================
// CONTAINER CONSTANTS
// =============================================================================

/// Default width of the canvas container.
pub const DEFAULT_CONTAINER_WIDTH: f32 = 1000.0;

/// Default height of the canvas container.
pub const DEFAULT_CONTAINER_HEIGHT: f32 = 500.0;

/// Smallest container the config may ask for; must fit at least one item.
pub const MIN_CONTAINER_WIDTH: f32 = ITEM_WIDTH;

/// Smallest container the config may ask for; must fit at least one item.
pub const MIN_CONTAINER_HEIGHT: f32 = ITEM_HEIGHT;

// =============================================================================
// INERTIA CONSTANTS
// =============================================================================

/// Reference frame duration the glide decay is expressed against.
pub const GLIDE_REFERENCE_DT: f32 = 1.0 / 60.0;

/// Fraction of glide velocity kept after one reference frame.
pub const GLIDE_DECAY_PER_FRAME: f32 = 0.85;

/// Glide stops once the speed drops below this many points per second.
pub const GLIDE_MIN_SPEED: f32 = 20.0;

/// Upper bound on the release speed so a single jittery frame can't fling an item.
pub const GLIDE_MAX_SPEED: f32 = 3000.0;

// =============================================================================
// NETWORK CONSTANTS
// =============================================================================

/// Backend used when neither the config file nor the environment names one.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// WINDOW CONSTANTS
// =============================================================================

/// Initial window width when the application starts.
pub const INITIAL_WINDOW_WIDTH: f32 = 1080.0;

/// Initial window height when the application starts.
pub const INITIAL_WINDOW_HEIGHT: f32 = 660.0;

// =============================================================================
// ICON RENDERING CONSTANTS
// =============================================================================

/// Size of the square icon area at the top of an item.
pub const ICON_SIZE: f32 = 40.0;

/// Gap between the top of the item and its icon.
pub const ICON_MARGIN: f32 = 10.0;

/// Corner radius for item hover frames.
pub const ITEM_CORNER_RADIUS: f32 = 4.0;

/// Corner radius for the folder body.
pub const FOLDER_CORNER_RADIUS: f32 = 2.0;

/// Width ratio for the folder tab relative to folder width.
pub const FOLDER_TAB_WIDTH_RATIO: f32 = 0.4;

/// Height of the folder tab above the folder body.
pub const FOLDER_TAB_HEIGHT: f32 = 5.0;

/// Size of the folded corner on the file glyph, as a ratio of icon width.
pub const FILE_FOLD_RATIO: f32 = 0.3;

/// Font size for item labels.
pub const LABEL_FONT_SIZE: f32 = 13.0;

// =============================================================================
// COLORS
// =============================================================================

/// Icon glyph color.
pub const COLOR_ICON: Color32 = Color32::from_rgb(55, 71, 79);

/// Item frame fill while hovered or dragged.
pub const COLOR_ITEM_HOVER_BG: Color32 = Color32::from_rgb(250, 250, 250);

/// Item frame stroke while hovered or dragged.
pub const COLOR_ITEM_HOVER_STROKE: Color32 = Color32::from_rgb(204, 204, 204);

/// Container background.
pub const COLOR_CONTAINER_BG: Color32 = Color32::from_rgb(236, 239, 241);

/// Container background while files are hovered over it.
pub const COLOR_CONTAINER_DRAG_OVER_BG: Color32 = Color32::from_rgb(215, 230, 245);

/// Container border.
pub const COLOR_CONTAINER_STROKE: Color32 = Color32::from_rgb(180, 190, 200);

/// Label text color.
pub const COLOR_LABEL: Color32 = Color32::from_rgb(33, 33, 33);

/// Heading color.
pub const COLOR_HEADING: Color32 = Color32::from_rgb(13, 110, 253);

/// Status line color for errors.
pub const COLOR_ERROR_TEXT: Color32 = Color32::from_rgb(200, 60, 60);

/// Toolbar background.
pub const COLOR_TOOLBAR_BG: Color32 = Color32::from_rgb(30, 30, 30);

// =============================================================================
// ICON TINT GENERATION CONSTANTS
// =============================================================================

/// Minimum saturation for icon-index tints.
pub const ICON_TINT_SATURATION_MIN: f32 = 0.35;

/// Saturation range for icon-index tints.
pub const ICON_TINT_SATURATION_RANGE: f32 = 0.25;

/// Lightness for icon-index tints.
pub const ICON_TINT_LIGHTNESS: f32 = 0.55;
