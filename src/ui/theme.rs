// CrashMinder - ui/theme.rs
//
// Colour scheme and layout constants.
// No dependencies on app state or business logic.

use egui::Color32;

/// Row colour for a crash log: symbolicated logs read as settled, raw
/// (unsymbolicated) logs stand out.
pub fn log_colour(symbolicated: bool) -> Color32 {
    if symbolicated {
        Color32::from_rgb(209, 213, 219) // Gray 300
    } else {
        Color32::from_rgb(220, 38, 38) // Red 600
    }
}

/// Colour for an unviewed-count badge when there are unviewed logs.
pub const UNVIEWED_BADGE: Color32 = Color32::from_rgb(217, 119, 6); // Amber 600

/// Colour for fully-viewed counts.
pub const VIEWED_BADGE: Color32 = Color32::from_rgb(107, 114, 128); // Gray 500

/// Layout constants.
pub const VIEWER_DEFAULT_WIDTH: f32 = 720.0;
pub const VIEWER_DEFAULT_HEIGHT: f32 = 500.0;
