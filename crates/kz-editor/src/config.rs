//! Interaction tuning constants.
//!
//! Canvas-space values are in artboard units; values marked "screen px"
//! are divided by the zoom before use so handles keep their on-screen size.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// A creation drag smaller than this (both axes) counts as a click.
    pub click_threshold: f32,
    /// Floor for width/height while resizing.
    pub min_resize: f32,
    /// Resize handle hit radius, screen px.
    pub handle_radius: f32,
    /// Clicking this close to a path's first point closes it.
    pub pen_close_tolerance: f32,
    /// Pointer must travel this far from an anchor before a handle appears.
    pub pen_handle_threshold: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_step: f32,
    /// Gradient handle hit radius, screen px.
    pub gradient_handle_radius: f32,
    /// Dropped images are scaled down to fit this box.
    pub max_image_size: f32,
    /// Size of a click-created text box.
    pub text_size: (f32, f32),
    /// Size of a click-created shape or frame.
    pub shape_size: (f32, f32),
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            click_threshold: 5.0,
            min_resize: 10.0,
            handle_radius: 6.0,
            pen_close_tolerance: 10.0,
            pen_handle_threshold: 5.0,
            min_zoom: 0.1,
            max_zoom: 3.0,
            zoom_step: 0.1,
            gradient_handle_radius: 8.0,
            max_image_size: 600.0,
            text_size: (300.0, 50.0),
            shape_size: (100.0, 100.0),
        }
    }
}
