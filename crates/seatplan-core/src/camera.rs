//! Camera module for zoom and pan.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Default zoom limits.
pub const DEFAULT_MIN_ZOOM: f64 = 0.25;
pub const DEFAULT_MAX_ZOOM: f64 = 5.0;

/// Camera manages the zoom and pan applied on top of the letterboxed layer.
///
/// Zoom scales about the container center; pan is a stage-space offset added
/// after scaling:
///
/// ```text
/// stage = (layer - center) * zoom + center + pan
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Stage-space pan offset in pixels.
    pub pan: Vec2,
    /// Current zoom level (1.0 = fit to container).
    pub zoom: f64,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with custom zoom limits.
    ///
    /// Swapped limits are reordered; a non-finite or non-positive limit falls
    /// back to its default.
    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        let usable = |zoom: f64, default: f64| {
            if zoom.is_finite() && zoom > 0.0 { zoom } else { default }
        };
        let min_zoom = usable(min_zoom, DEFAULT_MIN_ZOOM);
        let max_zoom = usable(max_zoom, DEFAULT_MAX_ZOOM);
        if min_zoom > max_zoom {
            log::warn!("Zoom limits {min_zoom} > {max_zoom}, swapping");
        }
        Self {
            min_zoom: min_zoom.min(max_zoom),
            max_zoom: min_zoom.max(max_zoom),
            ..Self::default()
        }
    }

    /// Clamp a zoom level to the limits without panicking on bad limits.
    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    /// Zoom level guarded against zero, negative and non-finite values.
    pub fn effective_zoom(&self) -> f64 {
        if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        }
    }

    /// Transform from layer space to stage space for a container center.
    pub fn transform(&self, center: Point) -> Affine {
        Affine::translate(center.to_vec2() + self.pan)
            * Affine::scale(self.effective_zoom())
            * Affine::translate(-center.to_vec2())
    }

    /// Transform from stage space back to layer space.
    pub fn inverse_transform(&self, center: Point) -> Affine {
        Affine::translate(center.to_vec2())
            * Affine::scale(1.0 / self.effective_zoom())
            * Affine::translate(-(center.to_vec2() + self.pan))
    }

    /// Convert a stage point to layer coordinates.
    pub fn stage_to_layer(&self, stage_point: Point, center: Point) -> Point {
        self.inverse_transform(center) * stage_point
    }

    /// Convert a layer point to stage coordinates.
    pub fn layer_to_stage(&self, layer_point: Point, center: Point) -> Point {
        self.transform(center) * layer_point
    }

    /// Pan the camera by a delta in stage pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Set the zoom level, clamped to the limits.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = self.clamp_zoom(zoom);
        }
    }

    /// Zoom about the container center.
    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.zoom * factor);
    }

    /// Zoom, keeping the given stage point fixed on screen.
    pub fn zoom_at(&mut self, stage_point: Point, factor: f64, center: Point) {
        let new_zoom = self.clamp_zoom(self.zoom * factor);
        if !new_zoom.is_finite() || (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let layer_point = self.stage_to_layer(stage_point, center);
        self.zoom = new_zoom;

        // Adjust pan so layer_point stays under stage_point
        let new_stage = self.layer_to_stage(layer_point, center);
        self.pan += stage_point - new_stage;
    }

    /// Reset camera to default pan and zoom.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }
}
