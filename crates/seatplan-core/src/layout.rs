//! Letterboxed mapping between percentage space and stage pixels.
//!
//! The floor-plan content keeps its aspect ratio and is fitted inside the
//! container ("contain" fit), centered on the limiting axis. Percentages are
//! relative to the displayed content rectangle, so a saved layout stays valid
//! for any container size.
//!
//! None of these functions fail: unusable container sizes and aspect ratios
//! are replaced with safe defaults.

use crate::camera::Camera;
use kurbo::{Point, Rect, Size, Vec2};

/// Container size used when the measured one is unusable.
pub const DEFAULT_CONTAINER: Size = Size::new(800.0, 600.0);

/// Content aspect ratio (height / width) used when no image is present.
pub const FALLBACK_ASPECT_RATIO: f64 = 0.75;

/// Aspect ratio (height / width) of an image, or the fallback when there is
/// no image or it has a degenerate size.
pub fn content_aspect_ratio(image: Option<Size>, fallback: f64) -> f64 {
    match image {
        Some(size) if size.width > 0.0 && size.height > 0.0 => {
            let ratio = size.height / size.width;
            if ratio.is_finite() { ratio } else { fallback }
        }
        _ => fallback,
    }
}

fn sanitize_container(container: Size) -> Size {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if usable(container.width) && usable(container.height) {
        container
    } else {
        log::warn!(
            "Container size {}x{} is unusable, using {}x{}",
            container.width,
            container.height,
            DEFAULT_CONTAINER.width,
            DEFAULT_CONTAINER.height
        );
        DEFAULT_CONTAINER
    }
}

fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        log::warn!("Content aspect ratio {ratio} is unusable, using {FALLBACK_ASPECT_RATIO}");
        FALLBACK_ASPECT_RATIO
    }
}

/// Placement of the content rectangle inside the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Container size actually used (after substituting defaults).
    pub container: Size,
    /// Top-left corner of the displayed content.
    pub origin: Point,
    /// Displayed content size.
    pub displayed: Size,
}

impl Letterbox {
    /// Fit content of the given aspect ratio (height / width) into a container.
    pub fn fit(container: Size, content_aspect_ratio: f64) -> Self {
        let container = sanitize_container(container);
        let ratio = sanitize_ratio(content_aspect_ratio);
        let container_ratio = container.height / container.width;

        let displayed = if ratio > container_ratio {
            // Taller than the container: height-limited.
            Size::new(container.height / ratio, container.height)
        } else {
            Size::new(container.width, container.width * ratio)
        };

        let origin = Point::new(
            (container.width - displayed.width) / 2.0,
            (container.height - displayed.height) / 2.0,
        );

        Self {
            container,
            origin,
            displayed,
        }
    }

    /// Displayed content rectangle in layer pixels.
    pub fn content_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.displayed)
    }

    /// Center of the container; zoom scales about this point.
    pub fn center(&self) -> Point {
        Point::new(self.container.width / 2.0, self.container.height / 2.0)
    }

    /// Percentage position to unzoomed layer pixels.
    pub fn percentage_to_layer(&self, percent: Point) -> Point {
        Point::new(
            self.origin.x + percent.x / 100.0 * self.displayed.width,
            self.origin.y + percent.y / 100.0 * self.displayed.height,
        )
    }

    /// Layer pixels to percentage position. Exact inverse of
    /// [`Letterbox::percentage_to_layer`]; the result is not clamped.
    pub fn layer_to_percentage(&self, layer: Point) -> Point {
        Point::new(
            (layer.x - self.origin.x) / self.displayed.width * 100.0,
            (layer.y - self.origin.y) / self.displayed.height * 100.0,
        )
    }

    /// Stage pixels (zoomed and panned) to percentage position.
    pub fn stage_to_percentage(&self, stage: Point, camera: &Camera) -> Point {
        let layer = camera.stage_to_layer(stage, self.center());
        self.layer_to_percentage(layer)
    }

    /// Percentage position to stage pixels, including zoom and pan.
    pub fn percentage_to_view(&self, percent: Point, camera: &Camera) -> Point {
        camera.layer_to_stage(self.percentage_to_layer(percent), self.center())
    }

    /// Convert a stage-pixel drag delta into a percentage delta.
    pub fn stage_delta_to_percentage(&self, delta: Vec2, camera: &Camera) -> Vec2 {
        let zoom = camera.effective_zoom();
        Vec2::new(
            delta.x / zoom / self.displayed.width * 100.0,
            delta.y / zoom / self.displayed.height * 100.0,
        )
    }
}

/// Percentage position to stage pixels (letterboxed, without zoom).
pub fn percentage_to_stage(percent: Point, container: Size, content_aspect_ratio: f64) -> Point {
    Letterbox::fit(container, content_aspect_ratio).percentage_to_layer(percent)
}

/// Unzoomed layer pixels to percentage position.
pub fn layer_to_percentage(layer: Point, container: Size, content_aspect_ratio: f64) -> Point {
    Letterbox::fit(container, content_aspect_ratio).layer_to_percentage(layer)
}

/// Stage pixels to percentage position, undoing zoom about the container
/// center and pan first.
pub fn stage_to_percentage(
    stage: Point,
    container: Size,
    content_aspect_ratio: f64,
    camera: &Camera,
) -> Point {
    Letterbox::fit(container, content_aspect_ratio).stage_to_percentage(stage, camera)
}
