//! Per-shape bounding boxes in percentage space.

use super::{Marker, MarkerRole, MarkerShape};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Fallback sizes for markers whose shape leaves a size unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsDefaults {
    pub radius: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundsDefaults {
    /// Seats on a section plan.
    pub const SEAT: Self = Self {
        radius: 0.8,
        width: 2.0,
        height: 1.5,
    };

    /// Generic circles.
    pub const CIRCLE: Self = Self {
        radius: 1.2,
        width: 2.0,
        height: 1.5,
    };

    /// Sections on the venue overview.
    pub const SECTION: Self = Self {
        radius: 1.2,
        width: 2.0,
        height: 1.5,
    };
}

impl Default for BoundsDefaults {
    fn default() -> Self {
        Self::CIRCLE
    }
}

/// Bounds defaults per marker role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleDefaults {
    pub seat: BoundsDefaults,
    pub section: BoundsDefaults,
}

impl RoleDefaults {
    pub fn for_role(&self, role: MarkerRole) -> &BoundsDefaults {
        match role {
            MarkerRole::Seat => &self.seat,
            MarkerRole::Section => &self.section,
        }
    }
}

impl Default for RoleDefaults {
    fn default() -> Self {
        Self {
            seat: BoundsDefaults::SEAT,
            section: BoundsDefaults::SECTION,
        }
    }
}

/// Axis-aligned bounds of a marker, in percentage units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerBounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl MarkerBounds {
    /// Bounds covering a rectangle (normalized first).
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        let center = rect.center();
        Self {
            left: rect.x0,
            right: rect.x1,
            top: rect.y0,
            bottom: rect.y1,
            center_x: center.x,
            center_y: center.y,
        }
    }

    /// Bounds of the given half extents around a center.
    pub fn around(center: Point, half_width: f64, half_height: f64) -> Self {
        Self {
            left: center.x - half_width,
            right: center.x + half_width,
            top: center.y - half_height,
            bottom: center.y + half_height,
            center_x: center.x,
            center_y: center.y,
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.right, self.bottom)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    /// Check for overlap with a rectangle. Touching edges count, so zero-size
    /// markers on the rectangle border are included.
    pub fn intersects(&self, rect: Rect) -> bool {
        let rect = rect.abs();
        self.left <= rect.x1 && self.right >= rect.x0 && self.top <= rect.y1 && self.bottom >= rect.y0
    }

    /// Check whether a point lies inside or on the edge.
    pub fn contains(&self, point: Point) -> bool {
        (self.left..=self.right).contains(&point.x) && (self.top..=self.bottom).contains(&point.y)
    }

    /// Smallest bounds covering both.
    pub fn union(&self, other: &MarkerBounds) -> MarkerBounds {
        Self::from_rect(self.to_rect().union(other.to_rect()))
    }
}

/// Compute the bounds of a marker.
///
/// Circles extend `radius` on both axes; rectangles, ellipses and seats extend
/// half their width/height. Polygon and freeform shapes cover their points,
/// sofas their width/height box, and all three collapse to the marker
/// position when they carry no size.
pub fn marker_bounds(marker: &Marker, defaults: &BoundsDefaults) -> MarkerBounds {
    let center = marker.position();
    match &marker.shape {
        MarkerShape::Circle { radius } => {
            let r = radius.unwrap_or(defaults.radius);
            MarkerBounds::around(center, r, r)
        }
        MarkerShape::Rectangle { width, height }
        | MarkerShape::Ellipse { width, height }
        | MarkerShape::Seat { width, height } => MarkerBounds::around(
            center,
            width.unwrap_or(defaults.width) / 2.0,
            height.unwrap_or(defaults.height) / 2.0,
        ),
        MarkerShape::Sofa { width, height } => MarkerBounds::around(
            center,
            width.unwrap_or(0.0) / 2.0,
            height.unwrap_or(0.0) / 2.0,
        ),
        MarkerShape::Polygon { points } | MarkerShape::Freeform { points } => {
            points_bounds(center, points)
        }
    }
}

fn points_bounds(origin: Point, points: &[Point]) -> MarkerBounds {
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return MarkerBounds::around(origin, 0.0, 0.0);
    };
    let start = Rect::from_points(*first, *first);
    let extent = iter.fold(start, |rect, p| rect.union_pt(*p));
    MarkerBounds::from_rect(extent + origin.to_vec2())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{MarkerStyle, ShapeKind};

    fn marker(shape: MarkerShape, x: f64, y: f64) -> Marker {
        Marker::new(MarkerRole::Seat, shape, Point::new(x, y), MarkerStyle::default())
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_circle_uses_radius_on_both_axes() {
        let m = marker(MarkerShape::Circle { radius: Some(2.0) }, 10.0, 20.0);
        let b = marker_bounds(&m, &BoundsDefaults::SEAT);
        assert!(approx(b.left, 8.0) && approx(b.right, 12.0));
        assert!(approx(b.top, 18.0) && approx(b.bottom, 22.0));
        assert!(approx(b.center_x, 10.0) && approx(b.center_y, 20.0));
    }

    #[test]
    fn test_circle_falls_back_to_default_radius() {
        let m = marker(ShapeKind::Circle.default_shape(), 50.0, 50.0);
        let seat = marker_bounds(&m, &BoundsDefaults::SEAT);
        let circle = marker_bounds(&m, &BoundsDefaults::CIRCLE);
        assert!(approx(seat.width(), 1.6));
        assert!(approx(circle.width(), 2.4));
    }

    #[test]
    fn test_rectangle_uses_half_extents() {
        let m = marker(
            MarkerShape::Rectangle { width: Some(4.0), height: None },
            50.0,
            50.0,
        );
        let b = marker_bounds(&m, &BoundsDefaults::SECTION);
        assert!(approx(b.left, 48.0) && approx(b.right, 52.0));
        assert!(approx(b.top, 49.25) && approx(b.bottom, 50.75));
    }

    #[test]
    fn test_sofa_without_size_is_zero() {
        let m = marker(MarkerShape::Sofa { width: None, height: None }, 30.0, 40.0);
        let b = marker_bounds(&m, &BoundsDefaults::SEAT);
        assert!(approx(b.width(), 0.0) && approx(b.height(), 0.0));
        assert!(approx(b.left, 30.0) && approx(b.top, 40.0));
    }

    #[test]
    fn test_sofa_box() {
        let m = marker(MarkerShape::sofa(1.0), 30.0, 40.0);
        let b = marker_bounds(&m, &BoundsDefaults::SEAT);
        assert!(approx(b.width(), 1.0) && approx(b.height(), 2.0));
    }

    #[test]
    fn test_polygon_covers_offset_points() {
        let shape = MarkerShape::Polygon {
            points: vec![Point::new(-1.0, 0.0), Point::new(3.0, 2.0), Point::new(0.0, -2.0)],
        };
        let m = marker(shape, 10.0, 10.0);
        let b = marker_bounds(&m, &BoundsDefaults::SEAT);
        assert!(approx(b.left, 9.0) && approx(b.right, 13.0));
        assert!(approx(b.top, 8.0) && approx(b.bottom, 12.0));
        assert!(approx(b.center_x, 11.0) && approx(b.center_y, 10.0));
    }

    #[test]
    fn test_empty_freeform_collapses_to_position() {
        let m = marker(ShapeKind::Freeform.default_shape(), 5.0, 6.0);
        let b = marker_bounds(&m, &BoundsDefaults::SEAT);
        assert!(approx(b.width(), 0.0));
        assert!(approx(b.center_x, 5.0) && approx(b.center_y, 6.0));
    }

    #[test]
    fn test_intersects_is_inclusive() {
        let b = MarkerBounds::around(Point::new(50.0, 50.0), 0.0, 0.0);
        assert!(b.intersects(Rect::new(0.0, 0.0, 50.0, 50.0)));
        assert!(!b.intersects(Rect::new(0.0, 0.0, 49.9, 49.9)));
        // Reversed corners are normalized.
        assert!(b.intersects(Rect::new(60.0, 60.0, 40.0, 40.0)));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let b = MarkerBounds::around(Point::new(50.0, 50.0), 2.0, 1.0);
        assert!(b.contains(Point::new(52.0, 51.0)));
        assert!(b.contains(Point::new(48.0, 49.0)));
        assert!(!b.contains(Point::new(52.1, 50.0)));

        let point = MarkerBounds::around(Point::new(30.0, 40.0), 0.0, 0.0);
        assert!(point.contains(Point::new(30.0, 40.0)));
    }

    #[test]
    fn test_union() {
        let a = MarkerBounds::around(Point::new(10.0, 10.0), 1.0, 1.0);
        let b = MarkerBounds::around(Point::new(20.0, 30.0), 2.0, 2.0);
        let u = a.union(&b);
        assert!(approx(u.left, 9.0) && approx(u.right, 22.0));
        assert!(approx(u.top, 9.0) && approx(u.bottom, 32.0));
    }
}
