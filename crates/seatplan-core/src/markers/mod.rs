//! Marker definitions for seats and sections.
//!
//! A marker is positioned in percentage space: both axes run from `0` to `100`
//! relative to the floor-plan content, independent of the pixel size the plan
//! is displayed at.

mod bounds;
mod color;

pub use bounds::{BoundsDefaults, MarkerBounds, RoleDefaults, marker_bounds};
pub use color::{ColorError, MarkerColor};

use kurbo::{Point, Vec2};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Unique identifier for markers.
pub type MarkerId = Uuid;

/// Lower bound of percentage space.
pub const PERCENT_MIN: f64 = 0.0;
/// Upper bound of percentage space.
pub const PERCENT_MAX: f64 = 100.0;

/// Sofa height per unit of width (10:20).
pub const SOFA_HEIGHT_PER_WIDTH: f64 = 2.0;
/// Width given to sofas placed with the sofa tool.
pub const DEFAULT_SOFA_WIDTH: f64 = 1.0;

/// Clamp a coordinate into percentage space. NaN maps to the origin.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        PERCENT_MIN
    } else {
        value.clamp(PERCENT_MIN, PERCENT_MAX)
    }
}

fn deserialize_percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(clamp_percent)
}

/// Shape type without its size data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Ellipse,
    Polygon,
    Freeform,
    Sofa,
    Seat,
}

impl ShapeKind {
    /// All shape kinds, in toolbar order.
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Circle,
        ShapeKind::Rectangle,
        ShapeKind::Ellipse,
        ShapeKind::Polygon,
        ShapeKind::Freeform,
        ShapeKind::Sofa,
        ShapeKind::Seat,
    ];

    /// Lowercase name used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Freeform => "freeform",
            ShapeKind::Sofa => "sofa",
            ShapeKind::Seat => "seat",
        }
    }

    /// Shape a freshly placed marker of this kind starts with.
    ///
    /// Sizes are left unset so the caller's bounds defaults apply; sofas get a
    /// concrete size because they have no defaults of their own.
    pub fn default_shape(self) -> MarkerShape {
        match self {
            ShapeKind::Circle => MarkerShape::Circle { radius: None },
            ShapeKind::Rectangle => MarkerShape::Rectangle { width: None, height: None },
            ShapeKind::Ellipse => MarkerShape::Ellipse { width: None, height: None },
            ShapeKind::Seat => MarkerShape::Seat { width: None, height: None },
            ShapeKind::Polygon => MarkerShape::Polygon { points: Vec::new() },
            ShapeKind::Freeform => MarkerShape::Freeform { points: Vec::new() },
            ShapeKind::Sofa => MarkerShape::sofa(DEFAULT_SOFA_WIDTH),
        }
    }
}

/// Shape of a marker, tagged by `type` on the wire.
///
/// Unset sizes fall back to the [`BoundsDefaults`] of the calling context.
/// Polygon and freeform points are offsets from the marker position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MarkerShape {
    Circle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        radius: Option<f64>,
    },
    Rectangle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
    },
    Ellipse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
    },
    Seat {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
    },
    Polygon {
        #[serde(default)]
        points: Vec<Point>,
    },
    Freeform {
        #[serde(default)]
        points: Vec<Point>,
    },
    /// Width and height always keep the 10:20 ratio.
    Sofa {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
    },
}

impl MarkerShape {
    /// Create a sofa of the given width; the height follows the fixed ratio.
    pub fn sofa(width: f64) -> Self {
        MarkerShape::Sofa {
            width: Some(width),
            height: Some(width * SOFA_HEIGHT_PER_WIDTH),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            MarkerShape::Circle { .. } => ShapeKind::Circle,
            MarkerShape::Rectangle { .. } => ShapeKind::Rectangle,
            MarkerShape::Ellipse { .. } => ShapeKind::Ellipse,
            MarkerShape::Seat { .. } => ShapeKind::Seat,
            MarkerShape::Polygon { .. } => ShapeKind::Polygon,
            MarkerShape::Freeform { .. } => ShapeKind::Freeform,
            MarkerShape::Sofa { .. } => ShapeKind::Sofa,
        }
    }

    /// Explicit radius, for circles only.
    pub fn radius(&self) -> Option<f64> {
        match self {
            MarkerShape::Circle { radius } => *radius,
            _ => None,
        }
    }

    /// Explicit width, for shapes that carry one.
    pub fn width(&self) -> Option<f64> {
        match self {
            MarkerShape::Rectangle { width, .. }
            | MarkerShape::Ellipse { width, .. }
            | MarkerShape::Seat { width, .. }
            | MarkerShape::Sofa { width, .. } => *width,
            MarkerShape::Circle { .. }
            | MarkerShape::Polygon { .. }
            | MarkerShape::Freeform { .. } => None,
        }
    }

    /// Explicit height, for shapes that carry one.
    pub fn height(&self) -> Option<f64> {
        match self {
            MarkerShape::Rectangle { height, .. }
            | MarkerShape::Ellipse { height, .. }
            | MarkerShape::Seat { height, .. }
            | MarkerShape::Sofa { height, .. } => *height,
            MarkerShape::Circle { .. }
            | MarkerShape::Polygon { .. }
            | MarkerShape::Freeform { .. } => None,
        }
    }

    /// Outline points, for polygon and freeform shapes.
    pub fn points(&self) -> Option<&[Point]> {
        match self {
            MarkerShape::Polygon { points } | MarkerShape::Freeform { points } => Some(points),
            _ => None,
        }
    }

    /// Set the radius. Returns false for shapes without one.
    pub fn set_radius(&mut self, value: f64) -> bool {
        match self {
            MarkerShape::Circle { radius } => {
                *radius = Some(value.max(0.0));
                true
            }
            _ => false,
        }
    }

    /// Set the width. Sofas recompute their height. Returns false for shapes
    /// without a width.
    pub fn set_width(&mut self, value: f64) -> bool {
        let value = value.max(0.0);
        match self {
            MarkerShape::Rectangle { width, .. }
            | MarkerShape::Ellipse { width, .. }
            | MarkerShape::Seat { width, .. } => {
                *width = Some(value);
                true
            }
            MarkerShape::Sofa { width, height } => {
                *width = Some(value);
                *height = Some(value * SOFA_HEIGHT_PER_WIDTH);
                true
            }
            MarkerShape::Circle { .. }
            | MarkerShape::Polygon { .. }
            | MarkerShape::Freeform { .. } => false,
        }
    }

    /// Set the height. Sofas recompute their width. Returns false for shapes
    /// without a height.
    pub fn set_height(&mut self, value: f64) -> bool {
        let value = value.max(0.0);
        match self {
            MarkerShape::Rectangle { height, .. }
            | MarkerShape::Ellipse { height, .. }
            | MarkerShape::Seat { height, .. } => {
                *height = Some(value);
                true
            }
            MarkerShape::Sofa { width, height } => {
                *height = Some(value);
                *width = Some(value / SOFA_HEIGHT_PER_WIDTH);
                true
            }
            MarkerShape::Circle { .. }
            | MarkerShape::Polygon { .. }
            | MarkerShape::Freeform { .. } => false,
        }
    }

    /// Replace the outline points. Returns false for shapes without points.
    pub fn set_points(&mut self, value: Vec<Point>) -> bool {
        match self {
            MarkerShape::Polygon { points } | MarkerShape::Freeform { points } => {
                *points = value;
                true
            }
            _ => false,
        }
    }
}

/// Visual style of a marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub fill_color: MarkerColor,
    pub stroke_color: MarkerColor,
    /// Rotation in degrees, clockwise.
    #[serde(default)]
    pub rotation: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            fill_color: MarkerColor::rgb(0x3b, 0x82, 0xf6),
            stroke_color: MarkerColor::rgb(0x1e, 0x40, 0xaf),
            rotation: 0.0,
        }
    }
}

/// Ticketing category of a seat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    #[default]
    Standard,
    Vip,
    Accessible,
    Restricted,
    Other(String),
}

/// Seat metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatInfo {
    /// Name of the owning section.
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub row: String,
    #[serde(default)]
    pub seat_number: String,
    #[serde(default)]
    pub seat_type: SeatType,
}

/// Section metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_background_color: Option<MarkerColor>,
    /// Opacity applied to seat fills inside the section, `0.0..=1.0`.
    #[serde(default = "default_fill_transparency")]
    pub marker_fill_transparency: f64,
}

fn default_fill_transparency() -> f64 {
    1.0
}

impl Default for SectionInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            image_url: None,
            canvas_background_color: None,
            marker_fill_transparency: default_fill_transparency(),
        }
    }
}

/// Whether a marker is a seat or a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerRole {
    #[default]
    Seat,
    Section,
}

/// Role-specific marker data, tagged by `role` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum MarkerDetails {
    Seat(SeatInfo),
    Section(SectionInfo),
}

impl MarkerDetails {
    /// Empty details for a role.
    pub fn for_role(role: MarkerRole) -> Self {
        match role {
            MarkerRole::Seat => MarkerDetails::Seat(SeatInfo::default()),
            MarkerRole::Section => MarkerDetails::Section(SectionInfo::default()),
        }
    }

    pub fn role(&self) -> MarkerRole {
        match self {
            MarkerDetails::Seat(_) => MarkerRole::Seat,
            MarkerDetails::Section(_) => MarkerRole::Section,
        }
    }
}

/// A placed seat or section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub(crate) id: MarkerId,
    #[serde(deserialize_with = "deserialize_percent")]
    x: f64,
    #[serde(deserialize_with = "deserialize_percent")]
    y: f64,
    pub shape: MarkerShape,
    #[serde(default)]
    pub style: MarkerStyle,
    #[serde(flatten)]
    pub details: MarkerDetails,
}

impl Marker {
    /// Create a marker at a percentage position (clamped into range).
    pub fn new(role: MarkerRole, shape: MarkerShape, position: Point, style: MarkerStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: clamp_percent(position.x),
            y: clamp_percent(position.y),
            shape,
            style,
            details: MarkerDetails::for_role(role),
        }
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move to a percentage position, clamping into `[0, 100]`.
    pub fn set_position(&mut self, position: Point) {
        self.x = clamp_percent(position.x);
        self.y = clamp_percent(position.y);
    }

    /// Move by a percentage delta, clamping into `[0, 100]`.
    pub fn translate(&mut self, delta: Vec2) {
        self.set_position(self.position() + delta);
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn role(&self) -> MarkerRole {
        self.details.role()
    }

    pub fn seat(&self) -> Option<&SeatInfo> {
        match &self.details {
            MarkerDetails::Seat(info) => Some(info),
            MarkerDetails::Section(_) => None,
        }
    }

    pub fn seat_mut(&mut self) -> Option<&mut SeatInfo> {
        match &mut self.details {
            MarkerDetails::Seat(info) => Some(info),
            MarkerDetails::Section(_) => None,
        }
    }

    pub fn section(&self) -> Option<&SectionInfo> {
        match &self.details {
            MarkerDetails::Section(info) => Some(info),
            MarkerDetails::Seat(_) => None,
        }
    }

    pub fn section_mut(&mut self) -> Option<&mut SectionInfo> {
        match &mut self.details {
            MarkerDetails::Section(info) => Some(info),
            MarkerDetails::Seat(_) => None,
        }
    }

    /// Apply a partial update. Size fields the shape does not use are ignored.
    pub fn apply_patch(&mut self, patch: &MarkerPatch) {
        if patch.x.is_some() || patch.y.is_some() {
            let x = patch.x.unwrap_or(self.x);
            let y = patch.y.unwrap_or(self.y);
            self.set_position(Point::new(x, y));
        }
        if let Some(radius) = patch.radius {
            self.shape.set_radius(radius);
        }
        // Height first: an explicit sofa width overrides the derived one.
        if let Some(height) = patch.height {
            self.shape.set_height(height);
        }
        if let Some(width) = patch.width {
            self.shape.set_width(width);
        }
        if let Some(points) = &patch.points {
            self.shape.set_points(points.clone());
        }
        if let Some(style) = &patch.style {
            self.style = style.clone();
        }
    }
}

/// Partial marker update. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<MarkerStyle>,
}

impl MarkerPatch {
    /// Patch that moves a marker to a position.
    pub fn position(position: Point) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            ..Self::default()
        }
    }

    /// Check whether the patch changes anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge another patch into this one; fields set in `other` win.
    pub fn merge(&mut self, other: MarkerPatch) {
        let MarkerPatch { x, y, radius, width, height, points, style } = other;
        self.x = x.or(self.x);
        self.y = y.or(self.y);
        self.radius = radius.or(self.radius);
        self.width = width.or(self.width);
        self.height = height.or(self.height);
        if points.is_some() {
            self.points = points;
        }
        if style.is_some() {
            self.style = style;
        }
    }
}
