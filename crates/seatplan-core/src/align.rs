//! Multi-marker alignment, distribution and uniform sizing.
//!
//! The engine is pure: it reads markers and their bounds and returns a patch
//! per marker. The caller applies the whole map as one batch (and one undo
//! step).

use crate::markers::{
    BoundsDefaults, Marker, MarkerBounds, MarkerId, MarkerPatch, MarkerShape, clamp_percent,
    marker_bounds,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Alignment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignOp {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
    SpaceBetweenH,
    SpaceBetweenV,
    SpaceBetweenBoth,
    SameWidth,
    SameHeight,
}

impl AlignOp {
    pub const ALL: [AlignOp; 11] = [
        AlignOp::Left,
        AlignOp::Center,
        AlignOp::Right,
        AlignOp::Top,
        AlignOp::Middle,
        AlignOp::Bottom,
        AlignOp::SpaceBetweenH,
        AlignOp::SpaceBetweenV,
        AlignOp::SpaceBetweenBoth,
        AlignOp::SameWidth,
        AlignOp::SameHeight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AlignOp::Left => "left",
            AlignOp::Center => "center",
            AlignOp::Right => "right",
            AlignOp::Top => "top",
            AlignOp::Middle => "middle",
            AlignOp::Bottom => "bottom",
            AlignOp::SpaceBetweenH => "space-between-h",
            AlignOp::SpaceBetweenV => "space-between-v",
            AlignOp::SpaceBetweenBoth => "space-between-both",
            AlignOp::SameWidth => "same-width",
            AlignOp::SameHeight => "same-height",
        }
    }
}

impl fmt::Display for AlignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for unknown alignment names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown alignment operation: {0}")]
pub struct UnknownAlignOp(pub String);

impl FromStr for AlignOp {
    type Err = UnknownAlignOp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlignOp::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| UnknownAlignOp(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn near(self, b: &MarkerBounds) -> f64 {
        match self {
            Axis::Horizontal => b.left,
            Axis::Vertical => b.top,
        }
    }

    fn far(self, b: &MarkerBounds) -> f64 {
        match self {
            Axis::Horizontal => b.right,
            Axis::Vertical => b.bottom,
        }
    }

    fn center(self, b: &MarkerBounds) -> f64 {
        match self {
            Axis::Horizontal => b.center_x,
            Axis::Vertical => b.center_y,
        }
    }

    fn size(self, b: &MarkerBounds) -> f64 {
        self.far(b) - self.near(b)
    }

    fn coordinate(self, m: &Marker) -> f64 {
        match self {
            Axis::Horizontal => m.x(),
            Axis::Vertical => m.y(),
        }
    }

    /// Patch moving the marker to `value` along this axis.
    fn move_to(self, value: f64) -> MarkerPatch {
        let value = clamp_percent(value);
        match self {
            Axis::Horizontal => MarkerPatch {
                x: Some(value),
                ..MarkerPatch::default()
            },
            Axis::Vertical => MarkerPatch {
                y: Some(value),
                ..MarkerPatch::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Anchor {
    Near,
    Center,
    Far,
}

/// Compute the updates for an alignment operation.
///
/// `bounds` may omit markers; missing bounds are computed from `defaults`.
/// Fewer than two markers yields an empty map.
pub fn apply_alignment(
    markers: &[&Marker],
    bounds: &HashMap<MarkerId, MarkerBounds>,
    op: AlignOp,
    defaults: &BoundsDefaults,
) -> HashMap<MarkerId, MarkerPatch> {
    if markers.len() < 2 {
        return HashMap::new();
    }

    let items: Vec<(&Marker, MarkerBounds)> = markers
        .iter()
        .map(|&m| {
            let b = bounds
                .get(&m.id())
                .copied()
                .unwrap_or_else(|| marker_bounds(m, defaults));
            (m, b)
        })
        .collect();

    let updates = match op {
        AlignOp::Left => align_edges(&items, Axis::Horizontal, Anchor::Near),
        AlignOp::Center => align_edges(&items, Axis::Horizontal, Anchor::Center),
        AlignOp::Right => align_edges(&items, Axis::Horizontal, Anchor::Far),
        AlignOp::Top => align_edges(&items, Axis::Vertical, Anchor::Near),
        AlignOp::Middle => align_edges(&items, Axis::Vertical, Anchor::Center),
        AlignOp::Bottom => align_edges(&items, Axis::Vertical, Anchor::Far),
        AlignOp::SpaceBetweenH => distribute(&items, Axis::Horizontal),
        AlignOp::SpaceBetweenV => distribute(&items, Axis::Vertical),
        AlignOp::SpaceBetweenBoth => {
            let mut updates = distribute(&items, Axis::Horizontal);
            for (id, patch) in distribute(&items, Axis::Vertical) {
                updates.entry(id).or_default().merge(patch);
            }
            updates
        }
        AlignOp::SameWidth => same_size(&items, Axis::Horizontal),
        AlignOp::SameHeight => same_size(&items, Axis::Vertical),
    };

    log::debug!("Alignment {op} on {} markers -> {} updates", items.len(), updates.len());
    updates
}

fn align_edges(
    items: &[(&Marker, MarkerBounds)],
    axis: Axis,
    anchor: Anchor,
) -> HashMap<MarkerId, MarkerPatch> {
    let min_near = items
        .iter()
        .map(|(_, b)| axis.near(b))
        .fold(f64::INFINITY, f64::min);
    let max_far = items
        .iter()
        .map(|(_, b)| axis.far(b))
        .fold(f64::NEG_INFINITY, f64::max);

    let target = match anchor {
        Anchor::Near => min_near,
        Anchor::Center => (min_near + max_far) / 2.0,
        Anchor::Far => max_far,
    };
    if !target.is_finite() {
        return HashMap::new();
    }

    items
        .iter()
        .map(|(m, b)| {
            let current = match anchor {
                Anchor::Near => axis.near(b),
                Anchor::Center => axis.center(b),
                Anchor::Far => axis.far(b),
            };
            let delta = target - current;
            (m.id(), axis.move_to(axis.coordinate(m) + delta))
        })
        .collect()
}

fn distribute(items: &[(&Marker, MarkerBounds)], axis: Axis) -> HashMap<MarkerId, MarkerPatch> {
    let mut sorted: Vec<&(&Marker, MarkerBounds)> = items.iter().collect();
    sorted.sort_by(|(_, a), (_, b)| axis.center(a).total_cmp(&axis.center(b)));

    let min_near = sorted
        .iter()
        .map(|(_, b)| axis.near(b))
        .fold(f64::INFINITY, f64::min);
    let max_far = sorted
        .iter()
        .map(|(_, b)| axis.far(b))
        .fold(f64::NEG_INFINITY, f64::max);
    if !min_near.is_finite() || !max_far.is_finite() {
        return HashMap::new();
    }

    let span = max_far - min_near;
    let total_size: f64 = sorted.iter().map(|(_, b)| axis.size(b)).sum();
    let gap = (span - total_size).max(0.0) / (sorted.len() - 1) as f64;

    let mut running = min_near;
    let mut updates = HashMap::with_capacity(sorted.len());
    for (m, b) in sorted {
        let size = axis.size(b);
        let new_center = running + size / 2.0;
        let delta = new_center - axis.center(b);
        updates.insert(m.id(), axis.move_to(axis.coordinate(m) + delta));
        running += size + gap;
    }
    updates
}

fn same_size(items: &[(&Marker, MarkerBounds)], axis: Axis) -> HashMap<MarkerId, MarkerPatch> {
    let max = items
        .iter()
        .map(|(_, b)| axis.size(b))
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return HashMap::new();
    }

    let mut updates = HashMap::new();
    for (m, _) in items {
        let patch = match (&m.shape, axis) {
            (MarkerShape::Circle { .. }, _) => MarkerPatch {
                radius: Some(max / 2.0),
                ..MarkerPatch::default()
            },
            (
                MarkerShape::Rectangle { .. } | MarkerShape::Ellipse { .. } | MarkerShape::Seat { .. },
                Axis::Horizontal,
            ) => MarkerPatch {
                width: Some(max),
                ..MarkerPatch::default()
            },
            (
                MarkerShape::Rectangle { .. } | MarkerShape::Ellipse { .. } | MarkerShape::Seat { .. },
                Axis::Vertical,
            ) => MarkerPatch {
                height: Some(max),
                ..MarkerPatch::default()
            },
            // No sizing rule for these shapes; they keep their size.
            (MarkerShape::Polygon { .. } | MarkerShape::Freeform { .. } | MarkerShape::Sofa { .. }, _) => {
                continue;
            }
        };
        updates.insert(m.id(), patch);
    }
    updates
}
