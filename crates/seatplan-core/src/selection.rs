//! Selection state and in-progress pointer gestures.
//!
//! Selection only holds marker ids; the markers themselves stay in the
//! [`MarkerStore`].

use crate::markers::{MarkerId, MarkerRole};
use crate::store::MarkerStore;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Selected markers.
///
/// Seats and sections are tracked in two independent multi-selections. The
/// single selection is the marker whose properties are being edited; the
/// anchor is the last marker toggled with shift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    single: Option<MarkerId>,
    seats: Vec<MarkerId>,
    sections: Vec<MarkerId>,
    anchor: Option<MarkerId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(&self) -> Option<MarkerId> {
        self.single
    }

    pub fn anchor(&self) -> Option<MarkerId> {
        self.anchor
    }

    /// Multi-selection for a role, in selection order.
    pub fn ids(&self, role: MarkerRole) -> &[MarkerId] {
        match role {
            MarkerRole::Seat => &self.seats,
            MarkerRole::Section => &self.sections,
        }
    }

    fn ids_mut(&mut self, role: MarkerRole) -> &mut Vec<MarkerId> {
        match role {
            MarkerRole::Seat => &mut self.seats,
            MarkerRole::Section => &mut self.sections,
        }
    }

    /// Every selected id once: seats, then sections, then the single
    /// selection if it is in neither set.
    pub fn all(&self) -> Vec<MarkerId> {
        let mut ids: Vec<MarkerId> = self.seats.iter().chain(&self.sections).copied().collect();
        if let Some(single) = self.single {
            if !ids.contains(&single) {
                ids.push(single);
            }
        }
        ids
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.single == Some(id) || self.seats.contains(&id) || self.sections.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.single.is_none() && self.seats.is_empty() && self.sections.is_empty()
    }

    /// Replace the whole selection with one marker.
    pub fn select_only(&mut self, id: MarkerId, role: MarkerRole) {
        self.clear();
        self.single = Some(id);
        self.ids_mut(role).push(id);
        self.anchor = Some(id);
    }

    /// Toggle a marker in its role's multi-selection. Returns whether it is
    /// selected afterwards.
    pub fn toggle(&mut self, id: MarkerId, role: MarkerRole) -> bool {
        self.anchor = Some(id);
        let ids = self.ids_mut(role);
        if let Some(index) = ids.iter().position(|&other| other == id) {
            ids.remove(index);
            if self.single == Some(id) {
                self.single = None;
            }
            false
        } else {
            ids.push(id);
            self.single = Some(id);
            true
        }
    }

    /// Make an already selected marker the single selection.
    pub fn focus(&mut self, id: MarkerId) {
        self.single = Some(id);
    }

    /// Replace a role's multi-selection.
    pub fn set_ids(&mut self, role: MarkerRole, ids: Vec<MarkerId>) {
        *self.ids_mut(role) = ids;
        self.single = None;
        self.anchor = None;
    }

    /// Add ids to a role's multi-selection, skipping ones already present.
    pub fn extend_ids(&mut self, role: MarkerRole, ids: impl IntoIterator<Item = MarkerId>) {
        let current = self.ids_mut(role);
        for id in ids {
            if !current.contains(&id) {
                current.push(id);
            }
        }
    }

    /// Clear all selections.
    pub fn clear(&mut self) {
        self.single = None;
        self.seats.clear();
        self.sections.clear();
        self.anchor = None;
    }

    /// Drop ids that no longer exist in the store. Returns whether anything
    /// changed.
    pub fn retain_existing(&mut self, store: &MarkerStore) -> bool {
        let before = self.clone();
        self.seats.retain(|&id| store.contains(id));
        self.sections.retain(|&id| store.contains(id));
        if self.single.is_some_and(|id| !store.contains(id)) {
            self.single = None;
        }
        if self.anchor.is_some_and(|id| !store.contains(id)) {
            self.anchor = None;
        }
        *self != before
    }
}

/// An in-progress marker drag.
///
/// Positions are the markers' original percentages; the drag moves them by
/// the pointer delta from `start_point`.
#[derive(Debug, Clone)]
pub struct DragState {
    /// Marker under the pointer.
    pub id: MarkerId,
    /// Starting pointer position, in percent.
    pub start_point: Point,
    /// Current pointer position, in percent.
    pub current_point: Point,
    /// Markers being moved with their original positions.
    pub originals: Vec<(MarkerId, Point)>,
}

impl DragState {
    pub fn new(id: MarkerId, start_point: Point, originals: Vec<(MarkerId, Point)>) -> Self {
        Self {
            id,
            start_point,
            current_point: start_point,
            originals,
        }
    }

    /// Get the drag delta.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// Check whether more than one marker moves.
    pub fn is_batch(&self) -> bool {
        self.originals.len() > 1
    }
}

/// An in-progress marquee selection, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarqueeState {
    pub start_point: Point,
    pub current_point: Point,
    /// Add to the existing selection instead of replacing it.
    pub additive: bool,
}

impl MarqueeState {
    pub fn new(start_point: Point, additive: bool) -> Self {
        Self {
            start_point,
            current_point: start_point,
            additive,
        }
    }

    /// Normalized selection rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start_point, self.current_point)
    }
}
