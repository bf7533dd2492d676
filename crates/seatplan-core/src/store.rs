//! Venue layout document: the seat and section arrays.

use crate::markers::{
    BoundsDefaults, Marker, MarkerBounds, MarkerId, MarkerPatch, MarkerRole, MarkerStyle,
    RoleDefaults, ShapeKind, marker_bounds,
};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Owns every marker of a venue layout.
///
/// Markers are only ever referenced by id from the outside; all mutation goes
/// through the store so positions stay inside percentage space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStore {
    /// Unique layout identifier.
    pub id: String,
    /// Layout name.
    pub name: String,
    #[serde(default)]
    seats: Vec<Marker>,
    #[serde(default)]
    sections: Vec<Marker>,
}

impl Default for MarkerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerStore {
    /// Create a new empty layout.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            seats: Vec::new(),
            sections: Vec::new(),
        }
    }

    fn list(&self, role: MarkerRole) -> &Vec<Marker> {
        match role {
            MarkerRole::Seat => &self.seats,
            MarkerRole::Section => &self.sections,
        }
    }

    fn list_mut(&mut self, role: MarkerRole) -> &mut Vec<Marker> {
        match role {
            MarkerRole::Seat => &mut self.seats,
            MarkerRole::Section => &mut self.sections,
        }
    }

    /// Create a marker of the given shape at a percentage position.
    pub fn create_marker(
        &mut self,
        role: MarkerRole,
        kind: ShapeKind,
        position: Point,
        style: MarkerStyle,
    ) -> MarkerId {
        let marker = Marker::new(role, kind.default_shape(), position, style);
        self.insert(marker)
    }

    /// Add an existing marker, keeping its id.
    pub fn insert(&mut self, marker: Marker) -> MarkerId {
        let id = marker.id();
        log::debug!("Adding {:?} {} ({})", marker.role(), id, marker.kind().name());
        self.list_mut(marker.role()).push(marker);
        id
    }

    /// Apply a partial update. Returns the updated marker, or None if the id
    /// is unknown.
    pub fn update_marker(&mut self, id: MarkerId, patch: &MarkerPatch) -> Option<&Marker> {
        let Some(marker) = self.get_mut(id) else {
            log::warn!("Update for unknown marker {id}");
            return None;
        };
        marker.apply_patch(patch);
        Some(marker)
    }

    /// Apply a batch of updates. Returns how many markers were updated.
    pub fn apply_updates(&mut self, updates: &HashMap<MarkerId, MarkerPatch>) -> usize {
        updates
            .iter()
            .filter(|(id, patch)| self.update_marker(**id, patch).is_some())
            .count()
    }

    /// Move markers by a shared percentage delta. Returns how many moved.
    pub fn translate_markers(&mut self, ids: &[MarkerId], delta: Vec2) -> usize {
        let mut moved = 0;
        for &id in ids {
            if let Some(marker) = self.get_mut(id) {
                marker.translate(delta);
                moved += 1;
            }
        }
        moved
    }

    /// Remove a marker.
    pub fn remove_marker(&mut self, id: MarkerId) -> Option<Marker> {
        for role in [MarkerRole::Seat, MarkerRole::Section] {
            let list = self.list_mut(role);
            if let Some(index) = list.iter().position(|m| m.id() == id) {
                return Some(list.remove(index));
            }
        }
        None
    }

    /// Remove every seat belonging to a section. Returns the number removed,
    /// or None if the id is not a section.
    pub fn clear_section(&mut self, section_id: MarkerId) -> Option<usize> {
        let name = self
            .sections
            .iter()
            .find(|m| m.id() == section_id)
            .and_then(|m| m.section())
            .map(|info| info.name.clone())?;

        let before = self.seats.len();
        self.seats
            .retain(|m| m.seat().is_none_or(|seat| seat.section != name));
        let removed = before - self.seats.len();
        log::debug!("Cleared {removed} seats from section {name:?}");
        Some(removed)
    }

    /// Remove all markers of a role.
    pub fn clear_role(&mut self, role: MarkerRole) {
        self.list_mut(role).clear();
    }

    /// Remove all markers.
    pub fn clear(&mut self) {
        self.seats.clear();
        self.sections.clear();
    }

    /// Get a marker by ID.
    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.iter().find(|m| m.id() == id)
    }

    /// Get a mutable reference to a marker by ID.
    pub fn get_mut(&mut self, id: MarkerId) -> Option<&mut Marker> {
        self.seats
            .iter_mut()
            .chain(self.sections.iter_mut())
            .find(|m| m.id() == id)
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.get(id).is_some()
    }

    pub fn seats(&self) -> &[Marker] {
        &self.seats
    }

    pub fn sections(&self) -> &[Marker] {
        &self.sections
    }

    /// Markers of one role, in insertion order.
    pub fn markers(&self, role: MarkerRole) -> &[Marker] {
        self.list(role)
    }

    /// All markers: seats first, then sections.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.seats.iter().chain(self.sections.iter())
    }

    /// Seats whose section label matches.
    pub fn seats_in_section<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Marker> + 'a {
        self.seats
            .iter()
            .filter(move |m| m.seat().is_some_and(|seat| seat.section == name))
    }

    /// Bounds of the given markers, keyed by id. Unknown ids are skipped.
    pub fn bounds_map(
        &self,
        ids: &[MarkerId],
        defaults: &BoundsDefaults,
    ) -> HashMap<MarkerId, MarkerBounds> {
        ids.iter()
            .filter_map(|&id| self.get(id))
            .map(|m| (m.id(), marker_bounds(m, defaults)))
            .collect()
    }

    /// Markers of a role whose bounds intersect a percentage rectangle.
    pub fn markers_in_rect(
        &self,
        role: MarkerRole,
        rect: Rect,
        defaults: &RoleDefaults,
    ) -> Vec<MarkerId> {
        let defaults = defaults.for_role(role);
        self.list(role)
            .iter()
            .filter(|m| marker_bounds(m, defaults).intersects(rect))
            .map(|m| m.id())
            .collect()
    }

    /// Topmost marker of a role under a percentage point.
    pub fn marker_at(&self, role: MarkerRole, point: Point, defaults: &RoleDefaults) -> Option<MarkerId> {
        let defaults = defaults.for_role(role);
        self.list(role)
            .iter()
            .rev()
            .find(|m| marker_bounds(m, defaults).contains(point))
            .map(|m| m.id())
    }

    /// Check if the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty() && self.sections.is_empty()
    }

    /// Get the number of markers.
    pub fn len(&self) -> usize {
        self.seats.len() + self.sections.len()
    }

    /// Serialize the layout to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a layout from JSON.
    ///
    /// Markers filed under the wrong array are moved to the one matching
    /// their role.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut store: Self = serde_json::from_str(json)?;
        store.normalize_roles();
        Ok(store)
    }

    fn normalize_roles(&mut self) {
        let (seats, misplaced_sections): (Vec<_>, Vec<_>) = std::mem::take(&mut self.seats)
            .into_iter()
            .partition(|m| m.role() == MarkerRole::Seat);
        let (sections, misplaced_seats): (Vec<_>, Vec<_>) = std::mem::take(&mut self.sections)
            .into_iter()
            .partition(|m| m.role() == MarkerRole::Section);
        self.seats = seats;
        self.seats.extend(misplaced_seats);
        self.sections = sections;
        self.sections.extend(misplaced_sections);
    }
}
