//! Event reducer for the layout designer.
//!
//! [`Designer::handle`] takes one pointer or keyboard event and applies it
//! synchronously: placement, selection, drags, marquee, alignment, and
//! undo/redo. Pointer positions arrive in stage pixels and are converted to
//! percentages through the current letterbox and camera.

use crate::align::{AlignOp, apply_alignment};
use crate::camera::Camera;
use crate::config::DesignerConfig;
use crate::history::{History, Snapshotter};
use crate::layout::{Letterbox, content_aspect_ratio};
use crate::markers::{Marker, MarkerId, MarkerPatch, MarkerRole, MarkerStyle, RoleDefaults, ShapeKind};
use crate::selection::{DragState, MarqueeState, Selection};
use crate::store::MarkerStore;
use crate::tools::{DefaultStyles, StyleProvider, ToolManager};
use kurbo::{Point, Rect, Size, Vec2};

/// Everything undo/redo restores: the markers and what was selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutState {
    pub store: MarkerStore,
    pub selection: Selection,
}

impl Snapshotter<LayoutState> for LayoutState {
    fn snapshot(&self) -> LayoutState {
        self.clone()
    }

    fn restore(&mut self, snapshot: LayoutState) {
        *self = snapshot;
    }
}

/// Input to the designer.
#[derive(Debug, Clone, PartialEq)]
pub enum DesignerEvent {
    /// Pick a placement tool, or None for the pointer.
    SelectTool(Option<ShapeKind>),
    /// Switch the layer clicks and marquees act on.
    SetLayer(MarkerRole),
    /// Click on empty canvas.
    CanvasClick { point: Point, shift: bool },
    /// Click on a marker.
    MarkerClick { id: MarkerId, shift: bool },
    DragStart { id: MarkerId, point: Point },
    DragMove { point: Point },
    DragEnd { point: Point },
    /// Move the whole selection by a percentage delta.
    BatchDragEnd { delta: Vec2 },
    MarqueeStart { point: Point, shift: bool },
    MarqueeMove { point: Point },
    MarqueeEnd { point: Point },
    SpaceDown,
    SpaceUp,
    /// Pointer movement; pans the view while space is held.
    PointerMove { point: Point },
    /// Zoom by whole steps, about a stage point or the container center.
    Zoom { steps: i32, at: Option<Point> },
    ResetView,
    /// Container was measured.
    Resize(Size),
    /// Natural size of the background image, if any.
    SetContentSize(Option<Size>),
    UpdateMarker { id: MarkerId, patch: MarkerPatch },
    /// Restyle every selected marker.
    UpdateStyle(MarkerStyle),
    Align(AlignOp),
    DeleteSelected,
    /// Remove every seat belonging to a section.
    ClearSection(MarkerId),
    Undo,
    Redo,
    SelectAll,
    ClearSelection,
    /// Move the selection by whole nudge steps.
    Nudge { dx: f64, dy: f64 },
}

/// What an event changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub layout_changed: bool,
    pub selection_changed: bool,
    pub view_changed: bool,
    /// Marker created by a placement click.
    pub created: Option<MarkerId>,
}

impl Outcome {
    fn layout() -> Self {
        Self {
            layout_changed: true,
            selection_changed: true,
            ..Self::default()
        }
    }

    fn selection() -> Self {
        Self {
            selection_changed: true,
            ..Self::default()
        }
    }

    fn view() -> Self {
        Self {
            view_changed: true,
            ..Self::default()
        }
    }

    /// Check whether the event had any effect.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default)]
enum Interaction {
    #[default]
    Idle,
    Dragging {
        drag: DragState,
        before: Box<LayoutState>,
    },
    Marquee(MarqueeState),
}

/// Layout designer state machine.
#[derive(Debug)]
pub struct Designer {
    state: LayoutState,
    history: History<LayoutState>,
    tools: ToolManager,
    camera: Camera,
    container: Size,
    content_aspect: f64,
    defaults: RoleDefaults,
    config: DesignerConfig,
    interaction: Interaction,
    space_held: bool,
    last_pointer: Option<Point>,
}

impl Default for Designer {
    fn default() -> Self {
        Self::new(DesignerConfig::default())
    }
}

impl Designer {
    /// Create a designer with an empty layout.
    pub fn new(config: DesignerConfig) -> Self {
        Self::with_store(MarkerStore::new(), config)
    }

    /// Create a designer editing an existing layout.
    pub fn with_store(store: MarkerStore, config: DesignerConfig) -> Self {
        Self::with_styles(store, config, &DefaultStyles)
    }

    /// Create a designer whose placement tools take their initial styles from
    /// `provider`.
    pub fn with_styles(
        store: MarkerStore,
        config: DesignerConfig,
        provider: &dyn StyleProvider,
    ) -> Self {
        let mut tools = ToolManager::with_provider(provider);
        tools.revert_to_pointer = config.revert_to_pointer_after_place;
        Self {
            state: LayoutState {
                store,
                selection: Selection::new(),
            },
            history: History::new(config.max_history),
            tools,
            camera: Camera::with_limits(config.min_zoom, config.max_zoom),
            container: config.default_container,
            content_aspect: config.fallback_aspect_ratio,
            defaults: config.role_defaults(),
            config,
            interaction: Interaction::Idle,
            space_held: false,
            last_pointer: None,
        }
    }

    pub fn store(&self) -> &MarkerStore {
        &self.state.store
    }

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolManager {
        &mut self.tools
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn history(&self) -> &History<LayoutState> {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_space_held(&self) -> bool {
        self.space_held
    }

    /// Replace the layout, dropping history and selection.
    pub fn load(&mut self, store: MarkerStore) {
        self.state = LayoutState {
            store,
            selection: Selection::new(),
        };
        self.history.clear();
        self.interaction = Interaction::Idle;
        log::info!("Loaded layout {} ({} markers)", self.state.store.id, self.state.store.len());
    }

    /// Current placement of the content inside the container.
    pub fn letterbox(&self) -> Letterbox {
        Letterbox::fit(self.container, self.content_aspect)
    }

    /// Stage pixels to percent.
    pub fn to_percentage(&self, stage: Point) -> Point {
        self.letterbox().stage_to_percentage(stage, &self.camera)
    }

    /// Percent to stage pixels.
    pub fn to_stage(&self, percent: Point) -> Point {
        self.letterbox().percentage_to_view(percent, &self.camera)
    }

    /// Topmost marker of the active layer under a stage point.
    pub fn hit_test(&self, stage: Point) -> Option<MarkerId> {
        let point = self.to_percentage(stage);
        self.state.store.marker_at(self.tools.layer, point, &self.defaults)
    }

    /// No drag or marquee is in progress. Saving is only safe when settled.
    pub fn is_settled(&self) -> bool {
        matches!(self.interaction, Interaction::Idle)
    }

    /// Marquee rectangle in percent, while one is being drawn.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match &self.interaction {
            Interaction::Marquee(marquee) => Some(marquee.rect()),
            _ => None,
        }
    }

    /// Apply one event.
    pub fn handle(&mut self, event: DesignerEvent) -> Outcome {
        match event {
            DesignerEvent::SelectTool(tool) => {
                self.tools.set_tool(tool);
                if matches!(self.interaction, Interaction::Marquee(_)) {
                    self.interaction = Interaction::Idle;
                }
                Outcome::default()
            }
            DesignerEvent::SetLayer(role) => {
                self.tools.layer = role;
                Outcome::default()
            }
            DesignerEvent::CanvasClick { point, shift } => self.canvas_click(point, shift),
            DesignerEvent::MarkerClick { id, shift } => self.marker_click(id, shift),
            DesignerEvent::DragStart { id, point } => self.drag_start(id, point),
            DesignerEvent::DragMove { point } => self.drag_move(point),
            DesignerEvent::DragEnd { point } => self.drag_end(point),
            DesignerEvent::BatchDragEnd { delta } => {
                let ids = self.state.selection.all();
                self.translate(&ids, delta)
            }
            DesignerEvent::MarqueeStart { point, shift } => self.marquee_start(point, shift),
            DesignerEvent::MarqueeMove { point } => {
                if self.space_held {
                    return Outcome::default();
                }
                let point = self.to_percentage(point);
                if let Interaction::Marquee(marquee) = &mut self.interaction {
                    marquee.current_point = point;
                }
                Outcome::default()
            }
            DesignerEvent::MarqueeEnd { point } => self.marquee_end(point),
            DesignerEvent::SpaceDown => {
                self.space_held = true;
                Outcome::default()
            }
            DesignerEvent::SpaceUp => {
                self.space_held = false;
                Outcome::default()
            }
            DesignerEvent::PointerMove { point } => {
                let previous = self.last_pointer.replace(point);
                match previous {
                    Some(previous) if self.space_held => {
                        self.camera.pan_by(point - previous);
                        Outcome::view()
                    }
                    _ => Outcome::default(),
                }
            }
            DesignerEvent::Zoom { steps, at } => {
                let factor = self.config.zoom_step.powi(steps);
                let before = self.camera.zoom;
                let center = self.letterbox().center();
                match at {
                    Some(at) => self.camera.zoom_at(at, factor, center),
                    None => self.camera.zoom_by(factor),
                }
                if (self.camera.zoom - before).abs() > f64::EPSILON {
                    Outcome::view()
                } else {
                    Outcome::default()
                }
            }
            DesignerEvent::ResetView => {
                self.camera.reset();
                Outcome::view()
            }
            DesignerEvent::Resize(container) => {
                self.container = container;
                Outcome::view()
            }
            DesignerEvent::SetContentSize(size) => {
                self.content_aspect = content_aspect_ratio(size, self.config.fallback_aspect_ratio);
                Outcome::view()
            }
            DesignerEvent::UpdateMarker { id, patch } => self.update_marker(id, patch),
            DesignerEvent::UpdateStyle(style) => self.update_style(style),
            DesignerEvent::Align(op) => self.align(op),
            DesignerEvent::DeleteSelected => self.delete_selected(),
            DesignerEvent::ClearSection(id) => self.clear_section(id),
            DesignerEvent::Undo => {
                let cancelled = self.cancel_gesture();
                if self.history.undo(&mut self.state) || cancelled {
                    Outcome::layout()
                } else {
                    Outcome::default()
                }
            }
            DesignerEvent::Redo => {
                let cancelled = self.cancel_gesture();
                if self.history.redo(&mut self.state) || cancelled {
                    Outcome::layout()
                } else {
                    Outcome::default()
                }
            }
            DesignerEvent::SelectAll => {
                let role = self.tools.layer;
                let ids = self.state.store.markers(role).iter().map(Marker::id).collect();
                self.state.selection.set_ids(role, ids);
                Outcome::selection()
            }
            DesignerEvent::ClearSelection => self.clear_selection(),
            DesignerEvent::Nudge { dx, dy } => {
                let ids = self.state.selection.all();
                let step = self.config.nudge_step;
                self.translate(&ids, Vec2::new(dx * step, dy * step))
            }
        }
    }

    fn clear_selection(&mut self) -> Outcome {
        if self.state.selection.is_empty() {
            return Outcome::default();
        }
        self.state.selection.clear();
        Outcome::selection()
    }

    fn canvas_click(&mut self, point: Point, shift: bool) -> Outcome {
        if self.space_held {
            return Outcome::default();
        }
        let Some(kind) = self.tools.current_tool else {
            return if shift { Outcome::default() } else { self.clear_selection() };
        };

        let position = self.to_percentage(point);
        let role = self.tools.layer;
        let style = self.tools.style_for(kind);

        self.history.record(&self.state);
        let id = self.state.store.create_marker(role, kind, position, style);
        self.state.selection.select_only(id, role);
        self.tools.placed();

        Outcome {
            created: Some(id),
            ..Outcome::layout()
        }
    }

    fn marker_click(&mut self, id: MarkerId, shift: bool) -> Outcome {
        let Some(role) = self.state.store.get(id).map(Marker::role) else {
            log::warn!("Click on unknown marker {id}");
            return Outcome::default();
        };

        let selection = &mut self.state.selection;
        if shift {
            selection.toggle(id, role);
        } else if selection.ids(role).contains(&id) {
            // Keep the multi-selection so it can be dragged as a group.
            if selection.single() == Some(id) {
                return Outcome::default();
            }
            selection.focus(id);
        } else {
            selection.select_only(id, role);
        }
        Outcome::selection()
    }

    fn drag_start(&mut self, id: MarkerId, point: Point) -> Outcome {
        if self.space_held || self.tools.is_placing() || !self.is_settled() {
            return Outcome::default();
        }
        let Some(role) = self.state.store.get(id).map(Marker::role) else {
            return Outcome::default();
        };

        let before = Box::new(self.state.clone());
        let mut outcome = Outcome::default();
        if !self.state.selection.ids(role).contains(&id) {
            self.state.selection.select_only(id, role);
            outcome.selection_changed = true;
        }

        let ids = self.state.selection.ids(role);
        let originals: Vec<(MarkerId, Point)> = if ids.len() > 1 {
            ids.iter()
                .filter_map(|&other| self.state.store.get(other))
                .map(|m| (m.id(), m.position()))
                .collect()
        } else {
            self.state
                .store
                .get(id)
                .map(|m| vec![(id, m.position())])
                .unwrap_or_default()
        };

        let start = self.to_percentage(point);
        self.interaction = Interaction::Dragging {
            drag: DragState::new(id, start, originals),
            before,
        };
        outcome
    }

    /// Move dragged markers to their originals plus the drag delta.
    fn apply_drag(&mut self, point: Point) -> bool {
        let percent = self.to_percentage(point);
        let Interaction::Dragging { drag, .. } = &mut self.interaction else {
            return false;
        };
        drag.current_point = percent;
        let delta = drag.delta();
        for &(id, original) in &drag.originals {
            if let Some(marker) = self.state.store.get_mut(id) {
                marker.set_position(original + delta);
            }
        }
        true
    }

    /// Abort a drag or marquee. A drag's preview is rolled back to the
    /// pre-drag state; returns whether the layout changed.
    fn cancel_gesture(&mut self) -> bool {
        match std::mem::take(&mut self.interaction) {
            Interaction::Dragging { drag, before } => {
                log::debug!("Drag of {} markers cancelled", drag.originals.len());
                let changed = before.store != self.state.store;
                self.state = *before;
                changed
            }
            Interaction::Marquee(_) | Interaction::Idle => false,
        }
    }

    fn drag_move(&mut self, point: Point) -> Outcome {
        // The pointer pans the view while space is held.
        if self.space_held {
            return Outcome::default();
        }
        if self.apply_drag(point) {
            Outcome {
                layout_changed: true,
                ..Outcome::default()
            }
        } else {
            Outcome::default()
        }
    }

    fn drag_end(&mut self, point: Point) -> Outcome {
        if !matches!(self.interaction, Interaction::Dragging { .. }) {
            return Outcome::default();
        }
        if !self.space_held {
            self.apply_drag(point);
        }
        let Interaction::Dragging { drag, before } = std::mem::take(&mut self.interaction) else {
            return Outcome::default();
        };

        let moved = drag.originals.iter().any(|&(id, original)| {
            self.state
                .store
                .get(id)
                .is_some_and(|m| m.position() != original)
        });
        if !moved {
            return Outcome::default();
        }

        // Intermediate moves are previews; only the pre-drag state is recorded.
        self.history.push(*before);
        log::debug!("Drag of {} markers committed", drag.originals.len());
        Outcome {
            layout_changed: true,
            ..Outcome::default()
        }
    }

    fn marquee_start(&mut self, point: Point, shift: bool) -> Outcome {
        if self.space_held || self.tools.is_placing() || !self.is_settled() {
            return Outcome::default();
        }
        let start = self.to_percentage(point);
        self.interaction = Interaction::Marquee(MarqueeState::new(start, shift));
        Outcome::default()
    }

    fn marquee_end(&mut self, point: Point) -> Outcome {
        let point = self.to_percentage(point);
        let Interaction::Marquee(mut marquee) = std::mem::take(&mut self.interaction) else {
            return Outcome::default();
        };
        if !self.space_held {
            marquee.current_point = point;
        }

        let role = self.tools.layer;
        let hits = self
            .state
            .store
            .markers_in_rect(role, marquee.rect(), &self.defaults);
        log::debug!("Marquee selected {} markers", hits.len());
        if marquee.additive {
            self.state.selection.extend_ids(role, hits);
        } else {
            self.state.selection.set_ids(role, hits);
        }
        Outcome::selection()
    }

    /// Translate markers as one undo step.
    fn translate(&mut self, ids: &[MarkerId], delta: Vec2) -> Outcome {
        let known = ids.iter().any(|&id| self.state.store.contains(id));
        if !known || delta == Vec2::ZERO {
            return Outcome::default();
        }
        self.history.record(&self.state);
        self.state.store.translate_markers(ids, delta);
        Outcome {
            layout_changed: true,
            ..Outcome::default()
        }
    }

    fn update_marker(&mut self, id: MarkerId, patch: MarkerPatch) -> Outcome {
        let Some(kind) = self.state.store.get(id).map(Marker::kind) else {
            log::warn!("Update for unknown marker {id}");
            return Outcome::default();
        };
        if patch.is_empty() {
            return Outcome::default();
        }

        self.history.record(&self.state);
        self.state.store.update_marker(id, &patch);
        if let Some(style) = patch.style {
            self.tools.remember_style(kind, style);
        }
        Outcome {
            layout_changed: true,
            ..Outcome::default()
        }
    }

    fn update_style(&mut self, style: MarkerStyle) -> Outcome {
        let ids = self.state.selection.all();
        let kinds: Vec<ShapeKind> = ids
            .iter()
            .filter_map(|&id| self.state.store.get(id))
            .map(Marker::kind)
            .collect();
        if kinds.is_empty() {
            return Outcome::default();
        }

        self.history.record(&self.state);
        let patch = MarkerPatch {
            style: Some(style.clone()),
            ..MarkerPatch::default()
        };
        for &id in &ids {
            if let Some(marker) = self.state.store.get_mut(id) {
                marker.apply_patch(&patch);
            }
        }
        for kind in kinds {
            self.tools.remember_style(kind, style.clone());
        }
        Outcome {
            layout_changed: true,
            ..Outcome::default()
        }
    }

    fn align(&mut self, op: AlignOp) -> Outcome {
        let role = self.tools.layer;
        let defaults = self.defaults.for_role(role);
        let ids = self.state.selection.ids(role);
        let markers: Vec<&Marker> = ids.iter().filter_map(|&id| self.state.store.get(id)).collect();
        let bounds = self.state.store.bounds_map(ids, defaults);

        let updates = apply_alignment(&markers, &bounds, op, defaults);
        if updates.is_empty() {
            return Outcome::default();
        }

        self.history.record(&self.state);
        self.state.store.apply_updates(&updates);
        Outcome {
            layout_changed: true,
            ..Outcome::default()
        }
    }

    fn delete_selected(&mut self) -> Outcome {
        let ids: Vec<MarkerId> = self
            .state
            .selection
            .all()
            .into_iter()
            .filter(|&id| self.state.store.contains(id))
            .collect();
        if ids.is_empty() {
            return self.clear_selection();
        }

        self.history.record(&self.state);
        for id in ids {
            self.state.store.remove_marker(id);
        }
        self.state.selection.clear();
        Outcome::layout()
    }

    fn clear_section(&mut self, section_id: MarkerId) -> Outcome {
        let Some(name) = self
            .state
            .store
            .get(section_id)
            .and_then(Marker::section)
            .map(|info| info.name.clone())
        else {
            log::warn!("Clear requested for unknown section {section_id}");
            return Outcome::default();
        };
        if self.state.store.seats_in_section(&name).next().is_none() {
            return Outcome::default();
        }

        self.history.record(&self.state);
        self.state.store.clear_section(section_id);
        self.state.selection.retain_existing(&self.state.store);
        Outcome::layout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::MarkerColor;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// 800x600 container with 0.75 content: one percent is 8px by 6px and
    /// the content fills the container.
    fn stage(x: f64, y: f64) -> Point {
        Point::new(x * 8.0, y * 6.0)
    }

    fn place(designer: &mut Designer, kind: ShapeKind, x: f64, y: f64) -> MarkerId {
        designer.handle(DesignerEvent::SelectTool(Some(kind)));
        let outcome = designer.handle(DesignerEvent::CanvasClick {
            point: stage(x, y),
            shift: false,
        });
        designer.handle(DesignerEvent::SelectTool(None));
        outcome.created.unwrap()
    }

    fn position(designer: &Designer, id: MarkerId) -> Point {
        designer.store().get(id).unwrap().position()
    }

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_click_to_place_converts_and_records() {
        init();
        let mut designer = Designer::default();
        let id = place(&mut designer, ShapeKind::Seat, 25.0, 50.0);

        assert!(approx(position(&designer, id), Point::new(25.0, 50.0)));
        assert_eq!(designer.selection().single(), Some(id));
        assert!(designer.can_undo());

        designer.handle(DesignerEvent::Undo);
        assert!(designer.store().is_empty());
        designer.handle(DesignerEvent::Redo);
        assert!(designer.store().contains(id));
    }

    #[test]
    fn test_place_uses_last_style_and_optional_revert() {
        let config = DesignerConfig {
            revert_to_pointer_after_place: true,
            ..DesignerConfig::default()
        };
        let mut designer = Designer::new(config);
        let red = MarkerStyle {
            fill_color: MarkerColor::rgb(255, 0, 0),
            ..MarkerStyle::default()
        };
        designer.tools_mut().remember_style(ShapeKind::Circle, red.clone());

        designer.handle(DesignerEvent::SelectTool(Some(ShapeKind::Circle)));
        let outcome = designer.handle(DesignerEvent::CanvasClick {
            point: stage(10.0, 10.0),
            shift: false,
        });
        let id = outcome.created.unwrap();
        assert_eq!(designer.store().get(id).unwrap().style, red);
        assert_eq!(designer.tools().current_tool, None);
    }

    #[test]
    fn test_canvas_click_without_tool_clears_selection() {
        let mut designer = Designer::default();
        let id = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);
        assert!(designer.selection().contains(id));

        let shifted = designer.handle(DesignerEvent::CanvasClick {
            point: stage(90.0, 90.0),
            shift: true,
        });
        assert!(shifted.is_noop());
        designer.handle(DesignerEvent::CanvasClick {
            point: stage(90.0, 90.0),
            shift: false,
        });
        assert!(designer.selection().is_empty());
        assert_eq!(designer.store().len(), 1);
    }

    #[test]
    fn test_shift_click_toggles() {
        let mut designer = Designer::default();
        let a = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);
        let b = place(&mut designer, ShapeKind::Seat, 20.0, 10.0);

        designer.handle(DesignerEvent::MarkerClick { id: a, shift: false });
        designer.handle(DesignerEvent::MarkerClick { id: b, shift: true });
        assert_eq!(designer.selection().ids(MarkerRole::Seat), &[a, b]);
        assert_eq!(designer.selection().anchor(), Some(b));

        designer.handle(DesignerEvent::MarkerClick { id: a, shift: true });
        assert_eq!(designer.selection().ids(MarkerRole::Seat), &[b]);
    }

    #[test]
    fn test_plain_click_replaces_unless_selected() {
        let mut designer = Designer::default();
        let a = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);
        let b = place(&mut designer, ShapeKind::Seat, 20.0, 10.0);
        let c = place(&mut designer, ShapeKind::Seat, 30.0, 10.0);

        designer.handle(DesignerEvent::MarkerClick { id: a, shift: false });
        designer.handle(DesignerEvent::MarkerClick { id: b, shift: true });
        // Clicking a selected marker keeps the group.
        designer.handle(DesignerEvent::MarkerClick { id: a, shift: false });
        assert_eq!(designer.selection().ids(MarkerRole::Seat), &[a, b]);
        assert_eq!(designer.selection().single(), Some(a));

        designer.handle(DesignerEvent::MarkerClick { id: c, shift: false });
        assert_eq!(designer.selection().ids(MarkerRole::Seat), &[c]);
    }

    #[test]
    fn test_single_drag_records_once() {
        init();
        let mut designer = Designer::default();
        let id = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);
        let undo_before = designer.history().undo_len();

        designer.handle(DesignerEvent::DragStart { id, point: stage(10.0, 10.0) });
        assert!(!designer.is_settled());
        for step in 1..=5 {
            let x = 10.0 + step as f64 * 2.0;
            designer.handle(DesignerEvent::DragMove { point: stage(x, 10.0) });
        }
        assert!(approx(position(&designer, id), Point::new(20.0, 10.0)));
        assert_eq!(designer.history().undo_len(), undo_before);

        designer.handle(DesignerEvent::DragEnd { point: stage(30.0, 20.0) });
        assert!(designer.is_settled());
        assert!(approx(position(&designer, id), Point::new(30.0, 20.0)));
        assert_eq!(designer.history().undo_len(), undo_before + 1);

        designer.handle(DesignerEvent::Undo);
        assert!(approx(position(&designer, id), Point::new(10.0, 10.0)));
        designer.handle(DesignerEvent::Redo);
        assert!(approx(position(&designer, id), Point::new(30.0, 20.0)));
    }

    #[test]
    fn test_drag_without_movement_records_nothing() {
        let mut designer = Designer::default();
        let id = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);
        let undo_before = designer.history().undo_len();
        designer.handle(DesignerEvent::DragStart { id, point: stage(10.0, 10.0) });
        let outcome = designer.handle(DesignerEvent::DragEnd { point: stage(10.0, 10.0) });
        assert!(outcome.is_noop());
        assert_eq!(designer.history().undo_len(), undo_before);
    }

    #[test]
    fn test_drag_clamps_to_percentage_space() {
        let mut designer = Designer::default();
        let id = place(&mut designer, ShapeKind::Seat, 95.0, 50.0);
        designer.handle(DesignerEvent::DragStart { id, point: stage(95.0, 50.0) });
        designer.handle(DesignerEvent::DragEnd { point: Point::new(5000.0, -900.0) });
        assert!(approx(position(&designer, id), Point::new(100.0, 0.0)));
    }

    #[test]
    fn test_drag_of_group_member_moves_group() {
        let mut designer = Designer::default();
        let a = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);
        let b = place(&mut designer, ShapeKind::Seat, 20.0, 20.0);
        designer.handle(DesignerEvent::MarkerClick { id: a, shift: true });

        designer.handle(DesignerEvent::DragStart { id: a, point: stage(10.0, 10.0) });
        designer.handle(DesignerEvent::DragEnd { point: stage(15.0, 10.0) });
        assert!(approx(position(&designer, a), Point::new(15.0, 10.0)));
        assert!(approx(position(&designer, b), Point::new(25.0, 20.0)));

        designer.handle(DesignerEvent::Undo);
        assert!(approx(position(&designer, a), Point::new(10.0, 10.0)));
        assert!(approx(position(&designer, b), Point::new(20.0, 20.0)));
    }

    #[test]
    fn test_batch_drag_end_is_one_step() {
        let mut designer = Designer::default();
        let a = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);
        let b = place(&mut designer, ShapeKind::Seat, 20.0, 20.0);
        designer.handle(DesignerEvent::MarkerClick { id: a, shift: true });
        let undo_before = designer.history().undo_len();

        designer.handle(DesignerEvent::BatchDragEnd { delta: Vec2::new(5.0, -5.0) });
        assert_eq!(designer.history().undo_len(), undo_before + 1);
        assert!(approx(position(&designer, a), Point::new(15.0, 5.0)));
        assert!(approx(position(&designer, b), Point::new(25.0, 15.0)));

        designer.handle(DesignerEvent::Undo);
        assert!(approx(position(&designer, a), Point::new(10.0, 10.0)));
        assert!(approx(position(&designer, b), Point::new(20.0, 20.0)));
    }

    #[test]
    fn test_marquee_selects_intersecting() {
        init();
        let mut designer = Designer::default();
        let near = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);
        place(&mut designer, ShapeKind::Seat, 90.0, 90.0);
        designer.handle(DesignerEvent::ClearSelection);

        designer.handle(DesignerEvent::MarqueeStart { point: stage(0.0, 0.0), shift: false });
        designer.handle(DesignerEvent::MarqueeMove { point: stage(30.0, 30.0) });
        assert!(designer.marquee_rect().is_some());
        designer.handle(DesignerEvent::MarqueeEnd { point: stage(50.0, 50.0) });

        assert_eq!(designer.selection().ids(MarkerRole::Seat), &[near]);
        assert!(designer.is_settled());
    }

    #[test]
    fn test_marquee_disabled_while_placing_or_panning() {
        let mut designer = Designer::default();
        place(&mut designer, ShapeKind::Seat, 10.0, 10.0);
        designer.handle(DesignerEvent::ClearSelection);

        designer.handle(DesignerEvent::SelectTool(Some(ShapeKind::Seat)));
        designer.handle(DesignerEvent::MarqueeStart { point: stage(0.0, 0.0), shift: false });
        assert!(designer.marquee_rect().is_none());
        designer.handle(DesignerEvent::MarqueeEnd { point: stage(50.0, 50.0) });
        assert!(designer.selection().is_empty());

        designer.handle(DesignerEvent::SelectTool(None));
        designer.handle(DesignerEvent::SpaceDown);
        designer.handle(DesignerEvent::MarqueeStart { point: stage(0.0, 0.0), shift: false });
        assert!(designer.is_settled());
    }

    #[test]
    fn test_space_pan_moves_camera_only() {
        let mut designer = Designer::default();
        let id = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);

        designer.handle(DesignerEvent::SpaceDown);
        designer.handle(DesignerEvent::PointerMove { point: Point::new(100.0, 100.0) });
        let outcome = designer.handle(DesignerEvent::PointerMove { point: Point::new(140.0, 90.0) });
        assert!(outcome.view_changed);
        assert_eq!(designer.camera().pan, Vec2::new(40.0, -10.0));

        let drag = designer.handle(DesignerEvent::DragStart { id, point: stage(10.0, 10.0) });
        assert!(drag.is_noop());
        assert!(designer.is_settled());

        designer.handle(DesignerEvent::SpaceUp);
        let idle = designer.handle(DesignerEvent::PointerMove { point: Point::new(0.0, 0.0) });
        assert!(!idle.view_changed);
    }

    #[test]
    fn test_zoomed_click_places_at_content_point() {
        let mut designer = Designer::default();
        designer.handle(DesignerEvent::Zoom { steps: 2, at: None });
        assert!((designer.camera().zoom - 1.44).abs() < 1e-9);

        designer.handle(DesignerEvent::SelectTool(Some(ShapeKind::Seat)));
        let target = Point::new(30.0, 70.0);
        let point = designer.to_stage(target);
        let id = designer
            .handle(DesignerEvent::CanvasClick { point, shift: false })
            .created
            .unwrap();
        assert!(approx(position(&designer, id), target));
    }

    #[test]
    fn test_align_is_one_undo_step() {
        let mut designer = Designer::default();
        let ids = [
            place(&mut designer, ShapeKind::Circle, 10.0, 10.0),
            place(&mut designer, ShapeKind::Circle, 30.0, 20.0),
            place(&mut designer, ShapeKind::Circle, 50.0, 30.0),
        ];
        for &id in &ids[..2] {
            designer.handle(DesignerEvent::MarkerClick { id, shift: true });
        }
        assert_eq!(designer.selection().ids(MarkerRole::Seat).len(), 3);
        let undo_before = designer.history().undo_len();

        designer.handle(DesignerEvent::Align(AlignOp::Left));
        assert_eq!(designer.history().undo_len(), undo_before + 1);
        for id in ids {
            assert!((position(&designer, id).x - 10.0).abs() < 1e-9);
        }

        designer.handle(DesignerEvent::Undo);
        assert!((position(&designer, ids[2]).x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_align_single_marker_is_noop() {
        let mut designer = Designer::default();
        place(&mut designer, ShapeKind::Circle, 10.0, 10.0);
        let undo_before = designer.history().undo_len();
        let outcome = designer.handle(DesignerEvent::Align(AlignOp::Right));
        assert!(outcome.is_noop());
        assert_eq!(designer.history().undo_len(), undo_before);
    }

    #[test]
    fn test_delete_and_clear_section() {
        let mut designer = Designer::default();
        designer.handle(DesignerEvent::SetLayer(MarkerRole::Section));
        let section = place(&mut designer, ShapeKind::Rectangle, 50.0, 50.0);
        if let Some(info) = designer.state.store.get_mut(section).and_then(|m| m.section_mut()) {
            info.name = "Floor".to_string();
        }

        designer.handle(DesignerEvent::SetLayer(MarkerRole::Seat));
        for x in [10.0, 20.0] {
            let seat = place(&mut designer, ShapeKind::Seat, x, 10.0);
            if let Some(info) = designer.state.store.get_mut(seat).and_then(|m| m.seat_mut()) {
                info.section = "Floor".to_string();
            }
        }
        assert_eq!(designer.store().seats().len(), 2);

        designer.handle(DesignerEvent::ClearSection(section));
        assert!(designer.store().seats().is_empty());
        assert!(designer.selection().is_empty());
        designer.handle(DesignerEvent::Undo);
        assert_eq!(designer.store().seats().len(), 2);

        designer.handle(DesignerEvent::MarkerClick { id: section, shift: false });
        designer.handle(DesignerEvent::DeleteSelected);
        assert!(designer.store().sections().is_empty());
        assert!(designer.selection().is_empty());
    }

    #[test]
    fn test_nudge_and_update_style() {
        let mut designer = Designer::default();
        let id = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);

        designer.handle(DesignerEvent::Nudge { dx: 2.0, dy: -1.0 });
        assert!(approx(position(&designer, id), Point::new(11.0, 9.5)));

        let green = MarkerStyle {
            fill_color: MarkerColor::rgb(0, 200, 0),
            ..MarkerStyle::default()
        };
        designer.handle(DesignerEvent::UpdateStyle(green.clone()));
        assert_eq!(designer.store().get(id).unwrap().style, green);
        assert_eq!(designer.tools().style_for(ShapeKind::Seat), green);
    }

    #[test]
    fn test_update_unknown_marker_is_noop() {
        let mut designer = Designer::default();
        let outcome = designer.handle(DesignerEvent::UpdateMarker {
            id: uuid::Uuid::new_v4(),
            patch: MarkerPatch::position(Point::new(1.0, 1.0)),
        });
        assert!(outcome.is_noop());
        assert!(!designer.can_undo());
    }

    #[test]
    fn test_select_all_uses_active_layer() {
        let mut designer = Designer::default();
        let a = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);
        let b = place(&mut designer, ShapeKind::Seat, 20.0, 10.0);
        designer.handle(DesignerEvent::SetLayer(MarkerRole::Section));
        place(&mut designer, ShapeKind::Rectangle, 50.0, 50.0);

        designer.handle(DesignerEvent::SetLayer(MarkerRole::Seat));
        designer.handle(DesignerEvent::ClearSelection);
        designer.handle(DesignerEvent::SelectAll);
        assert_eq!(designer.selection().ids(MarkerRole::Seat), &[a, b]);
        assert!(designer.selection().ids(MarkerRole::Section).is_empty());
    }

    #[test]
    fn test_history_is_bounded_by_config() {
        let config = DesignerConfig {
            max_history: 3,
            ..DesignerConfig::default()
        };
        let mut designer = Designer::new(config);
        for i in 0..5 {
            place(&mut designer, ShapeKind::Seat, 10.0 + i as f64, 10.0);
        }
        let mut undone = 0;
        while designer.handle(DesignerEvent::Undo).layout_changed {
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert_eq!(designer.store().len(), 2);
    }

    #[test]
    fn test_hit_test() {
        let mut designer = Designer::default();
        let id = place(&mut designer, ShapeKind::Seat, 40.0, 40.0);
        assert_eq!(designer.hit_test(stage(40.0, 40.0)), Some(id));
        assert_eq!(designer.hit_test(stage(80.0, 80.0)), None);
    }

    #[test]
    fn test_swapped_zoom_limits_do_not_panic() {
        let config = DesignerConfig {
            min_zoom: 4.0,
            max_zoom: 2.0,
            ..DesignerConfig::default()
        };
        let mut designer = Designer::new(config);
        designer.handle(DesignerEvent::Zoom { steps: 1, at: None });
        designer.handle(DesignerEvent::Zoom { steps: 3, at: Some(Point::new(100.0, 100.0)) });
        let zoom = designer.camera().zoom;
        assert!((2.0..=4.0).contains(&zoom));
    }

    #[test]
    fn test_undo_mid_drag_discards_preview() {
        init();
        let mut designer = Designer::default();
        let id = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);

        designer.handle(DesignerEvent::DragStart { id, point: stage(10.0, 10.0) });
        designer.handle(DesignerEvent::DragMove { point: stage(50.0, 50.0) });
        let outcome = designer.handle(DesignerEvent::Undo);
        assert!(outcome.layout_changed);
        assert!(designer.is_settled());
        assert!(designer.store().is_empty());

        designer.handle(DesignerEvent::Redo);
        assert!(approx(position(&designer, id), Point::new(10.0, 10.0)));
        assert!(!designer.can_redo());

        // The cancelled drag cannot be finished afterwards.
        let end = designer.handle(DesignerEvent::DragEnd { point: stage(50.0, 50.0) });
        assert!(end.is_noop());
        assert!(approx(position(&designer, id), Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_redo_mid_drag_discards_preview() {
        let mut designer = Designer::default();
        let a = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);
        let b = place(&mut designer, ShapeKind::Seat, 20.0, 20.0);
        designer.handle(DesignerEvent::Undo);
        assert!(!designer.store().contains(b));

        designer.handle(DesignerEvent::DragStart { id: a, point: stage(10.0, 10.0) });
        designer.handle(DesignerEvent::DragMove { point: stage(50.0, 50.0) });
        designer.handle(DesignerEvent::Redo);
        assert!(designer.is_settled());
        assert!(designer.store().contains(b));
        assert!(approx(position(&designer, a), Point::new(10.0, 10.0)));

        designer.handle(DesignerEvent::Undo);
        assert!(!designer.store().contains(b));
        assert!(approx(position(&designer, a), Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_space_mid_gesture_pans_without_moving_markers() {
        let mut designer = Designer::default();
        let id = place(&mut designer, ShapeKind::Seat, 10.0, 10.0);
        let undo_before = designer.history().undo_len();

        designer.handle(DesignerEvent::DragStart { id, point: stage(10.0, 10.0) });
        designer.handle(DesignerEvent::SpaceDown);
        designer.handle(DesignerEvent::PointerMove { point: stage(10.0, 10.0) });
        let moved = designer.handle(DesignerEvent::DragMove { point: stage(50.0, 50.0) });
        assert!(moved.is_noop());
        designer.handle(DesignerEvent::PointerMove { point: stage(50.0, 50.0) });

        assert!(approx(position(&designer, id), Point::new(10.0, 10.0)));
        assert_eq!(designer.camera().pan, Vec2::new(320.0, 240.0));

        let end = designer.handle(DesignerEvent::DragEnd { point: stage(50.0, 50.0) });
        assert!(end.is_noop());
        assert!(designer.is_settled());
        assert_eq!(designer.history().undo_len(), undo_before);
        assert!(approx(position(&designer, id), Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_space_freezes_marquee() {
        let mut designer = Designer::default();
        let id = place(&mut designer, ShapeKind::Seat, 30.0, 30.0);

        designer.handle(DesignerEvent::MarqueeStart { point: stage(0.0, 0.0), shift: false });
        designer.handle(DesignerEvent::SpaceDown);
        designer.handle(DesignerEvent::MarqueeMove { point: stage(50.0, 50.0) });
        designer.handle(DesignerEvent::MarqueeEnd { point: stage(50.0, 50.0) });
        assert!(designer.is_settled());
        assert!(!designer.selection().contains(id));
    }

    #[test]
    fn test_with_styles_keeps_config_flags() {
        struct Red;

        impl StyleProvider for Red {
            fn style_for(&self, _kind: ShapeKind) -> MarkerStyle {
                MarkerStyle {
                    fill_color: MarkerColor::rgb(255, 0, 0),
                    ..MarkerStyle::default()
                }
            }
        }

        let config = DesignerConfig {
            revert_to_pointer_after_place: true,
            ..DesignerConfig::default()
        };
        let mut designer = Designer::with_styles(MarkerStore::new(), config, &Red);
        designer.handle(DesignerEvent::SelectTool(Some(ShapeKind::Sofa)));
        let outcome = designer.handle(DesignerEvent::CanvasClick {
            point: stage(10.0, 10.0),
            shift: false,
        });
        let id = outcome.created.unwrap();
        assert_eq!(designer.store().get(id).unwrap().style.fill_color, MarkerColor::rgb(255, 0, 0));
        assert_eq!(designer.tools().current_tool, None);
    }
}
