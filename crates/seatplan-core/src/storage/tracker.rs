//! Tracks unsaved layout changes and decides when to persist them.

use super::{LayoutStorage, StorageResult};
use crate::store::MarkerStore;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default minimum time between automatic saves.
pub const DEFAULT_SAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Key under which the most recently saved layout is also stored.
pub const LAST_LAYOUT_KEY: &str = "__last_layout__";

/// Persists a layout only once edits have settled.
///
/// The caller marks the tracker dirty after every event that changed the
/// layout and offers a save whenever the designer is settled (no drag or
/// marquee in progress).
pub struct SaveTracker<S: LayoutStorage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
    current_id: Option<String>,
}

impl<S: LayoutStorage> SaveTracker<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: DEFAULT_SAVE_INTERVAL,
            last_save: None,
            dirty: false,
            current_id: None,
        }
    }

    /// Set the minimum time between automatic saves.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the layout as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Set the id layouts are saved under; None uses the layout's own id.
    pub fn set_layout_id(&mut self, id: Option<String>) {
        self.current_id = id;
    }

    pub fn layout_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// Check whether an automatic save is due.
    pub fn should_save(&self, settled: bool) -> bool {
        if !self.dirty || !settled {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save if dirty, settled, and the interval has elapsed.
    /// Returns true if a save was performed.
    pub async fn maybe_save(&mut self, layout: &MarkerStore, settled: bool) -> StorageResult<bool> {
        if !self.should_save(settled) {
            return Ok(false);
        }
        self.save(layout).await?;
        Ok(true)
    }

    /// Save immediately.
    pub async fn save(&mut self, layout: &MarkerStore) -> StorageResult<()> {
        let id = self.current_id.clone().unwrap_or_else(|| layout.id.clone());

        self.storage.save(&id, layout).await?;
        self.storage.save(LAST_LAYOUT_KEY, layout).await?;

        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::info!("Saved layout {id} ({} markers)", layout.len());
        Ok(())
    }

    /// Load a layout and make it the current one.
    pub async fn load(&mut self, id: &str) -> StorageResult<MarkerStore> {
        let layout = self.storage.load(id).await?;
        self.current_id = Some(id.to_string());
        self.dirty = false;
        self.last_save = Some(Instant::now());
        Ok(layout)
    }

    /// Load the most recently saved layout, if any.
    pub async fn load_last(&mut self) -> Option<MarkerStore> {
        match self.storage.load(LAST_LAYOUT_KEY).await {
            Ok(layout) => {
                self.current_id = Some(layout.id.clone());
                self.dirty = false;
                self.last_save = Some(Instant::now());
                Some(layout)
            }
            Err(e) => {
                log::debug!("No last layout: {e}");
                None
            }
        }
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id).await
    }

    /// List saved layout ids, excluding the last-layout entry.
    pub async fn list_layouts(&self) -> StorageResult<Vec<String>> {
        let mut ids = self.storage.list().await?;
        ids.retain(|id| id != LAST_LAYOUT_KEY);
        Ok(ids)
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::designer::{Designer, DesignerEvent};
    use crate::markers::{MarkerRole, ShapeKind};
    use crate::storage::{MemoryStorage, block_on};
    use kurbo::Point;

    #[test]
    fn test_clean_tracker_does_not_save() {
        let tracker = SaveTracker::new(Arc::new(MemoryStorage::new()));
        assert!(!tracker.is_dirty());
        assert!(!tracker.should_save(true));
    }

    #[test]
    fn test_waits_until_settled() {
        let mut tracker = SaveTracker::new(Arc::new(MemoryStorage::new()));
        tracker.mark_dirty();
        assert!(!tracker.should_save(false));
        assert!(tracker.should_save(true));
    }

    #[test]
    fn test_interval_between_saves() {
        let mut tracker = SaveTracker::new(Arc::new(MemoryStorage::new()));
        let layout = MarkerStore::new();
        tracker.mark_dirty();
        assert!(block_on(tracker.maybe_save(&layout, true)).unwrap());
        assert!(!tracker.is_dirty());

        tracker.mark_dirty();
        assert!(!block_on(tracker.maybe_save(&layout, true)).unwrap());

        tracker.set_interval(Duration::ZERO);
        assert!(block_on(tracker.maybe_save(&layout, true)).unwrap());
    }

    #[test]
    fn test_load_last_and_list() {
        let storage = Arc::new(MemoryStorage::new());
        let mut tracker = SaveTracker::new(storage.clone());
        let mut layout = MarkerStore::new();
        layout.name = "Arena".to_string();
        tracker.mark_dirty();
        block_on(tracker.save(&layout)).unwrap();

        let list = block_on(tracker.list_layouts()).unwrap();
        assert_eq!(list, vec![layout.id.clone()]);

        let mut fresh = SaveTracker::new(storage);
        let loaded = block_on(fresh.load_last()).unwrap();
        assert_eq!(loaded.name, "Arena");
        assert_eq!(fresh.layout_id(), Some(layout.id.as_str()));
    }

    #[test]
    fn test_designer_drag_saves_only_after_release() {
        let mut tracker = SaveTracker::new(Arc::new(MemoryStorage::new()));
        tracker.set_interval(Duration::ZERO);
        let mut designer = Designer::default();

        designer.handle(DesignerEvent::SelectTool(Some(ShapeKind::Seat)));
        let id = designer
            .handle(DesignerEvent::CanvasClick {
                point: Point::new(80.0, 60.0),
                shift: false,
            })
            .created
            .unwrap();
        designer.handle(DesignerEvent::SelectTool(None));
        tracker.mark_dirty();
        assert!(block_on(tracker.maybe_save(designer.store(), designer.is_settled())).unwrap());

        designer.handle(DesignerEvent::DragStart { id, point: Point::new(80.0, 60.0) });
        let outcome = designer.handle(DesignerEvent::DragMove { point: Point::new(160.0, 60.0) });
        if outcome.layout_changed {
            tracker.mark_dirty();
        }
        assert!(!block_on(tracker.maybe_save(designer.store(), designer.is_settled())).unwrap());

        designer.handle(DesignerEvent::DragEnd { point: Point::new(160.0, 60.0) });
        assert!(block_on(tracker.maybe_save(designer.store(), designer.is_settled())).unwrap());

        let saved = block_on(tracker.storage().load(&designer.store().id)).unwrap();
        let seat = &saved.markers(MarkerRole::Seat)[0];
        assert!((seat.x() - 20.0).abs() < 1e-9);
    }
}
