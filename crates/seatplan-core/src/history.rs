//! Snapshot-based undo/redo.
//!
//! [`History`] stores opaque snapshots of some state. The owner of the state
//! implements [`Snapshotter`] to capture and restore it. Mutators call
//! [`History::record`] *before* applying a change.
//!
//! While a snapshot is being restored, `record` calls are ignored so that a
//! restore which itself triggers change handlers cannot push onto the stacks.
//! [`SharedHistory`] exposes the same operations through a cloneable handle for
//! state that needs to reach its own history from inside `restore`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Maximum number of undo states to keep by default.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Captures and restores snapshots of some state.
pub trait Snapshotter<T> {
    /// Capture the current state.
    fn snapshot(&self) -> T;

    /// Replace the current state with a snapshot.
    fn restore(&mut self, snapshot: T);
}

/// Linear undo/redo history over snapshots of type `T`.
#[derive(Debug, Clone)]
pub struct History<T> {
    /// Oldest first.
    past: VecDeque<T>,
    /// Next redo at the back.
    future: Vec<T>,
    max_history: usize,
    restoring: bool,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl<T> History<T> {
    /// Create a history keeping at most `max_history` undo states (at least one).
    pub fn new(max_history: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            max_history: max_history.max(1),
            restoring: false,
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Push a pre-change snapshot and drop the redo stack.
    ///
    /// Ignored while a restore is in progress.
    pub fn push(&mut self, snapshot: T) {
        if self.restoring {
            log::debug!("Ignoring history record during restore");
            return;
        }

        self.past.push_back(snapshot);
        self.future.clear();

        while self.past.len() > self.max_history {
            self.past.pop_front();
        }
        log::debug!("History recorded ({} undo states)", self.past.len());
    }

    /// Record the current state of `target` (call before making changes).
    pub fn record<S: Snapshotter<T> + ?Sized>(&mut self, target: &S) {
        if self.restoring {
            log::debug!("Ignoring history record during restore");
            return;
        }
        self.push(target.snapshot());
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo<S: Snapshotter<T> + ?Sized>(&mut self, target: &mut S) -> bool {
        if self.past.is_empty() {
            return false;
        }
        let live = target.snapshot();
        let Some(snapshot) = self.take_undo(live) else {
            return false;
        };
        self.restore_into(target, snapshot);
        log::debug!("Undo ({} undo / {} redo left)", self.past.len(), self.future.len());
        true
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo<S: Snapshotter<T> + ?Sized>(&mut self, target: &mut S) -> bool {
        if self.future.is_empty() {
            return false;
        }
        let live = target.snapshot();
        let Some(snapshot) = self.take_redo(live) else {
            return false;
        };
        self.restore_into(target, snapshot);
        log::debug!("Redo ({} undo / {} redo left)", self.past.len(), self.future.len());
        true
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// Check whether a restore is currently running.
    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    fn take_undo(&mut self, live: T) -> Option<T> {
        let snapshot = self.past.pop_back()?;
        self.future.push(live);
        Some(snapshot)
    }

    fn take_redo(&mut self, live: T) -> Option<T> {
        let snapshot = self.future.pop()?;
        self.past.push_back(live);
        while self.past.len() > self.max_history {
            self.past.pop_front();
        }
        Some(snapshot)
    }

    fn restore_into<S: Snapshotter<T> + ?Sized>(&mut self, target: &mut S, snapshot: T) {
        let _guard = RestoringFlag::raise(&mut self.restoring);
        target.restore(snapshot);
    }
}

/// Holds the restoring flag of a [`History`] up until dropped, including on
/// unwind.
struct RestoringFlag<'a> {
    flag: &'a mut bool,
}

impl<'a> RestoringFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for RestoringFlag<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

/// Cloneable handle to a [`History`] for state whose restore path can call
/// back into the history.
///
/// The history is not borrowed while `restore` runs, so a nested
/// [`SharedHistory::record`] is observed and ignored instead of panicking.
#[derive(Debug)]
pub struct SharedHistory<T> {
    inner: Rc<RefCell<History<T>>>,
}

impl<T> Clone for SharedHistory<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for SharedHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

/// Clears the restoring flag when dropped, including on unwind.
struct RestoreGuard<'a, T> {
    history: &'a RefCell<History<T>>,
}

impl<T> Drop for RestoreGuard<'_, T> {
    fn drop(&mut self) {
        match self.history.try_borrow_mut() {
            Ok(mut history) => history.restoring = false,
            Err(_) => log::error!("History still borrowed after restore; records stay disabled"),
        }
    }
}

impl<T> SharedHistory<T> {
    pub fn new(max_history: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(History::new(max_history))),
        }
    }

    /// Record the current state of `target`.
    ///
    /// Ignored while a restore is in progress.
    pub fn record<S: Snapshotter<T> + ?Sized>(&self, target: &S) {
        match self.inner.try_borrow_mut() {
            Ok(mut history) => history.record(target),
            Err(_) => log::warn!("History busy, snapshot dropped"),
        }
    }

    /// Undo the last change.
    pub fn undo<S: Snapshotter<T> + ?Sized>(&self, target: &mut S) -> bool {
        if !self.can_undo() {
            return false;
        }
        let live = target.snapshot();
        let snapshot = {
            let mut history = self.inner.borrow_mut();
            let Some(snapshot) = history.take_undo(live) else {
                return false;
            };
            history.restoring = true;
            snapshot
        };
        self.restore_unborrowed(target, snapshot);
        true
    }

    /// Redo the last undone change.
    pub fn redo<S: Snapshotter<T> + ?Sized>(&self, target: &mut S) -> bool {
        if !self.can_redo() {
            return false;
        }
        let live = target.snapshot();
        let snapshot = {
            let mut history = self.inner.borrow_mut();
            let Some(snapshot) = history.take_redo(live) else {
                return false;
            };
            history.restoring = true;
            snapshot
        };
        self.restore_unborrowed(target, snapshot);
        true
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }

    pub fn can_undo(&self) -> bool {
        self.inner.borrow().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.inner.borrow().can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.inner.borrow().undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.inner.borrow().redo_len()
    }

    pub fn is_restoring(&self) -> bool {
        self.inner.borrow().is_restoring()
    }

    fn restore_unborrowed<S: Snapshotter<T> + ?Sized>(&self, target: &mut S, snapshot: T) {
        let _guard = RestoreGuard {
            history: &self.inner,
        };
        target.restore(snapshot);
    }
}
