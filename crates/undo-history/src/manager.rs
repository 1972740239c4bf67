/// Undo/redo manager over host-supplied reversible operations.
///
/// Entries live in a single stack with a cursor. Entries at or below the
/// cursor are applied; entries above it are redoable. Adding a new entry
/// discards everything above the cursor.
use anyhow::Result;

use crate::config::HistoryConfig;
use crate::error::HistoryError;
use crate::operation::{Entry, GroupId, HistoryState, Operation};

/// Callback invoked whenever `can_undo` or `can_redo` flips.
pub type ChangeCallback = Box<dyn FnMut(HistoryState) + Send>;

/// Records reversible operations and steps backward and forward through them.
///
/// Every mutating call takes `&mut self`, so a caller cannot start a new
/// `add`/`undo`/`redo` while a previous one is still pending.
pub struct HistoryManager {
    /// Recorded entries, oldest first.
    entries: Vec<Entry>,
    /// Number of applied entries. The cursor index is `applied - 1`.
    applied: usize,
    /// Configuration parameters.
    config: HistoryConfig,
    /// Group assigned to entries added while grouping.
    active_group: Option<GroupId>,
    /// Next group id to hand out.
    next_group: u64,
    /// Flags as last reported to `on_change`.
    observed: HistoryState,
    on_change: Option<ChangeCallback>,
}

impl std::fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryManager")
            .field("len", &self.entries.len())
            .field("index", &self.index())
            .field("max_size", &self.config.max_size)
            .field("active_group", &self.active_group)
            .field("can_undo", &self.observed.can_undo)
            .field("can_redo", &self.observed.can_redo)
            .field("has_on_change", &self.on_change.is_some())
            .finish()
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl HistoryManager {
    /// Creates an empty manager with the cursor before the first entry.
    pub fn new(mut config: HistoryConfig) -> Self {
        config.sanitize();
        Self {
            entries: Vec::new(),
            applied: 0,
            config,
            active_group: None,
            next_group: 0,
            observed: HistoryState::default(),
            on_change: None,
        }
    }

    /// Sets the change callback, builder style.
    pub fn with_on_change<F>(mut self, on_change: F) -> Self
    where
        F: FnMut(HistoryState) + Send + 'static,
    {
        self.set_on_change(on_change);
        self
    }

    /// Replaces the change callback.
    pub fn set_on_change<F>(&mut self, on_change: F)
    where
        F: FnMut(HistoryState) + Send + 'static,
    {
        self.on_change = Some(Box::new(on_change));
    }

    /// Removes the change callback.
    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    /// Whether there is an applied entry to undo.
    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    /// Whether there is an undone entry to redo.
    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    /// Current undo/redo availability.
    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// Cursor position: the last applied entry, or `None` at the very start.
    pub fn index(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    /// Number of recorded entries, applied or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.config.max_size
    }

    pub fn is_grouping(&self) -> bool {
        self.active_group.is_some()
    }

    pub fn active_group(&self) -> Option<GroupId> {
        self.active_group
    }

    /// Records an operation.
    ///
    /// Discards every redoable entry, appends the new one tagged with the
    /// active group and moves the cursor onto it, evicting the oldest entry
    /// when over capacity. Execute-style operations are then run; their
    /// failure is returned as-is and the entry stays recorded.
    pub async fn add(&mut self, op: Operation) -> Result<()> {
        let discarded = self.entries.len() - self.applied;
        if discarded > 0 {
            self.entries.truncate(self.applied);
            tracing::debug!(discarded, "Discarded redoable entries");
        }

        let (entry, run_now) = Entry::from_operation(op, self.active_group);
        self.entries.push(entry);
        self.move_cursor(self.applied + 1);

        if self.entries.len() > self.config.max_size {
            self.entries.remove(0);
            tracing::debug!(max_size = self.config.max_size, "Evicted oldest entry");
            self.move_cursor(self.applied - 1);
        }

        tracing::debug!(
            index = ?self.index(),
            len = self.entries.len(),
            group = ?self.active_group,
            "Added entry"
        );

        if run_now {
            let last = self.entries.len() - 1;
            (self.entries[last].redo)().await?;
        }
        Ok(())
    }

    /// Undoes the entry at the cursor.
    ///
    /// If that entry belongs to a group, keeps undoing while the next entry
    /// down shares the group, so the whole group unwinds in one call. A
    /// no-op when there is nothing to undo.
    pub async fn undo(&mut self) -> Result<()> {
        while self.can_undo() {
            let at = self.applied - 1;
            let group = self.entries[at].group;
            self.move_cursor(at);
            tracing::debug!(index = ?self.index(), group = ?group, "Undoing entry");

            (self.entries[at].undo)().await?;

            let next_group = self.index().and_then(|i| self.entries[i].group);
            if group.is_none() || next_group != group {
                break;
            }
        }
        Ok(())
    }

    /// Redoes the entry just above the cursor.
    ///
    /// Cascades through following entries of the same group. A no-op when
    /// there is nothing to redo.
    pub async fn redo(&mut self) -> Result<()> {
        while self.can_redo() {
            let at = self.applied;
            let group = self.entries[at].group;
            self.move_cursor(at + 1);
            tracing::debug!(index = ?self.index(), group = ?group, "Redoing entry");

            (self.entries[at].redo)().await?;

            let next_group = self.entries.get(self.applied).and_then(|e| e.group);
            if group.is_none() || next_group != group {
                break;
            }
        }
        Ok(())
    }

    /// Opens a group. Entries added until [`end_group`](Self::end_group)
    /// undo and redo as one step.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::AlreadyGrouping`] if a group is already open;
    /// the open group is kept.
    pub fn start_group(&mut self) -> Result<GroupId, HistoryError> {
        if let Some(open) = self.active_group {
            return Err(HistoryError::AlreadyGrouping(open));
        }
        let id = GroupId(self.next_group);
        self.next_group += 1;
        self.active_group = Some(id);
        tracing::debug!(group = %id, "Started group");
        Ok(id)
    }

    /// Closes the open group, if any.
    pub fn end_group(&mut self) {
        if let Some(id) = self.active_group.take() {
            tracing::debug!(group = %id, "Ended group");
        }
    }

    /// Drops every entry without invoking any callback.
    ///
    /// An open group stays open.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.move_cursor(0);
        tracing::debug!("Cleared history");
    }

    /// Moves the cursor and reports each flag that flipped.
    fn move_cursor(&mut self, applied: usize) {
        self.applied = applied;
        let current = self.state();
        if current.can_undo != self.observed.can_undo {
            self.observed.can_undo = current.can_undo;
            self.notify(current);
        }
        if current.can_redo != self.observed.can_redo {
            self.observed.can_redo = current.can_redo;
            self.notify(current);
        }
    }

    fn notify(&mut self, state: HistoryState) {
        tracing::trace!(can_undo = state.can_undo, can_redo = state.can_redo, "History changed");
        if let Some(cb) = self.on_change.as_mut() {
            cb(state);
        }
    }
}
