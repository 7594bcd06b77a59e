//! Undo/redo history over graph snapshots
//!
//! A linear list of immutable snapshots plus a cursor. Undo and redo only move
//! the cursor; pushing after an undo discards the redo branch.
//!
//! Invariant: `index < snapshots.len()` whenever the list is non-empty.

use crate::model::Snapshot;

/// Configuration for the history stack
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of snapshots to keep
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_history: 100 }
    }
}

/// Snapshot history with a current position
#[derive(Debug, Clone, Default)]
pub struct History {
    snapshots: Vec<Snapshot>,
    index: usize,
    config: HistoryConfig,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record a new state
    ///
    /// Drops any snapshots after the cursor, appends, and moves the cursor to
    /// the end. The oldest entries are dropped past `max_history`.
    pub fn push(&mut self, snapshot: Snapshot) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.index + 1);
        }
        self.snapshots.push(snapshot);

        let max = self.config.max_history.max(1);
        if self.snapshots.len() > max {
            let excess = self.snapshots.len() - max;
            self.snapshots.drain(..excess);
        }
        self.index = self.snapshots.len() - 1;
        log::debug!(
            "history: pushed snapshot {} of {}",
            self.index + 1,
            self.snapshots.len()
        );
    }

    /// Step back; `None` when already at the oldest snapshot
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        log::debug!("history: undo to {}", self.index);
        self.snapshots.get(self.index)
    }

    /// Step forward; `None` when already at the newest snapshot
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        log::debug!("history: redo to {}", self.index);
        self.snapshots.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.snapshots.is_empty() && self.index < self.snapshots.len() - 1
    }

    /// Snapshot at the cursor
    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.index = 0;
    }
}
