//! Immutable snapshots of the invocation stream and the raw/display projections.
//!
//! The user only ever counts completed entries, so two index spaces exist:
//! raw (every invocation) and display (completed only). They diverge as soon
//! as anything is mid-execution, so translation always goes through the
//! snapshot's stable [`SnapshotId`], never through index arithmetic.

use std::collections::HashMap;
use std::fmt;

use lookout_core::ToolInvocation;
use serde::Serialize;

/// Stable identity: raw index plus invocation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SnapshotId(String);

impl SnapshotId {
    pub fn new(raw_index: usize, invoked_at: &str) -> Self {
        Self(format!("{raw_index}@{invoked_at}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavSnapshot {
    pub id: SnapshotId,
    pub invocation: ToolInvocation,
    pub raw_index: usize,
}

/// Cursor position as the user sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayPosition {
    pub index: usize,
    pub total: usize,
    /// The raw cursor sits on a still-running entry; `index` is a stand-in.
    pub behind_live: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotArena {
    snapshots: Vec<NavSnapshot>,
    by_id: HashMap<SnapshotId, usize>,
    completed: Vec<SnapshotId>,
}

impl SnapshotArena {
    pub fn from_invocations(invocations: &[ToolInvocation]) -> Self {
        let mut arena = Self::default();
        for (raw_index, inv) in invocations.iter().enumerate() {
            let id = SnapshotId::new(raw_index, &inv.invoked_at);
            if inv.is_complete() {
                arena.completed.push(id.clone());
            }
            arena.by_id.insert(id.clone(), raw_index);
            arena.snapshots.push(NavSnapshot {
                id,
                invocation: inv.clone(),
                raw_index,
            });
        }
        arena
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, raw: usize) -> Option<&NavSnapshot> {
        self.snapshots.get(raw)
    }

    pub fn snapshots(&self) -> &[NavSnapshot] {
        &self.snapshots
    }

    pub fn raw_of(&self, id: &SnapshotId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn last_raw(&self) -> Option<usize> {
        self.snapshots.len().checked_sub(1)
    }

    pub fn last_completed_raw(&self) -> Option<usize> {
        self.completed.last().and_then(|id| self.raw_of(id))
    }

    pub fn newest_is_complete(&self) -> bool {
        self.snapshots
            .last()
            .is_some_and(|s| s.invocation.is_complete())
    }

    /// Project a raw index into completed-only space.
    ///
    /// A raw index on a running entry maps to the nearest completed entry at
    /// or before it (the first completed one if none precede it) and is
    /// flagged `behind_live`. `None` when out of range or nothing has
    /// completed yet.
    pub fn to_display(&self, raw: usize) -> Option<DisplayPosition> {
        let snapshot = self.snapshots.get(raw)?;
        let total = self.completed.len();
        if total == 0 {
            return None;
        }
        if let Some(index) = self.completed.iter().position(|id| *id == snapshot.id) {
            return Some(DisplayPosition {
                index,
                total,
                behind_live: false,
            });
        }
        let index = self
            .completed
            .iter()
            .rposition(|id| self.raw_of(id).is_some_and(|r| r < raw))
            .unwrap_or(0);
        Some(DisplayPosition {
            index,
            total,
            behind_live: true,
        })
    }

    /// Map a display index back to its raw index through the snapshot id.
    pub fn to_raw(&self, display: usize) -> Option<usize> {
        self.completed.get(display).and_then(|id| self.raw_of(id))
    }
}
