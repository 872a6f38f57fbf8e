//! Selection state: a set of cell ids scoped to the active sheet.
//!
//! Ids are weak references. A selected id whose cell was deleted simply
//! stops resolving; readers join against the live grid and skip it.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use ganttsheet_core::{GridRange, Region};

use crate::cell::Cell;
use crate::cell_id::CellId;
use crate::gantt::Gantt;

/// Ids to add and remove in one selection write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPatch {
    pub add: Vec<CellId>,
    pub remove: Vec<CellId>,
}

impl SelectionPatch {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: FxHashSet<CellId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole selection.
    pub fn replace(&mut self, ids: impl IntoIterator<Item = CellId>) {
        self.ids = ids.into_iter().collect();
    }

    /// Add then remove. Adding a present id or removing an absent one does
    /// nothing for that id. Returns true if the set changed.
    pub fn patch(&mut self, patch: &SelectionPatch) -> bool {
        let mut changed = false;
        for id in &patch.add {
            changed |= self.ids.insert(id.clone());
        }
        for id in &patch.remove {
            changed |= self.ids.remove(id);
        }
        changed
    }

    pub fn clear(&mut self) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        self.ids.clear();
        true
    }

    pub fn contains(&self, id: &CellId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellId> {
        self.ids.iter()
    }

    /// Drop ids that no longer resolve in `gantt`.
    pub fn retain_resolved(&mut self, gantt: &Gantt) {
        self.ids.retain(|id| gantt.contains(id));
    }

    /// Selected cells that still exist, in grid order (head first, row-major).
    pub fn resolve<'a>(&self, gantt: &'a Gantt) -> Vec<&'a Cell> {
        if self.ids.is_empty() {
            return Vec::new();
        }
        gantt.cells().filter(|c| self.ids.contains(&c.id)).collect()
    }

    /// Sorted id list, for stable serialization.
    pub fn to_sorted_vec(&self) -> Vec<CellId> {
        let mut ids: Vec<CellId> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}

/// Ids of every existing cell in the rectangle spanned by `anchor` and
/// `target`, in the anchor's region.
///
/// Returns an empty list when the anchor does not resolve. The target may
/// live in either region: only its position is used.
pub fn range_between(gantt: &Gantt, anchor: &CellId, target: &CellId) -> Vec<CellId> {
    let (Some(from), Some(to)) = (gantt.find(anchor), gantt.find(target)) else {
        return Vec::new();
    };
    let region: Region = from.region;
    let range = GridRange::new(from.row, from.column, to.row, to.column);
    gantt
        .cells_in_range(region, range)
        .into_iter()
        .map(|c| c.id.clone())
        .collect()
}
