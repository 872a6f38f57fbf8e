//! Rectangle (drag) selection.
//!
//! Cell bounds are measured once when the drag starts. Each frame computes
//! the set of cells whose box overlaps the drag rectangle and emits only the
//! delta against the previous frame.

use rustc_hash::FxHashSet;

use ganttsheet_core::{ScreenPoint, ScreenRect};

use crate::cell::Cell;
use crate::cell_id::CellId;
use crate::selection::SelectionPatch;

/// On-screen bounds lookup provided by the rendering layer.
pub trait CellBoundsSource {
    /// Current box of a rendered cell, or `None` if it is not on screen.
    fn cell_bounds(&self, id: &CellId) -> Option<ScreenRect>;
}

impl<F> CellBoundsSource for F
where
    F: Fn(&CellId) -> Option<ScreenRect>,
{
    fn cell_bounds(&self, id: &CellId) -> Option<ScreenRect> {
        self(id)
    }
}

#[derive(Debug, Clone)]
pub struct DragSelection {
    origin: ScreenPoint,
    bounds: Vec<(CellId, ScreenRect)>,
    matched: FxHashSet<CellId>,
}

impl DragSelection {
    /// Start a drag at `origin` against a snapshot of cell bounds.
    pub fn new(origin: ScreenPoint, bounds: Vec<(CellId, ScreenRect)>) -> Self {
        Self {
            origin,
            bounds,
            matched: FxHashSet::default(),
        }
    }

    /// Snapshot the bounds of `cells` from `source`. Cells the source cannot
    /// measure are left out of the drag entirely.
    pub fn measure<'a>(
        origin: ScreenPoint,
        cells: impl IntoIterator<Item = &'a Cell>,
        source: &impl CellBoundsSource,
    ) -> Self {
        let bounds = cells
            .into_iter()
            .filter_map(|cell| source.cell_bounds(&cell.id).map(|rect| (cell.id.clone(), rect)))
            .collect();
        Self::new(origin, bounds)
    }

    pub fn origin(&self) -> ScreenPoint {
        self.origin
    }

    /// Ids matched by the most recent frame.
    pub fn matched(&self) -> &FxHashSet<CellId> {
        &self.matched
    }

    /// Move the pointer to `point`. Returns the selection delta, or `None`
    /// when the matched set did not change.
    pub fn update(&mut self, point: ScreenPoint) -> Option<SelectionPatch> {
        let rect = ScreenRect::from_corners(self.origin, point);
        let next: FxHashSet<CellId> = self
            .bounds
            .iter()
            .filter(|(_, cell_rect)| rect.intersects(cell_rect))
            .map(|(id, _)| id.clone())
            .collect();

        let patch = diff(&self.matched, &next);
        self.matched = next;
        if patch.is_empty() {
            None
        } else {
            Some(patch)
        }
    }
}

/// `add = next - prev`, `remove = prev - next`, both sorted.
pub fn diff(prev: &FxHashSet<CellId>, next: &FxHashSet<CellId>) -> SelectionPatch {
    let mut add: Vec<CellId> = next.difference(prev).cloned().collect();
    let mut remove: Vec<CellId> = prev.difference(next).cloned().collect();
    add.sort();
    remove.sort();
    SelectionPatch { add, remove }
}
