use std::time::{Duration, Instant};

use ganttsheet_core::{GridRange, Region, ScreenPoint, ScreenRect};
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellStyle};
use crate::cell_id::{CellId, SheetId};
use crate::clipboard::{copy_source, Clipboard};
use crate::debounce::{PendingStyle, StyleDebouncer, DEFAULT_STYLE_DEBOUNCE};
use crate::drag::{CellBoundsSource, DragSelection};
use crate::events::{EventCallback, WorkbookEvent};
use crate::gantt::Gantt;
use crate::merge::{MergeError, MergeOutcome};
use crate::selection::{range_between, Selection, SelectionPatch};
use crate::sheet::{disambiguate_title, strip_counter_suffix, Sheet, SheetSummary};
use crate::structure::{ColumnDirection, RowDirection};

/// Title used when a sheet is added without one.
pub const DEFAULT_SHEET_TITLE: &str = "New Sheet";

/// Construction-time knobs, usually built from user settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookOptions {
    pub default_title: String,
    pub style_debounce: Duration,
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_SHEET_TITLE.to_string(),
            style_debounce: DEFAULT_STYLE_DEBOUNCE,
        }
    }
}

/// Direction for reordering a sheet tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetDirection {
    Left,
    Right,
}

/// State touched by one command, turned into events on commit.
#[derive(Debug, Default, Clone, Copy)]
struct Touched {
    sheets: bool,
    active: bool,
    grid: Option<usize>,
    selection: bool,
}

impl Touched {
    fn is_empty(&self) -> bool {
        !self.sheets && !self.active && self.grid.is_none() && !self.selection
    }
}

/// The sheet collection, active sheet, and selection.
///
/// All writes go through methods here. Each method that changes anything
/// bumps `revision` once and notifies subscribers; methods that change
/// nothing return `false` (or an empty result) and stay silent.
pub struct Workbook {
    options: WorkbookOptions,
    sheets: Vec<Sheet>,
    active: Option<usize>,
    selection: Selection,
    clipboard: Clipboard,
    debouncer: StyleDebouncer,
    drag: Option<DragSelection>,
    revision: u64,
    listeners: Vec<EventCallback>,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// A workbook holding one default sheet, active.
    pub fn new() -> Self {
        Self::with_options(WorkbookOptions::default())
    }

    pub fn with_options(options: WorkbookOptions) -> Self {
        let mut wb = Self::empty(options);
        wb.initialize();
        wb.revision = 0;
        wb
    }

    /// No sheets and no active sheet. Call [`Workbook::initialize`] before use.
    pub fn empty(options: WorkbookOptions) -> Self {
        let debouncer = StyleDebouncer::new(options.style_debounce);
        Self {
            options,
            sheets: Vec::new(),
            active: None,
            selection: Selection::new(),
            clipboard: Clipboard::new(),
            debouncer,
            drag: None,
            revision: 0,
            listeners: Vec::new(),
        }
    }

    /// Rebuild a workbook from stored parts.
    ///
    /// Every sheet is re-indexed and its merge flags normalized, the active
    /// index is clamped, and selected ids that do not resolve in the active
    /// sheet are dropped. The result may still be empty.
    pub fn from_parts(
        options: WorkbookOptions,
        sheets: Vec<Sheet>,
        active: Option<usize>,
        selected: impl IntoIterator<Item = CellId>,
    ) -> Self {
        let mut wb = Self::empty(options);
        wb.sheets = sheets;
        for sheet in &mut wb.sheets {
            sheet.gantt.reindex();
            sheet.gantt.normalize_merges();
            if let Err(e) = sheet.gantt.validate() {
                log::warn!("sheet {} loaded with a malformed grid: {}", sheet.id, e);
            }
        }
        wb.active = match active {
            _ if wb.sheets.is_empty() => None,
            Some(i) => Some(i.min(wb.sheets.len() - 1)),
            None => None,
        };
        wb.selection.replace(selected);
        match wb.active.and_then(|i| wb.sheets.get(i)) {
            Some(sheet) => wb.selection.retain_resolved(&sheet.gantt),
            None => {
                wb.selection.clear();
            }
        }
        wb
    }

    pub fn options(&self) -> &WorkbookOptions {
        &self.options
    }

    /// Monotonic change counter. Bumped once per committed command.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a listener for change events.
    pub fn subscribe(&mut self, callback: EventCallback) {
        self.listeners.push(callback);
    }

    fn commit(&mut self, touched: Touched) {
        if touched.is_empty() {
            return;
        }
        self.revision += 1;
        let revision = self.revision;

        let mut events = Vec::with_capacity(4);
        if touched.sheets {
            events.push(WorkbookEvent::SheetsChanged { revision });
        }
        if touched.active {
            events.push(WorkbookEvent::ActiveSheetChanged {
                revision,
                index: self.active,
            });
        }
        if let Some(sheet) = touched.grid.and_then(|i| self.sheets.get_mut(i)) {
            sheet.touch();
            events.push(WorkbookEvent::GridChanged {
                revision,
                sheet: sheet.id.clone(),
            });
        }
        if touched.selection {
            events.push(WorkbookEvent::SelectionChanged {
                revision,
                selected: self.selection.len(),
            });
        }

        for listener in &mut self.listeners {
            for event in &events {
                listener(event);
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn current_sheet(&self) -> Option<&Sheet> {
        self.active.and_then(|i| self.sheets.get(i))
    }

    fn current_gantt(&self) -> Option<&Gantt> {
        self.current_sheet().map(|s| &s.gantt)
    }

    /// Head rows of the active sheet (empty when there is none).
    pub fn current_head(&self) -> &[Vec<Cell>] {
        self.current_gantt().map(|g| g.head.as_slice()).unwrap_or(&[])
    }

    /// Body rows of the active sheet (empty when there is none).
    pub fn current_body(&self) -> &[Vec<Cell>] {
        self.current_gantt().map(|g| g.body.as_slice()).unwrap_or(&[])
    }

    /// Every cell of the active sheet, head first, row-major.
    pub fn all_cells(&self) -> Vec<&Cell> {
        self.current_gantt().map(|g| g.cells().collect()).unwrap_or_default()
    }

    /// Every cell of the active sheet joined with its on-screen bounds.
    pub fn all_cells_with_bounds(&self, source: &impl CellBoundsSource) -> Vec<(&Cell, Option<ScreenRect>)> {
        self.all_cells()
            .into_iter()
            .map(|cell| (cell, source.cell_bounds(&cell.id)))
            .collect()
    }

    pub fn cell_by_id(&self, id: &CellId) -> Option<&Cell> {
        self.current_gantt().and_then(|g| g.find(id))
    }

    pub fn sheet_list(&self) -> Vec<SheetSummary> {
        self.sheets.iter().map(Sheet::summary).collect()
    }

    pub fn sheet_by_id(&self, id: &SheetId) -> Option<&Sheet> {
        self.sheets.iter().find(|s| &s.id == id)
    }

    fn index_of(&self, id: &SheetId) -> Option<usize> {
        self.sheets.iter().position(|s| &s.id == id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, id: &CellId) -> bool {
        self.selection.contains(id)
    }

    /// Selected cells joined against the live grid. Stale ids are skipped.
    pub fn selected_cells(&self) -> Vec<&Cell> {
        self.current_gantt()
            .map(|g| self.selection.resolve(g))
            .unwrap_or_default()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut Clipboard {
        &mut self.clipboard
    }

    // =========================================================================
    // Sheet management
    // =========================================================================

    /// Ensure at least one sheet exists and the active index is valid.
    pub fn initialize(&mut self) -> bool {
        let mut touched = Touched::default();
        if self.sheets.is_empty() {
            let title = self.options.default_title.clone();
            self.sheets.push(Sheet::new(title));
            touched.sheets = true;
            log::debug!("initialized workbook with a default sheet");
        }
        let active = match self.active {
            _ if self.sheets.len() == 1 => 0,
            None => 0,
            Some(i) => i.min(self.sheets.len() - 1),
        };
        if self.active != Some(active) {
            self.active = Some(active);
            touched.active = true;
            touched.selection = self.selection.clear();
            self.drag = None;
        }
        self.commit(touched);
        !touched.is_empty()
    }

    /// Append a sheet with one default head and body cell.
    ///
    /// A supplied title gets a ` (N+1)` suffix when N existing titles start
    /// with it. The active sheet does not change.
    pub fn add_sheet(&mut self, title: Option<&str>) -> SheetId {
        let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => disambiguate_title(self.sheets.iter().map(|s| s.title.as_str()), t),
            None => self.options.default_title.clone(),
        };
        let sheet = Sheet::new(title);
        let id = sheet.id.clone();
        log::debug!("added sheet {} ({:?})", id, sheet.title);
        self.sheets.push(sheet);
        self.commit(Touched { sheets: true, ..Default::default() });
        id
    }

    /// Append a deep copy of a sheet (fresh sheet and cell ids). The title's
    /// counter suffix is stripped and recomputed.
    pub fn duplicate_sheet(&mut self, id: &SheetId) -> Option<SheetId> {
        let source = self.sheet_by_id(id)?;
        let base = strip_counter_suffix(&source.title);
        let matches = self.sheets.iter().filter(|s| s.title.starts_with(base)).count();
        let copy = source.duplicate(format!("{} ({})", base, matches + 1));
        let new_id = copy.id.clone();
        log::debug!("duplicated sheet {} as {} ({:?})", id, new_id, copy.title);
        self.sheets.push(copy);
        self.commit(Touched { sheets: true, ..Default::default() });
        Some(new_id)
    }

    /// Remove a sheet. The last remaining sheet becomes active; removing the
    /// only sheet re-initializes with a fresh default one.
    pub fn remove_sheet(&mut self, id: &SheetId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.sheets.remove(index);
        log::debug!("removed sheet {}", id);

        let mut touched = Touched { sheets: true, ..Default::default() };
        if self.sheets.is_empty() {
            let title = self.options.default_title.clone();
            self.sheets.push(Sheet::new(title));
        }
        self.active = Some(self.sheets.len() - 1);
        touched.active = true;
        touched.selection = self.selection.clear();
        self.drag = None;
        self.commit(touched);
        true
    }

    pub fn rename_sheet(&mut self, id: &SheetId, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        let Some(sheet) = self.sheets.iter_mut().find(|s| &s.id == id) else {
            return false;
        };
        if sheet.title == title {
            return false;
        }
        sheet.title = title.to_string();
        sheet.touch();
        self.commit(Touched { sheets: true, ..Default::default() });
        true
    }

    pub fn set_sheet_description(&mut self, id: &SheetId, description: Option<String>) -> bool {
        let Some(sheet) = self.sheets.iter_mut().find(|s| &s.id == id) else {
            return false;
        };
        if sheet.description == description {
            return false;
        }
        sheet.description = description;
        sheet.touch();
        self.commit(Touched { sheets: true, ..Default::default() });
        true
    }

    /// Swap a sheet with its neighbour. The moved sheet becomes active.
    pub fn move_sheet(&mut self, id: &SheetId, direction: SheetDirection) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let target = match direction {
            SheetDirection::Left if index > 0 => index - 1,
            SheetDirection::Right if index + 1 < self.sheets.len() => index + 1,
            _ => return false,
        };
        let previous = self.current_sheet().map(|s| s.id.clone());
        self.sheets.swap(index, target);
        self.active = Some(target.min(self.sheets.len() - 1));

        let mut touched = Touched { sheets: true, active: true, ..Default::default() };
        if previous.as_ref() != self.current_sheet().map(|s| &s.id) {
            touched.selection = self.selection.clear();
            self.drag = None;
        }
        log::debug!("moved sheet {} from {} to {}", id, index, target);
        self.commit(touched);
        true
    }

    /// Make the sheet at `index` active. Out-of-range indices are ignored.
    pub fn change_active_sheet(&mut self, index: usize) -> bool {
        if index >= self.sheets.len() || self.active == Some(index) {
            return false;
        }
        self.active = Some(index);
        let selection = self.selection.clear();
        self.drag = None;
        self.commit(Touched { active: true, selection, ..Default::default() });
        true
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = CellId>) -> bool {
        let mut next = Selection::new();
        next.replace(ids);
        if next == self.selection {
            return false;
        }
        self.selection = next;
        self.commit(Touched { selection: true, ..Default::default() });
        true
    }

    pub fn patch_selection(&mut self, patch: &SelectionPatch) -> bool {
        let changed = self.selection.patch(patch);
        self.commit(Touched { selection: changed, ..Default::default() });
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        self.commit(Touched { selection: changed, ..Default::default() });
        changed
    }

    /// Shift-click: add every cell in the rectangle between `anchor` and
    /// `target`, in the anchor's region.
    pub fn select_range(&mut self, anchor: &CellId, target: &CellId) -> bool {
        let add = match self.current_gantt() {
            Some(g) => range_between(g, anchor, target),
            None => return false,
        };
        self.patch_selection(&SelectionPatch { add, remove: Vec::new() })
    }

    /// Replace the selection with every existing cell of `region` in `range`.
    pub fn select_cells_in_range(&mut self, region: Region, range: GridRange) -> bool {
        let ids: Vec<CellId> = match self.current_gantt() {
            Some(g) => g.cells_in_range(region, range).into_iter().map(|c| c.id.clone()).collect(),
            None => return false,
        };
        self.set_selection(ids)
    }

    /// Select every cell of both regions.
    pub fn select_all(&mut self) -> bool {
        let ids: Vec<CellId> = self.all_cells().into_iter().map(|c| c.id.clone()).collect();
        self.set_selection(ids)
    }

    // =========================================================================
    // Rectangle selection
    // =========================================================================

    /// Start a drag: clear the selection and snapshot every cell's bounds.
    pub fn begin_drag(&mut self, origin: ScreenPoint, source: &impl CellBoundsSource) -> bool {
        let Some(gantt) = self.current_gantt() else {
            return false;
        };
        let drag = DragSelection::measure(origin, gantt.cells(), source);
        self.drag = Some(drag);
        self.clear_selection();
        true
    }

    /// Move the drag pointer. Writes only the delta; an unchanged frame
    /// writes nothing.
    pub fn drag_to(&mut self, point: ScreenPoint) -> bool {
        let patch = match self.drag.as_mut().and_then(|d| d.update(point)) {
            Some(patch) => patch,
            None => return false,
        };
        self.patch_selection(&patch)
    }

    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Run a structural edit on the active sheet as one revision.
    ///
    /// Selected ids that stop resolving are dropped; `clear_selection`
    /// clears the rest whether or not the edit changed anything.
    fn edit_active<F>(&mut self, clear_selection: bool, edit: F) -> bool
    where
        F: FnOnce(&mut Gantt) -> bool,
    {
        let Some(index) = self.active else {
            return false;
        };
        let Some(sheet) = self.sheets.get_mut(index) else {
            return false;
        };
        let edited = edit(&mut sheet.gantt);

        let mut touched = Touched::default();
        if edited {
            touched.grid = Some(index);
            let before = self.selection.len();
            self.selection.retain_resolved(&sheet.gantt);
            touched.selection = self.selection.len() != before;
        }
        if clear_selection {
            touched.selection |= self.selection.clear();
        }
        self.commit(touched);
        edited
    }

    pub fn insert_row(&mut self, region: Region, direction: RowDirection, pivot_row: usize) -> bool {
        self.edit_active(false, |g| {
            g.insert_row(region, direction, pivot_row);
            true
        })
    }

    pub fn insert_column(&mut self, direction: ColumnDirection, pivot_row: usize, pivot_col: usize) -> bool {
        self.edit_active(false, |g| {
            g.insert_column(direction, pivot_row, pivot_col);
            true
        })
    }

    pub fn delete_row(&mut self, region: Region, row: usize) -> bool {
        self.edit_active(false, |g| g.delete_row(region, row))
    }

    pub fn delete_column(&mut self, col: usize) -> bool {
        self.edit_active(false, |g| g.delete_column(col))
    }

    /// Insert a row at the top of `region`.
    pub fn add_row_above(&mut self, region: Region) -> bool {
        self.insert_row(region, RowDirection::Top, 0)
    }

    /// Insert a row at the bottom of `region`.
    pub fn add_row_below(&mut self, region: Region) -> bool {
        let last = self.current_gantt().map(|g| g.row_count(region).saturating_sub(1));
        match last {
            Some(last) => self.insert_row(region, RowDirection::Bottom, last),
            None => false,
        }
    }

    pub fn add_column_left(&mut self) -> bool {
        self.insert_column(ColumnDirection::Left, 0, 0)
    }

    pub fn add_column_right(&mut self) -> bool {
        let last = self.current_gantt().map(|g| g.column_count().saturating_sub(1));
        match last {
            Some(last) => self.insert_column(ColumnDirection::Right, 0, last),
            None => false,
        }
    }

    /// Region shared by every selected cell. `Err(())` when they disagree,
    /// `Ok(None)` when nothing is selected.
    fn selected_region(&self) -> Result<Option<Region>, ()> {
        let cells = self.selected_cells();
        let Some(first) = cells.first() else {
            return Ok(None);
        };
        if cells.iter().all(|c| c.region == first.region) {
            Ok(Some(first.region))
        } else {
            Err(())
        }
    }

    /// Insert a row above the topmost selected row, then clear the selection.
    ///
    /// Mixed head/body selections abort and leave the selection alone. With
    /// nothing selected the row goes on top of the head.
    pub fn insert_row_above_selection(&mut self) -> bool {
        let Ok(region) = self.selected_region() else {
            log::debug!("row insert skipped: selection spans both regions");
            return false;
        };
        let region = region.unwrap_or(Region::Head);
        let pivot = self.selected_cells().iter().map(|c| c.row).min().unwrap_or(0);
        self.edit_active(true, |g| {
            g.insert_row(region, RowDirection::Top, pivot);
            true
        })
    }

    /// Insert a row below the bottommost selected row, then clear the
    /// selection. With nothing selected the row goes under the last body row.
    pub fn insert_row_below_selection(&mut self) -> bool {
        let Ok(region) = self.selected_region() else {
            log::debug!("row insert skipped: selection spans both regions");
            return false;
        };
        let region = region.unwrap_or(Region::Body);
        let pivot = self.selected_cells().iter().map(|c| c.row).max();
        self.edit_active(true, |g| {
            let pivot = pivot.unwrap_or_else(|| g.row_count(region).saturating_sub(1));
            g.insert_row(region, RowDirection::Bottom, pivot);
            true
        })
    }

    /// Insert a column left of the leftmost selected column (column 0 when
    /// nothing is selected), then clear the selection.
    pub fn insert_column_left_of_selection(&mut self) -> bool {
        let pivot = self.selected_cells().iter().map(|c| c.column).min().unwrap_or(0);
        self.edit_active(true, |g| {
            g.insert_column(ColumnDirection::Left, 0, pivot);
            true
        })
    }

    /// Insert a column right of the rightmost selected column (the last
    /// column when nothing is selected), then clear the selection.
    pub fn insert_column_right_of_selection(&mut self) -> bool {
        let pivot = self.selected_cells().iter().map(|c| c.column).max();
        self.edit_active(true, |g| {
            let pivot = pivot.unwrap_or_else(|| g.column_count().saturating_sub(1));
            g.insert_column(ColumnDirection::Right, 0, pivot);
            true
        })
    }

    /// Delete every row touched by the selection, highest first, then clear
    /// the selection. Each delete keeps at least one row per region.
    pub fn delete_selected_rows(&mut self) -> bool {
        let mut rows: Vec<(Region, usize)> = self.selected_cells().iter().map(|c| (c.region, c.row)).collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        rows.dedup();

        self.edit_active(true, |g| {
            let mut deleted = false;
            for (region, row) in rows {
                deleted |= g.delete_row(region, row);
            }
            deleted
        })
    }

    /// Delete every column touched by the selection, highest first, then
    /// clear the selection. At least one column always remains.
    pub fn delete_selected_columns(&mut self) -> bool {
        let mut cols: Vec<usize> = self.selected_cells().iter().map(|c| c.column).collect();
        cols.sort_unstable_by(|a, b| b.cmp(a));
        cols.dedup();

        self.edit_active(true, |g| {
            let mut deleted = false;
            for col in cols {
                deleted |= g.delete_column(col);
            }
            deleted
        })
    }

    // =========================================================================
    // Merge
    // =========================================================================

    /// Merge the selected rectangle and clear the selection.
    ///
    /// On error nothing changes, selection included.
    pub fn merge_cells(&mut self, horizontal: bool, vertical: bool) -> Result<MergeOutcome, MergeError> {
        let index = self.active.ok_or(MergeError::NoActiveSheet)?;
        let sheet = self.sheets.get_mut(index).ok_or(MergeError::NoActiveSheet)?;
        let outcome = match sheet.gantt.merge_selection(&self.selection, horizontal, vertical) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("merge rejected: {}", e);
                return Err(e);
            }
        };
        let selection = self.selection.clear();
        self.commit(Touched { grid: Some(index), selection, ..Default::default() });
        Ok(outcome)
    }

    /// Dissolve every merge anchored by a selected cell, then clear the
    /// selection. Returns the number of blocks dissolved.
    pub fn unmerge_cells(&mut self) -> usize {
        let Some(index) = self.active else {
            return 0;
        };
        let Some(sheet) = self.sheets.get_mut(index) else {
            return 0;
        };
        let dissolved = sheet.gantt.unmerge_selection(&self.selection);
        let selection = self.selection.clear();
        let grid = (dissolved > 0).then_some(index);
        self.commit(Touched { grid, selection, ..Default::default() });
        dissolved
    }

    // =========================================================================
    // Content and style
    // =========================================================================

    /// Apply `write` to each listed cell of the active sheet that exists.
    /// Returns the active index when at least one cell was written.
    fn write_cells<F>(&mut self, ids: &[CellId], mut write: F) -> Option<usize>
    where
        F: FnMut(&mut Cell),
    {
        let index = self.active?;
        let sheet = self.sheets.get_mut(index)?;
        let mut written = false;
        for cell in sheet.gantt.cells_mut() {
            if ids.contains(&cell.id) {
                write(cell);
                written = true;
            }
        }
        written.then_some(index)
    }

    fn write_and_commit<F>(&mut self, ids: &[CellId], write: F) -> bool
    where
        F: FnMut(&mut Cell),
    {
        let grid = self.write_cells(ids, write);
        self.commit(Touched { grid, ..Default::default() });
        grid.is_some()
    }

    pub fn update_cell_content(&mut self, id: &CellId, content: &str) -> bool {
        self.write_and_commit(std::slice::from_ref(id), |cell| cell.content = content.to_string())
    }

    /// Merge `patch` into a cell's style. Patch keys overwrite.
    pub fn update_cell_style(&mut self, id: &CellId, patch: &CellStyle) -> bool {
        self.write_and_commit(std::slice::from_ref(id), |cell| cell.style.merge(patch))
    }

    /// Merge `patch` into many cells' styles in one revision.
    pub fn batch_update_cell_styles(&mut self, ids: &[CellId], patch: &CellStyle) -> bool {
        self.write_and_commit(ids, |cell| cell.style.merge(patch))
    }

    pub fn clear_cell_style(&mut self, id: &CellId) -> bool {
        self.write_and_commit(std::slice::from_ref(id), |cell| cell.style.clear())
    }

    /// Write to every selected cell, then clear the selection, as one
    /// revision.
    fn write_selection<F>(&mut self, write: F) -> bool
    where
        F: FnMut(&mut Cell),
    {
        let ids: Vec<CellId> = self.selection.to_sorted_vec();
        let grid = self.write_cells(&ids, write);
        let selection = self.selection.clear();
        self.commit(Touched { grid, selection, ..Default::default() });
        grid.is_some() || selection
    }

    pub fn paste_content_to_selection(&mut self, content: &str) -> bool {
        self.write_selection(|cell| cell.content = content.to_string())
    }

    pub fn apply_style_to_selection(&mut self, patch: &CellStyle) -> bool {
        self.write_selection(|cell| cell.style.merge(patch))
    }

    pub fn clear_style_of_selection(&mut self) -> bool {
        self.write_selection(|cell| cell.style.clear())
    }

    /// Backspace: empty the content of every selected cell.
    pub fn delete_content_of_selection(&mut self) -> bool {
        self.write_selection(|cell| cell.content.clear())
    }

    /// Delete: empty content and style of every selected cell.
    pub fn clear_content_and_style_of_selection(&mut self) -> bool {
        self.write_selection(|cell| {
            cell.content.clear();
            cell.style.clear();
        })
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    /// Copy the content of the selection's top-left selected cell.
    pub fn copy_content(&mut self) -> bool {
        let content = copy_source(&self.selected_cells()).map(|c| c.content.clone());
        match content {
            Some(content) => {
                self.clipboard.set_content(content);
                true
            }
            None => false,
        }
    }

    /// Copy the style of the selection's top-left selected cell.
    pub fn copy_style(&mut self) -> bool {
        let style = copy_source(&self.selected_cells()).map(|c| c.style.clone());
        match style {
            Some(style) => {
                self.clipboard.set_style(style);
                true
            }
            None => false,
        }
    }

    pub fn paste_content(&mut self) -> bool {
        let content = self.clipboard.content().to_string();
        self.paste_content_to_selection(&content)
    }

    /// Paste the copied style. An empty clipboard style clears the selected
    /// cells' styles instead.
    pub fn paste_style(&mut self) -> bool {
        if self.clipboard.has_style() {
            let style = self.clipboard.style().clone();
            self.apply_style_to_selection(&style)
        } else {
            self.clear_style_of_selection()
        }
    }

    // =========================================================================
    // Debounced style
    // =========================================================================

    /// Style the selected cells, coalescing rapid calls.
    ///
    /// The target ids are captured now. Immediate mode drops any pending
    /// write and commits at once; otherwise the write waits for
    /// [`Workbook::flush_due_style`] after the quiet period.
    pub fn apply_style(&mut self, patch: CellStyle, immediate: bool, now: Instant) -> bool {
        let ids: Vec<CellId> = self.selected_cells().iter().map(|c| c.id.clone()).collect();
        if ids.is_empty() {
            return false;
        }
        if immediate {
            self.debouncer.cancel();
            return self.batch_update_cell_styles(&ids, &patch);
        }
        self.debouncer.schedule(patch, ids, now);
        false
    }

    pub fn has_pending_style(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// When the pending style write is due.
    pub fn pending_style_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Commit the pending style write if its quiet period has passed.
    pub fn flush_due_style(&mut self, now: Instant) -> bool {
        match self.debouncer.take_due(now) {
            Some(pending) => self.commit_pending_style(pending),
            None => false,
        }
    }

    /// Commit the pending style write regardless of its deadline.
    pub fn flush_pending_style(&mut self) -> bool {
        match self.debouncer.cancel() {
            Some(pending) => self.commit_pending_style(pending),
            None => false,
        }
    }

    fn commit_pending_style(&mut self, pending: PendingStyle) -> bool {
        log::debug!("committing debounced style for {} cell(s)", pending.ids.len());
        self.batch_update_cell_styles(&pending.ids, &pending.patch)
    }
}
