//! Test harness for workbook operations with event tracking.
//!
//! `EngineHarness` wraps a `Workbook`, records every event it emits, and
//! applies `Op`s expressed as grid positions (resolved modulo the current
//! grid size, so any generated sequence is applicable). After each op the
//! caller can run `check_invariants` to verify:
//! - every sheet passes `Gantt::validate`
//! - every ghost is covered by exactly one anchor block, and blocks stay
//!   inside their region
//! - every selected id resolves in the active sheet
//! - event revisions never decrease and never run ahead of the workbook

use std::sync::{Arc, Mutex, MutexGuard};

use ganttsheet_core::{GridRange, Region};

use crate::events::{EventCollector, WorkbookEvent};
use crate::gantt::Gantt;
use crate::structure::{ColumnDirection, RowDirection};
use crate::workbook::{SheetDirection, Workbook};

/// Operation to apply to a workbook.
#[derive(Debug, Clone)]
pub enum Op {
    InsertRow { region: Region, direction: RowDirection, pivot: usize },
    InsertColumn { direction: ColumnDirection, pivot: usize },
    DeleteRow { region: Region, row: usize },
    DeleteColumn { col: usize },
    /// Select the rectangle between two positions of a region.
    Select { region: Region, from: (usize, usize), to: (usize, usize) },
    SelectAll,
    ClearSelection,
    Merge { horizontal: bool, vertical: bool },
    Unmerge,
    DeleteSelectedRows,
    DeleteSelectedColumns,
    InsertRowAboveSelection,
    InsertColumnRightOfSelection,
    SetContent { region: Region, row: usize, col: usize, content: String },
    AddSheet,
    RemoveActiveSheet,
    SwitchSheet(usize),
    MoveActiveSheet(SheetDirection),
}

/// Test harness wrapping Workbook with event tracking.
pub struct EngineHarness {
    workbook: Workbook,
    events: Arc<Mutex<EventCollector>>,
}

impl Default for EngineHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineHarness {
    /// Create a new harness with a fresh workbook.
    pub fn new() -> Self {
        Self::with_workbook(Workbook::new())
    }

    /// Create a harness wrapping an existing workbook.
    pub fn with_workbook(mut workbook: Workbook) -> Self {
        let events = Arc::new(Mutex::new(EventCollector::new()));
        let sink = Arc::clone(&events);
        workbook.subscribe(Box::new(move |event: &WorkbookEvent| {
            if let Ok(mut collector) = sink.lock() {
                collector.push(event.clone());
            }
        }));
        Self { workbook, events }
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn workbook_mut(&mut self) -> &mut Workbook {
        &mut self.workbook
    }

    /// Get collected events.
    pub fn events(&self) -> MutexGuard<'_, EventCollector> {
        self.events.lock().unwrap()
    }

    fn gantt(&self) -> Option<&Gantt> {
        self.workbook.current_sheet().map(|s| &s.gantt)
    }

    /// Map a generated position into the current region bounds.
    fn fit(&self, region: Region, row: usize, col: usize) -> (usize, usize) {
        match self.gantt() {
            Some(g) => (row % g.row_count(region).max(1), col % g.column_count().max(1)),
            None => (0, 0),
        }
    }

    /// Apply a single op. Returns whatever the workbook call reported.
    pub fn apply(&mut self, op: &Op) -> bool {
        match op {
            Op::InsertRow { region, direction, pivot } => self.workbook.insert_row(*region, *direction, *pivot),
            Op::InsertColumn { direction, pivot } => self.workbook.insert_column(*direction, 0, *pivot),
            Op::DeleteRow { region, row } => self.workbook.delete_row(*region, *row),
            Op::DeleteColumn { col } => self.workbook.delete_column(*col),
            Op::Select { region, from, to } => {
                let from = self.fit(*region, from.0, from.1);
                let to = self.fit(*region, to.0, to.1);
                let range = GridRange::new(from.0, from.1, to.0, to.1);
                self.workbook.select_cells_in_range(*region, range)
            }
            Op::SelectAll => self.workbook.select_all(),
            Op::ClearSelection => self.workbook.clear_selection(),
            Op::Merge { horizontal, vertical } => self.workbook.merge_cells(*horizontal, *vertical).is_ok(),
            Op::Unmerge => self.workbook.unmerge_cells() > 0,
            Op::DeleteSelectedRows => self.workbook.delete_selected_rows(),
            Op::DeleteSelectedColumns => self.workbook.delete_selected_columns(),
            Op::InsertRowAboveSelection => self.workbook.insert_row_above_selection(),
            Op::InsertColumnRightOfSelection => self.workbook.insert_column_right_of_selection(),
            Op::SetContent { region, row, col, content } => {
                let (row, col) = self.fit(*region, *row, *col);
                let id = self
                    .gantt()
                    .and_then(|g| g.cell_at(*region, row, col))
                    .map(|c| c.id.clone());
                match id {
                    Some(id) => self.workbook.update_cell_content(&id, content),
                    None => false,
                }
            }
            Op::AddSheet => {
                self.workbook.add_sheet(Some("Sheet"));
                true
            }
            Op::RemoveActiveSheet => {
                let id = self.workbook.current_sheet().map(|s| s.id.clone());
                match id {
                    Some(id) => self.workbook.remove_sheet(&id),
                    None => false,
                }
            }
            Op::SwitchSheet(index) => self.workbook.change_active_sheet(*index),
            Op::MoveActiveSheet(direction) => {
                let id = self.workbook.current_sheet().map(|s| s.id.clone());
                match id {
                    Some(id) => self.workbook.move_sheet(&id, *direction),
                    None => false,
                }
            }
        }
    }

    /// Apply ops in order, checking invariants after each one.
    pub fn apply_all(&mut self, ops: &[Op]) -> Result<(), String> {
        for (idx, op) in ops.iter().enumerate() {
            self.apply(op);
            self.check_invariants()
                .map_err(|e| format!("after op {} ({:?}): {}", idx, op, e))?;
        }
        Ok(())
    }

    pub fn check_invariants(&self) -> Result<(), String> {
        if self.workbook.sheet_count() == 0 {
            return Err("workbook has no sheets".to_string());
        }
        match self.workbook.active_index() {
            Some(i) if i < self.workbook.sheet_count() => {}
            other => return Err(format!("active index {:?} out of range", other)),
        }

        for sheet in self.workbook.sheets() {
            sheet.gantt.validate()?;
            check_merge_coverage(&sheet.gantt)?;
        }

        for id in self.workbook.selection().iter() {
            if self.workbook.cell_by_id(id).is_none() {
                return Err(format!("selected id {} does not resolve", id));
            }
        }

        let events = self.events();
        let mut last = 0;
        for event in events.events() {
            if event.revision() < last {
                return Err(format!("event revision went backwards: {:?}", event));
            }
            last = event.revision();
        }
        if last > self.workbook.revision() {
            return Err(format!("event revision {} ahead of workbook {}", last, self.workbook.revision()));
        }
        Ok(())
    }
}

/// Every ghost sits inside exactly one anchor block; blocks stay in bounds.
pub fn check_merge_coverage(gantt: &Gantt) -> Result<(), String> {
    for region in Region::ALL {
        let grid = gantt.region(region);
        let rows = grid.len();
        let cols = gantt.column_count();
        let mut cover = vec![vec![0usize; cols]; rows];

        for cell in grid.iter().flatten().filter(|c| c.anchor) {
            let height = cell.cell_props.row_span();
            let width = cell.cell_props.col_span();
            if cell.row + height > rows || cell.column + width > cols {
                return Err(format!("anchor {} span runs past the {} edge", cell.id, region));
            }
            for row in cover.iter_mut().skip(cell.row).take(height) {
                for slot in row.iter_mut().skip(cell.column).take(width) {
                    *slot += 1;
                }
            }
        }

        for cell in grid.iter().flatten() {
            let count = cover[cell.row][cell.column];
            if cell.ghost && count != 1 {
                return Err(format!("ghost {} covered by {} blocks", cell.id, count));
            }
            if !cell.ghost && !cell.anchor && count != 0 {
                return Err(format!("plain cell {} lies inside a merge block", cell.id));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config_256() -> ProptestConfig {
        ProptestConfig {
            cases: std::env::var("PROPTEST_CASES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(256),
            failure_persistence: None,
            ..ProptestConfig::default()
        }
    }

    fn arb_region() -> impl Strategy<Value = Region> {
        prop_oneof![Just(Region::Head), Just(Region::Body)]
    }

    fn arb_pos() -> impl Strategy<Value = (usize, usize)> {
        (0usize..6, 0usize..6)
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (arb_region(), any::<bool>(), 0usize..6).prop_map(|(region, top, pivot)| Op::InsertRow {
                region,
                direction: if top { RowDirection::Top } else { RowDirection::Bottom },
                pivot,
            }),
            3 => (any::<bool>(), 0usize..6).prop_map(|(left, pivot)| Op::InsertColumn {
                direction: if left { ColumnDirection::Left } else { ColumnDirection::Right },
                pivot,
            }),
            2 => (arb_region(), 0usize..6).prop_map(|(region, row)| Op::DeleteRow { region, row }),
            2 => (0usize..6).prop_map(|col| Op::DeleteColumn { col }),
            4 => (arb_region(), arb_pos(), arb_pos()).prop_map(|(region, from, to)| Op::Select { region, from, to }),
            1 => Just(Op::SelectAll),
            1 => Just(Op::ClearSelection),
            3 => (any::<bool>(), any::<bool>()).prop_map(|(horizontal, vertical)| Op::Merge { horizontal, vertical }),
            1 => Just(Op::Unmerge),
            1 => Just(Op::DeleteSelectedRows),
            1 => Just(Op::DeleteSelectedColumns),
            1 => Just(Op::InsertRowAboveSelection),
            1 => Just(Op::InsertColumnRightOfSelection),
            1 => (arb_region(), 0usize..6, 0usize..6, "[a-z]{0,8}")
                .prop_map(|(region, row, col, content)| Op::SetContent { region, row, col, content }),
            1 => Just(Op::AddSheet),
            1 => Just(Op::RemoveActiveSheet),
            1 => (0usize..4).prop_map(Op::SwitchSheet),
            1 => prop_oneof![Just(SheetDirection::Left), Just(SheetDirection::Right)].prop_map(Op::MoveActiveSheet),
        ]
    }

    proptest! {
        #![proptest_config(config_256())]

        #[test]
        fn prop_invariants_hold_for_any_sequence(ops in proptest::collection::vec(arb_op(), 1..40)) {
            let mut harness = EngineHarness::new();
            if let Err(e) = harness.apply_all(&ops) {
                prop_assert!(false, "{}", e);
            }
        }

        #[test]
        fn prop_column_counts_stay_equal(ops in proptest::collection::vec(arb_op(), 1..40)) {
            let mut harness = EngineHarness::new();
            for op in &ops {
                harness.apply(op);
                let g = &harness.workbook().current_sheet().unwrap().gantt;
                prop_assert!(g.head.iter().chain(g.body.iter()).all(|row| row.len() == g.column_count()));
                prop_assert!(g.row_count(Region::Head) >= 1 && g.row_count(Region::Body) >= 1);
            }
        }

        #[test]
        fn prop_full_merge_shape(rows in 1usize..5, cols in 1usize..5) {
            let mut harness = EngineHarness::new();
            for _ in 1..rows {
                harness.apply(&Op::InsertRow { region: Region::Body, direction: RowDirection::Bottom, pivot: 0 });
            }
            for _ in 1..cols {
                harness.apply(&Op::InsertColumn { direction: ColumnDirection::Right, pivot: 0 });
            }
            harness.apply(&Op::Select { region: Region::Body, from: (0, 0), to: (rows - 1, cols - 1) });
            let merged = harness.apply(&Op::Merge { horizontal: true, vertical: true });
            prop_assert!(merged);

            let body = harness.workbook().current_body();
            let anchors: Vec<_> = body.iter().flatten().filter(|c| c.anchor).collect();
            prop_assert_eq!(anchors.len(), 1);
            prop_assert_eq!(anchors[0].cell_props.row_span, Some(rows));
            prop_assert_eq!(anchors[0].cell_props.col_span, Some(cols));
            prop_assert_eq!(body.iter().flatten().filter(|c| c.ghost).count(), rows * cols - 1);
            prop_assert!(harness.workbook().selection().is_empty());
        }
    }

    #[test]
    fn test_harness_records_events() {
        let mut harness = EngineHarness::new();
        harness.apply(&Op::InsertColumn { direction: ColumnDirection::Right, pivot: 0 });
        harness.apply(&Op::SelectAll);
        harness.apply(&Op::DeleteRow { region: Region::Head, row: 0 });

        assert_eq!(harness.events().len(), 2);
        assert_eq!(harness.workbook().revision(), 2);
        harness.check_invariants().unwrap();
    }

    #[test]
    fn test_merge_coverage_detects_orphan_ghost() {
        let mut gantt = Gantt::with_size(1, 2, 2);
        gantt.body[1][1].ghost = true;
        assert!(check_merge_coverage(&gantt).is_err());
    }

    #[test]
    fn test_structural_edits_around_merges() {
        let mut harness = EngineHarness::new();
        let ops = vec![
            Op::InsertColumn { direction: ColumnDirection::Right, pivot: 0 },
            Op::InsertColumn { direction: ColumnDirection::Right, pivot: 1 },
            Op::InsertRow { region: Region::Body, direction: RowDirection::Bottom, pivot: 0 },
            Op::InsertRow { region: Region::Body, direction: RowDirection::Bottom, pivot: 1 },
            Op::Select { region: Region::Body, from: (0, 0), to: (2, 2) },
            Op::Merge { horizontal: true, vertical: true },
            Op::InsertRow { region: Region::Body, direction: RowDirection::Top, pivot: 1 },
            Op::DeleteColumn { col: 0 },
            Op::InsertColumn { direction: ColumnDirection::Left, pivot: 1 },
            Op::DeleteRow { region: Region::Body, row: 3 },
        ];
        harness.apply_all(&ops).unwrap();
    }
}
