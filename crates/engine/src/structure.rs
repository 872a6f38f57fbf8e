//! Structural edits: row/column insertion and deletion.
//!
//! Every edit ends with [`Gantt::reindex`] and a merge normalization pass,
//! so callers never observe stale positions or dangling ghost cells.
//!
//! Merge blocks are kept coherent across edits:
//! - inserting strictly inside a block grows its span, and the new cells
//!   become ghosts of that block
//! - deleting a row/column strictly inside a block shrinks its span
//! - deleting an anchor's row/column dissolves the block (its former ghosts
//!   become plain cells again)

use ganttsheet_core::Region;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::gantt::Gantt;

/// Where a new row goes relative to its pivot row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowDirection {
    Top,
    Bottom,
}

/// Where a new column goes relative to its pivot column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnDirection {
    Left,
    Right,
}

impl Gantt {
    /// Insert a row of placeholder cells before (`Top`) or after (`Bottom`)
    /// `pivot_row`. A pivot past the end appends.
    pub fn insert_row(&mut self, region: Region, direction: RowDirection, pivot_row: usize) {
        let cols = self.column_count().max(1);
        let len = self.row_count(region);
        let at = match direction {
            RowDirection::Top => pivot_row.min(len),
            RowDirection::Bottom => pivot_row.saturating_add(1).min(len),
        };

        for cell in self.region_mut(region).iter_mut().flatten() {
            let span = cell.cell_props.row_span();
            if cell.anchor && cell.row < at && at < cell.row + span {
                cell.cell_props.row_span = Some(span + 1);
            }
        }

        let new_row: Vec<Cell> = (0..cols).map(|c| Cell::new(region, at, c)).collect();
        self.region_mut(region).insert(at, new_row);
        self.finish_structural_edit();

        log::debug!("inserted {} row at {} ({} columns)", region, at, cols);
    }

    /// Insert one placeholder cell into every row of both regions, before
    /// (`Left`) or after (`Right`) `pivot_col`.
    ///
    /// `_pivot_row` is accepted for call-site symmetry with the context menu
    /// but does not scope the insertion: columns always span both regions.
    pub fn insert_column(&mut self, direction: ColumnDirection, _pivot_row: usize, pivot_col: usize) {
        let len = self.column_count();
        let at = match direction {
            ColumnDirection::Left => pivot_col.min(len),
            ColumnDirection::Right => pivot_col.saturating_add(1).min(len),
        };

        for region in Region::ALL {
            for (row_idx, row) in self.region_mut(region).iter_mut().enumerate() {
                for cell in row.iter_mut() {
                    let span = cell.cell_props.col_span();
                    if cell.anchor && cell.column < at && at < cell.column + span {
                        cell.cell_props.col_span = Some(span + 1);
                    }
                }
                let at = at.min(row.len());
                row.insert(at, Cell::new(region, row_idx, at));
            }
        }
        self.finish_structural_edit();

        log::debug!("inserted column at {}", at);
    }

    /// Remove a row. Returns false (and leaves the grid untouched) when the
    /// region has a single row or `row` is out of range.
    pub fn delete_row(&mut self, region: Region, row: usize) -> bool {
        let len = self.row_count(region);
        if len <= 1 || row >= len {
            return false;
        }

        for cell in self.region_mut(region).iter_mut().flatten() {
            let span = cell.cell_props.row_span();
            if cell.anchor && cell.row < row && row < cell.row + span {
                cell.cell_props.row_span = Some(span - 1);
            }
        }

        self.region_mut(region).remove(row);
        self.finish_structural_edit();

        log::debug!("deleted {} row {}", region, row);
        true
    }

    /// Remove a column from every row of both regions. Returns false when
    /// only one column remains or `col` is out of range.
    pub fn delete_column(&mut self, col: usize) -> bool {
        let len = self.column_count();
        if len <= 1 || col >= len {
            return false;
        }

        for region in Region::ALL {
            for row in self.region_mut(region).iter_mut() {
                for cell in row.iter_mut() {
                    let span = cell.cell_props.col_span();
                    if cell.anchor && cell.column < col && col < cell.column + span {
                        cell.cell_props.col_span = Some(span - 1);
                    }
                }
                if col < row.len() {
                    row.remove(col);
                }
            }
        }
        self.finish_structural_edit();

        log::debug!("deleted column {}", col);
        true
    }

    /// Re-derive positions and merge coverage after an edit.
    fn finish_structural_edit(&mut self) {
        self.reindex();
        self.normalize_merges();
    }

    /// Make ghost flags agree with the anchors' spans.
    ///
    /// Spans are clamped to the region edge, anchors swallowed by an
    /// earlier (row-major) block are dissolved, every cell covered by a
    /// block becomes a ghost and every uncovered ghost becomes plain.
    pub fn normalize_merges(&mut self) {
        for region in Region::ALL {
            let grid = self.region_mut(region);
            let rows = grid.len();
            let mut covered: Vec<Vec<bool>> = grid.iter().map(|row| vec![false; row.len()]).collect();

            for r in 0..rows {
                let cols = grid[r].len();
                for c in 0..cols {
                    let cell = &mut grid[r][c];
                    if !cell.anchor {
                        continue;
                    }
                    if covered[r][c] {
                        cell.reset_merge();
                        continue;
                    }
                    let height = cell.cell_props.row_span().min(rows - r);
                    let width = cell.cell_props.col_span().min(cols - c);
                    if cell.cell_props.row_span.is_some() {
                        cell.cell_props.row_span = Some(height);
                    }
                    if cell.cell_props.col_span.is_some() {
                        cell.cell_props.col_span = Some(width);
                    }
                    for flags in covered.iter_mut().skip(r).take(height) {
                        for flag in flags.iter_mut().skip(c).take(width) {
                            *flag = true;
                        }
                    }
                }
            }

            for (row, flags) in grid.iter_mut().zip(covered.iter()) {
                for (cell, &is_covered) in row.iter_mut().zip(flags.iter()) {
                    if cell.anchor {
                        continue;
                    }
                    if is_covered {
                        cell.make_ghost();
                    } else if cell.ghost {
                        cell.reset_merge();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions_ok(gantt: &Gantt) {
        if let Err(e) = gantt.validate() {
            panic!("invariant violated: {}", e);
        }
    }

    #[test]
    fn test_insert_row_top_and_bottom() {
        let mut gantt = Gantt::with_size(1, 2, 3);
        let first = gantt.body[0][0].id.clone();
        let second = gantt.body[1][0].id.clone();

        gantt.insert_row(Region::Body, RowDirection::Top, 1);
        assert_eq!(gantt.row_count(Region::Body), 3);
        assert_eq!(gantt.body[0][0].id, first);
        assert_eq!(gantt.body[2][0].id, second);
        assert_eq!(gantt.body[1].len(), 3);
        assert!(gantt.body[1].iter().all(|c| c.content == "-"));

        gantt.insert_row(Region::Body, RowDirection::Bottom, 2);
        assert_eq!(gantt.row_count(Region::Body), 4);
        assert_eq!(gantt.body[2][0].id, second);
        assert_eq!(gantt.row_count(Region::Head), 1);
        positions_ok(&gantt);
    }

    #[test]
    fn test_insert_row_pivot_past_end_appends() {
        let mut gantt = Gantt::new();
        gantt.insert_row(Region::Head, RowDirection::Top, 99);
        assert_eq!(gantt.row_count(Region::Head), 2);
        positions_ok(&gantt);
    }

    #[test]
    fn test_insert_column_spans_both_regions() {
        let mut gantt = Gantt::with_size(2, 3, 1);
        let original = gantt.head[0][0].id.clone();

        gantt.insert_column(ColumnDirection::Right, 0, 0);
        assert_eq!(gantt.column_count(), 2);
        assert!(gantt.head.iter().chain(gantt.body.iter()).all(|row| row.len() == 2));
        assert_eq!(gantt.head[0][0].id, original);

        gantt.insert_column(ColumnDirection::Left, 1, 0);
        assert_eq!(gantt.head[0][1].id, original);
        assert_eq!(gantt.body[2][0].region, Region::Body);
        positions_ok(&gantt);
    }

    #[test]
    fn test_delete_last_row_is_noop() {
        let mut gantt = Gantt::new();
        let before = gantt.clone();
        assert!(!gantt.delete_row(Region::Head, 0));
        assert!(!gantt.delete_row(Region::Body, 0));
        assert_eq!(gantt, before);
    }

    #[test]
    fn test_delete_last_column_is_noop() {
        let mut gantt = Gantt::with_size(2, 2, 1);
        let before = gantt.clone();
        assert!(!gantt.delete_column(0));
        assert_eq!(gantt, before);
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let mut gantt = Gantt::with_size(2, 2, 2);
        assert!(!gantt.delete_row(Region::Body, 5));
        assert!(!gantt.delete_column(2));
        assert_eq!(gantt.column_count(), 2);
    }

    #[test]
    fn test_delete_row_and_column() {
        let mut gantt = Gantt::with_size(2, 3, 3);
        let keep = gantt.body[2][2].id.clone();

        assert!(gantt.delete_row(Region::Body, 0));
        assert!(gantt.delete_column(1));
        assert_eq!(gantt.row_count(Region::Body), 2);
        assert_eq!(gantt.column_count(), 2);
        assert_eq!(gantt.find(&keep).map(|c| (c.row, c.column)), Some((1, 1)));
        positions_ok(&gantt);
    }

    #[test]
    fn test_insert_inside_merge_grows_span() {
        let mut gantt = Gantt::with_size(1, 3, 3);
        gantt.body[0][0].make_anchor(Some(2), Some(2));
        gantt.normalize_merges();
        assert!(gantt.body[1][1].ghost);

        gantt.insert_row(Region::Body, RowDirection::Bottom, 0);
        assert_eq!(gantt.body[0][0].cell_props.row_span, Some(3));
        assert!(gantt.body[1][0].ghost && gantt.body[1][1].ghost);
        assert!(!gantt.body[1][2].ghost);

        gantt.insert_column(ColumnDirection::Left, 0, 1);
        assert_eq!(gantt.body[0][0].cell_props.col_span, Some(3));
        assert!(gantt.head[0][1].is_visible());
        positions_ok(&gantt);
    }

    #[test]
    fn test_delete_anchor_row_dissolves_block() {
        let mut gantt = Gantt::with_size(1, 3, 2);
        gantt.body[0][0].make_anchor(Some(2), Some(2));
        gantt.normalize_merges();

        assert!(gantt.delete_row(Region::Body, 0));
        assert!(gantt.body.iter().flatten().all(|c| !c.ghost && !c.anchor));
        positions_ok(&gantt);
    }

    #[test]
    fn test_delete_inside_merge_shrinks_span() {
        let mut gantt = Gantt::with_size(1, 3, 3);
        gantt.body[0][0].make_anchor(Some(3), Some(3));
        gantt.normalize_merges();

        assert!(gantt.delete_column(1));
        assert!(gantt.delete_row(Region::Body, 2));
        assert_eq!(gantt.body[0][0].cell_props.col_span, Some(2));
        assert_eq!(gantt.body[0][0].cell_props.row_span, Some(2));
        assert_eq!(gantt.body.iter().flatten().filter(|c| c.ghost).count(), 3);
        positions_ok(&gantt);
    }

    #[test]
    fn test_normalize_clamps_spans_to_region() {
        let mut gantt = Gantt::with_size(1, 2, 2);
        gantt.body[0][1].make_anchor(Some(5), Some(5));
        gantt.normalize_merges();
        assert_eq!(gantt.body[0][1].cell_props.row_span, Some(2));
        assert_eq!(gantt.body[0][1].cell_props.col_span, Some(1));
        assert!(gantt.body[1][1].ghost);
        assert!(!gantt.body[1][0].ghost);
    }
}
