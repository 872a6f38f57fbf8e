//! The region matrix pair: `head` and `body` grids of cells.
//!
//! Both regions are row-major and rectangular, and always share one column
//! count. Row counts are independent. Cached `row`/`column` values on each
//! cell are restored by [`Gantt::reindex`] after every structural edit.

use ganttsheet_core::{GridRange, Region};
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::cell_id::CellId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gantt {
    pub head: Vec<Vec<Cell>>,
    pub body: Vec<Vec<Cell>>,
}

impl Default for Gantt {
    fn default() -> Self {
        Self::new()
    }
}

impl Gantt {
    /// One head row and one body row, each holding a single placeholder cell.
    pub fn new() -> Self {
        Self {
            head: vec![vec![Cell::new(Region::Head, 0, 0)]],
            body: vec![vec![Cell::new(Region::Body, 0, 0)]],
        }
    }

    /// Build a `head_rows + body_rows` by `cols` grid of placeholder cells.
    ///
    /// Zero counts are bumped to one: no region or column set may be empty.
    pub fn with_size(head_rows: usize, body_rows: usize, cols: usize) -> Self {
        let cols = cols.max(1);
        let build = |region: Region, rows: usize| -> Vec<Vec<Cell>> {
            (0..rows.max(1))
                .map(|r| (0..cols).map(|c| Cell::new(region, r, c)).collect())
                .collect()
        };
        Self {
            head: build(Region::Head, head_rows),
            body: build(Region::Body, body_rows),
        }
    }

    pub fn region(&self, region: Region) -> &Vec<Vec<Cell>> {
        match region {
            Region::Head => &self.head,
            Region::Body => &self.body,
        }
    }

    pub fn region_mut(&mut self, region: Region) -> &mut Vec<Vec<Cell>> {
        match region {
            Region::Head => &mut self.head,
            Region::Body => &mut self.body,
        }
    }

    pub fn row_count(&self, region: Region) -> usize {
        self.region(region).len()
    }

    /// Shared column count (taken from the first head row).
    pub fn column_count(&self) -> usize {
        self.head.first().map(|row| row.len()).unwrap_or(0)
    }

    /// Re-derive every cell's `row`/`column` from its array position.
    pub fn reindex(&mut self) {
        for region in Region::ALL {
            for (row_idx, row) in self.region_mut(region).iter_mut().enumerate() {
                for (col_idx, cell) in row.iter_mut().enumerate() {
                    cell.row = row_idx;
                    cell.column = col_idx;
                }
            }
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Cell at an array position, if any.
    pub fn cell_at(&self, region: Region, row: usize, col: usize) -> Option<&Cell> {
        self.region(region).get(row).and_then(|r| r.get(col))
    }

    pub fn cell_at_mut(&mut self, region: Region, row: usize, col: usize) -> Option<&mut Cell> {
        self.region_mut(region).get_mut(row).and_then(|r| r.get_mut(col))
    }

    /// All cells, head first, row-major.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.head.iter().chain(self.body.iter()).flat_map(|row| row.iter())
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.head
            .iter_mut()
            .chain(self.body.iter_mut())
            .flat_map(|row| row.iter_mut())
    }

    pub fn cell_count(&self) -> usize {
        self.head.iter().chain(self.body.iter()).map(|row| row.len()).sum()
    }

    pub fn find(&self, id: &CellId) -> Option<&Cell> {
        self.cells().find(|c| &c.id == id)
    }

    pub fn find_mut(&mut self, id: &CellId) -> Option<&mut Cell> {
        self.cells_mut().find(|c| &c.id == id)
    }

    pub fn contains(&self, id: &CellId) -> bool {
        self.find(id).is_some()
    }

    /// Existing cells of a region inside a range (row-major). Positions
    /// outside the grid are skipped.
    pub fn cells_in_range(&self, region: Region, range: GridRange) -> Vec<&Cell> {
        range
            .positions()
            .filter_map(|(r, c)| self.cell_at(region, r, c))
            .collect()
    }

    // =========================================================================
    // Invariants
    // =========================================================================

    /// Check the grid invariants, describing the first violation found.
    ///
    /// - every region has at least one row, every row at least one column
    /// - all rows of both regions have the same length
    /// - every cell's cached position matches its array position
    /// - every cell's region matches the region it lives in
    /// - ghost and anchor are exclusive; spans only on anchors and >= 1
    pub fn validate(&self) -> Result<(), String> {
        let cols = self.column_count();
        if cols == 0 {
            return Err("grid has no columns".to_string());
        }
        for region in Region::ALL {
            let rows = self.region(region);
            if rows.is_empty() {
                return Err(format!("{} has no rows", region));
            }
            for (row_idx, row) in rows.iter().enumerate() {
                if row.len() != cols {
                    return Err(format!(
                        "{} row {} has {} columns, expected {}",
                        region, row_idx, row.len(), cols
                    ));
                }
                for (col_idx, cell) in row.iter().enumerate() {
                    if cell.row != row_idx || cell.column != col_idx {
                        return Err(format!(
                            "cell {} cached at ({}, {}) but lives at {} ({}, {})",
                            cell.id, cell.row, cell.column, region, row_idx, col_idx
                        ));
                    }
                    if cell.region != region {
                        return Err(format!("cell {} is {} but lives in {}", cell.id, cell.region, region));
                    }
                    if cell.ghost && cell.anchor {
                        return Err(format!("cell {} is both ghost and anchor", cell.id));
                    }
                    let spans = [cell.cell_props.col_span, cell.cell_props.row_span];
                    if !cell.anchor && spans.iter().any(Option::is_some) {
                        return Err(format!("cell {} carries a span without being an anchor", cell.id));
                    }
                    if spans.iter().flatten().any(|&s| s == 0) {
                        return Err(format!("cell {} has a zero span", cell.id));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_gantt_shape() {
        let gantt = Gantt::new();
        assert_eq!(gantt.row_count(Region::Head), 1);
        assert_eq!(gantt.row_count(Region::Body), 1);
        assert_eq!(gantt.column_count(), 1);
        assert_eq!(gantt.cell_count(), 2);
        assert!(gantt.validate().is_ok());
    }

    #[test]
    fn test_with_size_bumps_zero_counts() {
        let gantt = Gantt::with_size(0, 3, 0);
        assert_eq!(gantt.row_count(Region::Head), 1);
        assert_eq!(gantt.row_count(Region::Body), 3);
        assert_eq!(gantt.column_count(), 1);
        assert!(gantt.validate().is_ok());
    }

    #[test]
    fn test_reindex_repairs_positions() {
        let mut gantt = Gantt::with_size(1, 2, 2);
        gantt.body.swap(0, 1);
        assert!(gantt.validate().is_err());

        gantt.reindex();
        assert!(gantt.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_ragged_rows() {
        let mut gantt = Gantt::with_size(1, 2, 2);
        gantt.body[1].pop();
        let err = gantt.validate().unwrap_err();
        assert!(err.contains("body row 1"), "{}", err);
    }

    #[test]
    fn test_validate_rejects_ghost_anchor() {
        let mut gantt = Gantt::new();
        gantt.head[0][0].ghost = true;
        gantt.head[0][0].anchor = true;
        assert!(gantt.validate().is_err());
    }

    #[test]
    fn test_find_and_cells_in_range() {
        let gantt = Gantt::with_size(1, 3, 3);
        let id = gantt.body[2][1].id.clone();
        assert_eq!(gantt.find(&id).map(|c| (c.row, c.column)), Some((2, 1)));
        assert!(gantt.find(&CellId::from_raw("missing")).is_none());

        let cells = gantt.cells_in_range(Region::Body, GridRange::new(1, 1, 5, 5));
        assert_eq!(cells.len(), 4);
    }
}
