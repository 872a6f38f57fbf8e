//! Merge and unmerge of rectangular cell ranges.
//!
//! A merge snaps the selection to a full rectangle: the bounding box of the
//! selected cells, grown until it fully contains every existing merge block
//! it touches. Every cell in that rectangle is reset and then re-assigned as
//! anchor or ghost according to the merge mode.

use std::fmt;

use ganttsheet_core::{GridRange, Region};

use crate::cell_id::CellId;
use crate::gantt::Gantt;
use crate::selection::Selection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The selection resolves to no cells.
    NothingSelected,
    /// Neither horizontal nor vertical was requested.
    NoDirection,
    /// The selection (or the rectangle it snaps to) mixes head and body cells.
    MixedRegions,
    /// The workbook has no active sheet.
    NoActiveSheet,
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingSelected => write!(f, "no cells selected"),
            Self::NoDirection => write!(f, "merge needs a horizontal or vertical direction"),
            Self::MixedRegions => write!(f, "selection spans mixed head/body types"),
            Self::NoActiveSheet => write!(f, "no active sheet"),
        }
    }
}

impl std::error::Error for MergeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// One anchor for the whole rectangle.
    All,
    /// One anchor per row.
    Horizontal,
    /// One anchor per column.
    Vertical,
}

impl MergeMode {
    pub fn from_flags(horizontal: bool, vertical: bool) -> Option<Self> {
        match (horizontal, vertical) {
            (true, true) => Some(Self::All),
            (true, false) => Some(Self::Horizontal),
            (false, true) => Some(Self::Vertical),
            (false, false) => None,
        }
    }
}

/// What a successful merge produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub region: Region,
    pub range: GridRange,
    pub anchors: Vec<CellId>,
    pub ghosts: usize,
}

impl Gantt {
    /// Merge the rectangle covered by `selection`.
    ///
    /// Fails without touching the grid when the selection is empty, no
    /// direction is requested, or the cells span both regions.
    pub fn merge_selection(
        &mut self,
        selection: &Selection,
        horizontal: bool,
        vertical: bool,
    ) -> Result<MergeOutcome, MergeError> {
        let mode = MergeMode::from_flags(horizontal, vertical).ok_or(MergeError::NoDirection)?;

        let selected = selection.resolve(self);
        let first = selected.first().ok_or(MergeError::NothingSelected)?;
        let region = first.region;
        if selected.iter().any(|c| c.region != region) {
            return Err(MergeError::MixedRegions);
        }

        let mut range = GridRange::bounding(selected.iter().map(|c| (c.row, c.column)))
            .ok_or(MergeError::NothingSelected)?;
        range = self.expand_to_blocks(region, range);

        if self.cells_in_range(region, range).iter().any(|c| c.region != region) {
            return Err(MergeError::MixedRegions);
        }

        Ok(self.merge_range(region, range, mode))
    }

    /// Merge an explicit rectangle. The range is first grown to cover any
    /// merge block it partially overlaps; positions outside the grid are
    /// ignored.
    pub fn merge_range(&mut self, region: Region, range: GridRange, mode: MergeMode) -> MergeOutcome {
        let rows = self.row_count(region);
        let cols = self.column_count();
        let range = self.expand_to_blocks(region, clamp_range(range, rows, cols));

        let grid = self.region_mut(region);
        for (r, c) in range.positions() {
            if let Some(cell) = grid.get_mut(r).and_then(|row| row.get_mut(c)) {
                cell.reset_merge();
            }
        }

        let height = range.height();
        let width = range.width();
        let mut anchors = Vec::new();
        let mut ghosts = 0;

        for (r, c) in range.positions() {
            let Some(cell) = grid.get_mut(r).and_then(|row| row.get_mut(c)) else {
                continue;
            };
            let is_anchor = match mode {
                MergeMode::All => r == range.start_row && c == range.start_col,
                MergeMode::Horizontal => c == range.start_col,
                MergeMode::Vertical => r == range.start_row,
            };
            if is_anchor {
                match mode {
                    MergeMode::All => cell.make_anchor(Some(height), Some(width)),
                    MergeMode::Horizontal => cell.make_anchor(None, Some(width)),
                    MergeMode::Vertical => cell.make_anchor(Some(height), None),
                }
                anchors.push(cell.id.clone());
            } else {
                cell.make_ghost();
                ghosts += 1;
            }
        }

        log::debug!(
            "merged {} rows {}..={} cols {}..={} ({:?}): {} anchor(s), {} ghost(s)",
            region,
            range.start_row,
            range.end_row,
            range.start_col,
            range.end_col,
            mode,
            anchors.len(),
            ghosts
        );

        MergeOutcome { region, range, anchors, ghosts }
    }

    /// Dissolve every merge block anchored by a selected cell. Selected
    /// cells that are not anchors are ignored. Returns the number of blocks
    /// dissolved.
    pub fn unmerge_selection(&mut self, selection: &Selection) -> usize {
        let blocks: Vec<(Region, GridRange)> = selection
            .resolve(self)
            .into_iter()
            .filter(|c| c.anchor)
            .map(|c| (c.region, block_of(c.row, c.column, c.cell_props.row_span(), c.cell_props.col_span())))
            .collect();

        for &(region, block) in &blocks {
            self.unmerge_range(region, block);
        }
        if !blocks.is_empty() {
            log::debug!("unmerged {} block(s)", blocks.len());
        }
        blocks.len()
    }

    /// Reset merge state for every cell in `range`.
    pub fn unmerge_range(&mut self, region: Region, range: GridRange) {
        let grid = self.region_mut(region);
        for (r, c) in range.positions() {
            if let Some(cell) = grid.get_mut(r).and_then(|row| row.get_mut(c)) {
                cell.reset_merge();
            }
        }
    }

    /// Grow `range` until no merge block in `region` straddles its edge.
    fn expand_to_blocks(&self, region: Region, mut range: GridRange) -> GridRange {
        let blocks: Vec<GridRange> = self
            .region(region)
            .iter()
            .flatten()
            .filter(|c| c.anchor)
            .map(|c| block_of(c.row, c.column, c.cell_props.row_span(), c.cell_props.col_span()))
            .collect();

        loop {
            let mut grown = range;
            for block in &blocks {
                if overlaps(&grown, block) {
                    grown = grown
                        .include(block.start_row, block.start_col)
                        .include(block.end_row, block.end_col);
                }
            }
            if grown == range {
                return range;
            }
            range = grown;
        }
    }
}

fn block_of(row: usize, col: usize, row_span: usize, col_span: usize) -> GridRange {
    GridRange::new(row, col, row + row_span.max(1) - 1, col + col_span.max(1) - 1)
}

fn overlaps(a: &GridRange, b: &GridRange) -> bool {
    a.start_row <= b.end_row && b.start_row <= a.end_row && a.start_col <= b.end_col && b.start_col <= a.end_col
}

fn clamp_range(range: GridRange, rows: usize, cols: usize) -> GridRange {
    let max_row = rows.saturating_sub(1);
    let max_col = cols.saturating_sub(1);
    GridRange::new(
        range.start_row.min(max_row),
        range.start_col.min(max_col),
        range.end_row.min(max_row),
        range.end_col.min(max_col),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(gantt: &Gantt, region: Region, range: GridRange) -> Selection {
        let mut sel = Selection::new();
        sel.replace(gantt.cells_in_range(region, range).into_iter().map(|c| c.id.clone()));
        sel
    }

    fn count(gantt: &Gantt, region: Region) -> (usize, usize) {
        let cells = gantt.region(region).iter().flatten();
        let anchors = cells.clone().filter(|c| c.anchor).count();
        let ghosts = cells.filter(|c| c.ghost).count();
        (anchors, ghosts)
    }

    #[test]
    fn test_merge_all_directions() {
        let mut gantt = Gantt::with_size(1, 3, 4);
        let sel = select(&gantt, Region::Body, GridRange::new(0, 1, 2, 3));

        let outcome = gantt.merge_selection(&sel, true, true).unwrap();
        assert_eq!(outcome.anchors.len(), 1);
        assert_eq!(outcome.ghosts, 8);

        let anchor = &gantt.body[0][1];
        assert!(anchor.anchor);
        assert_eq!(anchor.cell_props.row_span, Some(3));
        assert_eq!(anchor.cell_props.col_span, Some(3));
        assert_eq!(count(&gantt, Region::Body), (1, 8));
        assert!(!gantt.body[0][0].ghost);
    }

    #[test]
    fn test_merge_horizontal_per_row() {
        let mut gantt = Gantt::with_size(1, 2, 3);
        let sel = select(&gantt, Region::Body, GridRange::new(0, 0, 1, 2));

        let outcome = gantt.merge_selection(&sel, true, false).unwrap();
        assert_eq!(outcome.anchors.len(), 2);
        for row in &gantt.body {
            assert!(row[0].anchor);
            assert_eq!(row[0].cell_props.col_span, Some(3));
            assert_eq!(row[0].cell_props.row_span, None);
            assert!(row[1].ghost && row[2].ghost);
        }
    }

    #[test]
    fn test_merge_vertical_per_column() {
        let mut gantt = Gantt::with_size(3, 1, 2);
        let sel = select(&gantt, Region::Head, GridRange::new(0, 0, 2, 1));

        gantt.merge_selection(&sel, false, true).unwrap();
        assert_eq!(gantt.head[0][0].cell_props.row_span, Some(3));
        assert_eq!(gantt.head[0][1].cell_props.row_span, Some(3));
        assert_eq!(count(&gantt, Region::Head), (2, 4));
    }

    #[test]
    fn test_merge_rejects_mixed_regions() {
        let mut gantt = Gantt::with_size(1, 1, 2);
        let mut sel = Selection::new();
        sel.replace(vec![gantt.head[0][0].id.clone(), gantt.body[0][0].id.clone()]);
        let before = gantt.clone();

        let err = gantt.merge_selection(&sel, true, true).unwrap_err();
        assert_eq!(err, MergeError::MixedRegions);
        assert_eq!(err.to_string(), "selection spans mixed head/body types");
        assert_eq!(gantt, before);
    }

    #[test]
    fn test_merge_preconditions() {
        let mut gantt = Gantt::with_size(1, 1, 2);
        let sel = select(&gantt, Region::Body, GridRange::new(0, 0, 0, 1));
        assert_eq!(gantt.merge_selection(&sel, false, false), Err(MergeError::NoDirection));
        assert_eq!(gantt.merge_selection(&Selection::new(), true, true), Err(MergeError::NothingSelected));

        let mut stale = Selection::new();
        stale.replace(vec![CellId::from_raw("gone")]);
        assert_eq!(gantt.merge_selection(&stale, true, true), Err(MergeError::NothingSelected));
    }

    #[test]
    fn test_merge_snaps_to_existing_block() {
        let mut gantt = Gantt::with_size(1, 3, 3);
        gantt.merge_range(Region::Body, GridRange::new(1, 1, 2, 2), MergeMode::All);

        // Select (0,0) and the existing anchor at (1,1): rectangle must grow to (2,2).
        let mut sel = Selection::new();
        sel.replace(vec![gantt.body[0][0].id.clone(), gantt.body[1][1].id.clone()]);
        let outcome = gantt.merge_selection(&sel, true, true).unwrap();

        assert_eq!(outcome.range, GridRange::new(0, 0, 2, 2));
        assert_eq!(gantt.body[0][0].cell_props.row_span, Some(3));
        assert_eq!(count(&gantt, Region::Body), (1, 8));
    }

    #[test]
    fn test_merge_grows_over_partially_covered_block() {
        let mut gantt = Gantt::with_size(1, 3, 3);
        gantt.merge_range(Region::Body, GridRange::new(0, 0, 1, 1), MergeMode::All);

        // (1,1) is a ghost of the block at (0,0); selecting it with (2,2)
        // must pull the whole block in.
        let sel = select(&gantt, Region::Body, GridRange::new(1, 1, 2, 2));
        let outcome = gantt.merge_selection(&sel, true, true).unwrap();
        assert_eq!(outcome.range, GridRange::new(0, 0, 2, 2));
        assert_eq!(count(&gantt, Region::Body), (1, 8));
    }

    #[test]
    fn test_merge_then_unmerge_restores_cells() {
        let mut gantt = Gantt::with_size(1, 2, 2);
        gantt.body[0][0].content = "Task".to_string();
        gantt.body[0][0].style.set("color", "red");
        let sel = select(&gantt, Region::Body, GridRange::new(0, 0, 1, 1));
        gantt.merge_selection(&sel, true, true).unwrap();

        let mut anchor_sel = Selection::new();
        anchor_sel.replace(vec![gantt.body[0][0].id.clone()]);
        assert_eq!(gantt.unmerge_selection(&anchor_sel), 1);

        assert!(gantt.body.iter().flatten().all(|c| !c.ghost && !c.anchor));
        assert!(gantt.body.iter().flatten().all(|c| c.cell_props.col_span.is_none()));
        assert_eq!(gantt.body[0][0].content, "Task");
        assert!(gantt.body[0][0].style.get("color").is_some());
    }

    #[test]
    fn test_unmerge_ignores_non_anchors() {
        let mut gantt = Gantt::with_size(1, 2, 2);
        gantt.merge_range(Region::Body, GridRange::new(0, 0, 1, 1), MergeMode::All);

        let sel = select(&gantt, Region::Body, GridRange::new(1, 0, 1, 1));
        assert_eq!(gantt.unmerge_selection(&sel), 0);
        assert_eq!(count(&gantt, Region::Body), (1, 3));
    }

    #[test]
    fn test_single_cell_merge_is_one_by_one_anchor() {
        let mut gantt = Gantt::new();
        let sel = select(&gantt, Region::Head, GridRange::single(0, 0));
        let outcome = gantt.merge_selection(&sel, true, true).unwrap();
        assert_eq!(outcome.ghosts, 0);
        assert_eq!(gantt.head[0][0].cell_props.row_span, Some(1));
        assert!(gantt.validate().is_ok());
    }
}
