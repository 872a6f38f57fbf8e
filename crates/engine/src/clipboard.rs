//! Internal clipboard for copy/paste of cell content and cell style.
//!
//! Content and style are held independently: copying one leaves the other
//! untouched. An empty string / empty style means nothing was copied.

use crate::cell::{Cell, CellStyle};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    content: String,
    style: CellStyle,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn style(&self) -> &CellStyle {
        &self.style
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_style(&mut self, style: CellStyle) {
        self.style = style;
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn has_style(&self) -> bool {
        !self.style.is_empty()
    }

    pub fn clear_content(&mut self) {
        self.content.clear();
    }

    pub fn clear_style(&mut self) {
        self.style.clear();
    }
}

/// The copy source of a multi-cell selection: the selected cell sitting at
/// the selection's minimum row and minimum column, if one does.
///
/// For an L-shaped selection that corner may be unselected, in which case
/// there is nothing to copy.
pub fn copy_source<'a>(cells: &[&'a Cell]) -> Option<&'a Cell> {
    let min_row = cells.iter().map(|c| c.row).min()?;
    let min_col = cells.iter().map(|c| c.column).min()?;
    cells
        .iter()
        .find(|c| c.row == min_row && c.column == min_col)
        .copied()
}
