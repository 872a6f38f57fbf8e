use std::collections::BTreeMap;

use ganttsheet_core::Region;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::cell_id::CellId;

/// Placeholder content of a freshly created cell.
pub const DEFAULT_CONTENT: &str = "-";

/// Presentation properties of a cell (background, font color, border per edge, ...).
///
/// Keys are renderer property names (`backgroundColor`, `borderTopWidth`);
/// values are whatever the renderer accepts, usually strings or numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellStyle(BTreeMap<String, Value>);

impl CellStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Overlay `patch` onto this style. Keys in the patch win.
    pub fn merge(&mut self, patch: &CellStyle) {
        for (key, value) in &patch.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Auxiliary rendering attributes.
///
/// `col_span`/`row_span` are only present on merge anchors; any other
/// attribute the renderer stores rides along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_span: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_span: Option<usize>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CellProps {
    /// Effective column span (absent means 1).
    pub fn col_span(&self) -> usize {
        self.col_span.unwrap_or(1).max(1)
    }

    /// Effective row span (absent means 1).
    pub fn row_span(&self) -> usize {
        self.row_span.unwrap_or(1).max(1)
    }

    pub fn clear_spans(&mut self) {
        self.col_span = None;
        self.row_span = None;
    }
}

/// Read a cached position leniently: anything but a non-negative integer
/// becomes 0 and is fixed by the next re-index.
fn cached_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_u64().map_or(0, |v| v as usize))
}

/// A single grid cell.
///
/// `row`/`column` are a cache of the cell's array position and are only
/// trustworthy right after a re-index pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub id: CellId,
    #[serde(default, deserialize_with = "cached_index")]
    pub row: usize,
    #[serde(default, deserialize_with = "cached_index")]
    pub column: usize,
    pub content: String,
    #[serde(rename = "type")]
    pub region: Region,
    #[serde(default)]
    pub style: CellStyle,
    #[serde(default)]
    pub cell_props: CellProps,
    #[serde(default)]
    pub ghost: bool,
    #[serde(default)]
    pub anchor: bool,
}

impl Cell {
    /// Create a fresh placeholder cell at the given position.
    pub fn new(region: Region, row: usize, column: usize) -> Self {
        Self {
            id: CellId::generate(),
            row,
            column,
            content: DEFAULT_CONTENT.to_string(),
            region,
            style: CellStyle::new(),
            cell_props: CellProps::default(),
            ghost: false,
            anchor: false,
        }
    }

    /// Copy of this cell under a new identity (used when duplicating sheets).
    pub fn duplicate(&self) -> Self {
        Self {
            id: CellId::generate(),
            ..self.clone()
        }
    }

    /// Make this cell the top-left of a `row_span × col_span` merge.
    pub fn make_anchor(&mut self, row_span: Option<usize>, col_span: Option<usize>) {
        self.ghost = false;
        self.anchor = true;
        self.cell_props.row_span = row_span;
        self.cell_props.col_span = col_span;
    }

    /// Mark this cell as covered by another cell's merge.
    pub fn make_ghost(&mut self) {
        self.anchor = false;
        self.ghost = true;
        self.cell_props.clear_spans();
    }

    /// Drop all merge state.
    pub fn reset_merge(&mut self) {
        self.ghost = false;
        self.anchor = false;
        self.cell_props.clear_spans();
    }

    /// True if the renderer should draw this cell on its own.
    pub fn is_visible(&self) -> bool {
        !self.ghost
    }
}
