//! The persisted workbook document.
//!
//! Layout:
//!
//! ```json
//! { "state": { "sheets": [...], "currentSheetIndex": 0, "selectedIds": ["..."] }, "version": 0 }
//! ```
//!
//! Loading never fails on content: a document that cannot be read as an
//! envelope yields an empty workbook, and individual sheets that cannot be
//! read are dropped. Only storage I/O surfaces as an error.

use std::fmt;

use ganttsheet_engine::{CellId, Sheet, Workbook, WorkbookOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::StateStorage;
use crate::{DEFAULT_STORAGE_KEY, STATE_FORMAT_VERSION};

#[derive(Debug)]
pub enum StoreError {
    Io(String),
    Json(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "storage error: {}", msg),
            StoreError::Json(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e.to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredState<'a> {
    sheets: &'a [Sheet],
    current_sheet_index: i64,
    selected_ids: Vec<CellId>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    state: StoredState<'a>,
    version: u32,
}

/// Serialize a workbook into the envelope. No active sheet is written as -1.
pub fn encode(workbook: &Workbook) -> Result<String, StoreError> {
    let envelope = Envelope {
        state: StoredState {
            sheets: workbook.sheets(),
            current_sheet_index: workbook.active_index().map_or(-1, |i| i as i64),
            selected_ids: workbook.selection().to_sorted_vec(),
        },
        version: STATE_FORMAT_VERSION,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Rebuild a workbook from a stored document.
pub fn decode(document: &str, options: WorkbookOptions) -> Workbook {
    let root: Value = match serde_json::from_str(document) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("stored workbook is not valid JSON, starting empty: {}", e);
            return Workbook::empty(options);
        }
    };
    let Some(state) = root.get("state").filter(|s| s.is_object()) else {
        log::warn!("stored workbook has no state object, starting empty");
        return Workbook::empty(options);
    };

    if let Some(version) = root.get("version").and_then(Value::as_u64) {
        if version != u64::from(STATE_FORMAT_VERSION) {
            log::warn!("stored workbook has format version {}, reading as {}", version, STATE_FORMAT_VERSION);
        }
    }

    let sheets = decode_sheets(state.get("sheets"));
    let active = state
        .get("currentSheetIndex")
        .and_then(Value::as_i64)
        .and_then(|i| usize::try_from(i).ok());
    let selected: Vec<CellId> = state
        .get("selectedIds")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_str).map(CellId::from_raw).collect())
        .unwrap_or_default();

    Workbook::from_parts(options, sheets, active, selected)
}

fn decode_sheets(value: Option<&Value>) -> Vec<Sheet> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            if entry.is_null() {
                log::warn!("dropping null sheet entry at index {}", i);
                return None;
            }
            match Sheet::deserialize(entry) {
                Ok(sheet) => Some(sheet),
                Err(e) => {
                    log::warn!("dropping unreadable sheet at index {}: {}", i, e);
                    None
                }
            }
        })
        .collect()
}

/// Loads and saves a workbook under one storage key.
pub struct GanttStore<S: StateStorage> {
    storage: S,
    key: String,
    options: WorkbookOptions,
}

impl<S: StateStorage> GanttStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            options: WorkbookOptions::default(),
        }
    }

    /// Options handed to every workbook this store loads.
    pub fn with_options(mut self, options: WorkbookOptions) -> Self {
        self.options = options;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the stored workbook. Nothing stored yields an empty workbook.
    pub fn load(&self) -> Result<Workbook, StoreError> {
        let workbook = match self.storage.get_item(&self.key)? {
            Some(document) => decode(&document, self.options.clone()),
            None => Workbook::empty(self.options.clone()),
        };
        log::info!("loaded workbook '{}': {} sheet(s)", self.key, workbook.sheet_count());
        Ok(workbook)
    }

    pub fn save(&mut self, workbook: &Workbook) -> Result<(), StoreError> {
        let document = encode(workbook)?;
        self.storage.set_item(&self.key, &document)?;
        log::info!("saved workbook '{}': {} sheet(s)", self.key, workbook.sheet_count());
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.storage.remove_item(&self.key)?;
        log::info!("cleared workbook '{}'", self.key);
        Ok(())
    }
}
