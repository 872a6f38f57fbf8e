//! Change notifications emitted by the workbook.
//!
//! Every committed mutation bumps the workbook revision once and emits one
//! event per kind of state it touched, all tagged with that revision (a
//! merge emits `GridChanged` then `SelectionChanged`). No-ops emit nothing.
//! Renderers subscribe and re-read the snapshot they care about.

use crate::cell_id::SheetId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkbookEvent {
    /// Sheets were added, removed, reordered, or renamed.
    SheetsChanged { revision: u64 },

    /// A different sheet became active (or none is).
    ActiveSheetChanged { revision: u64, index: Option<usize> },

    /// Cells of one sheet changed: structural edit, merge, content, or style.
    GridChanged { revision: u64, sheet: SheetId },

    /// The selection set changed.
    SelectionChanged { revision: u64, selected: usize },
}

impl WorkbookEvent {
    pub fn revision(&self) -> u64 {
        match self {
            Self::SheetsChanged { revision }
            | Self::ActiveSheetChanged { revision, .. }
            | Self::GridChanged { revision, .. }
            | Self::SelectionChanged { revision, .. } => *revision,
        }
    }
}

/// Callback type for receiving workbook events.
pub type EventCallback = Box<dyn FnMut(&WorkbookEvent) + Send>;

/// Simple event collector for testing.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<WorkbookEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: WorkbookEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[WorkbookEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sheets whose grid changed, in emission order.
    pub fn grid_changes(&self) -> Vec<&SheetId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                WorkbookEvent::GridChanged { sheet, .. } => Some(sheet),
                _ => None,
            })
            .collect()
    }

    /// Number of SelectionChanged events.
    pub fn selection_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, WorkbookEvent::SelectionChanged { .. }))
            .count()
    }
}
