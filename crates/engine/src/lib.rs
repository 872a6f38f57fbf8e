pub mod cell;
pub mod cell_id;
pub mod clipboard;
pub mod debounce;
pub mod drag;
pub mod events;
pub mod gantt;
pub mod merge;
pub mod selection;
pub mod sheet;
pub mod structure;
pub mod workbook;

#[cfg(test)]
pub mod harness;

pub use cell::{Cell, CellProps, CellStyle, DEFAULT_CONTENT};
pub use cell_id::{CellId, SheetId};
pub use gantt::Gantt;
pub use merge::{MergeError, MergeMode, MergeOutcome};
pub use selection::{Selection, SelectionPatch};
pub use sheet::{Sheet, SheetSummary};
pub use structure::{ColumnDirection, RowDirection};
pub use workbook::{SheetDirection, Workbook, WorkbookOptions};
