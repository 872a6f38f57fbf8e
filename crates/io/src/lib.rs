// Workbook persistence

pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, StateStorage};
pub use store::{GanttStore, StoreError};

/// Key the workbook state is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "gantt-sheets-storage";

/// Envelope version written with every saved document.
pub const STATE_FORMAT_VERSION: u32 = 0;
