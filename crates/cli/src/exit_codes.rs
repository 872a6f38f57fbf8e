//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Description                                        |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad args, unknown sheet, bad index)   |
//! | 3    | Merge rejected (empty selection, mixed regions)    |
//! | 4    | Storage error (unreadable or unwritable workbook)  |

use ganttsheet_engine::MergeError;
use ganttsheet_io::StoreError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown sheet, out-of-range index.
pub const EXIT_USAGE: u8 = 2;

/// The merge engine refused the requested merge.
pub const EXIT_MERGE_REJECTED: u8 = 3;

/// Reading or writing the stored workbook failed.
pub const EXIT_STORAGE: u8 = 4;

/// Map a merge rejection to its exit code.
pub fn merge_exit_code(err: &MergeError) -> u8 {
    match err {
        MergeError::NothingSelected | MergeError::NoDirection | MergeError::MixedRegions => EXIT_MERGE_REJECTED,
        MergeError::NoActiveSheet => EXIT_ERROR,
    }
}

/// Map a storage failure to its exit code.
pub fn store_exit_code(err: &StoreError) -> u8 {
    match err {
        StoreError::Io(_) | StoreError::Json(_) => EXIT_STORAGE,
    }
}
