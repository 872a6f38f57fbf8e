// Gantt sheet CLI - headless editing of the stored workbook
// Every command loads the workbook, applies itself, saves, and prints.

mod commands;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use ganttsheet_core::Region;
use ganttsheet_engine::{ColumnDirection, RowDirection, SheetDirection};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE, EXIT_ERROR};

#[derive(Parser)]
#[command(name = "gsheet")]
#[command(about = "Gantt sheet editor (CLI mode, headless)")]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, env = "GSHEET_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the stored workbook (overrides storage.dir)
    #[arg(long, global = true, env = "GSHEET_STORE_DIR", value_name = "DIR")]
    store_dir: Option<PathBuf>,

    /// Storage key (overrides storage.key)
    #[arg(long, global = true, value_name = "KEY")]
    key: Option<String>,

    /// Print the active sheet as JSON after the command
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the active sheet's grid
    Show,

    /// List sheets (the active one is marked with *)
    Sheets,

    /// Append a sheet; duplicate titles get a (N) suffix
    AddSheet {
        title: Option<String>,
    },

    /// Copy a sheet, with fresh cell ids, to the end of the list
    DuplicateSheet {
        /// Sheet id or exact title
        sheet: String,
    },

    /// Remove a sheet; removing the last one starts a fresh sheet
    RemoveSheet {
        /// Sheet id or exact title
        sheet: String,
    },

    /// Rename a sheet
    RenameSheet {
        /// Sheet id or exact title
        sheet: String,
        title: String,
    },

    /// Make the sheet at INDEX active
    Switch {
        index: usize,
    },

    /// Move a sheet one position left or right
    MoveSheet {
        /// Sheet id or exact title
        sheet: String,
        direction: SheetDirectionArg,
    },

    /// Insert a row above (top) or below (bottom) PIVOT
    #[command(after_help = "\
Examples:
  gsheet insert-row body bottom 0
  gsheet insert-row head top 0")]
    InsertRow {
        region: RegionArg,
        direction: RowDirectionArg,
        pivot: usize,
    },

    /// Insert a column left or right of PIVOT in every row of both regions
    InsertColumn {
        direction: ColumnDirectionArg,
        pivot: usize,
    },

    /// Delete a row (a region always keeps one row)
    DeleteRow {
        region: RegionArg,
        row: usize,
    },

    /// Delete a column (the grid always keeps one column)
    DeleteColumn {
        col: usize,
    },

    /// Set a cell's content
    Set {
        region: RegionArg,
        row: usize,
        col: usize,
        content: String,
    },

    /// Merge the rectangle R1,C1..R2,C2 of one region
    ///
    /// With neither flag (or both) the rectangle becomes a single block.
    #[command(after_help = "\
Examples:
  gsheet merge body 0 0 1 1
  gsheet merge head 0 0 0 3 --horizontal")]
    Merge {
        region: RegionArg,
        r1: usize,
        c1: usize,
        r2: usize,
        c2: usize,

        /// Merge each row of the rectangle on its own
        #[arg(long)]
        horizontal: bool,

        /// Merge each column of the rectangle on its own
        #[arg(long)]
        vertical: bool,
    },

    /// Dissolve the merge block covering a cell
    Unmerge {
        region: RegionArg,
        row: usize,
        col: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RegionArg {
    Head,
    Body,
}

impl From<RegionArg> for Region {
    fn from(arg: RegionArg) -> Self {
        match arg {
            RegionArg::Head => Region::Head,
            RegionArg::Body => Region::Body,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RowDirectionArg {
    Top,
    Bottom,
}

impl From<RowDirectionArg> for RowDirection {
    fn from(arg: RowDirectionArg) -> Self {
        match arg {
            RowDirectionArg::Top => RowDirection::Top,
            RowDirectionArg::Bottom => RowDirection::Bottom,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ColumnDirectionArg {
    Left,
    Right,
}

impl From<ColumnDirectionArg> for ColumnDirection {
    fn from(arg: ColumnDirectionArg) -> Self {
        match arg {
            ColumnDirectionArg::Left => ColumnDirection::Left,
            ColumnDirectionArg::Right => ColumnDirection::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SheetDirectionArg {
    Left,
    Right,
}

impl From<SheetDirectionArg> for SheetDirection {
    fn from(arg: SheetDirectionArg) -> Self {
        match arg {
            SheetDirectionArg::Left => SheetDirection::Left,
            SheetDirectionArg::Right => SheetDirection::Right,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match commands::run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn merge(err: ganttsheet_engine::MergeError) -> Self {
        let code = exit_codes::merge_exit_code(&err);
        let hint = match err {
            ganttsheet_engine::MergeError::MixedRegions => {
                Some("merge head and body cells separately".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn store(err: ganttsheet_io::StoreError) -> Self {
        Self { code: exit_codes::store_exit_code(&err), message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
