// Command execution: load -> apply -> save -> print

use std::io::{self, Write};

use ganttsheet_config::Settings;
use ganttsheet_core::{GridRange, Region};
use ganttsheet_engine::{CellId, Sheet, SheetId, Workbook, WorkbookOptions};
use ganttsheet_io::{FileStorage, GanttStore};

use crate::{Cli, CliError, Commands};

/// What a command did, and what to print for it.
#[derive(Debug, PartialEq)]
pub enum Report {
    /// The active sheet's grid.
    Grid,
    /// The sheet list.
    Sheets,
    /// A one-line confirmation.
    Done(String),
    /// The command was valid but changed nothing.
    Unchanged(String),
}

impl Report {
    fn changed(&self) -> bool {
        matches!(self, Report::Done(_))
    }
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let dir = cli
        .store_dir
        .clone()
        .or_else(|| settings.resolved_storage_dir())
        .ok_or_else(|| {
            CliError::args("cannot determine a storage directory")
                .with_hint("pass --store-dir or set storage.dir in settings.json")
        })?;
    let key = cli.key.clone().unwrap_or_else(|| settings.storage_key.clone());
    let options = WorkbookOptions {
        default_title: settings.default_sheet_title.clone(),
        style_debounce: settings.style_debounce(),
    };

    let mut store = GanttStore::with_key(FileStorage::new(dir), key).with_options(options);
    let mut workbook = store.load().map_err(CliError::store)?;
    let initialized = workbook.initialize();

    let report = apply(&mut workbook, &cli.command)?;
    if initialized || report.changed() {
        store.save(&workbook).map_err(CliError::store)?;
    }

    print_report(&workbook, &report, cli.json)
}

/// Apply one command to the workbook.
pub fn apply(workbook: &mut Workbook, command: &Commands) -> Result<Report, CliError> {
    let report = match command {
        Commands::Show => Report::Grid,
        Commands::Sheets => Report::Sheets,

        Commands::AddSheet { title } => {
            let id = workbook.add_sheet(title.as_deref());
            Report::Done(format!("added sheet {} \"{}\"", id, sheet_title(workbook, &id)))
        }

        Commands::DuplicateSheet { sheet } => {
            let source = resolve_sheet(workbook, sheet)?;
            let id = workbook
                .duplicate_sheet(&source)
                .ok_or_else(|| CliError::general(format!("could not duplicate sheet {}", source)))?;
            Report::Done(format!("added sheet {} \"{}\"", id, sheet_title(workbook, &id)))
        }

        Commands::RemoveSheet { sheet } => {
            let id = resolve_sheet(workbook, sheet)?;
            changed(workbook.remove_sheet(&id), format!("removed sheet {}", id), "sheet not removed")
        }

        Commands::RenameSheet { sheet, title } => {
            let id = resolve_sheet(workbook, sheet)?;
            changed(
                workbook.rename_sheet(&id, title),
                format!("renamed sheet {} to \"{}\"", id, sheet_title(workbook, &id)),
                "title is empty or unchanged",
            )
        }

        Commands::Switch { index } => {
            if *index >= workbook.sheet_count() {
                return Err(CliError::args(format!(
                    "sheet index {} out of range (0..{})",
                    index,
                    workbook.sheet_count()
                ))
                .with_hint("run `gsheet sheets` to list sheets"));
            }
            changed(
                workbook.change_active_sheet(*index),
                format!("active sheet is now {}", index),
                "sheet is already active",
            )
        }

        Commands::MoveSheet { sheet, direction } => {
            let id = resolve_sheet(workbook, sheet)?;
            changed(
                workbook.move_sheet(&id, (*direction).into()),
                format!("moved sheet {}", id),
                "sheet is already at that edge",
            )
        }

        Commands::InsertRow { region, direction, pivot } => changed(
            workbook.insert_row((*region).into(), (*direction).into(), *pivot),
            format!("inserted {} row", Region::from(*region)),
            "no active sheet",
        ),

        Commands::InsertColumn { direction, pivot } => changed(
            workbook.insert_column((*direction).into(), 0, *pivot),
            "inserted column".to_string(),
            "no active sheet",
        ),

        Commands::DeleteRow { region, row } => changed(
            workbook.delete_row((*region).into(), *row),
            format!("deleted {} row {}", Region::from(*region), row),
            "row is out of range or is the region's last row",
        ),

        Commands::DeleteColumn { col } => changed(
            workbook.delete_column(*col),
            format!("deleted column {}", col),
            "column is out of range or is the last column",
        ),

        Commands::Set { region, row, col, content } => {
            let region = Region::from(*region);
            let id = cell_at(workbook, region, *row, *col)?;
            changed(
                workbook.update_cell_content(&id, content),
                format!("set {} {},{}", region, row, col),
                "cell not found",
            )
        }

        Commands::Merge { region, r1, c1, r2, c2, horizontal, vertical } => {
            let (horizontal, vertical) = match (*horizontal, *vertical) {
                (false, false) => (true, true),
                flags => flags,
            };
            workbook.select_cells_in_range((*region).into(), GridRange::new(*r1, *c1, *r2, *c2));
            let outcome = workbook.merge_cells(horizontal, vertical).map_err(CliError::merge)?;
            Report::Done(format!(
                "merged {} block(s) covering {} cell(s)",
                outcome.anchors.len(),
                outcome.anchors.len() + outcome.ghosts
            ))
        }

        Commands::Unmerge { region, row, col } => {
            let region = Region::from(*region);
            match covering_anchor(workbook, region, *row, *col) {
                Some(anchor) => {
                    workbook.set_selection([anchor]);
                    let dissolved = workbook.unmerge_cells();
                    changed(dissolved > 0, format!("unmerged {} block(s)", dissolved), "cell is not merged")
                }
                None => Report::Unchanged("cell is not merged".to_string()),
            }
        }
    };
    Ok(report)
}

fn changed(did_change: bool, done: String, unchanged: &str) -> Report {
    if did_change {
        Report::Done(done)
    } else {
        Report::Unchanged(unchanged.to_string())
    }
}

fn sheet_title(workbook: &Workbook, id: &SheetId) -> String {
    workbook.sheet_by_id(id).map(|s| s.title.clone()).unwrap_or_default()
}

/// Find a sheet by id, falling back to an exact title match.
fn resolve_sheet(workbook: &Workbook, arg: &str) -> Result<SheetId, CliError> {
    let sheets = workbook.sheets();
    sheets
        .iter()
        .find(|s| s.id.as_str() == arg)
        .or_else(|| sheets.iter().find(|s| s.title == arg))
        .map(|s| s.id.clone())
        .ok_or_else(|| {
            CliError::args(format!("no sheet with id or title '{}'", arg))
                .with_hint("run `gsheet sheets` to list sheets")
        })
}

fn cell_at(workbook: &Workbook, region: Region, row: usize, col: usize) -> Result<CellId, CliError> {
    workbook
        .current_sheet()
        .and_then(|s| s.gantt.cell_at(region, row, col))
        .map(|c| c.id.clone())
        .ok_or_else(|| {
            CliError::args(format!("no {} cell at {},{}", region, row, col))
                .with_hint("run `gsheet show` to see the grid")
        })
}

/// The anchor whose block covers (row, col), if any.
fn covering_anchor(workbook: &Workbook, region: Region, row: usize, col: usize) -> Option<CellId> {
    let sheet = workbook.current_sheet()?;
    sheet
        .gantt
        .region(region)
        .iter()
        .flatten()
        .filter(|c| c.anchor)
        .find(|c| {
            let block = GridRange::new(
                c.row,
                c.column,
                c.row + c.cell_props.row_span() - 1,
                c.column + c.cell_props.col_span() - 1,
            );
            block.contains(row, col)
        })
        .map(|c| c.id.clone())
}

fn print_report(workbook: &Workbook, report: &Report, json: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let io_err = |e: io::Error| CliError::general(e.to_string());

    if let Report::Unchanged(reason) = report {
        eprintln!("note: nothing changed ({})", reason);
    }

    if json {
        let text = serde_json::to_string_pretty(&workbook.current_sheet())
            .map_err(|e| CliError::general(e.to_string()))?;
        return writeln!(out, "{}", text).map_err(io_err);
    }

    match report {
        Report::Grid => match workbook.current_sheet() {
            Some(sheet) => write!(out, "{}", render_grid(sheet)).map_err(io_err),
            None => writeln!(out, "(no active sheet)").map_err(io_err),
        },
        Report::Sheets => write!(out, "{}", render_sheet_list(workbook)).map_err(io_err),
        Report::Done(line) => writeln!(out, "{}", line).map_err(io_err),
        Report::Unchanged(_) => Ok(()),
    }
}

/// Text rendering of a sheet: one block per region, ghosts left blank,
/// anchors suffixed with their `rows x cols` span.
pub fn render_grid(sheet: &Sheet) -> String {
    let label = |cell: &ganttsheet_engine::Cell| -> String {
        if cell.ghost {
            String::new()
        } else if cell.anchor {
            format!("{} [{}x{}]", cell.content, cell.cell_props.row_span(), cell.cell_props.col_span())
        } else {
            cell.content.clone()
        }
    };

    let columns = sheet.gantt.column_count();
    let mut widths = vec![1usize; columns];
    for cell in sheet.gantt.cells() {
        if let Some(w) = widths.get_mut(cell.column) {
            *w = (*w).max(label(cell).chars().count());
        }
    }

    let mut text = format!("{}\n", sheet.title);
    for region in Region::ALL {
        text.push_str(&format!("[{}]\n", region));
        for row in sheet.gantt.region(region) {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<width$}", label(cell), width = *w))
                .collect();
            text.push_str(line.join(" | ").trim_end());
            text.push('\n');
        }
    }
    text
}

pub fn render_sheet_list(workbook: &Workbook) -> String {
    let active = workbook.active_index();
    workbook
        .sheet_list()
        .iter()
        .enumerate()
        .map(|(i, summary)| {
            let marker = if Some(i) == active { '*' } else { ' ' };
            format!("{} {}  {}  {}\n", marker, i, summary.id, summary.title)
        })
        .collect()
}
