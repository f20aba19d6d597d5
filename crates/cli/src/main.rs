// gsheets - inspect, track and sort game sheets from the command line

mod exit_codes;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use gamesheets_config::Settings;
use gamesheets_engine::cell_id::{col_to_letters, CellAddr};
use gamesheets_engine::progress::compute_progress;
use gamesheets_engine::render::PresentationKind;
use gamesheets_engine::sort::{sort_matrix, SortDirection, SortKind, SortOptions, SortScope};
use gamesheets_io::{DecodedSheet, DecodedWorkbook, IoError};

use exit_codes::{io_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};
use report::{ProgressReport, SheetReport};

#[derive(Parser)]
#[command(name = "gsheets")]
#[command(about = "Inspect, track and sort game sheets (CSV, TSV, XLSX)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a sheet renders: columns, sections, controls and progress
    #[command(after_help = "\
Examples:
  gsheets inspect quests.csv
  gsheets inspect campaign.xlsx --sheet Loot --presentation sticky-header
  gsheets inspect quests.csv --plain --json")]
    Inspect {
        /// Input file (csv, tsv, txt, xlsx, xlsm, xls, xlsb, ods)
        file: PathBuf,

        /// Only this sheet (default: every sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Turn smart mode off: text editors only, no section headers
        #[arg(long)]
        plain: bool,

        /// Presentation: plain, sticky-header or shadow-isolated
        #[arg(long, value_name = "KIND")]
        presentation: Option<PresentationKind>,

        /// Print the render plans as JSON
        #[arg(long)]
        json: bool,

        /// Settings file (default: the user settings.json)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Print checkbox completion per sheet, e.g. "Quests (67%)"
    Progress {
        /// Input file
        file: PathBuf,

        /// Print counts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sort body rows by one column and write the result
    #[command(after_help = "\
Examples:
  gsheets sort quests.csv --col D --desc -o sorted.csv
  gsheets sort campaign.xlsx --sheet Loot --col 2 --kind numeric -o campaign.xlsx
  gsheets sort quests.csv --col C --scope sheet -o out.csv")]
    Sort {
        /// Input file
        file: PathBuf,

        /// Column to sort by: letter (C) or 1-based number (3)
        #[arg(long, value_name = "COL")]
        col: String,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// sections (keep section headers in place) or sheet
        #[arg(long)]
        scope: Option<SortScope>,

        /// Comparator: alpha, numeric or completed (default: inferred)
        #[arg(long)]
        kind: Option<SortKind>,

        /// Sheet to sort (default: the first)
        #[arg(long)]
        sheet: Option<String>,

        /// Output file; format follows the extension
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Settings file (default: the user settings.json)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Show where settings live and the values in effect
    Settings {
        /// Overwrite the settings file with the defaults
        #[arg(long)]
        reset: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect { file, sheet, plain, presentation, json, config } => {
            cmd_inspect(file, sheet, plain, presentation, json, config)
        }
        Commands::Progress { file, json } => cmd_progress(file, json),
        Commands::Sort { file, col, desc, scope, kind, sheet, output, config } => {
            cmd_sort(file, col, desc, scope, kind, sheet, output, config)
        }
        Commands::Settings { reset } => cmd_settings(reset),
    };

    match result {
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
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::UnsupportedFormat(_) => {
                Some("supported extensions: csv, tsv, txt, xlsx, xlsm, xls, xlsb, ods".to_string())
            }
            _ => None,
        };
        Self { code: io_exit_code(&err), message: err.to_string(), hint }
    }
}

// ============================================================================
// shared helpers
// ============================================================================

fn load_settings(config: Option<&Path>) -> Result<Settings, CliError> {
    match config {
        Some(path) => Settings::load_from(path).map_err(CliError::general),
        None => Ok(Settings::load()),
    }
}

fn open(file: &Path) -> Result<DecodedWorkbook, CliError> {
    let book = gamesheets_io::decode_path(file)?;
    log::debug!("opened {} ({} sheets)", file.display(), book.sheets.len());
    Ok(book)
}

fn sheet_index(book: &DecodedWorkbook, name: Option<&str>) -> Result<usize, CliError> {
    let Some(name) = name else {
        return if book.sheets.is_empty() { Err(IoError::NoSheets.into()) } else { Ok(0) };
    };
    book.sheets.iter().position(|s| s.name == name).ok_or_else(|| {
        let names: Vec<&str> = book.sheets.iter().map(|s| s.name.as_str()).collect();
        CliError::args(format!("unknown sheet '{}'", name))
            .with_hint(format!("available sheets: {}", names.join(", ")))
    })
}

fn select_sheets<'a>(book: &'a DecodedWorkbook, name: Option<&str>) -> Result<Vec<&'a DecodedSheet>, CliError> {
    match name {
        Some(_) => Ok(vec![&book.sheets[sheet_index(book, name)?]]),
        None => Ok(book.sheets.iter().collect()),
    }
}

/// Column by letter ("C", "aa") or 1-based number ("3").
fn parse_column(arg: &str) -> Result<usize, CliError> {
    let arg = arg.trim();
    if let Ok(n) = arg.parse::<usize>() {
        return n
            .checked_sub(1)
            .ok_or_else(|| CliError::args("column numbers start at 1"));
    }
    let invalid = || {
        CliError::args(format!("invalid column '{}'", arg))
            .with_hint("use a letter (C) or a 1-based number (3)")
    };
    if arg.is_empty() || !arg.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }
    format!("{}1", arg)
        .parse::<CellAddr>()
        .map(|addr| addr.col)
        .map_err(|_| invalid())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

// ============================================================================
// inspect
// ============================================================================

fn cmd_inspect(
    file: PathBuf,
    sheet: Option<String>,
    plain: bool,
    presentation: Option<PresentationKind>,
    json: bool,
    config: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut settings = load_settings(config.as_deref())?;
    if plain {
        settings.smart_mode = false;
    }
    if let Some(kind) = presentation {
        settings.presentation = kind;
    }
    let renderer = settings.renderer();

    let book = open(&file)?;
    let sheets = select_sheets(&book, sheet.as_deref())?;

    if json {
        let reports: Vec<SheetReport> = sheets
            .iter()
            .map(|s| SheetReport {
                sheet: &s.name,
                rows: s.matrix.row_count(),
                columns: s.matrix.column_count(),
                progress: ProgressReport::new(&s.name, compute_progress(&s.matrix)),
                plan: renderer.render(&s.matrix, &s.hints),
            })
            .collect();
        return print_json(&reports);
    }

    for (i, s) in sheets.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let plan = renderer.render(&s.matrix, &s.hints);
        print!("{}", report::plan_summary(&s.name, &s.matrix, &plan, renderer.options().smart));
    }
    Ok(())
}

// ============================================================================
// progress
// ============================================================================

fn cmd_progress(file: PathBuf, json: bool) -> Result<(), CliError> {
    let book = open(&file)?;

    if json {
        let reports: Vec<ProgressReport> = book
            .sheets
            .iter()
            .map(|s| ProgressReport::new(&s.name, compute_progress(&s.matrix)))
            .collect();
        return print_json(&reports);
    }

    for s in &book.sheets {
        println!("{}", report::progress_line(&s.name, &compute_progress(&s.matrix)));
    }
    Ok(())
}

// ============================================================================
// sort
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn cmd_sort(
    file: PathBuf,
    col: String,
    desc: bool,
    scope: Option<SortScope>,
    kind: Option<SortKind>,
    sheet: Option<String>,
    output: PathBuf,
    config: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = load_settings(config.as_deref())?;
    let col = parse_column(&col)?;

    let mut book = open(&file)?;
    let idx = sheet_index(&book, sheet.as_deref())?;
    let target = &mut book.sheets[idx];

    let columns = target.matrix.column_count();
    if col >= columns {
        return Err(CliError::args(format!(
            "column {} is out of range ('{}' has {} columns)",
            col_to_letters(col),
            target.name,
            columns
        )));
    }

    let options = SortOptions {
        col,
        direction: if desc { SortDirection::Descending } else { SortDirection::Ascending },
        scope: scope.unwrap_or(settings.sort_scope),
        kind,
    };
    let outcome = sort_matrix(&mut target.matrix, &target.hints, &options, &settings.heuristics);
    let name = target.name.clone();

    gamesheets_io::encode_path(&output, &book.sheets)?;

    println!(
        "Sorted '{}' by column {} {} ({}, {} {}) -> {}",
        name,
        col_to_letters(outcome.col),
        match outcome.direction {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        },
        match outcome.kind {
            SortKind::Alpha => "alpha",
            SortKind::Numeric => "numeric",
            SortKind::Completed => "completed",
        },
        outcome.blocks,
        if outcome.blocks == 1 { "block" } else { "blocks" },
        output.display()
    );
    Ok(())
}

// ============================================================================
// settings
// ============================================================================

fn cmd_settings(reset: bool) -> Result<(), CliError> {
    let settings = if reset {
        let defaults = Settings::default();
        defaults
            .save()
            .map_err(|e| CliError::general(format!("failed to reset settings: {}", e)))?;
        log::info!("settings reset to defaults");
        defaults
    } else {
        Settings::load()
    };

    println!("Settings file: {}", Settings::config_path_display());
    print_json(&settings)
}
