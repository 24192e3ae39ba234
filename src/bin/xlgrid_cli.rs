//! CLI tool for xlgrid - imports a table, applies value filters and prints
//! the rows that remain visible.
//!
//! Usage:
//!   xlgrid_cli data.xlsx                          # Aligned text table
//!   xlgrid_cli data.csv --only City=Chicago       # Keep one value
//!   xlgrid_cli data.csv --exclude A=John --json   # Snapshot as JSON
//!   xlgrid_cli                                    # Sample sheet

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use unicode_width::UnicodeWidthStr;
use xlgrid::cell_ref::parse_column_label;
use xlgrid::import::read_file;
use xlgrid::{Grid, GridConfig, GridError, Snapshot, Spreadsheet};

#[derive(Parser)]
#[command(name = "xlgrid_cli", about = "Filter the rows of a CSV/TSV/XLSX table")]
struct Args {
    /// Table to import; the sample sheet is used when omitted
    input: Option<PathBuf>,

    /// TOML file with column width settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show only rows whose COLUMN equals VALUE (repeatable, values of the
    /// same column are combined)
    #[arg(long, value_name = "COLUMN=VALUE")]
    only: Vec<String>,

    /// Hide rows whose COLUMN equals VALUE (repeatable)
    #[arg(long, value_name = "COLUMN=VALUE")]
    exclude: Vec<String>,

    /// Deselect every value of COLUMN
    #[arg(long, value_name = "COLUMN")]
    none: Vec<String>,

    /// Print the full snapshot as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let _ = TermLogger::init(level, log_config, TerminalMode::Stderr, ColorChoice::Auto);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> xlgrid::Result<()> {
    let config = match &args.config {
        Some(path) => GridConfig::load(path)?,
        None => GridConfig::default(),
    };

    let mut sheet = Spreadsheet::from_rows(Grid::sample().rows().to_vec(), config)?;
    if let Some(path) = &args.input {
        sheet.import(read_file(path)?)?;
    }
    log::info!(
        "Loaded {} data rows x {} columns",
        sheet.grid().data_row_count(),
        sheet.grid().column_count()
    );

    apply_filters(&mut sheet, args)?;

    let snapshot = sheet.snapshot();
    let text = if args.json {
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| GridError::Parse(format!("JSON serialization error: {e}")))?
    } else {
        render_table(&snapshot)
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &text)?;
            eprintln!("Written: {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

/// Apply `--none`, `--only` and `--exclude`, in that order.
fn apply_filters(sheet: &mut Spreadsheet, args: &Args) -> xlgrid::Result<()> {
    for column in &args.none {
        let col = resolve_column(sheet, column)?;
        sheet.select_all_values_for_column(col, false)?;
    }

    let mut cleared = Vec::new();
    for arg in &args.only {
        let (col, value) = parse_filter_arg(sheet, arg)?;
        if !cleared.contains(&col) {
            sheet.select_all_values_for_column(col, false)?;
            cleared.push(col);
        }
        if !sheet.filters().filter_set(col)?.contains(value) {
            sheet.toggle_filter_value(col, value)?;
        }
    }

    for arg in &args.exclude {
        let (col, value) = parse_filter_arg(sheet, arg)?;
        if sheet.filters().filter_set(col)?.contains(value) {
            sheet.toggle_filter_value(col, value)?;
        }
    }
    Ok(())
}

fn parse_filter_arg<'a>(sheet: &Spreadsheet, arg: &'a str) -> xlgrid::Result<(usize, &'a str)> {
    let (column, value) = arg
        .split_once('=')
        .ok_or_else(|| GridError::Parse(format!("expected COLUMN=VALUE, got {arg:?}")))?;
    Ok((resolve_column(sheet, column)?, value))
}

/// A column named by its header text, or by its letter.
fn resolve_column(sheet: &Spreadsheet, name: &str) -> xlgrid::Result<usize> {
    let grid = sheet.grid();
    let col = grid
        .header()
        .iter()
        .position(|h| h == name)
        .or_else(|| parse_column_label(name))
        .ok_or_else(|| GridError::Parse(format!("unknown column {name:?}")))?;
    if col >= grid.column_count() {
        return Err(GridError::ColumnOutOfRange {
            col,
            columns: grid.column_count(),
        });
    }
    Ok(col)
}

/// Header and visible rows as a left-aligned text table.
fn render_table(snapshot: &Snapshot) -> String {
    let mut widths: Vec<usize> = snapshot.header.iter().map(|h| h.width()).collect();
    for row in &snapshot.rows {
        for (w, cell) in widths.iter_mut().zip(&row.cells) {
            *w = (*w).max(cell.width());
        }
    }

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell}{}", " ".repeat(w.saturating_sub(cell.width()))))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(&snapshot.header)];
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(snapshot.rows.iter().map(|row| format_row(&row.cells)));
    lines.push(format!(
        "({} of {} rows)",
        snapshot.rows.len(),
        snapshot.total_rows
    ));
    lines.join("\n")
}
