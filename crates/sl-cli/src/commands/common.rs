//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;
use sl_core::Config;
use sl_sql::{LineageRow, Remark};
use std::fmt;

use crate::cli::{GlobalArgs, OutputFormat};

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main.rs exits with the code and prints nothing
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load the config named by `--config`, else `./sqllineage.yml`, else defaults.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    Config::load_or_default(global.config.as_deref()).context("Failed to load config")
}

/// Serialize `data` as pretty JSON to stdout
pub(crate) fn print_json<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Print lineage rows in the requested format
pub(crate) fn print_rows(rows: &[LineageRow], output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => print_json(rows),
        OutputFormat::Table => {
            print_table(&ROW_HEADERS, &row_cells(rows));
            Ok(())
        }
    }
}

/// Whether any row marks a parse failure
pub(crate) fn has_tech_failure(rows: &[LineageRow]) -> bool {
    rows.iter().any(|row| row.has_remark(Remark::TechFailure))
}

const ROW_HEADERS: [&str; 7] = [
    "VIEW", "DATABASE", "TABLE", "ALIAS", "COLUMN", "COLUMN_ALIAS", "REMARKS",
];

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

fn row_cells(rows: &[LineageRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let remarks: Vec<String> = row.remarks.iter().map(ToString::to_string).collect();
            vec![
                or_dash(&row.view_name),
                or_dash(&row.database_name),
                or_dash(&row.table_name),
                or_dash(&row.table_alias_name),
                or_dash(&row.column_name),
                or_dash(&row.alias_name),
                remarks.join(", "),
            ]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Calculate column widths for a table given headers and row data.
///
/// For each column, returns the maximum width across the header and all
/// row values so that data aligns when printed with left-padding.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths
}

/// Print a formatted table to stdout: a left-aligned header row, a
/// separator line of dashes, then each data row, two spaces apart.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}
