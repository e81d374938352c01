//! Shared types for the tabular store.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::Serialize;

use super::format::SourceKind;

/// Number of rows included in `SheetInfo::preview`.
const PREVIEW_ROWS: usize = 5;

/// Synthetic positional column name: `col_0`, `col_1`, …
pub fn column_name(index: usize) -> String {
    format!("col_{index}")
}

// ─── Cells ──────────────────────────────────────────────────────────────────

/// A single cell as read from the source, before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Spreadsheet date/time serial (days since 1899-12-30, fraction = time of day).
    DateTime(f64),
    Error(String),
}

/// Coarse cell classification used by `SheetInfo::column_types`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Empty,
    Text,
    Number,
    Bool,
    Datetime,
    Error,
    Mixed,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn kind(&self) -> CellKind {
        match self {
            CellValue::Empty => CellKind::Empty,
            CellValue::Text(_) => CellKind::Text,
            CellValue::Number(_) => CellKind::Number,
            CellValue::Bool(_) => CellKind::Bool,
            CellValue::DateTime(_) => CellKind::Datetime,
            CellValue::Error(_) => CellKind::Error,
        }
    }

    /// Literal text form of the cell.
    ///
    /// Integral numbers print without a fractional part, time-of-day serials
    /// print as `HH:MM:SS`, full serials as `YYYY-MM-DD HH:MM:SS`.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
            CellValue::DateTime(serial) => {
                format_serial(*serial).unwrap_or_else(|| format_number(*serial))
            }
            CellValue::Error(e) => e.clone(),
        }
    }

    /// Numeric interpretation, if the cell has one.
    ///
    /// Text is parsed after trimming; date/time cells and errors have none.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Empty | CellValue::DateTime(_) | CellValue::Error(_) => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Render a spreadsheet serial (1900 date system).
fn format_serial(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let total_secs = (serial * 86_400.0).round() as i64;

    if serial < 1.0 {
        let secs = u32::try_from(total_secs.rem_euclid(86_400)).ok()?;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)?;
        return Some(time.format("%H:%M:%S").to_string());
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let stamp = epoch.checked_add_signed(TimeDelta::try_seconds(total_secs)?)?;
    Some(stamp.format("%Y-%m-%d %H:%M:%S").to_string())
}

// ─── Sheets ─────────────────────────────────────────────────────────────────

/// The active in-memory table of a document.
///
/// Immutable once built; callers share it as `Arc<LoadedSheet>` so tool
/// bindings keep the snapshot they were created with.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSheet {
    pub sheet_name: String,
    /// Positional names, one per column.
    pub columns: Vec<String>,
    /// Rows padded with `CellValue::Empty` to `columns.len()`.
    pub rows: Vec<Vec<CellValue>>,
}

impl LoadedSheet {
    /// Build a sheet from ragged rows; every row is padded to the widest one.
    pub fn from_rows(sheet_name: impl Into<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        Self {
            sheet_name: sheet_name.into(),
            columns: (0..width).map(column_name).collect(),
            rows,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column by its synthetic name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `(row, col)`; out-of-range positions read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }

    /// Dominant non-empty cell kind of a column.
    pub fn column_kind(&self, col: usize) -> CellKind {
        let mut kind: Option<CellKind> = None;
        for row in &self.rows {
            let cell_kind = match row.get(col) {
                Some(cell) if !cell.is_empty() => cell.kind(),
                _ => continue,
            };
            match kind {
                None => kind = Some(cell_kind),
                Some(k) if k == cell_kind => {}
                Some(_) => return CellKind::Mixed,
            }
        }
        kind.unwrap_or(CellKind::Empty)
    }
}

/// An uploaded file whose sheet list has been read.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub source: SourceKind,
    pub sheet_names: Vec<String>,
}

/// Summary of the active sheet.
#[derive(Debug, Clone, Serialize)]
pub struct SheetInfo {
    pub file_path: String,
    pub sheet_name: String,
    pub num_rows: usize,
    pub num_cols: usize,
    pub columns: Vec<String>,
    pub column_types: Vec<(String, CellKind)>,
    pub preview: Vec<Vec<String>>,
}

impl SheetInfo {
    pub fn describe(document: &Document, sheet: &LoadedSheet) -> Self {
        Self {
            file_path: document.path.display().to_string(),
            sheet_name: sheet.sheet_name.clone(),
            num_rows: sheet.num_rows(),
            num_cols: sheet.num_cols(),
            columns: sheet.columns.clone(),
            column_types: sheet
                .columns
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), sheet.column_kind(i)))
                .collect(),
            preview: sheet
                .rows
                .iter()
                .take(PREVIEW_ROWS)
                .map(|row| row.iter().map(CellValue::display).collect())
                .collect(),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
