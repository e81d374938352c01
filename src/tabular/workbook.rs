//! Spreadsheet reader backed by `calamine`.
//!
//! Listing sheet names only parses the workbook index (sheet names and
//! relationships); cell data is read per sheet in `read_sheet`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, open_workbook_auto, Data, Range, Reader, Sheets, Xls, Xlsb, Xlsx};

use super::format::SpreadsheetEngine;
use super::types::{CellValue, LoadedSheet};

type WorkbookFile = Sheets<BufReader<File>>;

/// Open a workbook with the requested engine.
fn open(path: &Path, engine: SpreadsheetEngine) -> Result<WorkbookFile, String> {
    let workbook = match engine {
        SpreadsheetEngine::OpenXml => {
            Sheets::Xlsx(open_workbook::<Xlsx<_>, _>(path).map_err(|e| e.to_string())?)
        }
        SpreadsheetEngine::Binary => {
            Sheets::Xlsb(open_workbook::<Xlsb<_>, _>(path).map_err(|e| e.to_string())?)
        }
        SpreadsheetEngine::LegacyBiff => {
            Sheets::Xls(open_workbook::<Xls<_>, _>(path).map_err(|e| e.to_string())?)
        }
        SpreadsheetEngine::Auto => open_workbook_auto(path).map_err(|e| e.to_string())?,
    };
    Ok(workbook)
}

/// Enumerate sheet names without materializing any sheet.
pub fn list_sheet_names(path: &Path, engine: SpreadsheetEngine) -> Result<Vec<String>, String> {
    let workbook = open(path, engine)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();
    if names.is_empty() {
        return Err("workbook contains no sheets".to_string());
    }
    Ok(names)
}

/// Materialize one sheet. Cell positions are absolute: a sheet whose used
/// range starts at `B3` still has its first value at `(2, 1)`.
pub fn read_sheet(
    path: &Path,
    engine: SpreadsheetEngine,
    sheet_name: &str,
) -> Result<LoadedSheet, String> {
    let mut workbook = open(path, engine)?;
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| e.to_string())?;
    Ok(range_to_sheet(sheet_name, &range))
}

fn range_to_sheet(sheet_name: &str, range: &Range<Data>) -> LoadedSheet {
    let Some((start_row, start_col)) = range.start() else {
        return LoadedSheet::from_rows(sheet_name, Vec::new());
    };
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row];
    for source_row in range.rows() {
        let mut row = vec![CellValue::Empty; start_col];
        row.extend(source_row.iter().map(convert_cell));
        rows.push(row);
    }

    LoadedSheet::from_rows(sheet_name, rows)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}
