//! Reader selection by file extension.
//!
//! Anything that is not `.csv` is treated as a workbook. The workbook engine
//! is a static lookup on the extension; extensions outside the table fall
//! back to content sniffing, which may itself fail at open time.

use std::path::Path;

/// Extensions accepted by the upload surface.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["csv", "xlsx", "xls", "xlsb", "xlsm"];

/// Synthetic sheet name for single-table formats.
pub const DEFAULT_SHEET_NAME: &str = "default";

/// Which decoder a workbook is opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetEngine {
    /// Office Open XML (`.xlsx`, `.xlsm`).
    OpenXml,
    /// Binary workbook (`.xlsb`).
    Binary,
    /// Legacy BIFF workbook (`.xls`).
    LegacyBiff,
    /// Let the reader pick based on the file itself.
    Auto,
}

impl SpreadsheetEngine {
    /// Static extension → engine table.
    pub fn for_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "xlsx" | "xlsm" => SpreadsheetEngine::OpenXml,
            "xlsb" => SpreadsheetEngine::Binary,
            "xls" => SpreadsheetEngine::LegacyBiff,
            _ => SpreadsheetEngine::Auto,
        }
    }

    /// Short name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpreadsheetEngine::OpenXml => "openxml",
            SpreadsheetEngine::Binary => "xlsb",
            SpreadsheetEngine::LegacyBiff => "biff",
            SpreadsheetEngine::Auto => "auto",
        }
    }
}

/// How a document's rows are stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Single-table delimited text.
    Delimited,
    /// Multi-sheet workbook, opened with the given engine.
    Workbook(SpreadsheetEngine),
}

impl SourceKind {
    /// Classify a path by its extension.
    pub fn from_path(path: &Path) -> Self {
        let extension = file_extension(path).unwrap_or_default();
        if extension == "csv" {
            SourceKind::Delimited
        } else {
            SourceKind::Workbook(SpreadsheetEngine::for_extension(&extension))
        }
    }

    /// Whether the source holds more than one logical sheet.
    pub fn is_multi_sheet(&self) -> bool {
        matches!(self, SourceKind::Workbook(_))
    }
}

/// Lower-cased extension of `path`, without the dot.
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Whether `filename` carries one of the accepted extensions.
pub fn is_supported(filename: &str) -> bool {
    file_extension(Path::new(filename))
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}
