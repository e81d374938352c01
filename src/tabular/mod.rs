//! Tabular Store: loads uploaded CSV and spreadsheet files.
//!
//! Submodules:
//! - `format`: extension → reader selection (delimited text or one of the
//!   spreadsheet engines)
//! - `delimited`: CSV reader (encoding fallback, delimiter sniffing)
//! - `workbook`: spreadsheet reader (metadata-only sheet listing, single
//!   sheet materialization)
//! - `store`: `TabularStore`, the per-session document + active sheet holder
//! - `types`: `CellValue`, `LoadedSheet`, `Document`, `SheetInfo`
//! - `errors`: `TabularError`
//!
//! Sheets are read without header inference: the first row is data, and
//! columns are addressed by synthetic positional names (`col_0`, `col_1`, …).

pub mod delimited;
pub mod errors;
pub mod format;
pub mod store;
pub mod types;
pub mod workbook;

// Re-exports for convenience
pub use errors::TabularError;
pub use format::{SourceKind, SpreadsheetEngine};
pub use store::TabularStore;
pub use types::{column_name, CellKind, CellValue, Document, LoadedSheet, SheetInfo};
