//! TabularStore: one document, at most one active sheet.

use std::path::Path;
use std::sync::Arc;

use super::delimited;
use super::errors::TabularError;
use super::format::{SourceKind, DEFAULT_SHEET_NAME};
use super::types::{Document, LoadedSheet, SheetInfo};
use super::workbook;

/// Holds the current document and its active sheet.
///
/// The active sheet is handed out as `Arc<LoadedSheet>`; replacing it never
/// affects snapshots already shared with tool bindings.
#[derive(Debug, Default)]
pub struct TabularStore {
    document: Option<Document>,
    active: Option<Arc<LoadedSheet>>,
}

impl TabularStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document and list its sheets without reading row data.
    ///
    /// Any previous document and sheet are dropped first, so a failed load
    /// leaves the store empty.
    pub fn load(&mut self, path: &Path) -> Result<Vec<String>, TabularError> {
        self.document = None;
        self.active = None;

        let source = SourceKind::from_path(path);
        let sheet_names = match source {
            SourceKind::Delimited => {
                let metadata = std::fs::metadata(path).map_err(|e| load_error(path, e))?;
                if !metadata.is_file() {
                    return Err(load_error(path, "not a regular file"));
                }
                vec![DEFAULT_SHEET_NAME.to_string()]
            }
            SourceKind::Workbook(engine) => {
                workbook::list_sheet_names(path, engine).map_err(|e| load_error(path, e))?
            }
        };

        tracing::info!(
            path = %path.display(),
            source = ?source,
            sheets = sheet_names.len(),
            "document loaded"
        );

        self.document = Some(Document {
            path: path.to_path_buf(),
            source,
            sheet_names: sheet_names.clone(),
        });
        Ok(sheet_names)
    }

    /// Read `sheet_name` in full and make it the active sheet.
    ///
    /// An unknown name leaves the current sheet untouched. A read failure
    /// clears it.
    pub fn load_sheet(&mut self, sheet_name: &str) -> Result<Arc<LoadedSheet>, TabularError> {
        let document = self.document.as_ref().ok_or_else(TabularError::no_document)?;
        if !document.sheet_names.iter().any(|s| s == sheet_name) {
            return Err(TabularError::NotFound {
                sheet_name: sheet_name.to_string(),
            });
        }

        let read = match document.source {
            SourceKind::Delimited => delimited::read_sheet(&document.path, sheet_name),
            SourceKind::Workbook(engine) => {
                workbook::read_sheet(&document.path, engine, sheet_name)
            }
        };

        match read {
            Ok(sheet) => {
                tracing::info!(
                    sheet = %sheet_name,
                    rows = sheet.num_rows(),
                    cols = sheet.num_cols(),
                    "sheet loaded"
                );
                let sheet = Arc::new(sheet);
                self.active = Some(Arc::clone(&sheet));
                Ok(sheet)
            }
            Err(reason) => {
                tracing::warn!(sheet = %sheet_name, error = %reason, "sheet read failed");
                self.active = None;
                Err(TabularError::ReadError {
                    sheet_name: sheet_name.to_string(),
                    reason,
                })
            }
        }
    }

    pub fn document(&self) -> Result<&Document, TabularError> {
        self.document.as_ref().ok_or_else(TabularError::no_document)
    }

    pub fn sheet_names(&self) -> Result<&[String], TabularError> {
        Ok(&self.document()?.sheet_names)
    }

    /// The active sheet snapshot.
    pub fn active_sheet(&self) -> Result<Arc<LoadedSheet>, TabularError> {
        self.active.clone().ok_or_else(TabularError::no_sheet)
    }

    /// Summary of the active sheet.
    pub fn sheet_info(&self) -> Result<SheetInfo, TabularError> {
        let document = self.document()?;
        let sheet = self.active.as_ref().ok_or_else(TabularError::no_sheet)?;
        Ok(SheetInfo::describe(document, sheet))
    }
}

fn load_error(path: &Path, reason: impl ToString) -> TabularError {
    TabularError::LoadError {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
