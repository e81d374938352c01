//! AnalysisSession: store, tool bindings and orchestrator for one upload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::agent::{AgentOrchestrator, AgentReply, DecisionEngine};
use crate::tabular::{LoadedSheet, SheetInfo, TabularError, TabularStore};
use crate::tools::ToolRegistry;

use super::errors::SessionError;

/// One document under analysis.
///
/// The orchestrator is rebuilt on every successful sheet selection, over a
/// snapshot of that sheet. Loading a new document drops it.
pub struct AnalysisSession {
    id: Uuid,
    store: TabularStore,
    engine: Arc<dyn DecisionEngine>,
    output_dir: PathBuf,
    max_steps: usize,
    orchestrator: Option<AgentOrchestrator>,
}

impl AnalysisSession {
    pub fn new(
        engine: Arc<dyn DecisionEngine>,
        output_dir: impl Into<PathBuf>,
        max_steps: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            store: TabularStore::new(),
            engine,
            output_dir: output_dir.into(),
            max_steps,
            orchestrator: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Register a document. Blocking file I/O.
    pub fn load(&mut self, path: &Path) -> Result<Vec<String>, SessionError> {
        self.orchestrator = None;
        let sheet_names = self.store.load(path)?;
        tracing::info!(session_id = %self.id, sheets = ?sheet_names, "session document loaded");
        Ok(sheet_names)
    }

    /// Make `sheet_name` active and rebind the tools to it. Blocking file I/O.
    pub fn select_sheet(&mut self, sheet_name: &str) -> Result<Arc<LoadedSheet>, SessionError> {
        match self.store.load_sheet(sheet_name) {
            Ok(sheet) => {
                let tools = ToolRegistry::new(Arc::clone(&sheet), self.output_dir.clone());
                self.orchestrator = Some(
                    AgentOrchestrator::new(Arc::clone(&self.engine), tools)
                        .with_max_steps(self.max_steps),
                );
                tracing::info!(session_id = %self.id, sheet = %sheet_name, "agent bound to sheet");
                Ok(sheet)
            }
            Err(e) => {
                // A failed read clears the active sheet; the agent goes with it
                if self.store.active_sheet().is_err() {
                    self.orchestrator = None;
                }
                Err(e.into())
            }
        }
    }

    /// Run a natural-language query against the active sheet.
    pub async fn analyze(&self, query: &str) -> Result<AgentReply, SessionError> {
        let orchestrator = self
            .orchestrator
            .as_ref()
            .ok_or_else(TabularError::no_sheet)?;

        tracing::info!(session_id = %self.id, query_len = query.len(), "analysis started");
        Ok(orchestrator.run(query).await)
    }

    pub fn sheet_names(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.store.sheet_names()?.to_vec())
    }

    pub fn sheet_info(&self) -> Result<SheetInfo, SessionError> {
        Ok(self.store.sheet_info()?)
    }
}
