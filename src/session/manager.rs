//! SessionManager: the registry of live sessions.
//!
//! The registry is bounded. Registering a session beyond `max_sessions`
//! evicts the least recently used ones; callers clean up whatever else an
//! evicted id owns.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::agent::DecisionEngine;

use super::errors::SessionError;
use super::session::AnalysisSession;

/// Default cap on concurrently registered sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 32;

/// Shared handle to one session. Hold the lock for the whole request.
pub type SessionHandle = Arc<Mutex<AnalysisSession>>;

struct Entry {
    handle: SessionHandle,
    last_used: AtomicU64,
}

pub struct SessionManager {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    clock: AtomicU64,
    engine: Arc<dyn DecisionEngine>,
    output_dir: PathBuf,
    max_steps: usize,
    max_sessions: usize,
}

impl SessionManager {
    pub fn new(
        engine: Arc<dyn DecisionEngine>,
        output_dir: impl Into<PathBuf>,
        max_steps: usize,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            engine,
            output_dir: output_dir.into(),
            max_steps,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub fn engine(&self) -> &Arc<dyn DecisionEngine> {
        &self.engine
    }

    /// A fresh, unregistered session. Register it with `insert` once its
    /// document has loaded.
    pub fn new_session(&self) -> AnalysisSession {
        AnalysisSession::new(Arc::clone(&self.engine), self.output_dir.clone(), self.max_steps)
    }

    /// Register a session. Returns its handle and the ids evicted to stay
    /// within `max_sessions`, least recently used first.
    pub fn insert(&self, session: AnalysisSession) -> (SessionHandle, Vec<Uuid>) {
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        let entry = Entry {
            handle: Arc::clone(&handle),
            last_used: AtomicU64::new(self.tick()),
        };

        let mut sessions = self.write();
        sessions.insert(id, entry);
        let evicted = evict_oldest(&mut sessions, self.max_sessions);
        let live = sessions.len();
        drop(sessions);

        for evicted_id in &evicted {
            tracing::info!(session_id = %evicted_id, "session evicted");
        }
        tracing::info!(session_id = %id, live, "session registered");
        (handle, evicted)
    }

    pub fn get(&self, id: Uuid) -> Result<SessionHandle, SessionError> {
        let sessions = self.read();
        let entry = sessions.get(&id).ok_or_else(|| not_found(id))?;
        entry.last_used.store(self.tick(), Ordering::Relaxed);
        Ok(Arc::clone(&entry.handle))
    }

    pub fn remove(&self, id: Uuid) -> Result<SessionHandle, SessionError> {
        let entry = self.write().remove(&id).ok_or_else(|| not_found(id))?;
        tracing::info!(session_id = %id, "session removed");
        Ok(entry.handle)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    // A poisoned map is still structurally valid; keep serving.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, Entry>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, Entry>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Drop least recently used entries until at most `capacity` remain.
fn evict_oldest(sessions: &mut HashMap<Uuid, Entry>, capacity: usize) -> Vec<Uuid> {
    let excess = sessions.len().saturating_sub(capacity);
    if excess == 0 {
        return Vec::new();
    }
    let mut by_age: Vec<(u64, Uuid)> = sessions
        .iter()
        .map(|(id, entry)| (entry.last_used.load(Ordering::Relaxed), *id))
        .collect();
    by_age.sort_unstable();
    by_age
        .into_iter()
        .take(excess)
        .map(|(_, id)| {
            sessions.remove(&id);
            id
        })
        .collect()
}

fn not_found(id: Uuid) -> SessionError {
    SessionError::NotFound {
        session_id: id.to_string(),
    }
}
