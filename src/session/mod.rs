//! Sessions: one uploaded document, its active sheet and its agent.
//!
//! Each upload gets its own `AnalysisSession`; nothing is process-global.
//! `SessionManager` hands sessions out behind per-session async mutexes, so
//! requests against different sessions never contend.

pub mod errors;
pub mod manager;
pub mod session;

pub use errors::SessionError;
pub use manager::{SessionHandle, SessionManager, DEFAULT_MAX_SESSIONS};
pub use session::AnalysisSession;
