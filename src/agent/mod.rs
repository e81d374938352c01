//! Agent: the tool-using conversation loop for one query.
//!
//! - `engine`: the `DecisionEngine` boundary (model decides: call tools or answer)
//! - `orchestrator`: `AgentOrchestrator`, runs decide → invoke → observe rounds
//! - `prompt`: system instructions, including the per-plant business rules
//! - `types`: `AgentReply`, `ToolInvocation`, `RunStatus`
//! - `errors`: `AgentError`

pub mod engine;
pub mod errors;
pub mod orchestrator;
pub mod prompt;
pub mod types;

pub use engine::{Decision, DecisionEngine};
pub use errors::AgentError;
pub use orchestrator::{AgentOrchestrator, DEFAULT_MAX_STEPS};
pub use types::{AgentReply, RunStatus, ToolInvocation};
