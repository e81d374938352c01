//! Agent result types.

use serde::Serialize;

/// How a query resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The model produced a final answer.
    Success,
    /// The loop stopped without one (silent model or step limit).
    Incomplete,
    /// The decision step failed.
    Error,
}

/// One scratchpad entry: a tool call and what it returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub arguments: serde_json::Value,
    pub result: String,
    #[serde(skip)]
    pub is_error: bool,
    #[serde(skip)]
    pub duration_ms: u64,
}

/// Terminal output of `AgentOrchestrator::run`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentReply {
    pub answer: String,
    pub status: RunStatus,
    /// The scratchpad, in call order.
    pub invocations: Vec<ToolInvocation>,
}

impl AgentReply {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}
