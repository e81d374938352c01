//! AgentOrchestrator: decide → invoke → observe until the model answers.
//!
//! All loop state (history, scratchpad) is local to one `run` call, so a
//! failed run leaves nothing behind.

use std::sync::Arc;
use std::time::Instant;

use crate::inference::{ChatMessage, ToolCall};
use crate::tools::ToolRegistry;

use super::engine::{Decision, DecisionEngine};
use super::errors::AgentError;
use super::prompt::system_prompt;
use super::types::{AgentReply, RunStatus, ToolInvocation};

// ─── Constants ──────────────────────────────────────────────────────────────

/// Default maximum decision rounds per query.
///
/// Each round is one model call plus the tool calls it requested.
pub const DEFAULT_MAX_STEPS: usize = 15;

/// Shown when the model stops without producing an answer.
const NO_ANSWER_NOTICE: &str =
    "The analysis finished without a final answer from the model.";

/// Shown when the round limit is reached.
const STEP_LIMIT_NOTICE: &str =
    "The analysis stopped after reaching the maximum number of steps without a final answer.";

// ─── AgentOrchestrator ──────────────────────────────────────────────────────

/// Runs queries against one tool set. Rebuilt whenever the sheet changes.
pub struct AgentOrchestrator {
    engine: Arc<dyn DecisionEngine>,
    tools: ToolRegistry,
    system_prompt: String,
    max_steps: usize,
}

impl AgentOrchestrator {
    pub fn new(engine: Arc<dyn DecisionEngine>, tools: ToolRegistry) -> Self {
        Self {
            engine,
            tools,
            system_prompt: system_prompt(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Resolve one query. Never fails: errors become the reply text.
    pub async fn run(&self, query: &str) -> AgentReply {
        let start = Instant::now();
        let mut scratchpad = Vec::new();

        let (answer, status) = match self.resolve(query, &mut scratchpad).await {
            Ok(Some(answer)) => (answer, RunStatus::Success),
            Ok(None) => (NO_ANSWER_NOTICE.to_string(), RunStatus::Incomplete),
            Err(AgentError::StepLimit { max_steps }) => {
                tracing::warn!(max_steps, "agent step limit reached");
                (STEP_LIMIT_NOTICE.to_string(), RunStatus::Incomplete)
            }
            Err(e) => {
                tracing::error!(error = %e, "agent run failed");
                (
                    format!("An error occurred during the analysis: {e}"),
                    RunStatus::Error,
                )
            }
        };

        tracing::info!(
            status = ?status,
            tool_calls = scratchpad.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "agent run finished"
        );

        AgentReply {
            answer,
            status,
            invocations: scratchpad,
        }
    }

    /// The loop proper. `Ok(None)` means the model went silent.
    async fn resolve(
        &self,
        query: &str,
        scratchpad: &mut Vec<ToolInvocation>,
    ) -> Result<Option<String>, AgentError> {
        let definitions = self.tools.definitions();
        let mut history = vec![ChatMessage::user(query)];

        for round in 0..self.max_steps {
            let decision = self
                .engine
                .decide(&self.system_prompt, &history, &definitions)
                .await?;

            match decision {
                Decision::Answer(text) => {
                    tracing::info!(round, "final answer received");
                    return Ok(Some(text));
                }
                Decision::Silent => {
                    tracing::warn!(round, "model returned neither text nor tool calls");
                    return Ok(None);
                }
                Decision::Invoke { calls, text } => {
                    tracing::info!(round, tool_calls = calls.len(), "executing tool calls");
                    history.push(ChatMessage::assistant_tool_calls(text, &calls));
                    for call in &calls {
                        let invocation = self.invoke(call);
                        history.push(ChatMessage::tool_result(&call.id, &invocation.result));
                        scratchpad.push(invocation);
                    }
                }
            }
        }

        Err(AgentError::StepLimit {
            max_steps: self.max_steps,
        })
    }

    fn invoke(&self, call: &ToolCall) -> ToolInvocation {
        let start = Instant::now();
        let outcome = self.tools.invoke(call);
        let invocation = ToolInvocation {
            tool: call.name.clone(),
            arguments: call.arguments.clone(),
            result: outcome.model_text().to_string(),
            is_error: outcome.is_error(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        tracing::debug!(
            tool = %invocation.tool,
            call_id = %call.id,
            is_error = invocation.is_error,
            duration_ms = invocation.duration_ms,
            "tool call finished"
        );
        invocation
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Role;
    use crate::test_support::{expected_total, extract_call, plant_sheet, ScriptedEngine};
    use serde_json::json;

    fn orchestrator(engine: Arc<ScriptedEngine>, dir: &tempfile::TempDir) -> AgentOrchestrator {
        let tools = ToolRegistry::new(Arc::new(plant_sheet()), dir.path().join("data"));
        AgentOrchestrator::new(engine, tools)
    }

    #[tokio::test]
    async fn test_single_tool_round_then_answer() {
        let dir = tempfile::tempdir().unwrap();
        let total = expected_total(2);
        let engine = ScriptedEngine::new(vec![
            Ok(Decision::Invoke {
                calls: vec![extract_call("call_1", "USINA III")],
                text: None,
            }),
            Ok(Decision::Answer(format!("USINA III produced {total}"))),
        ]);
        let reply = orchestrator(engine.clone(), &dir).run("get data for USINA III").await;

        assert_eq!(reply.status, RunStatus::Success);
        assert_eq!(reply.answer, format!("USINA III produced {total}"));
        assert_eq!(reply.invocations.len(), 1);
        assert_eq!(reply.invocations[0].tool, "get_usina_data");
        assert_eq!(reply.invocations[0].arguments["usina_name"], "USINA III");
        assert!(!reply.invocations[0].is_error);

        // Second decision saw: user, assistant(tool_calls), tool(result)
        let seen = engine.seen();
        let history = &seen[1];
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[2].role, Role::Tool);
        assert_eq!(history[2].tool_call_id.as_deref(), Some("call_1"));
        let observed: serde_json::Value =
            serde_json::from_str(history[2].content.as_deref().unwrap()).unwrap();
        assert_eq!(observed["total_produzido"], total);
    }

    #[tokio::test]
    async fn test_tool_errors_are_observations() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ScriptedEngine::new(vec![
            Ok(Decision::Invoke {
                calls: vec![
                    extract_call("c1", "USINA VIII"),
                    ToolCall {
                        id: "c2".into(),
                        name: "run_python".into(),
                        arguments: json!({}),
                    },
                ],
                text: None,
            }),
            Ok(Decision::Answer("USINA VIII does not exist".into())),
        ]);
        let reply = orchestrator(engine.clone(), &dir).run("USINA VIII?").await;

        assert!(reply.is_success());
        assert_eq!(reply.invocations.len(), 2);
        assert!(reply.invocations.iter().all(|i| i.is_error));
        assert!(reply.invocations[0].result.contains("USINA VIII"));
        assert!(reply.invocations[1].result.contains("unknown tool"));

        assert_eq!(engine.seen()[1].len(), 4);
    }

    #[tokio::test]
    async fn test_unparseable_arguments_reject_only_that_call() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ScriptedEngine::new(vec![
            Ok(Decision::Invoke {
                calls: vec![
                    extract_call("c1", "USINA I"),
                    ToolCall {
                        id: "c2".into(),
                        name: "get_usina_data".into(),
                        arguments: serde_json::Value::String("{usina_name: USINA II}".into()),
                    },
                ],
                text: None,
            }),
            Ok(Decision::Answer("USINA I only".into())),
        ]);
        let reply = orchestrator(engine.clone(), &dir).run("USINA I and II").await;

        assert_eq!(reply.status, RunStatus::Success);
        assert_eq!(reply.answer, "USINA I only");
        assert_eq!(reply.invocations.len(), 2);
        assert!(!reply.invocations[0].is_error);
        assert!(reply.invocations[1].is_error);
        assert!(reply.invocations[1].result.starts_with("Error:"));

        // Both results reach the model before its next decision
        let history = &engine.seen()[1];
        assert_eq!(history.len(), 4);
        assert_eq!(history[3].tool_call_id.as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn test_invocation_duration_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ScriptedEngine::new(vec![]);
        let orchestrator = orchestrator(engine, &dir);

        let invocation = orchestrator.invoke(&extract_call("c1", "USINA IV"));
        assert_eq!(invocation.tool, "get_usina_data");
        assert!(!invocation.is_error);
        assert!(invocation.duration_ms < 60_000);
    }

    #[tokio::test]
    async fn test_decision_failure_becomes_error_reply() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ScriptedEngine::new(vec![Err(AgentError::Decision {
            reason: "HTTP 503: unavailable".into(),
        })]);
        let reply = orchestrator(engine, &dir).run("anything").await;

        assert_eq!(reply.status, RunStatus::Error);
        assert!(reply.answer.starts_with("An error occurred during the analysis"));
        assert!(reply.answer.contains("503"));
        assert!(reply.invocations.is_empty());
    }

    #[tokio::test]
    async fn test_silent_model_yields_notice() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ScriptedEngine::new(vec![]);
        let reply = orchestrator(engine, &dir).run("anything").await;

        assert_eq!(reply.status, RunStatus::Incomplete);
        assert_eq!(reply.answer, NO_ANSWER_NOTICE);
    }

    #[tokio::test]
    async fn test_step_limit() {
        let dir = tempfile::tempdir().unwrap();
        let looping: Vec<_> = (0..5)
            .map(|i| {
                Ok(Decision::Invoke {
                    calls: vec![extract_call(&format!("c{i}"), "USINA I")],
                    text: None,
                })
            })
            .collect();
        let engine = ScriptedEngine::new(looping);
        let reply = orchestrator(engine, &dir)
            .with_max_steps(3)
            .run("loop forever")
            .await;

        assert_eq!(reply.status, RunStatus::Incomplete);
        assert_eq!(reply.answer, STEP_LIMIT_NOTICE);
        assert_eq!(reply.invocations.len(), 3);
    }

    #[tokio::test]
    async fn test_all_plants_query_scratchpad_order() {
        let dir = tempfile::tempdir().unwrap();
        let calls: Vec<ToolCall> = ["USINA I", "USINA II", "USINA III", "USINA IV", "USINA V"]
            .iter()
            .enumerate()
            .map(|(i, p)| extract_call(&format!("c{i}"), p))
            .collect();
        let engine = ScriptedEngine::new(vec![
            Ok(Decision::Invoke { calls, text: None }),
            Ok(Decision::Answer("done".into())),
        ]);
        let reply = orchestrator(engine, &dir).run("all plants").await;

        let plants: Vec<&str> = reply
            .invocations
            .iter()
            .map(|i| i.arguments["usina_name"].as_str().unwrap())
            .collect();
        assert_eq!(plants, ["USINA I", "USINA II", "USINA III", "USINA IV", "USINA V"]);
        for (i, inv) in reply.invocations.iter().enumerate() {
            let value: serde_json::Value = serde_json::from_str(&inv.result).unwrap();
            assert_eq!(value["total_produzido"], expected_total(i));
        }
    }
}
