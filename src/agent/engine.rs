//! DecisionEngine: the model boundary of the agent loop.

use async_trait::async_trait;

use crate::inference::{
    ChatMessage, CompletionResponse, ConnectionStatus, InferenceClient, ToolCall, ToolDefinition,
};

use super::errors::AgentError;

/// What the model wants to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Run these tool calls, in order. `text` is any accompanying content.
    Invoke {
        calls: Vec<ToolCall>,
        text: Option<String>,
    },
    /// Final answer for the user.
    Answer(String),
    /// Neither tool calls nor text.
    Silent,
}

impl From<CompletionResponse> for Decision {
    fn from(resp: CompletionResponse) -> Self {
        if !resp.tool_calls.is_empty() {
            Decision::Invoke {
                calls: resp.tool_calls,
                text: resp.content,
            }
        } else {
            match resp.content {
                Some(text) => Decision::Answer(text),
                None => Decision::Silent,
            }
        }
    }
}

/// Decides the next step given the conversation so far.
///
/// Opaque and possibly slow or failing. Implemented by `InferenceClient`
/// for real models and by scripted engines in tests.
#[async_trait]
pub trait DecisionEngine: Send + Sync {
    async fn decide(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<Decision, AgentError>;

    /// Cheap reachability check.
    async fn probe(&self) -> ConnectionStatus {
        ConnectionStatus::connected(None)
    }
}

#[async_trait]
impl DecisionEngine for InferenceClient {
    async fn decide(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<Decision, AgentError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend_from_slice(history);

        let tools = if tools.is_empty() {
            None
        } else {
            Some(tools.to_vec())
        };

        let response = self.chat_completion(messages, tools).await?;
        Ok(Decision::from(response))
    }

    async fn probe(&self) -> ConnectionStatus {
        self.test_connection().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_calls_win_over_text() {
        let call = ToolCall {
            id: "c1".into(),
            name: "get_usina_data".into(),
            arguments: json!({"usina_name": "USINA I"}),
        };
        let decision = Decision::from(CompletionResponse {
            content: Some("Looking it up".into()),
            tool_calls: vec![call.clone()],
            finish_reason: Some("tool_calls".into()),
        });
        assert_eq!(
            decision,
            Decision::Invoke {
                calls: vec![call],
                text: Some("Looking it up".into())
            }
        );
    }

    #[test]
    fn test_text_only_is_answer() {
        let decision = Decision::from(CompletionResponse {
            content: Some("Total: 10".into()),
            ..CompletionResponse::default()
        });
        assert_eq!(decision, Decision::Answer("Total: 10".into()));
    }

    #[test]
    fn test_empty_is_silent() {
        assert_eq!(Decision::from(CompletionResponse::default()), Decision::Silent);
    }
}
