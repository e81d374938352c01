//! Chat completion response parsing.
//!
//! Only native JSON tool calls are understood. Argument strings that fail to
//! parse get a small set of repairs; anything still unreadable is passed on
//! as a raw JSON string so the tool layer rejects that one call.

use serde::Deserialize;
use uuid::Uuid;

use super::errors::InferenceError;
use super::types::{CompletionResponse, ToolCall};

#[derive(Deserialize)]
struct RawResponse {
    choices: Vec<RawChoice>,
}

#[derive(Deserialize)]
struct RawChoice {
    message: RawMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct RawMessage {
    content: Option<String>,
    tool_calls: Option<Vec<RawToolCall>>,
}

#[derive(Deserialize)]
struct RawToolCall {
    id: Option<String>,
    function: RawFunction,
}

#[derive(Deserialize)]
struct RawFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

/// Parse a non-streaming chat completion body.
pub fn parse_completion_response(body: &str) -> Result<CompletionResponse, InferenceError> {
    let resp: RawResponse = serde_json::from_str(body).map_err(|e| InferenceError::ResponseError {
        reason: format!("failed to parse completion response: {e}"),
    })?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| InferenceError::ResponseError {
            reason: "empty choices array".into(),
        })?;

    let content = choice.message.content.filter(|c| !c.trim().is_empty());

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(parse_tool_call)
        .collect::<Result<Vec<_>, _>>()?;

    let finish_reason = if tool_calls.is_empty() {
        choice.finish_reason
    } else {
        Some("tool_calls".into())
    };

    Ok(CompletionResponse {
        content,
        tool_calls,
        finish_reason,
    })
}

fn parse_tool_call(raw: RawToolCall) -> Result<ToolCall, InferenceError> {
    if raw.function.name.is_empty() {
        return Err(InferenceError::ToolCallParseError {
            raw_response: raw.function.arguments,
            reason: "empty tool name".into(),
        });
    }

    let arguments = if raw.function.arguments.trim().is_empty() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        match repair_tool_call_json(&raw.function.arguments) {
            Some(value) => value,
            None => {
                tracing::warn!(
                    tool = %raw.function.name,
                    arguments = %raw.function.arguments,
                    "unparseable tool arguments kept as raw string"
                );
                serde_json::Value::String(raw.function.arguments.clone())
            }
        }
    };

    Ok(ToolCall {
        id: raw
            .id
            .unwrap_or_else(|| format!("call_{}", Uuid::new_v4())),
        name: raw.function.name,
        arguments,
    })
}

/// Extract `error.message` from an OpenAI-style error body.
pub fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

// ─── JSON Repair ─────────────────────────────────────────────────────────────

/// Parse tool call arguments, repairing common malformations:
/// trailing commas, missing closing braces, stray control characters.
///
/// Returns `None` if the text is irreparable.
pub fn repair_tool_call_json(raw: &str) -> Option<serde_json::Value> {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(raw) {
        return Some(v);
    }

    let mut repaired = strip_trailing_commas(raw);
    if let Ok(v) = serde_json::from_str(&repaired) {
        return Some(v);
    }

    repaired = close_open_braces(&repaired);
    if let Ok(v) = serde_json::from_str(&repaired) {
        return Some(v);
    }

    repaired = repaired
        .chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\r' || c == '\t')
        .collect();
    serde_json::from_str(&repaired).ok()
}

/// Remove commas directly before `}` or `]`.
fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());

    for (i, &c) in chars.iter().enumerate() {
        if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Append `}` for every brace left open outside string literals.
fn close_open_braces(input: &str) -> String {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for ch in input.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => depth -= 1,
            _ => {}
        }
    }

    let mut out = input.to_string();
    for _ in 0..depth.max(0) {
        out.push('}');
    }
    out
}

// ─── Tests ───────────────────────────────────────────────────────────────────
